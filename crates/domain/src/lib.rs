//! Criteria domain - static definitions, value objects and progress records
//!
//! Everything here is plain data: rows loaded from the static dataset,
//! their structural validation, and the snapshots events are evaluated
//! against. Evaluation itself lives in `criteria-engine`.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    AchievementEntry, AchievementFaction, AchievementFlags, CriteriaData, CriteriaDataRow,
    CriteriaDataType, CriteriaEntry, CriteriaFlags, CriteriaProgress, CriteriaProgressRow,
    CriteriaTreeEntry, CriteriaTreeFlags, CriteriaTreeOperator, ModifierCondition, ModifierKind,
    ModifierTreeEntry, ModifierTreeOperator, QuestObjectiveEntry, ScenarioStepEntry,
};

pub use error::DomainError;

pub use ids::{
    AccountId, AchievementId, CriteriaId, CriteriaTreeId, GuildId, ModifierTreeId,
    ParticipantId, QuestId, QuestObjectiveId, ScenarioId, ScenarioInstanceId, ScenarioStepId,
};

pub use value_objects::{
    AmountSource, AuraSnapshot, BattlegroundSnapshot, ComparisonOp, CriteriaEvent,
    CriteriaFailEvent, CriteriaStartEvent, CriteriaType, Deliverable, FailReason, Gender,
    ItemSnapshot, OwnerKind, OwnerKinds, ParticipantSnapshot, ProgressType, Team,
    WorldObjectKind, WorldObjectSnapshot,
};
