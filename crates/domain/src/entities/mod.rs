//! Domain entities - static definition rows and per-owner progress

mod achievement;
mod criteria;
mod criteria_data;
mod criteria_tree;
mod modifier_tree;
mod progress;
mod quest_objective;
mod scenario;

pub use achievement::{AchievementEntry, AchievementFaction, AchievementFlags};
pub use criteria::{CriteriaEntry, CriteriaFlags};
pub use criteria_data::{
    CriteriaData, CriteriaDataRow, CriteriaDataType, MAX_DRUNK_STATE, MAX_ITEM_QUALITY,
    MAX_LEVEL, MAX_SPELL_EFFECTS,
};
pub use criteria_tree::{CriteriaTreeEntry, CriteriaTreeFlags, CriteriaTreeOperator};
pub use modifier_tree::{ModifierCondition, ModifierKind, ModifierTreeEntry, ModifierTreeOperator};
pub use progress::{CriteriaProgress, CriteriaProgressRow};
pub use quest_objective::QuestObjectiveEntry;
pub use scenario::ScenarioStepEntry;
