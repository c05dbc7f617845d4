//! Value objects - Immutable objects defined by their attributes

mod comparison;
mod criteria_event;
mod criteria_type;
mod deliverable;
mod owner_kind;
mod snapshot;
mod timed_events;

pub use comparison::ComparisonOp;
pub use criteria_event::CriteriaEvent;
pub use criteria_type::{AmountSource, CriteriaType, ProgressType};
pub use deliverable::Deliverable;
pub use owner_kind::{OwnerKind, OwnerKinds};
pub use snapshot::{
    AuraSnapshot, BattlegroundSnapshot, Gender, ItemSnapshot, ParticipantSnapshot, Team,
    WorldObjectKind, WorldObjectSnapshot,
};
pub use timed_events::{CriteriaFailEvent, CriteriaStartEvent, FailReason};
