//! Owner-kind specialisations of the tracker pipeline.
//!
//! Each type here implements [`CriteriaOwner`](crate::tracker::CriteriaOwner)
//! for one kind of owner and is meant to be wrapped in a
//! [`CriteriaHandler`](crate::tracker::CriteriaHandler).

mod achievements;
mod guild;
mod quest_objective;
mod scenario;

pub use achievements::{EarnedAchievements, ParticipantAchievements};
pub use guild::GuildAchievements;
pub use quest_objective::QuestObjectives;
pub use scenario::ScenarioProgress;

use crate::tracker::CriteriaHandler;

pub type ParticipantAchievementHandler = CriteriaHandler<ParticipantAchievements>;
pub type GuildAchievementHandler = CriteriaHandler<GuildAchievements>;
pub type ScenarioHandler = CriteriaHandler<ScenarioProgress>;
pub type QuestObjectiveHandler = CriteriaHandler<QuestObjectives>;
