//! Criteria Engine library.
//!
//! Tracks progress of owners (participants, accounts, guilds, scenarios and
//! quest objective sets) toward criteria defined in a static dataset.
//!
//! ## Structure
//!
//! - `registry/` - Immutable criteria graph and its lookup indices
//! - `evaluation/` - Pure predicates judging an event against definitions
//! - `tracker/` - The per-owner update pipeline
//! - `owners/` - Owner-kind specialisations (achievements, scenarios, ...)
//! - `infrastructure/` - Ports, settings and static dataset loading

pub mod evaluation;
pub mod infrastructure;
pub mod owners;
pub mod registry;
pub mod tracker;

/// Registry builders, recording notifier and canned events for tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end scenarios over the shipped test dataset.
#[cfg(test)]
mod e2e_tests;

pub use owners::{
    GuildAchievementHandler, ParticipantAchievementHandler, QuestObjectiveHandler,
    ScenarioHandler,
};
pub use registry::CriteriaRegistry;
pub use tracker::{CriteriaHandler, CriteriaOwner, CriteriaServices, CriteriaState};
