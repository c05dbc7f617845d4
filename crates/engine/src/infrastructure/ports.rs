//! Port traits for the collaborators the engine calls out to.
//!
//! All ports are synchronous: the engine never blocks or suspends, and
//! implementations are expected to hand work off (queue a packet, record a
//! row) rather than perform I/O inline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use criteria_domain::{
    AccountId, AchievementId, CriteriaEvent, CriteriaId, CriteriaProgressRow, Deliverable,
    GuildId, ParticipantId, QuestObjectiveId, ScenarioId, ScenarioInstanceId, ScenarioStepId,
};

// =============================================================================
// Port Types
// =============================================================================

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerRef {
    Participant(ParticipantId),
    Account(AccountId),
    Guild(GuildId),
    Scenario(ScenarioInstanceId),
    QuestObjectives(ParticipantId),
}

/// A progress change as announced to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaUpdate {
    pub criteria_id: CriteriaId,
    pub counter: u64,
    pub date: DateTime<Utc>,
    pub player: Option<ParticipantId>,
    /// Time since the criteria's timer started, for timed criteria
    pub elapsed: Option<Duration>,
    /// The update completed a timed criteria within its budget
    pub timed_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedDeliverable {
    pub deliverable: Deliverable,
    pub date: DateTime<Utc>,
}

/// Full progress dump of one owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllCriteriaData {
    pub progress: Vec<CriteriaProgressRow>,
    pub completed: Vec<CompletedDeliverable>,
}

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Presentation
// =============================================================================

/// Receives every externally visible progress change
#[cfg_attr(test, mockall::automock)]
pub trait CriteriaNotifier: Send + Sync {
    fn criteria_update(&self, owner: OwnerRef, update: &CriteriaUpdate);

    fn criteria_removed(&self, owner: OwnerRef, criteria_id: CriteriaId);

    fn achievement_earned(
        &self,
        owner: OwnerRef,
        achievement_id: AchievementId,
        earned_by: Option<ParticipantId>,
        date: DateTime<Utc>,
    );

    fn achievement_removed(&self, owner: OwnerRef, achievement_id: AchievementId);

    fn scenario_step_completed(&self, owner: OwnerRef, step_id: ScenarioStepId);

    fn scenario_completed(&self, owner: OwnerRef, scenario_id: ScenarioId);

    fn quest_objective_completed(&self, owner: OwnerRef, objective_id: QuestObjectiveId);

    /// `receiver` is the participant asking for the dump, if not the owner itself
    fn all_data(&self, owner: OwnerRef, receiver: Option<ParticipantId>, data: &AllCriteriaData);
}

// =============================================================================
// Scripting
// =============================================================================

/// Named scripted checks referenced by requirement predicates
#[cfg_attr(test, mockall::automock)]
pub trait ScriptCheckPort: Send + Sync {
    /// Whether a check is registered under `name` (load-time validation)
    fn is_bound(&self, name: &str) -> bool;

    /// Runs the check. `None` when nothing is bound under `name`.
    fn check(&self, name: &str, criteria_id: CriteriaId, event: &CriteriaEvent) -> Option<bool>;
}

/// Hooks into the script of the instance an owner is in
#[cfg_attr(test, mockall::automock)]
pub trait InstanceScriptPort: Send + Sync {
    /// Instance-specific requirement check. `None` when the instance has no script.
    fn check_requirement(
        &self,
        instance_id: u32,
        criteria_id: CriteriaId,
        event: &CriteriaEvent,
    ) -> Option<bool>;

    fn on_scenario_step_completed(&self, scenario: ScenarioInstanceId, step_id: ScenarioStepId);
}

// =============================================================================
// World State
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait WorldStatePort: Send + Sync {
    fn is_holiday_active(&self, holiday_id: u32) -> bool;

    fn is_game_event_active(&self, event_id: u32) -> bool;
}

/// Scripting and world-state ports for deployments without either
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptCheckPort for NoScripts {
    fn is_bound(&self, _name: &str) -> bool {
        false
    }

    fn check(&self, _name: &str, _criteria_id: CriteriaId, _event: &CriteriaEvent) -> Option<bool> {
        None
    }
}

impl InstanceScriptPort for NoScripts {
    fn check_requirement(
        &self,
        _instance_id: u32,
        _criteria_id: CriteriaId,
        _event: &CriteriaEvent,
    ) -> Option<bool> {
        None
    }

    fn on_scenario_step_completed(&self, _scenario: ScenarioInstanceId, _step_id: ScenarioStepId) {}
}

impl WorldStatePort for NoScripts {
    fn is_holiday_active(&self, _holiday_id: u32) -> bool {
        false
    }

    fn is_game_event_active(&self, _event_id: u32) -> bool {
        false
    }
}
