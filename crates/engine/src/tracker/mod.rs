//! Per-owner progress tracking.
//!
//! [`CriteriaHandler`] runs the one update pipeline shared by every owner
//! kind. What differs between owner kinds (which criteria are candidates,
//! which trees may advance or complete, what completing a tree delivers)
//! comes from a [`CriteriaOwner`] implementation in [`crate::owners`].

mod handler;

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use criteria_domain::{AchievementId, CriteriaEvent, OwnerKind, OwnerKinds};

pub use handler::CriteriaHandler;

use crate::evaluation::EvaluationContext;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::ports::{
    ClockPort, CompletedDeliverable, CriteriaNotifier, InstanceScriptPort, NoScripts, OwnerRef,
    ScriptCheckPort, WorldStatePort,
};
use crate::registry::{Criteria, CriteriaIdx, CriteriaRegistry, CriteriaTreeNode, TreeIdx};

// =============================================================================
// Services
// =============================================================================

/// Shared collaborators handed to every tracker
#[derive(Clone)]
pub struct CriteriaServices {
    pub registry: Arc<CriteriaRegistry>,
    pub clock: Arc<dyn ClockPort>,
    pub notifier: Arc<dyn CriteriaNotifier>,
    pub scripts: Arc<dyn ScriptCheckPort>,
    pub instance_scripts: Arc<dyn InstanceScriptPort>,
    pub world: Arc<dyn WorldStatePort>,
}

impl CriteriaServices {
    /// Services with the system clock and no scripting or world state
    pub fn new(registry: Arc<CriteriaRegistry>, notifier: Arc<dyn CriteriaNotifier>) -> Self {
        Self {
            registry,
            clock: Arc::new(SystemClock),
            notifier,
            scripts: Arc::new(NoScripts),
            instance_scripts: Arc::new(NoScripts),
            world: Arc::new(NoScripts),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_scripts(mut self, scripts: Arc<dyn ScriptCheckPort>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_instance_scripts(mut self, instance_scripts: Arc<dyn InstanceScriptPort>) -> Self {
        self.instance_scripts = instance_scripts;
        self
    }

    pub fn with_world(mut self, world: Arc<dyn WorldStatePort>) -> Self {
        self.world = world;
        self
    }

    pub fn evaluation_context<'a>(&'a self, event: &'a CriteriaEvent) -> EvaluationContext<'a> {
        EvaluationContext {
            event,
            scripts: self.scripts.as_ref(),
            instance_scripts: self.instance_scripts.as_ref(),
            world: self.world.as_ref(),
        }
    }
}

impl fmt::Debug for CriteriaServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CriteriaServices")
            .field("criteria", &self.registry.criteria_count())
            .field("trees", &self.registry.tree_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Goal State
// =============================================================================

/// Where one owner stands on one criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaState {
    NotStarted,
    InProgress,
    Completed,
    /// Timed out or failed by a fail event; cleared by the next start or a reset
    Failed,
}

// =============================================================================
// Owner Capabilities
// =============================================================================

/// Events raised while handling an event, processed after it in FIFO order
pub type FollowUps = VecDeque<CriteriaEvent>;

/// What one owner kind contributes to the shared pipeline
pub trait CriteriaOwner: Send {
    /// Owner kinds whose criteria this tracker accepts
    fn owner_kinds(&self) -> &'static [OwnerKind];

    fn owner_ref(&self) -> OwnerRef;

    fn owner_flags(&self) -> OwnerKinds {
        self.owner_kinds()
            .iter()
            .fold(OwnerKinds::empty(), |acc, kind| acc | kind.flag())
    }

    /// Who is told about progress on `criteria`
    fn audience_for(&self, _criteria: &Criteria) -> OwnerRef {
        self.owner_ref()
    }

    /// Criteria that may react to `event`, without duplicates
    fn candidate_criteria(&self, registry: &CriteriaRegistry, event: &CriteriaEvent) -> Vec<CriteriaIdx> {
        let mut seen = BTreeSet::new();
        self.owner_kinds()
            .iter()
            .flat_map(|kind| registry.criteria_by_type(*kind, event.criteria_type, event.misc_value1))
            .copied()
            .filter(|idx| seen.insert(*idx))
            .collect()
    }

    /// Whether progress may still be made on the tree a criteria gates
    fn can_update_criteria_tree(
        &self,
        registry: &CriteriaRegistry,
        tree: &CriteriaTreeNode,
        event: &CriteriaEvent,
    ) -> bool;

    /// Veto consulted on every node while judging completion
    fn can_complete_criteria_tree(&self, registry: &CriteriaRegistry, tree: &CriteriaTreeNode) -> bool;

    /// A tree node is complete after a progress update. Called on every
    /// such update, so the deliverable must only be handed out once.
    fn completed_criteria_tree(
        &mut self,
        services: &CriteriaServices,
        tree: TreeIdx,
        event: &CriteriaEvent,
        follow_ups: &mut FollowUps,
    );

    /// Called once per touched root after every progress update
    fn after_criteria_tree_update(
        &mut self,
        _services: &CriteriaServices,
        _root: TreeIdx,
        _event: &CriteriaEvent,
    ) {
    }

    fn has_earned_achievement(&self, _achievement: AchievementId) -> bool {
        false
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable>;

    /// Drops owner-side completion state, notifying as needed
    fn reset(&mut self, services: &CriteriaServices);
}
