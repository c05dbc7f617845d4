//! Staged encounters: one step active at a time, bonus steps alongside

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use criteria_domain::{
    CriteriaEvent, Deliverable, OwnerKind, ScenarioId, ScenarioInstanceId, ScenarioStepEntry,
    ScenarioStepId,
};

use crate::infrastructure::ports::{CompletedDeliverable, OwnerRef};
use crate::registry::{CriteriaIdx, CriteriaRegistry, CriteriaTreeNode, TreeIdx};
use crate::tracker::{CriteriaHandler, CriteriaOwner, CriteriaServices, FollowUps};

const SCENARIO_KINDS: [OwnerKind; 1] = [OwnerKind::Scenario];

#[derive(Debug, Clone)]
pub struct ScenarioProgress {
    instance: ScenarioInstanceId,
    scenario_id: ScenarioId,
    /// In play order
    steps: Vec<ScenarioStepEntry>,
    current: Option<ScenarioStepId>,
    completed_steps: BTreeMap<ScenarioStepId, DateTime<Utc>>,
    complete: bool,
}

impl ScenarioProgress {
    pub fn new(instance: ScenarioInstanceId, scenario_id: ScenarioId, registry: &CriteriaRegistry) -> Self {
        let steps: Vec<ScenarioStepEntry> = registry
            .scenario_steps(scenario_id)
            .into_iter()
            .cloned()
            .collect();
        if steps.is_empty() {
            tracing::warn!(scenario_id = %scenario_id, "Scenario has no steps");
        }

        let mut progress = Self {
            instance,
            scenario_id,
            steps,
            current: None,
            completed_steps: BTreeMap::new(),
            complete: false,
        };
        progress.current = progress.next_main_step();
        progress
    }

    pub fn instance(&self) -> ScenarioInstanceId {
        self.instance
    }

    pub fn scenario_id(&self) -> ScenarioId {
        self.scenario_id
    }

    pub fn current_step(&self) -> Option<ScenarioStepId> {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_step_completed(&self, step: ScenarioStepId) -> bool {
        self.completed_steps.contains_key(&step)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = ScenarioStepId> + '_ {
        self.completed_steps.keys().copied()
    }

    fn step(&self, id: ScenarioStepId) -> Option<&ScenarioStepEntry> {
        self.steps.iter().find(|step| step.id == id)
    }

    /// First main step not yet completed
    fn next_main_step(&self) -> Option<ScenarioStepId> {
        self.steps
            .iter()
            .find(|step| !step.is_bonus && !self.is_step_completed(step.id))
            .map(|step| step.id)
    }

    /// Steps whose criteria may move: the current one and open bonus steps
    fn is_active(&self, step: &ScenarioStepEntry) -> bool {
        if step.scenario_id != self.scenario_id || self.is_step_completed(step.id) {
            return false;
        }
        step.is_bonus || self.current == Some(step.id)
    }

    fn tree_step(&self, tree: &CriteriaTreeNode) -> Option<&ScenarioStepEntry> {
        match tree.deliverable {
            Some(Deliverable::ScenarioStep(id)) => self.step(id),
            _ => None,
        }
    }

    fn complete_step(&mut self, services: &CriteriaServices, step: ScenarioStepEntry) {
        let now = services.clock.now();
        self.completed_steps.insert(step.id, now);

        let owner = self.owner_ref();
        services.notifier.scenario_step_completed(owner, step.id);
        services
            .instance_scripts
            .on_scenario_step_completed(self.instance, step.id);

        tracing::info!(
            scenario_id = %self.scenario_id,
            step_id = %step.id,
            bonus = step.is_bonus,
            "Scenario step completed"
        );

        if step.is_bonus {
            return;
        }

        self.current = self.next_main_step();
        if self.current.is_none() {
            self.complete = true;
            services.notifier.scenario_completed(owner, self.scenario_id);
            tracing::info!(scenario_id = %self.scenario_id, "Scenario completed");
        }
    }
}

impl CriteriaOwner for ScenarioProgress {
    fn owner_kinds(&self) -> &'static [OwnerKind] {
        &SCENARIO_KINDS
    }

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Scenario(self.instance)
    }

    fn candidate_criteria(&self, registry: &CriteriaRegistry, event: &CriteriaEvent) -> Vec<CriteriaIdx> {
        registry
            .scenario_criteria_by_type(self.scenario_id, event.criteria_type)
            .to_vec()
    }

    fn can_update_criteria_tree(
        &self,
        _registry: &CriteriaRegistry,
        tree: &CriteriaTreeNode,
        _event: &CriteriaEvent,
    ) -> bool {
        !self.complete && self.tree_step(tree).is_some_and(|step| self.is_active(step))
    }

    fn can_complete_criteria_tree(&self, _registry: &CriteriaRegistry, tree: &CriteriaTreeNode) -> bool {
        self.tree_step(tree).is_some_and(|step| self.is_active(step))
    }

    fn completed_criteria_tree(
        &mut self,
        services: &CriteriaServices,
        tree: TreeIdx,
        _event: &CriteriaEvent,
        _follow_ups: &mut FollowUps,
    ) {
        let node = services.registry.tree(tree);
        if !node.is_root() {
            return;
        }
        let Some(step) = self.tree_step(node).cloned() else {
            return;
        };
        if self.is_step_completed(step.id) {
            return;
        }
        self.complete_step(services, step);
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable> {
        self.completed_steps
            .iter()
            .map(|(id, date)| CompletedDeliverable {
                deliverable: Deliverable::ScenarioStep(*id),
                date: *date,
            })
            .collect()
    }

    fn reset(&mut self, _services: &CriteriaServices) {
        self.completed_steps.clear();
        self.complete = false;
        self.current = self.next_main_step();
    }
}

impl CriteriaHandler<ScenarioProgress> {
    /// Rebuilds step state from loaded progress, walking the steps in play
    /// order until the first incomplete main step.
    pub fn resume(&mut self) {
        let now = self.services().clock.now();
        let steps = self.owner().steps.clone();

        for step in steps {
            if !step.is_bonus {
                self.owner_mut().current = Some(step.id);
            }
            if !self.is_criteria_tree_completed(step.criteria_tree_id) {
                if step.is_bonus {
                    continue;
                }
                break;
            }
            self.owner_mut().completed_steps.insert(step.id, now);
        }

        let owner = self.owner_mut();
        owner.current = owner.next_main_step();
        owner.complete = owner.current.is_none() && !owner.steps.is_empty();

        tracing::debug!(
            scenario_id = %self.owner().scenario_id,
            current_step = ?self.owner().current,
            "Scenario resumed"
        );
    }
}
