//! Quest objectives tracked through criteria trees

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use criteria_domain::{
    CriteriaEvent, Deliverable, OwnerKind, ParticipantId, QuestId, QuestObjectiveEntry,
    QuestObjectiveId,
};

use crate::infrastructure::ports::{CompletedDeliverable, OwnerRef};
use crate::registry::{CriteriaRegistry, CriteriaTreeNode, TreeIdx};
use crate::tracker::{CriteriaHandler, CriteriaOwner, CriteriaServices, FollowUps};

const OBJECTIVE_KINDS: [OwnerKind; 1] = [OwnerKind::QuestObjective];

#[derive(Debug, Clone)]
pub struct QuestObjectives {
    participant: ParticipantId,
    active_quests: BTreeSet<QuestId>,
    completed: BTreeMap<QuestObjectiveId, DateTime<Utc>>,
}

impl QuestObjectives {
    pub fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            active_quests: BTreeSet::new(),
            completed: BTreeMap::new(),
        }
    }

    /// Quests already in the log when stored progress is restored
    pub fn with_active_quests(mut self, quests: impl IntoIterator<Item = QuestId>) -> Self {
        self.active_quests.extend(quests);
        self
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn is_quest_active(&self, quest: QuestId) -> bool {
        self.active_quests.contains(&quest)
    }

    pub fn has_completed_objective(&self, objective: QuestObjectiveId) -> bool {
        self.completed.contains_key(&objective)
    }

    fn open_objective<'r>(
        &self,
        registry: &'r CriteriaRegistry,
        tree: &CriteriaTreeNode,
    ) -> Option<&'r QuestObjectiveEntry> {
        let Some(Deliverable::QuestObjective(id)) = tree.deliverable else {
            return None;
        };
        registry
            .quest_objective(id)
            .filter(|objective| self.is_quest_active(objective.quest_id))
            .filter(|objective| !self.has_completed_objective(objective.id))
    }
}

impl CriteriaOwner for QuestObjectives {
    fn owner_kinds(&self) -> &'static [OwnerKind] {
        &OBJECTIVE_KINDS
    }

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::QuestObjectives(self.participant)
    }

    fn can_update_criteria_tree(
        &self,
        registry: &CriteriaRegistry,
        tree: &CriteriaTreeNode,
        _event: &CriteriaEvent,
    ) -> bool {
        self.open_objective(registry, tree).is_some()
    }

    fn can_complete_criteria_tree(&self, registry: &CriteriaRegistry, tree: &CriteriaTreeNode) -> bool {
        self.open_objective(registry, tree).is_some()
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
        let Some(objective) = self.open_objective(&services.registry, node) else {
            return;
        };

        let id = objective.id;
        self.completed.insert(id, services.clock.now());
        services
            .notifier
            .quest_objective_completed(self.owner_ref(), id);
        tracing::debug!(
            quest_id = %objective.quest_id,
            objective_id = %id,
            "Quest objective completed"
        );
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable> {
        self.completed
            .iter()
            .map(|(id, date)| CompletedDeliverable {
                deliverable: Deliverable::QuestObjective(*id),
                date: *date,
            })
            .collect()
    }

    fn reset(&mut self, _services: &CriteriaServices) {
        self.completed.clear();
    }
}

impl CriteriaHandler<QuestObjectives> {
    /// Starts tracking `quest`. Objectives left over from an earlier run of a
    /// repeatable quest start again from nothing.
    pub fn accept_quest(&mut self, quest: QuestId) {
        if !self.owner_mut().active_quests.insert(quest) {
            return;
        }
        self.forget_objectives(quest);
    }

    /// Drops the quest along with all progress on its objectives
    pub fn abandon_quest(&mut self, quest: QuestId) {
        if !self.owner_mut().active_quests.remove(&quest) {
            return;
        }
        self.forget_objectives(quest);
        tracing::debug!(quest_id = %quest, "Quest abandoned");
    }

    /// Quest turned in; objective completions are kept until it is taken again
    pub fn complete_quest(&mut self, quest: QuestId) {
        self.owner_mut().active_quests.remove(&quest);
    }

    fn forget_objectives(&mut self, quest: QuestId) {
        let trees: Vec<_> = self
            .registry()
            .quest_objectives(quest)
            .into_iter()
            .map(|objective| (objective.id, objective.criteria_tree_id))
            .collect();

        for (objective, tree) in trees {
            self.owner_mut().completed.remove(&objective);
            self.reset_criteria_tree(tree);
        }
    }
}
