//! Criteria registry - the immutable static graph and its lookup indices.
//!
//! Built once from a [`StaticDataSet`](crate::infrastructure::static_data::StaticDataSet)
//! and shared read-only (usually behind an `Arc`) by every tracker. No query
//! mutates the registry, so any number of trackers may read it concurrently.

mod loader;
mod nodes;
mod report;

use std::collections::HashMap;

use criteria_domain::{
    AchievementEntry, AchievementId, CriteriaFailEvent, CriteriaId, CriteriaStartEvent,
    CriteriaTreeId, CriteriaType, ModifierTreeId, OwnerKind, QuestId, QuestObjectiveEntry,
    QuestObjectiveId, ScenarioId, ScenarioStepEntry, ScenarioStepId,
};

pub use nodes::{Criteria, CriteriaIdx, CriteriaTreeNode, ModifierIdx, ModifierNode, TreeIdx};
pub use report::{LoadReport, TableCounts};

#[derive(Debug, Default)]
pub struct CriteriaRegistry {
    criteria: Vec<Criteria>,
    trees: Vec<CriteriaTreeNode>,
    modifiers: Vec<ModifierNode>,

    criteria_by_id: HashMap<CriteriaId, CriteriaIdx>,
    tree_by_id: HashMap<CriteriaTreeId, TreeIdx>,
    modifier_by_id: HashMap<ModifierTreeId, ModifierIdx>,

    achievements: HashMap<AchievementId, AchievementEntry>,
    achievement_by_tree: HashMap<CriteriaTreeId, AchievementId>,
    scenario_steps: HashMap<ScenarioStepId, ScenarioStepEntry>,
    steps_by_scenario: HashMap<ScenarioId, Vec<ScenarioStepId>>,
    step_by_tree: HashMap<CriteriaTreeId, ScenarioStepId>,
    quest_objectives: HashMap<QuestObjectiveId, QuestObjectiveEntry>,
    objectives_by_quest: HashMap<QuestId, Vec<QuestObjectiveId>>,
    objective_by_tree: HashMap<CriteriaTreeId, QuestObjectiveId>,

    by_type: HashMap<(OwnerKind, CriteriaType), Vec<CriteriaIdx>>,
    by_asset: HashMap<(OwnerKind, CriteriaType, u64), Vec<CriteriaIdx>>,
    scenario_by_type: HashMap<(ScenarioId, CriteriaType), Vec<CriteriaIdx>>,
    by_start_event: HashMap<(CriteriaStartEvent, u64), Vec<CriteriaIdx>>,
    by_fail_event: HashMap<(CriteriaFailEvent, u64), Vec<CriteriaIdx>>,

    report: LoadReport,
}

impl CriteriaRegistry {
    // =========================================================================
    // Arena access
    // =========================================================================

    pub fn criteria(&self, idx: CriteriaIdx) -> &Criteria {
        &self.criteria[idx.get()]
    }

    pub fn tree(&self, idx: TreeIdx) -> &CriteriaTreeNode {
        &self.trees[idx.get()]
    }

    pub fn modifier(&self, idx: ModifierIdx) -> &ModifierNode {
        &self.modifiers[idx.get()]
    }

    pub fn criteria_idx(&self, id: CriteriaId) -> Option<CriteriaIdx> {
        self.criteria_by_id.get(&id).copied()
    }

    pub fn tree_idx(&self, id: CriteriaTreeId) -> Option<TreeIdx> {
        self.tree_by_id.get(&id).copied()
    }

    pub fn modifier_idx(&self, id: ModifierTreeId) -> Option<ModifierIdx> {
        self.modifier_by_id.get(&id).copied()
    }

    pub fn criteria_by_id(&self, id: CriteriaId) -> Option<&Criteria> {
        self.criteria_idx(id).map(|idx| self.criteria(idx))
    }

    pub fn tree_by_id(&self, id: CriteriaTreeId) -> Option<&CriteriaTreeNode> {
        self.tree_idx(id).map(|idx| self.tree(idx))
    }

    pub fn criteria_count(&self) -> usize {
        self.criteria.len()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Tree nodes gated by a criteria
    pub fn trees_for_criteria(&self, idx: CriteriaIdx) -> &[TreeIdx] {
        &self.criteria(idx).trees
    }

    /// Pre-order walk of the subtree rooted at `root`, `root` included
    pub fn subtree(&self, root: TreeIdx) -> Vec<TreeIdx> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.tree(idx).children.iter().rev().copied());
        }
        out
    }

    /// `idx` followed by each of its ancestors up to the root
    pub fn ancestors(&self, idx: TreeIdx) -> impl Iterator<Item = TreeIdx> + '_ {
        std::iter::successors(Some(idx), move |current| self.tree(*current).parent)
    }

    // =========================================================================
    // Event indices
    // =========================================================================

    /// Criteria of `kind` listening for `criteria_type`.
    ///
    /// For participant and account criteria of a type stored by asset, a
    /// nonzero `asset` narrows the result to the criteria requiring it.
    pub fn criteria_by_type(
        &self,
        kind: OwnerKind,
        criteria_type: CriteriaType,
        asset: u64,
    ) -> &[CriteriaIdx] {
        let bucketed = matches!(kind, OwnerKind::Player | OwnerKind::Account);
        let list = if bucketed && asset != 0 && criteria_type.is_stored_by_asset() {
            self.by_asset.get(&(kind, criteria_type, asset))
        } else {
            self.by_type.get(&(kind, criteria_type))
        };
        list.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scenario_criteria_by_type(
        &self,
        scenario_id: ScenarioId,
        criteria_type: CriteriaType,
    ) -> &[CriteriaIdx] {
        self.scenario_by_type
            .get(&(scenario_id, criteria_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn timed_criteria_by_start_event(
        &self,
        event: CriteriaStartEvent,
        asset: u64,
    ) -> &[CriteriaIdx] {
        self.by_start_event
            .get(&(event, asset))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn criteria_by_fail_event(&self, event: CriteriaFailEvent, asset: u64) -> &[CriteriaIdx] {
        self.by_fail_event
            .get(&(event, asset))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // =========================================================================
    // Deliverables
    // =========================================================================

    pub fn achievement(&self, id: AchievementId) -> Option<&AchievementEntry> {
        self.achievements.get(&id)
    }

    pub fn achievement_for_tree(&self, tree: CriteriaTreeId) -> Option<&AchievementEntry> {
        self.achievement_by_tree
            .get(&tree)
            .and_then(|id| self.achievements.get(id))
    }

    pub fn scenario_step(&self, id: ScenarioStepId) -> Option<&ScenarioStepEntry> {
        self.scenario_steps.get(&id)
    }

    pub fn scenario_step_for_tree(&self, tree: CriteriaTreeId) -> Option<&ScenarioStepEntry> {
        self.step_by_tree
            .get(&tree)
            .and_then(|id| self.scenario_steps.get(id))
    }

    /// Steps of a scenario in play order
    pub fn scenario_steps(&self, scenario_id: ScenarioId) -> Vec<&ScenarioStepEntry> {
        self.steps_by_scenario
            .get(&scenario_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.scenario_steps.get(id))
            .collect()
    }

    pub fn quest_objective(&self, id: QuestObjectiveId) -> Option<&QuestObjectiveEntry> {
        self.quest_objectives.get(&id)
    }

    pub fn quest_objective_for_tree(&self, tree: CriteriaTreeId) -> Option<&QuestObjectiveEntry> {
        self.objective_by_tree
            .get(&tree)
            .and_then(|id| self.quest_objectives.get(id))
    }

    pub fn quest_objectives(&self, quest_id: QuestId) -> Vec<&QuestObjectiveEntry> {
        self.objectives_by_quest
            .get(&quest_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.quest_objectives.get(id))
            .collect()
    }

    // =========================================================================
    // Type metadata
    // =========================================================================

    /// Whether one event of this type credits every eligible group member
    pub fn is_group_criteria_type(criteria_type: CriteriaType) -> bool {
        criteria_type.is_group_type()
    }

    /// Types a participant tracker may re-evaluate from current state on login
    pub fn retroactively_updateable_types() -> &'static [CriteriaType] {
        CriteriaType::retroactively_updateable()
    }

    pub fn criteria_type_name(criteria_type: CriteriaType) -> &'static str {
        criteria_type.name()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
