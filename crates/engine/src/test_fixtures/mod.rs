//! Test fixtures: registry builders, a recording notifier and common events.
//!
//! Registries are assembled from static rows the same way production loads
//! them (through [`CriteriaRegistry::build`]), so fixtures exercise the real
//! loader and indices.
//!
//! ```rust,ignore
//! use crate::test_fixtures::{kill_event, RegistryBuilder};
//!
//! let (services, notifier) = RegistryBuilder::new().kill_goal(1, 100, 5).services();
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use criteria_domain::{
    AchievementEntry, AchievementId, CriteriaDataRow, CriteriaEntry, CriteriaEvent, CriteriaId,
    CriteriaStartEvent, CriteriaTreeEntry, CriteriaTreeOperator, CriteriaType,
    ModifierTreeEntry, ParticipantId, ParticipantSnapshot, QuestObjectiveEntry,
    QuestObjectiveId, ScenarioId, ScenarioStepEntry, ScenarioStepId, Team, WorldObjectSnapshot,
};

use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::ports::{
    AllCriteriaData, CompletedDeliverable, CriteriaNotifier, CriteriaUpdate, NoScripts, OwnerRef,
};
use crate::infrastructure::static_data::StaticDataSet;
use crate::registry::{CriteriaRegistry, CriteriaTreeNode, TreeIdx};
use crate::tracker::{CriteriaOwner, CriteriaServices, FollowUps};

/// Directory of the JSON static dataset shipped for tests
pub fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("criteria")
}

/// Start of every fixture clock
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

// =============================================================================
// Rows and Events
// =============================================================================

pub fn kill_criteria(id: u32, creature: u64, amount: u64) -> CriteriaEntry {
    CriteriaEntry::new(id.into(), CriteriaType::KillCreature, creature).with_amount(amount)
}

pub fn participant(level: u8) -> ParticipantSnapshot {
    ParticipantSnapshot::new(ParticipantId::new(), level, Team::Horde)
}

/// `count` kills of creature `creature` by a level 80 participant
pub fn kill_event(creature: u64, count: u64) -> CriteriaEvent {
    kill_event_by(participant(80), creature, count)
}

pub fn kill_event_by(actor: ParticipantSnapshot, creature: u64, count: u64) -> CriteriaEvent {
    let entry = u32::try_from(creature).unwrap();
    CriteriaEvent::new(CriteriaType::KillCreature)
        .with_misc(creature, count)
        .by(actor)
        .on(WorldObjectSnapshot::creature(entry, 1, 60))
}

// =============================================================================
// Registry Builder
// =============================================================================

/// Collects static rows and builds a registry from them.
///
/// Goal helpers follow one numbering scheme: criteria `n` hangs under root
/// tree `10 * n` via leaf `10 * n + 1`, delivered by achievement `n`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    data: StaticDataSet,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(mut self, entry: CriteriaEntry) -> Self {
        self.data.criteria.push(entry);
        self
    }

    pub fn tree(mut self, entry: CriteriaTreeEntry) -> Self {
        self.data.criteria_trees.push(entry);
        self
    }

    pub fn tree_root(self, id: u32, operator: CriteriaTreeOperator) -> Self {
        self.tree(CriteriaTreeEntry::root(id.into(), operator))
    }

    pub fn tree_group(self, id: u32, parent: u32, operator: CriteriaTreeOperator) -> Self {
        self.tree(CriteriaTreeEntry::root(id.into(), operator).with_parent(parent.into()))
    }

    pub fn tree_leaf(self, id: u32, parent: u32, criteria: u32) -> Self {
        self.tree(CriteriaTreeEntry::leaf(id.into(), parent.into(), criteria.into()))
    }

    pub fn modifier(mut self, entry: ModifierTreeEntry) -> Self {
        self.data.modifier_trees.push(entry);
        self
    }

    pub fn data(mut self, row: CriteriaDataRow) -> Self {
        self.data.criteria_data.push(row);
        self
    }

    pub fn achievement(self, id: u32, tree: u32) -> Self {
        self.achievement_entry(AchievementEntry::new(AchievementId::new(id), tree.into()))
    }

    pub fn achievement_entry(mut self, entry: AchievementEntry) -> Self {
        self.data.achievements.push(entry);
        self
    }

    pub fn scenario_step(mut self, entry: ScenarioStepEntry) -> Self {
        self.data.scenario_steps.push(entry);
        self
    }

    pub fn quest_objective(mut self, entry: QuestObjectiveEntry) -> Self {
        self.data.quest_objectives.push(entry);
        self
    }

    /// Achievement `achievement` completed by criteria `criteria` alone
    pub fn single_goal_achievement(self, criteria: u32, tree: u32, achievement: u32) -> Self {
        self.tree_root(tree, CriteriaTreeOperator::All)
            .tree_leaf(tree + 1, tree, criteria)
            .achievement(achievement, tree)
    }

    /// Kill `amount` of creature `creature`
    pub fn kill_goal(self, criteria: u32, creature: u64, amount: u64) -> Self {
        self.criteria(kill_criteria(criteria, creature, amount))
            .single_goal_achievement(criteria, criteria * 10, criteria)
    }

    /// Reach level `level`
    pub fn level_goal(self, criteria: u32, level: u64) -> Self {
        self.criteria(
            CriteriaEntry::new(criteria.into(), CriteriaType::ReachLevel, 0).with_amount(level),
        )
        .single_goal_achievement(criteria, criteria * 10, criteria)
    }

    /// Kill goal on a timer started by script event `start_asset`
    pub fn timed_kill_goal(
        self,
        criteria: u32,
        creature: u64,
        amount: u64,
        start_asset: u64,
        seconds: u32,
    ) -> Self {
        self.criteria(kill_criteria(criteria, creature, amount).with_timer(
            CriteriaStartEvent::SendEvent,
            start_asset,
            seconds,
        ))
        .single_goal_achievement(criteria, criteria * 10, criteria)
    }

    /// Scenario step `step` completed by the criteria under `tree`
    pub fn step(self, step: u32, scenario: u32, tree: u32, order: u32) -> Self {
        self.scenario_step(ScenarioStepEntry::new(
            ScenarioStepId::new(step),
            ScenarioId::new(scenario),
            tree.into(),
            order,
        ))
    }

    /// Quest objective `objective` of quest `quest` completed by the tree
    pub fn objective(self, objective: u32, quest: u32, tree: u32) -> Self {
        self.quest_objective(QuestObjectiveEntry::new(
            QuestObjectiveId::new(objective),
            quest.into(),
            tree.into(),
        ))
    }

    pub fn build(self) -> CriteriaRegistry {
        CriteriaRegistry::build(self.data, &NoScripts)
    }

    /// Services around the built registry, with a pinned clock and a
    /// recording notifier
    pub fn services(self) -> (CriteriaServices, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let services = CriteriaServices::new(Arc::new(self.build()), notifier.clone())
            .with_clock(Arc::new(ManualClock::new(fixture_time())));
        (services, notifier)
    }
}

// =============================================================================
// Recording Notifier
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Update(OwnerRef, CriteriaUpdate),
    Removed(OwnerRef, CriteriaId),
    AchievementEarned(OwnerRef, AchievementId, Option<ParticipantId>),
    AchievementRemoved(OwnerRef, AchievementId),
    StepCompleted(OwnerRef, ScenarioStepId),
    ScenarioCompleted(OwnerRef, ScenarioId),
    ObjectiveCompleted(OwnerRef, QuestObjectiveId),
    AllData(OwnerRef, Option<ParticipantId>, AllCriteriaData),
}

/// Notifier that keeps every call, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn push(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }

    pub fn updates_for(&self, criteria_id: CriteriaId) -> Vec<CriteriaUpdate> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Update(_, update) if update.criteria_id == criteria_id => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn removals_for(&self, criteria_id: CriteriaId) -> usize {
        self.notices()
            .iter()
            .filter(|n| matches!(n, Notice::Removed(_, id) if *id == criteria_id))
            .count()
    }

    pub fn earned(&self) -> Vec<AchievementId> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::AchievementEarned(_, id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn last_dump(&self) -> Option<AllCriteriaData> {
        self.notices().into_iter().rev().find_map(|n| match n {
            Notice::AllData(_, _, data) => Some(data),
            _ => None,
        })
    }
}

impl CriteriaNotifier for RecordingNotifier {
    fn criteria_update(&self, owner: OwnerRef, update: &CriteriaUpdate) {
        self.push(Notice::Update(owner, update.clone()));
    }

    fn criteria_removed(&self, owner: OwnerRef, criteria_id: CriteriaId) {
        self.push(Notice::Removed(owner, criteria_id));
    }

    fn achievement_earned(
        &self,
        owner: OwnerRef,
        achievement_id: AchievementId,
        earned_by: Option<ParticipantId>,
        _date: DateTime<Utc>,
    ) {
        self.push(Notice::AchievementEarned(owner, achievement_id, earned_by));
    }

    fn achievement_removed(&self, owner: OwnerRef, achievement_id: AchievementId) {
        self.push(Notice::AchievementRemoved(owner, achievement_id));
    }

    fn scenario_step_completed(&self, owner: OwnerRef, step_id: ScenarioStepId) {
        self.push(Notice::StepCompleted(owner, step_id));
    }

    fn scenario_completed(&self, owner: OwnerRef, scenario_id: ScenarioId) {
        self.push(Notice::ScenarioCompleted(owner, scenario_id));
    }

    fn quest_objective_completed(&self, owner: OwnerRef, objective_id: QuestObjectiveId) {
        self.push(Notice::ObjectiveCompleted(owner, objective_id));
    }

    fn all_data(&self, owner: OwnerRef, receiver: Option<ParticipantId>, data: &AllCriteriaData) {
        self.push(Notice::AllData(owner, receiver, data.clone()));
    }
}

// =============================================================================
// Minimal Owner
// =============================================================================

/// Player-kind owner that allows everything and records completions
#[derive(Debug, Default)]
pub struct TestOwner {
    pub id: ParticipantId,
    /// Distinct trees handed over as complete, in order
    pub completed: Vec<TreeIdx>,
    /// Roots passed to `after_criteria_tree_update`, one entry per call
    pub tree_updates: Vec<TreeIdx>,
    pub resets: usize,
}

impl CriteriaOwner for TestOwner {
    fn owner_kinds(&self) -> &'static [criteria_domain::OwnerKind] {
        &[criteria_domain::OwnerKind::Player]
    }

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Participant(self.id)
    }

    fn can_update_criteria_tree(
        &self,
        _registry: &CriteriaRegistry,
        _tree: &CriteriaTreeNode,
        _event: &CriteriaEvent,
    ) -> bool {
        true
    }

    fn can_complete_criteria_tree(&self, _registry: &CriteriaRegistry, _tree: &CriteriaTreeNode) -> bool {
        true
    }

    fn completed_criteria_tree(
        &mut self,
        _services: &CriteriaServices,
        tree: TreeIdx,
        _event: &CriteriaEvent,
        _follow_ups: &mut FollowUps,
    ) {
        if !self.completed.contains(&tree) {
            self.completed.push(tree);
        }
    }

    fn after_criteria_tree_update(
        &mut self,
        _services: &CriteriaServices,
        root: TreeIdx,
        _event: &CriteriaEvent,
    ) {
        self.tree_updates.push(root);
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable> {
        Vec::new()
    }

    fn reset(&mut self, _services: &CriteriaServices) {
        self.completed.clear();
        self.resets += 1;
    }
}
