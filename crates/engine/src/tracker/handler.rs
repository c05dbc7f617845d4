//! The update pipeline shared by every owner kind

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use criteria_domain::{
    CriteriaEvent, CriteriaFailEvent, CriteriaFlags, CriteriaId, CriteriaProgress,
    CriteriaProgressRow, CriteriaStartEvent, CriteriaTreeId, FailReason, ParticipantId,
    ProgressType,
};

use super::{CriteriaOwner, CriteriaServices, CriteriaState, FollowUps};
use crate::evaluation::conditions::conditions_satisfied;
use crate::evaluation::modifiers::modifier_tree_satisfied;
use crate::evaluation::requirements::requirements_satisfied;
use crate::evaluation::trees::TreeEvaluator;
use crate::infrastructure::ports::{AllCriteriaData, CriteriaUpdate};
use crate::registry::{CriteriaIdx, CriteriaRegistry, CriteriaTreeNode, TreeIdx};

/// Running timer of a started timed criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CriteriaTimer {
    budget: Duration,
    remaining: Duration,
}

impl CriteriaTimer {
    fn elapsed(&self) -> Duration {
        self.budget.saturating_sub(self.remaining)
    }
}

/// Progress of one owner, driven by the events reported to it.
///
/// Mutating calls must be serialized by the caller. Different handlers share
/// nothing mutable and may run on different threads.
pub struct CriteriaHandler<O> {
    owner: O,
    services: CriteriaServices,
    progress: HashMap<CriteriaId, CriteriaProgress>,
    /// Deleted since the last save
    removed: HashSet<CriteriaId>,
    timers: HashMap<CriteriaId, CriteriaTimer>,
    failed: HashSet<CriteriaId>,
}

impl<O: CriteriaOwner> CriteriaHandler<O> {
    pub fn new(owner: O, services: CriteriaServices) -> Self {
        Self {
            owner,
            services,
            progress: HashMap::new(),
            removed: HashSet::new(),
            timers: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub(crate) fn owner_mut(&mut self) -> &mut O {
        &mut self.owner
    }

    pub fn services(&self) -> &CriteriaServices {
        &self.services
    }

    pub fn registry(&self) -> &CriteriaRegistry {
        &self.services.registry
    }

    pub fn progress(&self, criteria_id: CriteriaId) -> Option<&CriteriaProgress> {
        self.progress.get(&criteria_id)
    }

    /// Time left on a started timed criteria
    pub fn time_remaining(&self, criteria_id: CriteriaId) -> Option<Duration> {
        self.timers.get(&criteria_id).map(|timer| timer.remaining)
    }

    // =========================================================================
    // Event Pipeline
    // =========================================================================

    /// Feeds one reported event, then any follow-up events it raises
    pub fn update_criteria(&mut self, event: CriteriaEvent) {
        let mut queue: FollowUps = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            self.process_event(&event, &mut queue);
        }
    }

    fn process_event(&mut self, event: &CriteriaEvent, follow_ups: &mut FollowUps) {
        let registry = Arc::clone(&self.services.registry);
        let candidates = self.owner.candidate_criteria(&registry, event);

        tracing::trace!(
            owner = ?self.owner.owner_ref(),
            criteria_type = %event.criteria_type.name(),
            misc_value1 = event.misc_value1,
            candidates = candidates.len(),
            "Processing criteria event"
        );

        for idx in candidates {
            if !self.can_update_criteria(&registry, idx, event) {
                continue;
            }

            let criteria = registry.criteria(idx);
            let (_, policy) = criteria.entry.criteria_type.progress_rule();
            let player = event.actor.as_ref().map(|actor| actor.id);
            self.set_criteria_progress(&registry, idx, event.progress_amount(), player, policy);

            self.propagate_completion(&registry, idx, event, follow_ups);
        }
    }

    fn can_update_criteria(
        &self,
        registry: &CriteriaRegistry,
        idx: CriteriaIdx,
        event: &CriteriaEvent,
    ) -> bool {
        let criteria = registry.criteria(idx);
        let trees = registry.trees_for_criteria(idx);
        if trees.is_empty() {
            tracing::trace!(criteria_id = %criteria.id(), "Criteria gates no tree");
            return false;
        }

        let flags = self.owner.owner_flags();
        let updatable = trees.iter().any(|tree| {
            let node = registry.tree(*tree);
            node.owner_kinds.intersects(flags)
                && self.owner.can_update_criteria_tree(registry, node, event)
        });
        if !updatable {
            tracing::trace!(criteria_id = %criteria.id(), "No gating tree can advance");
            return false;
        }

        let earned = |achievement| self.owner.has_earned_achievement(achievement);
        if !requirements_satisfied(&criteria.entry, event, &earned) {
            tracing::trace!(criteria_id = %criteria.id(), "Requirements not satisfied");
            return false;
        }

        let ctx = self.services.evaluation_context(event);
        if let Some(modifier) = criteria.modifier {
            if !modifier_tree_satisfied(registry, modifier, &ctx) {
                tracing::trace!(criteria_id = %criteria.id(), "Modifier tree not satisfied");
                return false;
            }
        }

        conditions_satisfied(criteria, &ctx)
    }

    fn set_criteria_progress(
        &mut self,
        registry: &CriteriaRegistry,
        idx: CriteriaIdx,
        change: u64,
        player: Option<ParticipantId>,
        policy: ProgressType,
    ) {
        let criteria = registry.criteria(idx);
        let id = criteria.id();
        let timed = criteria.entry.is_timed();

        if timed && !self.timers.contains_key(&id) {
            tracing::trace!(criteria_id = %id, "Timed criteria not started");
            return;
        }

        let now = self.services.clock.now();
        let counter = match self.progress.get_mut(&id) {
            None => {
                if change == 0 && !timed {
                    return;
                }
                self.progress
                    .insert(id, CriteriaProgress::new(change, now, player));
                change
            }
            Some(progress) => {
                let counter = policy.apply(progress.counter, change);
                if counter == progress.counter && !timed {
                    return;
                }
                progress.counter = counter;
                progress.date = now;
                progress.player = player;
                progress.changed = true;
                counter
            }
        };
        self.removed.remove(&id);

        let mut elapsed = None;
        let mut timed_completed = false;
        if timed {
            elapsed = self.timers.get(&id).map(CriteriaTimer::elapsed);
            if self.all_trees_complete(registry, idx) {
                self.timers.remove(&id);
                timed_completed = true;
            }
        }

        tracing::debug!(
            criteria_id = %id,
            counter,
            timed_completed,
            "Criteria progress updated"
        );

        let update = CriteriaUpdate {
            criteria_id: id,
            counter,
            date: now,
            player,
            elapsed,
            timed_completed,
        };
        self.services
            .notifier
            .criteria_update(self.owner.audience_for(criteria), &update);
    }

    /// Trees of other owner kinds never complete for this owner
    fn completable<'a>(
        &'a self,
        registry: &'a CriteriaRegistry,
    ) -> impl Fn(&CriteriaTreeNode) -> bool + 'a {
        let flags = self.owner.owner_flags();
        move |node: &CriteriaTreeNode| {
            node.owner_kinds.intersects(flags)
                && self.owner.can_complete_criteria_tree(registry, node)
        }
    }

    /// Hands every complete tree in the chain to the owner, deepest first.
    ///
    /// A tree may already have been complete before this update, for
    /// example when its veto lifted after another deliverable was earned;
    /// owners ignore deliverables they already hold.
    fn propagate_completion(
        &mut self,
        registry: &CriteriaRegistry,
        idx: CriteriaIdx,
        event: &CriteriaEvent,
        follow_ups: &mut FollowUps,
    ) {
        let chain = completion_chain(registry, registry.trees_for_criteria(idx));
        let complete: Vec<TreeIdx> = {
            let veto = self.completable(registry);
            let evaluator = TreeEvaluator::new(registry, &self.progress, &veto);
            chain
                .into_iter()
                .filter(|tree| evaluator.is_completed_tree(*tree))
                .collect()
        };

        for tree in complete {
            tracing::trace!(tree_id = %registry.tree(tree).id(), "Criteria tree complete");
            self.owner
                .completed_criteria_tree(&self.services, tree, event, follow_ups);
        }

        let mut roots: Vec<TreeIdx> = registry
            .trees_for_criteria(idx)
            .iter()
            .map(|tree| registry.tree(*tree).root)
            .collect();
        roots.sort();
        roots.dedup();
        for root in roots {
            self.owner
                .after_criteria_tree_update(&self.services, root, event);
        }
    }

    /// Every gating tree of this owner's kinds is complete
    fn all_trees_complete(&self, registry: &CriteriaRegistry, idx: CriteriaIdx) -> bool {
        let flags = self.owner.owner_flags();
        let veto = self.completable(registry);
        let evaluator = TreeEvaluator::new(registry, &self.progress, &veto);
        let mut own = registry
            .trees_for_criteria(idx)
            .iter()
            .filter(|tree| registry.tree(**tree).owner_kinds.intersects(flags))
            .peekable();
        own.peek().is_some() && own.all(|tree| evaluator.is_completed_tree(*tree))
    }

    // =========================================================================
    // Timed Criteria
    // =========================================================================

    /// Starts the timers of criteria listening for `event` on `asset`.
    ///
    /// `already_elapsed` is time that passed before the start was reported.
    pub fn start_criteria(
        &mut self,
        event: CriteriaStartEvent,
        asset: u64,
        already_elapsed: Duration,
    ) {
        let registry = Arc::clone(&self.services.registry);
        let flags = self.owner.owner_flags();

        for idx in registry.timed_criteria_by_start_event(event, asset) {
            let criteria = registry.criteria(*idx);
            let id = criteria.id();
            let Some(budget) = criteria.entry.time_limit() else {
                continue;
            };
            if !criteria.owner_kinds.intersects(flags) || already_elapsed >= budget {
                continue;
            }
            if self.all_trees_complete(&registry, *idx) {
                continue;
            }
            if self.timers.contains_key(&id)
                && !criteria.entry.flags.contains(CriteriaFlags::RESET_ON_START)
            {
                continue;
            }

            self.timers.insert(
                id,
                CriteriaTimer {
                    budget,
                    remaining: budget - already_elapsed,
                },
            );
            self.failed.remove(&id);

            tracing::debug!(
                criteria_id = %id,
                start_event = %event,
                budget_secs = budget.as_secs(),
                "Timed criteria started"
            );
            self.set_criteria_progress(&registry, *idx, 0, None, ProgressType::Set);
        }
    }

    /// Fails criteria listening for `event` on `asset` that are not complete
    pub fn fail_criteria(&mut self, event: CriteriaFailEvent, asset: u64) {
        let registry = Arc::clone(&self.services.registry);
        let flags = self.owner.owner_flags();

        for idx in registry.criteria_by_fail_event(event, asset) {
            let criteria = registry.criteria(*idx);
            if !criteria.owner_kinds.intersects(flags) {
                continue;
            }
            if self.all_trees_complete(&registry, *idx) {
                continue;
            }
            self.fail(&registry, *idx, FailReason::Event(event));
        }
    }

    /// Advances every running timer by `delta`, failing the ones that run out
    pub fn update_timed_criteria(&mut self, delta: Duration) {
        let mut expired = Vec::new();
        for (id, timer) in self.timers.iter_mut() {
            if timer.remaining <= delta {
                expired.push(*id);
            } else {
                timer.remaining -= delta;
            }
        }
        if expired.is_empty() {
            return;
        }
        expired.sort();

        let registry = Arc::clone(&self.services.registry);
        for id in expired {
            match registry.criteria_idx(id) {
                Some(idx) => self.fail(&registry, idx, FailReason::Timeout),
                None => {
                    self.timers.remove(&id);
                }
            }
        }
    }

    fn fail(&mut self, registry: &CriteriaRegistry, idx: CriteriaIdx, reason: FailReason) {
        let id = registry.criteria(idx).id();
        let had_timer = self.timers.remove(&id).is_some();
        let had_progress = self.remove_criteria_progress(registry, idx);

        if had_timer || had_progress {
            self.failed.insert(id);
            tracing::debug!(criteria_id = %id, reason = %reason, "Criteria failed");
        }
    }

    fn remove_criteria_progress(&mut self, registry: &CriteriaRegistry, idx: CriteriaIdx) -> bool {
        let criteria = registry.criteria(idx);
        let id = criteria.id();
        if self.progress.remove(&id).is_none() {
            return false;
        }
        self.removed.insert(id);
        self.services
            .notifier
            .criteria_removed(self.owner.audience_for(criteria), id);
        true
    }

    // =========================================================================
    // Owner Lifecycle
    // =========================================================================

    /// Clears every progress record, running timer and owner-side completion
    pub fn reset(&mut self) {
        let registry = Arc::clone(&self.services.registry);
        let mut ids: Vec<CriteriaId> = self.progress.keys().copied().collect();
        ids.sort();

        for id in ids {
            match registry.criteria_idx(id) {
                Some(idx) => {
                    self.remove_criteria_progress(&registry, idx);
                }
                None => {
                    self.progress.remove(&id);
                    self.removed.insert(id);
                    self.services
                        .notifier
                        .criteria_removed(self.owner.owner_ref(), id);
                }
            }
        }
        self.timers.clear();
        self.failed.clear();
        self.owner.reset(&self.services);

        tracing::info!(owner = ?self.owner.owner_ref(), "Criteria progress reset");
    }

    /// Removes progress on every criteria in the subtree of `tree_id`
    pub fn reset_criteria_tree(&mut self, tree_id: CriteriaTreeId) {
        let registry = Arc::clone(&self.services.registry);
        let Some(root) = registry.tree_idx(tree_id) else {
            tracing::warn!(tree_id = %tree_id, "Reset of unknown criteria tree");
            return;
        };

        for node in registry.subtree(root) {
            if let Some(idx) = registry.tree(node).criteria {
                let id = registry.criteria(idx).id();
                self.timers.remove(&id);
                self.failed.remove(&id);
                self.remove_criteria_progress(&registry, idx);
            }
        }
    }

    /// Sends the full progress dump, addressed to `receiver` when someone
    /// other than the owner asked for it
    pub fn send_all_data(&self, receiver: Option<ParticipantId>) {
        let data = AllCriteriaData {
            progress: self.progress_rows(|_| true),
            completed: self.owner.completed_deliverables(),
        };
        self.services
            .notifier
            .all_data(self.owner.owner_ref(), receiver, &data);
    }

    pub fn is_criteria_tree_completed(&self, tree_id: CriteriaTreeId) -> bool {
        let registry = self.registry();
        let Some(idx) = registry.tree_idx(tree_id) else {
            return false;
        };
        let veto = self.completable(registry);
        TreeEvaluator::new(registry, &self.progress, &veto).is_completed_tree(idx)
    }

    pub fn criteria_state(&self, criteria_id: CriteriaId) -> CriteriaState {
        let registry = self.registry();
        let Some(idx) = registry.criteria_idx(criteria_id) else {
            return CriteriaState::NotStarted;
        };

        if self.progress.contains_key(&criteria_id) && self.all_trees_complete(registry, idx) {
            CriteriaState::Completed
        } else if self.timers.contains_key(&criteria_id) || self.progress.contains_key(&criteria_id) {
            CriteriaState::InProgress
        } else if self.failed.contains(&criteria_id) {
            CriteriaState::Failed
        } else {
            CriteriaState::NotStarted
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Hydrates stored progress without marking it changed or notifying
    pub fn load_progress(&mut self, rows: impl IntoIterator<Item = CriteriaProgressRow>) {
        let mut loaded = 0usize;
        for row in rows {
            if self.registry().criteria_idx(row.criteria_id).is_none() {
                tracing::warn!(
                    owner = ?self.owner.owner_ref(),
                    criteria_id = %row.criteria_id,
                    "Stored progress for unknown criteria, discarding"
                );
                self.removed.insert(row.criteria_id);
                continue;
            }
            let (id, progress) = row.into_progress();
            self.progress.insert(id, progress);
            loaded += 1;
        }
        tracing::debug!(owner = ?self.owner.owner_ref(), loaded, "Criteria progress loaded");
    }

    /// Records changed since the last save
    pub fn changed_progress(&self) -> Vec<CriteriaProgressRow> {
        self.progress_rows(|progress| progress.changed)
    }

    /// Records deleted since the last save
    pub fn removed_progress(&self) -> Vec<CriteriaId> {
        let mut ids: Vec<CriteriaId> = self.removed.iter().copied().collect();
        ids.sort();
        ids
    }

    /// Storage wrote everything; clears the change markers
    pub fn mark_saved(&mut self) {
        for progress in self.progress.values_mut() {
            progress.changed = false;
        }
        self.removed.clear();
    }

    fn progress_rows(&self, keep: impl Fn(&CriteriaProgress) -> bool) -> Vec<CriteriaProgressRow> {
        let mut rows: Vec<CriteriaProgressRow> = self
            .progress
            .iter()
            .filter(|(_, progress)| keep(progress))
            .map(|(id, progress)| CriteriaProgressRow::from_progress(*id, progress))
            .collect();
        rows.sort_by_key(|row| row.criteria_id);
        rows
    }
}

/// Gating trees and all their ancestors, deepest first
fn completion_chain(registry: &CriteriaRegistry, trees: &[TreeIdx]) -> Vec<TreeIdx> {
    let mut seen = HashSet::new();
    let mut chain: Vec<(usize, TreeIdx)> = Vec::new();
    for tree in trees {
        for node in registry.ancestors(*tree) {
            if seen.insert(node) {
                chain.push((registry.ancestors(node).count(), node));
            }
        }
    }
    chain.sort_by_key(|(depth, node)| (Reverse(*depth), *node));
    chain.into_iter().map(|(_, node)| node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        kill_criteria, kill_event, participant, RecordingNotifier, RegistryBuilder, TestOwner,
    };
    use criteria_domain::{CriteriaTreeOperator, CriteriaType};

    fn handler(builder: RegistryBuilder) -> (CriteriaHandler<TestOwner>, Arc<RecordingNotifier>) {
        let (services, notifier) = builder.services();
        (CriteriaHandler::new(TestOwner::default(), services), notifier)
    }

    #[test]
    fn zero_change_creates_no_record() {
        let (mut h, notifier) = handler(RegistryBuilder::new().kill_goal(1, 100, 5));
        h.update_criteria(kill_event(100, 0));

        assert!(h.progress(1.into()).is_none());
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn completion_chain_is_deepest_first() {
        let registry = RegistryBuilder::new()
            .criteria(kill_criteria(1, 100, 1))
            .tree_root(10, CriteriaTreeOperator::All)
            .tree_group(11, 10, CriteriaTreeOperator::All)
            .tree_leaf(12, 11, 1)
            .achievement(1, 10)
            .build();
        let leaf = registry.tree_idx(12.into()).unwrap();
        let chain: Vec<u32> = completion_chain(&registry, &[leaf])
            .into_iter()
            .map(|idx| registry.tree(idx).id().get())
            .collect();
        assert_eq!(chain, vec![12, 11, 10]);
    }

    #[test]
    fn after_update_hook_runs_once_per_root_without_completion() {
        // criteria 1 sits under two leaves of the same root
        let (mut h, _) = handler(
            RegistryBuilder::new()
                .criteria(kill_criteria(1, 100, 5))
                .criteria(kill_criteria(2, 200, 5))
                .tree_root(10, CriteriaTreeOperator::All)
                .tree_leaf(11, 10, 1)
                .tree_leaf(12, 10, 1)
                .tree_leaf(13, 10, 2)
                .achievement(1, 10),
        );
        let root = h.registry().tree_idx(10.into()).unwrap();

        h.update_criteria(kill_event(100, 1));

        assert!(h.owner().completed.is_empty());
        assert_eq!(h.owner().tree_updates, vec![root]);
    }

    #[test]
    fn stored_progress_completes_on_the_next_update() {
        let (mut h, _) = handler(RegistryBuilder::new().kill_goal(1, 100, 2));
        h.load_progress(vec![CriteriaProgressRow {
            criteria_id: 1.into(),
            counter: 2,
            date: chrono::Utc::now(),
            player: None,
        }]);
        assert!(h.owner().completed.is_empty());

        h.update_criteria(kill_event(100, 1));

        let root = h.registry().tree_idx(10.into()).unwrap();
        assert!(h.owner().completed.contains(&root));
    }

    #[test]
    fn set_policy_same_value_is_a_no_op() {
        let (mut h, notifier) = handler(RegistryBuilder::new().level_goal(1, 80));
        let event = || {
            CriteriaEvent::new(CriteriaType::ReachLevel)
                .with_misc(40, 0)
                .by(participant(40))
        };

        h.update_criteria(event());
        h.mark_saved();
        h.update_criteria(event());

        assert_eq!(h.progress(1.into()).unwrap().counter, 40);
        assert!(h.changed_progress().is_empty());
        assert_eq!(notifier.updates_for(1.into()).len(), 1);
    }

    #[test]
    fn timed_criteria_ignores_progress_until_started() {
        let (mut h, notifier) = handler(RegistryBuilder::new().timed_kill_goal(1, 100, 3, 42, 30));
        h.update_criteria(kill_event(100, 1));
        assert!(h.progress(1.into()).is_none());
        assert!(notifier.notices().is_empty());

        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);
        assert_eq!(h.progress(1.into()).unwrap().counter, 0);
        assert_eq!(h.criteria_state(1.into()), CriteriaState::InProgress);

        h.update_criteria(kill_event(100, 1));
        assert_eq!(h.progress(1.into()).unwrap().counter, 1);
    }

    #[test]
    fn start_skips_exhausted_budget_and_running_timers() {
        let (mut h, _) = handler(RegistryBuilder::new().timed_kill_goal(1, 100, 3, 42, 30));

        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::from_secs(30));
        assert!(h.time_remaining(1.into()).is_none());

        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::from_secs(5));
        h.update_timed_criteria(Duration::from_secs(10));
        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);
        assert_eq!(h.time_remaining(1.into()), Some(Duration::from_secs(15)));
    }

    #[test]
    fn reset_on_start_restarts_the_timer() {
        let builder = RegistryBuilder::new()
            .criteria(
                kill_criteria(1, 100, 3)
                    .with_timer(CriteriaStartEvent::SendEvent, 42, 30)
                    .with_flags(CriteriaFlags::RESET_ON_START),
            )
            .single_goal_achievement(1, 10, 1);
        let (mut h, _) = handler(builder);

        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);
        h.update_criteria(kill_event(100, 2));
        h.update_timed_criteria(Duration::from_secs(20));
        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);

        assert_eq!(h.time_remaining(1.into()), Some(Duration::from_secs(30)));
        assert_eq!(h.progress(1.into()).unwrap().counter, 0);
    }

    #[test]
    fn timer_completion_flags_the_update() {
        let (mut h, notifier) = handler(RegistryBuilder::new().timed_kill_goal(1, 100, 2, 42, 30));
        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);
        h.update_timed_criteria(Duration::from_secs(12));
        h.update_criteria(kill_event(100, 2));

        let last = notifier.updates_for(1.into()).pop().unwrap();
        assert!(last.timed_completed);
        assert_eq!(last.elapsed, Some(Duration::from_secs(12)));
        assert!(h.time_remaining(1.into()).is_none());
        assert_eq!(h.criteria_state(1.into()), CriteriaState::Completed);
    }

    #[test]
    fn fail_event_removes_progress_once() {
        let builder = RegistryBuilder::new()
            .criteria(
                kill_criteria(1, 100, 5)
                    .with_timer(CriteriaStartEvent::SendEvent, 42, 60)
                    .with_fail_event(CriteriaFailEvent::Death, 0),
            )
            .single_goal_achievement(1, 10, 1);
        let (mut h, notifier) = handler(builder);

        h.start_criteria(CriteriaStartEvent::SendEvent, 42, Duration::ZERO);
        h.update_criteria(kill_event(100, 1));
        h.fail_criteria(CriteriaFailEvent::Death, 0);
        h.fail_criteria(CriteriaFailEvent::Death, 0);

        assert!(h.progress(1.into()).is_none());
        assert_eq!(h.criteria_state(1.into()), CriteriaState::Failed);
        assert_eq!(notifier.removals_for(1.into()), 1);
        assert_eq!(h.removed_progress(), vec![CriteriaId::new(1)]);
    }

    #[test]
    fn load_and_tree_reset_track_persistence_markers() {
        let (mut h, notifier) = handler(RegistryBuilder::new().kill_goal(1, 100, 5));
        let stored = |criteria: u32| CriteriaProgressRow {
            criteria_id: criteria.into(),
            counter: 3,
            date: chrono::Utc::now(),
            player: None,
        };
        h.load_progress(vec![stored(1), stored(999)]);

        assert_eq!(h.progress(1.into()).unwrap().counter, 3);
        assert!(h.changed_progress().is_empty());
        assert_eq!(h.removed_progress(), vec![CriteriaId::new(999)]);
        assert!(notifier.notices().is_empty());

        h.mark_saved();
        h.reset_criteria_tree(10.into());
        assert!(h.progress(1.into()).is_none());
        assert_eq!(h.removed_progress(), vec![CriteriaId::new(1)]);
    }

    #[test]
    fn reset_notifies_every_record() {
        let (mut h, notifier) =
            handler(RegistryBuilder::new().kill_goal(1, 100, 5).kill_goal(2, 200, 5));
        h.update_criteria(kill_event(100, 1));
        h.update_criteria(kill_event(200, 1));
        h.reset();

        assert_eq!(notifier.removals_for(1.into()), 1);
        assert_eq!(notifier.removals_for(2.into()), 1);
        assert_eq!(h.criteria_state(1.into()), CriteriaState::NotStarted);
        assert_eq!(h.owner().resets, 1);
    }

    #[test]
    fn all_data_carries_every_record() {
        let (mut h, notifier) = handler(RegistryBuilder::new().kill_goal(1, 100, 5));
        h.update_criteria(kill_event(100, 2));
        h.send_all_data(None);

        let dump = notifier.last_dump().unwrap();
        assert_eq!(dump.progress.len(), 1);
        assert_eq!(dump.progress[0].counter, 2);
    }
}
