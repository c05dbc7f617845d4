//! Achievements of a single participant, including account-wide ones

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use criteria_domain::{
    AccountId, AchievementEntry, AchievementId, CriteriaEvent, CriteriaTreeFlags, CriteriaType,
    Deliverable, OwnerKind, ParticipantId, Team,
};

use crate::infrastructure::ports::{CompletedDeliverable, OwnerRef};
use crate::registry::{Criteria, CriteriaRegistry, CriteriaTreeNode, TreeIdx};
use crate::tracker::{CriteriaHandler, CriteriaOwner, CriteriaServices, FollowUps};

// =============================================================================
// Earned Achievements
// =============================================================================

/// Achievements an owner has earned, with the date of each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarnedAchievements {
    earned: BTreeMap<AchievementId, DateTime<Utc>>,
}

impl EarnedAchievements {
    pub fn contains(&self, id: AchievementId) -> bool {
        self.earned.contains_key(&id)
    }

    pub fn date(&self, id: AchievementId) -> Option<DateTime<Utc>> {
        self.earned.get(&id).copied()
    }

    /// Records `id`; false if it was already earned
    pub fn insert(&mut self, id: AchievementId, date: DateTime<Utc>) -> bool {
        if self.earned.contains_key(&id) {
            return false;
        }
        self.earned.insert(id, date);
        true
    }

    pub fn remove(&mut self, id: AchievementId) -> bool {
        self.earned.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.earned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.earned.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = AchievementId> + '_ {
        self.earned.keys().copied()
    }

    /// Sum of the points of every earned achievement the registry knows
    pub fn total_points(&self, registry: &CriteriaRegistry) -> u64 {
        self.earned
            .keys()
            .filter_map(|id| registry.achievement(*id))
            .map(|a| u64::from(a.points))
            .sum()
    }

    pub fn deliverables(&self) -> Vec<CompletedDeliverable> {
        self.earned
            .iter()
            .map(|(id, date)| CompletedDeliverable {
                deliverable: Deliverable::Achievement(*id),
                date: *date,
            })
            .collect()
    }

    pub fn take(&mut self) -> Vec<AchievementId> {
        std::mem::take(&mut self.earned).into_keys().collect()
    }
}

impl FromIterator<(AchievementId, DateTime<Utc>)> for EarnedAchievements {
    fn from_iter<T: IntoIterator<Item = (AchievementId, DateTime<Utc>)>>(iter: T) -> Self {
        Self {
            earned: iter.into_iter().collect(),
        }
    }
}

/// Counter achievements never complete; others complete only after their
/// prerequisite. An earned achievement's tree stays complete.
pub(super) fn achievement_completable(earned: &EarnedAchievements, achievement: &AchievementEntry) -> bool {
    !achievement.is_counter()
        && achievement
            .required_achievement
            .map_or(true, |required| earned.contains(required))
}

/// Records the achievement, announces it and queues the events earning it raises
pub(super) fn earn_achievement(
    earned: &mut EarnedAchievements,
    services: &CriteriaServices,
    audience: OwnerRef,
    achievement: &AchievementEntry,
    event: &CriteriaEvent,
    follow_ups: &mut FollowUps,
) {
    let now = services.clock.now();
    if !earned.insert(achievement.id, now) {
        return;
    }

    let earned_by = event.actor.as_ref().map(|actor| actor.id);
    services
        .notifier
        .achievement_earned(audience, achievement.id, earned_by, now);

    tracing::info!(
        owner = ?audience,
        achievement_id = %achievement.id,
        points = achievement.points,
        "Achievement earned"
    );

    let total = earned.total_points(&services.registry);
    let mut earn = CriteriaEvent::new(CriteriaType::EarnAchievement)
        .with_misc(u64::from(achievement.id.get()), 0);
    let mut points = CriteriaEvent::new(CriteriaType::EarnAchievementPoints).with_misc(total, 0);
    if let Some(actor) = &event.actor {
        earn = earn.by(actor.clone());
        points = points.by(actor.clone());
    }
    follow_ups.push_back(earn);
    follow_ups.push_back(points);
}

// =============================================================================
// Participant Owner
// =============================================================================

const PARTICIPANT_KINDS: [OwnerKind; 2] = [OwnerKind::Player, OwnerKind::Account];

#[derive(Debug, Clone)]
pub struct ParticipantAchievements {
    participant: ParticipantId,
    account: AccountId,
    team: Team,
    earned: EarnedAchievements,
}

impl ParticipantAchievements {
    pub fn new(participant: ParticipantId, account: AccountId, team: Team) -> Self {
        Self {
            participant,
            account,
            team,
            earned: EarnedAchievements::default(),
        }
    }

    pub fn with_earned(mut self, earned: EarnedAchievements) -> Self {
        self.earned = earned;
        self
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn earned(&self) -> &EarnedAchievements {
        &self.earned
    }

    pub fn has_achieved(&self, id: AchievementId) -> bool {
        self.earned.contains(id)
    }

    fn audience_for_achievement(&self, achievement: &AchievementEntry) -> OwnerRef {
        match achievement.owner_kind() {
            OwnerKind::Account => OwnerRef::Account(self.account),
            _ => OwnerRef::Participant(self.participant),
        }
    }
}

impl CriteriaOwner for ParticipantAchievements {
    fn owner_kinds(&self) -> &'static [OwnerKind] {
        &PARTICIPANT_KINDS
    }

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Participant(self.participant)
    }

    fn audience_for(&self, criteria: &Criteria) -> OwnerRef {
        let kinds = criteria.owner_kinds;
        if kinds.contains(OwnerKind::Account.flag()) && !kinds.contains(OwnerKind::Player.flag()) {
            OwnerRef::Account(self.account)
        } else {
            OwnerRef::Participant(self.participant)
        }
    }

    fn can_update_criteria_tree(
        &self,
        registry: &CriteriaRegistry,
        tree: &CriteriaTreeNode,
        event: &CriteriaEvent,
    ) -> bool {
        let Some(Deliverable::Achievement(id)) = tree.deliverable else {
            return false;
        };
        let Some(achievement) = registry.achievement(id) else {
            return false;
        };

        if self.earned.contains(id) {
            tracing::trace!(achievement_id = %id, "Achievement already earned");
            return false;
        }
        if !achievement.faction.allows(self.team) {
            return false;
        }
        match achievement.instance_map {
            Some(map_id) => event.actor.as_ref().is_some_and(|a| a.map_id == map_id),
            None => true,
        }
    }

    fn can_complete_criteria_tree(&self, registry: &CriteriaRegistry, tree: &CriteriaTreeNode) -> bool {
        let flags = tree.entry.flags;
        if flags.contains(CriteriaTreeFlags::HORDE_ONLY) && self.team != Team::Horde {
            return false;
        }
        if flags.contains(CriteriaTreeFlags::ALLIANCE_ONLY) && self.team != Team::Alliance {
            return false;
        }

        match registry.achievement_for_tree(tree.id()) {
            Some(achievement) => {
                achievement.faction.allows(self.team)
                    && achievement_completable(&self.earned, achievement)
            }
            None => true,
        }
    }

    fn completed_criteria_tree(
        &mut self,
        services: &CriteriaServices,
        tree: TreeIdx,
        event: &CriteriaEvent,
        follow_ups: &mut FollowUps,
    ) {
        let registry = &services.registry;
        let Some(achievement) = registry.achievement_for_tree(registry.tree(tree).id()) else {
            return;
        };
        let audience = self.audience_for_achievement(achievement);
        earn_achievement(&mut self.earned, services, audience, achievement, event, follow_ups);
    }

    fn has_earned_achievement(&self, achievement: AchievementId) -> bool {
        self.earned.contains(achievement)
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable> {
        self.earned.deliverables()
    }

    fn reset(&mut self, services: &CriteriaServices) {
        for id in self.earned.take() {
            let audience = services
                .registry
                .achievement(id)
                .map_or(OwnerRef::Participant(self.participant), |a| {
                    self.audience_for_achievement(a)
                });
            services.notifier.achievement_removed(audience, id);
        }
    }
}

impl CriteriaHandler<ParticipantAchievements> {
    /// Re-evaluates criteria from current participant state (level, skills,
    /// reputation, ...) on login. Events of other types are ignored.
    pub fn update_from_state(&mut self, events: impl IntoIterator<Item = CriteriaEvent>) {
        let replayable = CriteriaRegistry::retroactively_updateable_types();
        for event in events {
            if replayable.contains(&event.criteria_type) {
                self.update_criteria(event);
            } else {
                tracing::debug!(
                    criteria_type = %event.criteria_type.name(),
                    "Type cannot be re-evaluated from state, skipping"
                );
            }
        }
    }

    /// Takes an earned achievement back and clears the progress behind it
    pub fn remove_achievement(&mut self, id: AchievementId) {
        if !self.owner_mut().earned.remove(id) {
            return;
        }
        let Some(achievement) = self.registry().achievement(id).cloned() else {
            return;
        };
        let audience = self.owner().audience_for_achievement(&achievement);
        self.services().notifier.achievement_removed(audience, id);
        self.reset_criteria_tree(achievement.criteria_tree_id);

        tracing::info!(achievement_id = %id, "Achievement removed");
    }
}
