//! Guild achievements, credited by the actions of guild members

use criteria_domain::{AchievementId, CriteriaEvent, Deliverable, GuildId, OwnerKind};

use super::achievements::{achievement_completable, earn_achievement, EarnedAchievements};
use crate::infrastructure::ports::{CompletedDeliverable, OwnerRef};
use crate::registry::{CriteriaRegistry, CriteriaTreeNode, TreeIdx};
use crate::tracker::{CriteriaHandler, CriteriaOwner, CriteriaServices, FollowUps};

const GUILD_KINDS: [OwnerKind; 1] = [OwnerKind::Guild];

#[derive(Debug, Clone)]
pub struct GuildAchievements {
    guild: GuildId,
    earned: EarnedAchievements,
}

impl GuildAchievements {
    pub fn new(guild: GuildId) -> Self {
        Self {
            guild,
            earned: EarnedAchievements::default(),
        }
    }

    pub fn with_earned(mut self, earned: EarnedAchievements) -> Self {
        self.earned = earned;
        self
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    pub fn earned(&self) -> &EarnedAchievements {
        &self.earned
    }

    pub fn has_achieved(&self, id: AchievementId) -> bool {
        self.earned.contains(id)
    }
}

impl CriteriaOwner for GuildAchievements {
    fn owner_kinds(&self) -> &'static [OwnerKind] {
        &GUILD_KINDS
    }

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Guild(self.guild)
    }

    // A guild has no faction of its own; the acting member's team decides
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
            return false;
        }
        match &event.actor {
            Some(actor) => achievement.faction.allows(actor.team),
            None => true,
        }
    }

    fn can_complete_criteria_tree(&self, registry: &CriteriaRegistry, tree: &CriteriaTreeNode) -> bool {
        registry
            .achievement_for_tree(tree.id())
            .map_or(true, |achievement| achievement_completable(&self.earned, achievement))
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
        earn_achievement(
            &mut self.earned,
            services,
            OwnerRef::Guild(self.guild),
            achievement,
            event,
            follow_ups,
        );
    }

    fn has_earned_achievement(&self, achievement: AchievementId) -> bool {
        self.earned.contains(achievement)
    }

    fn completed_deliverables(&self) -> Vec<CompletedDeliverable> {
        self.earned.deliverables()
    }

    fn reset(&mut self, services: &CriteriaServices) {
        for id in self.earned.take() {
            services
                .notifier
                .achievement_removed(OwnerRef::Guild(self.guild), id);
        }
    }
}

impl CriteriaHandler<GuildAchievements> {
    pub fn remove_achievement(&mut self, id: AchievementId) {
        if !self.owner_mut().earned.remove(id) {
            return;
        }
        let guild = OwnerRef::Guild(self.owner().guild);
        self.services().notifier.achievement_removed(guild, id);
        if let Some(tree) = self.registry().achievement(id).map(|a| a.criteria_tree_id) {
            self.reset_criteria_tree(tree);
        }
    }
}
