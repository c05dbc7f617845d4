//! Achievements - deliverables earned by completing a criteria tree

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::criteria::zero_as_none;
use crate::ids::{AchievementId, CriteriaTreeId};
use crate::value_objects::{OwnerKind, Team};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AchievementFlags: u32 {
        /// Statistic; progress is tracked but never completes
        const COUNTER = 0x0001;
        /// Shared by every character of the account
        const ACCOUNT = 0x0002;
        /// Earned by a guild
        const GUILD   = 0x0004;
        /// Not announced to others when earned
        const HIDDEN  = 0x0008;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementFaction {
    #[default]
    Any,
    Horde,
    Alliance,
}

impl AchievementFaction {
    pub fn allows(self, team: Team) -> bool {
        match self {
            AchievementFaction::Any => true,
            AchievementFaction::Horde => team == Team::Horde,
            AchievementFaction::Alliance => team == Team::Alliance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementEntry {
    pub id: AchievementId,
    pub criteria_tree_id: CriteriaTreeId,
    #[serde(default)]
    pub faction: AchievementFaction,
    #[serde(default)]
    pub flags: AchievementFlags,
    #[serde(default)]
    pub points: u32,
    /// Achievement that must be earned first
    #[serde(default, deserialize_with = "zero_as_none")]
    pub required_achievement: Option<AchievementId>,
    /// Map the owner must be on for progress to count
    #[serde(default)]
    pub instance_map: Option<u32>,
}

impl AchievementEntry {
    pub fn new(id: AchievementId, criteria_tree_id: CriteriaTreeId) -> Self {
        Self {
            id,
            criteria_tree_id,
            faction: AchievementFaction::Any,
            flags: AchievementFlags::empty(),
            points: 0,
            required_achievement: None,
            instance_map: None,
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_flags(mut self, flags: AchievementFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_faction(mut self, faction: AchievementFaction) -> Self {
        self.faction = faction;
        self
    }

    pub fn requires(mut self, achievement: AchievementId) -> Self {
        self.required_achievement = Some(achievement);
        self
    }

    pub fn in_instance(mut self, map_id: u32) -> Self {
        self.instance_map = Some(map_id);
        self
    }

    pub fn is_counter(&self) -> bool {
        self.flags.contains(AchievementFlags::COUNTER)
    }

    /// Owner kind that tracks this achievement
    pub fn owner_kind(&self) -> OwnerKind {
        if self.flags.contains(AchievementFlags::GUILD) {
            OwnerKind::Guild
        } else if self.flags.contains(AchievementFlags::ACCOUNT) {
            OwnerKind::Account
        } else {
            OwnerKind::Player
        }
    }
}
