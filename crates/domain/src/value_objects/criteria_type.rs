//! Criteria types - the kind of game event a criteria listens for
//!
//! Each type fixes three things about incoming events:
//! - which reported misc value must match the criteria's static `asset`
//! - which reported misc value is the progress amount
//! - how that amount is folded into the counter (`ProgressType`)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// How a reported amount is folded into a progress counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressType {
    /// counter := value
    Set,
    /// counter += value
    Accumulate,
    /// counter := max(counter, value)
    Highest,
}

impl ProgressType {
    /// Folds `change` into `current`. Returns the new counter value.
    pub fn apply(self, current: u64, change: u64) -> u64 {
        match self {
            ProgressType::Set => change,
            ProgressType::Accumulate => current.saturating_add(change),
            ProgressType::Highest => current.max(change),
        }
    }
}

/// Which reported value carries the progress amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    MiscValue1,
    MiscValue2,
    /// The event itself counts as one occurrence
    One,
}

impl AmountSource {
    pub fn pick(self, misc_value1: u64, misc_value2: u64) -> u64 {
        match self {
            AmountSource::MiscValue1 => misc_value1,
            AmountSource::MiscValue2 => misc_value2,
            AmountSource::One => 1,
        }
    }
}

/// Kind of event a criteria listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaType {
    /// misc1 = creature entry, misc2 = kill count
    KillCreature,
    /// misc1 = creature type, misc2 = kill count
    KillAnyCreature,
    /// misc1 = creature entry
    KilledByCreature,
    /// misc1 = map id
    WinBattleground,
    WinAnyBattleground,
    WinAnyRankedArena,
    EarnHonorableKill,
    /// misc1 = new level
    ReachLevel,
    /// misc1 = skill line, misc2 = skill value
    ReachSkillLevel,
    /// misc1 = achievement id
    EarnAchievement,
    /// misc1 = total achievement points
    EarnAchievementPoints,
    /// misc1 = total completed quests
    CompleteQuestsCount,
    /// misc1 = quest id
    CompleteQuest,
    CompleteDailyQuest,
    /// misc1 = zone id
    CompleteQuestsInZone,
    /// misc1 = damage amount
    DamageDealt,
    /// misc1 = healing amount
    HealingDone,
    /// misc1 = hit amount
    HighestHitDealt,
    /// misc1 = heal amount
    HighestHealCast,
    Die,
    /// misc1 = spell id
    LearnSpell,
    /// misc1 = spell id
    CastSpell,
    /// misc1 = spell id
    BeSpellTarget,
    /// misc1 = spell id
    GainAura,
    /// misc1 = item entry, misc2 = count
    ObtainItem,
    /// misc1 = item entry
    UseItem,
    /// misc1 = copper amount
    LootMoney,
    /// misc1 = area id
    ExploreArea,
    /// misc1 = faction id, misc2 = standing
    GainReputation,
    /// misc1 = emote id
    DoEmote,
    /// misc1 = encounter id
    CompleteDungeonEncounter,
    CompleteAnyScenario,
    /// misc1 = script event id
    SendEvent,
}

impl CriteriaType {
    pub const ALL: [CriteriaType; 33] = [
        CriteriaType::KillCreature,
        CriteriaType::KillAnyCreature,
        CriteriaType::KilledByCreature,
        CriteriaType::WinBattleground,
        CriteriaType::WinAnyBattleground,
        CriteriaType::WinAnyRankedArena,
        CriteriaType::EarnHonorableKill,
        CriteriaType::ReachLevel,
        CriteriaType::ReachSkillLevel,
        CriteriaType::EarnAchievement,
        CriteriaType::EarnAchievementPoints,
        CriteriaType::CompleteQuestsCount,
        CriteriaType::CompleteQuest,
        CriteriaType::CompleteDailyQuest,
        CriteriaType::CompleteQuestsInZone,
        CriteriaType::DamageDealt,
        CriteriaType::HealingDone,
        CriteriaType::HighestHitDealt,
        CriteriaType::HighestHealCast,
        CriteriaType::Die,
        CriteriaType::LearnSpell,
        CriteriaType::CastSpell,
        CriteriaType::BeSpellTarget,
        CriteriaType::GainAura,
        CriteriaType::ObtainItem,
        CriteriaType::UseItem,
        CriteriaType::LootMoney,
        CriteriaType::ExploreArea,
        CriteriaType::GainReputation,
        CriteriaType::DoEmote,
        CriteriaType::CompleteDungeonEncounter,
        CriteriaType::CompleteAnyScenario,
        CriteriaType::SendEvent,
    ];

    /// Stable name used in logs and data files
    pub fn name(&self) -> &'static str {
        match self {
            CriteriaType::KillCreature => "kill_creature",
            CriteriaType::KillAnyCreature => "kill_any_creature",
            CriteriaType::KilledByCreature => "killed_by_creature",
            CriteriaType::WinBattleground => "win_battleground",
            CriteriaType::WinAnyBattleground => "win_any_battleground",
            CriteriaType::WinAnyRankedArena => "win_any_ranked_arena",
            CriteriaType::EarnHonorableKill => "earn_honorable_kill",
            CriteriaType::ReachLevel => "reach_level",
            CriteriaType::ReachSkillLevel => "reach_skill_level",
            CriteriaType::EarnAchievement => "earn_achievement",
            CriteriaType::EarnAchievementPoints => "earn_achievement_points",
            CriteriaType::CompleteQuestsCount => "complete_quests_count",
            CriteriaType::CompleteQuest => "complete_quest",
            CriteriaType::CompleteDailyQuest => "complete_daily_quest",
            CriteriaType::CompleteQuestsInZone => "complete_quests_in_zone",
            CriteriaType::DamageDealt => "damage_dealt",
            CriteriaType::HealingDone => "healing_done",
            CriteriaType::HighestHitDealt => "highest_hit_dealt",
            CriteriaType::HighestHealCast => "highest_heal_cast",
            CriteriaType::Die => "die",
            CriteriaType::LearnSpell => "learn_spell",
            CriteriaType::CastSpell => "cast_spell",
            CriteriaType::BeSpellTarget => "be_spell_target",
            CriteriaType::GainAura => "gain_aura",
            CriteriaType::ObtainItem => "obtain_item",
            CriteriaType::UseItem => "use_item",
            CriteriaType::LootMoney => "loot_money",
            CriteriaType::ExploreArea => "explore_area",
            CriteriaType::GainReputation => "gain_reputation",
            CriteriaType::DoEmote => "do_emote",
            CriteriaType::CompleteDungeonEncounter => "complete_dungeon_encounter",
            CriteriaType::CompleteAnyScenario => "complete_any_scenario",
            CriteriaType::SendEvent => "send_event",
        }
    }

    /// Progress amount source and folding policy for this type
    pub fn progress_rule(&self) -> (AmountSource, ProgressType) {
        use AmountSource::*;
        use ProgressType::*;

        match self {
            CriteriaType::KillCreature
            | CriteriaType::KillAnyCreature
            | CriteriaType::ObtainItem => (MiscValue2, Accumulate),

            CriteriaType::DamageDealt | CriteriaType::HealingDone | CriteriaType::LootMoney => {
                (MiscValue1, Accumulate)
            }

            CriteriaType::KilledByCreature
            | CriteriaType::WinBattleground
            | CriteriaType::WinAnyBattleground
            | CriteriaType::WinAnyRankedArena
            | CriteriaType::EarnHonorableKill
            | CriteriaType::CompleteDailyQuest
            | CriteriaType::CompleteQuestsInZone
            | CriteriaType::Die
            | CriteriaType::CastSpell
            | CriteriaType::BeSpellTarget
            | CriteriaType::UseItem
            | CriteriaType::DoEmote
            | CriteriaType::CompleteDungeonEncounter
            | CriteriaType::CompleteAnyScenario
            | CriteriaType::SendEvent => (One, Accumulate),

            CriteriaType::ReachLevel
            | CriteriaType::EarnAchievementPoints
            | CriteriaType::CompleteQuestsCount => (MiscValue1, Set),

            CriteriaType::GainReputation => (MiscValue2, Set),

            CriteriaType::EarnAchievement
            | CriteriaType::CompleteQuest
            | CriteriaType::LearnSpell
            | CriteriaType::GainAura
            | CriteriaType::ExploreArea => (One, Set),

            CriteriaType::ReachSkillLevel => (MiscValue2, Highest),

            CriteriaType::HighestHitDealt | CriteriaType::HighestHealCast => {
                (MiscValue1, Highest)
            }
        }
    }

    /// Types whose `asset` must equal the reported misc value 1.
    ///
    /// These are also the types the participant index buckets by asset.
    pub fn is_stored_by_asset(&self) -> bool {
        matches!(
            self,
            CriteriaType::KillCreature
                | CriteriaType::KilledByCreature
                | CriteriaType::WinBattleground
                | CriteriaType::ReachSkillLevel
                | CriteriaType::EarnAchievement
                | CriteriaType::CompleteQuest
                | CriteriaType::CompleteQuestsInZone
                | CriteriaType::LearnSpell
                | CriteriaType::CastSpell
                | CriteriaType::BeSpellTarget
                | CriteriaType::GainAura
                | CriteriaType::ObtainItem
                | CriteriaType::UseItem
                | CriteriaType::ExploreArea
                | CriteriaType::GainReputation
                | CriteriaType::DoEmote
                | CriteriaType::CompleteDungeonEncounter
                | CriteriaType::SendEvent
        )
    }

    /// Whether one event should be credited to every eligible group member
    /// rather than only the reporting participant.
    pub fn is_group_type(&self) -> bool {
        matches!(
            self,
            CriteriaType::KillCreature
                | CriteriaType::WinBattleground
                | CriteriaType::BeSpellTarget
                | CriteriaType::WinAnyRankedArena
                | CriteriaType::GainAura
                | CriteriaType::WinAnyBattleground
        )
    }

    /// Whether requirement data rows other than scripted checks may be
    /// attached to criteria of this type.
    pub fn supports_requirement_data(&self) -> bool {
        matches!(
            self,
            CriteriaType::KillCreature
                | CriteriaType::KillAnyCreature
                | CriteriaType::WinBattleground
                | CriteriaType::WinAnyRankedArena
                | CriteriaType::EarnHonorableKill
                | CriteriaType::CastSpell
                | CriteriaType::BeSpellTarget
                | CriteriaType::GainAura
                | CriteriaType::DoEmote
                | CriteriaType::UseItem
                | CriteriaType::ObtainItem
                | CriteriaType::HighestHitDealt
                | CriteriaType::DamageDealt
                | CriteriaType::ReachLevel
        )
    }

    /// Types a participant tracker may re-evaluate from current state
    /// (e.g. on login) without a real event occurring.
    pub fn retroactively_updateable() -> &'static [CriteriaType] {
        &[
            CriteriaType::ReachLevel,
            CriteriaType::ReachSkillLevel,
            CriteriaType::EarnAchievementPoints,
            CriteriaType::CompleteQuestsCount,
            CriteriaType::LearnSpell,
            CriteriaType::GainReputation,
        ]
    }
}

impl fmt::Display for CriteriaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CriteriaType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        CriteriaType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == needle)
            .ok_or_else(|| DomainError::parse(format!("Unknown criteria type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for t in CriteriaType::ALL {
            assert_eq!(t.name().parse::<CriteriaType>(), Ok(t));
        }
    }

    #[test]
    fn serde_name_matches_display_name() {
        for t in CriteriaType::ALL {
            let json = serde_json::to_string(&t).expect("serialize");
            assert_eq!(json, format!("\"{}\"", t.name()));
        }
    }

    #[test]
    fn unknown_type_is_parse_error() {
        assert!(matches!(
            "fly_to_moon".parse::<CriteriaType>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn progress_type_folding() {
        assert_eq!(ProgressType::Set.apply(7, 3), 3);
        assert_eq!(ProgressType::Accumulate.apply(7, 3), 10);
        assert_eq!(ProgressType::Highest.apply(7, 3), 7);
        assert_eq!(ProgressType::Highest.apply(7, 9), 9);
        assert_eq!(ProgressType::Accumulate.apply(u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn kill_creature_accumulates_reported_count() {
        let (source, policy) = CriteriaType::KillCreature.progress_rule();
        assert_eq!(source.pick(100, 2), 2);
        assert_eq!(policy, ProgressType::Accumulate);
    }

    #[test]
    fn group_types() {
        assert!(CriteriaType::KillCreature.is_group_type());
        assert!(CriteriaType::WinAnyBattleground.is_group_type());
        assert!(!CriteriaType::ReachLevel.is_group_type());
    }
}
