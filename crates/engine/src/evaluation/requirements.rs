//! Type-specific matching of reported values against a criteria's asset

use criteria_domain::{AchievementId, CriteriaEntry, CriteriaEvent, CriteriaType};

/// Whether `event` counts for `criteria` at all.
///
/// `required_achievement` answers whether the owner has earned an
/// achievement, for criteria that track other achievements.
pub fn requirements_satisfied(
    criteria: &CriteriaEntry,
    event: &CriteriaEvent,
    required_achievement: &dyn Fn(AchievementId) -> bool,
) -> bool {
    let misc1 = event.misc_value1;
    let asset = criteria.asset;

    match criteria.criteria_type {
        CriteriaType::EarnAchievement => {
            if misc1 != 0 && misc1 != asset {
                return false;
            }
            match u32::try_from(asset) {
                Ok(raw) => required_achievement(AchievementId::new(raw)),
                Err(_) => false,
            }
        }

        // Asset-keyed types need the exact asset reported
        t if t.is_stored_by_asset() => misc1 != 0 && misc1 == asset,

        CriteriaType::KillAnyCreature => misc1 != 0 && misc1 == asset,

        CriteriaType::WinAnyRankedArena => asset == 0 || misc1 == asset,

        CriteriaType::ReachLevel
        | CriteriaType::EarnAchievementPoints
        | CriteriaType::CompleteQuestsCount
        | CriteriaType::DamageDealt
        | CriteriaType::HealingDone
        | CriteriaType::HighestHitDealt
        | CriteriaType::HighestHealCast
        | CriteriaType::LootMoney => misc1 != 0,

        CriteriaType::WinAnyBattleground
        | CriteriaType::EarnHonorableKill
        | CriteriaType::CompleteDailyQuest
        | CriteriaType::Die
        | CriteriaType::CompleteAnyScenario => true,

        // Unreachable: every remaining type is asset-keyed
        _ => false,
    }
}
