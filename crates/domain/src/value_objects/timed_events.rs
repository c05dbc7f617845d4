//! Start and fail events for timed criteria

use std::fmt;

use serde::{Deserialize, Serialize};

/// External event that starts a criteria's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaStartEvent {
    /// asset = level
    ReachLevel,
    CompleteDailyQuest,
    /// asset = map id
    StartBattleground,
    /// asset = team size
    WinRankedArenaMatch,
    /// asset = quest id
    CompleteQuest,
    /// asset = spell id
    CastSpell,
    /// asset = spell id
    BeSpellTarget,
    /// asset = spell id
    GainAura,
    /// asset = script event id
    SendEvent,
    /// asset = item entry
    UseItem,
    /// asset = creature entry
    KillCreature,
}

/// External event that fails a started criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaFailEvent {
    Death,
    DailyQuestReset,
    /// asset = map id
    LeaveBattleground,
    LoseRankedArenaMatch,
    /// asset = spell id
    LoseAura,
    /// asset = spell id
    GainAura,
    EnterCombat,
    CompleteAnyQuest,
    ModifyPartyStatus,
    /// asset = map id
    LeaveInstance,
}

impl fmt::Display for CriteriaStartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CriteriaStartEvent::ReachLevel => "reach_level",
            CriteriaStartEvent::CompleteDailyQuest => "complete_daily_quest",
            CriteriaStartEvent::StartBattleground => "start_battleground",
            CriteriaStartEvent::WinRankedArenaMatch => "win_ranked_arena_match",
            CriteriaStartEvent::CompleteQuest => "complete_quest",
            CriteriaStartEvent::CastSpell => "cast_spell",
            CriteriaStartEvent::BeSpellTarget => "be_spell_target",
            CriteriaStartEvent::GainAura => "gain_aura",
            CriteriaStartEvent::SendEvent => "send_event",
            CriteriaStartEvent::UseItem => "use_item",
            CriteriaStartEvent::KillCreature => "kill_creature",
        };
        f.write_str(name)
    }
}

impl fmt::Display for CriteriaFailEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CriteriaFailEvent::Death => "death",
            CriteriaFailEvent::DailyQuestReset => "daily_quest_reset",
            CriteriaFailEvent::LeaveBattleground => "leave_battleground",
            CriteriaFailEvent::LoseRankedArenaMatch => "lose_ranked_arena_match",
            CriteriaFailEvent::LoseAura => "lose_aura",
            CriteriaFailEvent::GainAura => "gain_aura",
            CriteriaFailEvent::EnterCombat => "enter_combat",
            CriteriaFailEvent::CompleteAnyQuest => "complete_any_quest",
            CriteriaFailEvent::ModifyPartyStatus => "modify_party_status",
            CriteriaFailEvent::LeaveInstance => "leave_instance",
        };
        f.write_str(name)
    }
}

/// Why a started criteria was failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Its timer ran out
    Timeout,
    /// A matching fail event was reported
    Event(CriteriaFailEvent),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::Timeout => f.write_str("timeout"),
            FailReason::Event(event) => write!(f, "{}", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_names() {
        let json = serde_json::to_string(&CriteriaStartEvent::WinRankedArenaMatch).unwrap();
        assert_eq!(json, "\"win_ranked_arena_match\"");
        assert_eq!(
            CriteriaStartEvent::WinRankedArenaMatch.to_string(),
            "win_ranked_arena_match"
        );

        let json = serde_json::to_string(&CriteriaFailEvent::ModifyPartyStatus).unwrap();
        assert_eq!(json, "\"modify_party_status\"");
    }

    #[test]
    fn fail_reason_display() {
        assert_eq!(FailReason::Timeout.to_string(), "timeout");
        assert_eq!(
            FailReason::Event(CriteriaFailEvent::Death).to_string(),
            "death"
        );
    }
}
