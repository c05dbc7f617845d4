//! Modifier tree evaluation

use criteria_domain::{ModifierCondition, ModifierTreeOperator};

use super::EvaluationContext;
use crate::registry::{CriteriaRegistry, ModifierIdx};

/// Evaluates the modifier tree rooted at `idx` against the event in `ctx`
pub fn modifier_tree_satisfied(
    registry: &CriteriaRegistry,
    idx: ModifierIdx,
    ctx: &EvaluationContext<'_>,
) -> bool {
    let node = registry.modifier(idx);

    match node.operator() {
        // a single node without a condition kind never passes
        ModifierTreeOperator::SingleTrue => {
            has_kind(&node.condition) && condition_holds(&node.condition, ctx)
        }
        ModifierTreeOperator::SingleFalse => {
            has_kind(&node.condition) && !condition_holds(&node.condition, ctx)
        }
        ModifierTreeOperator::All if node.children.is_empty() => {
            condition_holds(&node.condition, ctx)
        }
        ModifierTreeOperator::All => node
            .children
            .iter()
            .all(|child| modifier_tree_satisfied(registry, *child, ctx)),
        ModifierTreeOperator::Some if node.children.is_empty() => {
            condition_holds(&node.condition, ctx)
        }
        ModifierTreeOperator::Some => {
            let needed = node.entry.amount.max(1) as usize;
            node.children
                .iter()
                .filter(|child| modifier_tree_satisfied(registry, **child, ctx))
                .take(needed)
                .count()
                >= needed
        }
    }
}

fn has_kind(condition: &ModifierCondition) -> bool {
    !matches!(condition, ModifierCondition::Always)
}

fn condition_holds(condition: &ModifierCondition, ctx: &EvaluationContext<'_>) -> bool {
    let actor = ctx.actor();
    let target = ctx.target();

    match *condition {
        ModifierCondition::Always => true,
        ModifierCondition::MiscValue1 { value, op } => op.compare(ctx.misc_value1(), value),
        ModifierCondition::MiscValue2 { value, op } => op.compare(ctx.misc_value2(), value),
        ModifierCondition::ActorLevel { value, op } => {
            actor.is_some_and(|a| op.compare(u64::from(a.level), value))
        }
        ModifierCondition::TargetLevel { value, op } => {
            target.is_some_and(|t| op.compare(u64::from(t.level), value))
        }
        ModifierCondition::ActorHealthPct { value, op } => {
            actor.is_some_and(|a| op.compare(u64::from(a.health_pct), value))
        }
        ModifierCondition::TargetHealthPct { value, op } => {
            target.is_some_and(|t| op.compare(u64::from(t.health_pct), value))
        }
        ModifierCondition::MapPlayerCount { value, op } => {
            actor.is_some_and(|a| op.compare(u64::from(a.map_player_count), value))
        }
        ModifierCondition::ActorClassIn { mask } => actor.is_some_and(|a| in_mask(mask, a.class)),
        ModifierCondition::ActorRaceIn { mask } => actor.is_some_and(|a| in_mask(mask, a.race)),
        ModifierCondition::TargetCreatureEntry(entry) => {
            target.and_then(|t| t.creature_entry()) == Some(entry)
        }
        ModifierCondition::TargetCreatureType(creature_type) => {
            target.and_then(|t| t.creature_type()) == Some(creature_type)
        }
        ModifierCondition::TargetIsPlayer => target.is_some_and(|t| t.is_player()),
        ModifierCondition::ActorMap(map_id) => actor.is_some_and(|a| a.map_id == map_id),
        ModifierCondition::ActorZone(zone_id) => actor.is_some_and(|a| a.zone_id == zone_id),
        ModifierCondition::ActorAura(spell_id) => actor.is_some_and(|a| a.has_aura(spell_id, None)),
        ModifierCondition::TargetAura(spell_id) => {
            target.is_some_and(|t| t.has_aura(spell_id, None))
        }
        ModifierCondition::ActorTeam(team) => actor.is_some_and(|a| a.team == team),
        ModifierCondition::ActorKnownTitle(title) => actor.is_some_and(|a| a.knows_title(title)),
        ModifierCondition::HolidayActive(holiday_id) => ctx.world.is_holiday_active(holiday_id),
        ModifierCondition::GameEventActive(event_id) => ctx.world.is_game_event_active(event_id),
    }
}

/// Bit `value - 1` of `mask`; value 0 never matches
fn in_mask(mask: u64, value: u8) -> bool {
    match value {
        0 | 65.. => false,
        v => mask & (1u64 << (v - 1)) != 0,
    }
}
