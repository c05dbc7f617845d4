//! Requirement predicate evaluation.
//!
//! A predicate that needs the actor, the context entity or the item fails
//! when the event does not carry it. A scripted predicate whose script is
//! not bound fails too.

use criteria_domain::{CriteriaData, CriteriaId, WorldObjectKind};

use super::EvaluationContext;
use crate::registry::Criteria;

/// Every predicate of the criteria holds (vacuously true when there are none)
pub fn conditions_satisfied(criteria: &Criteria, ctx: &EvaluationContext<'_>) -> bool {
    criteria.data.iter().all(|data| {
        let met = data_meets(data, criteria.id(), ctx);
        if !met {
            tracing::trace!(criteria_id = %criteria.id(), predicate = ?data, "Requirement predicate not met");
        }
        met
    })
}

pub fn data_meets(data: &CriteriaData, criteria_id: CriteriaId, ctx: &EvaluationContext<'_>) -> bool {
    let actor = ctx.actor();
    let target = ctx.target();

    match data {
        CriteriaData::None => true,

        CriteriaData::TargetCreature { entry } => {
            target.and_then(|t| t.creature_entry()) == Some(*entry)
        }

        CriteriaData::TargetPlayerClassRace { class, race } => match target.map(|t| &t.kind) {
            Some(WorldObjectKind::Player {
                class: target_class,
                race: target_race,
                ..
            }) => class_race_matches(*class, *race, *target_class, *target_race),
            _ => false,
        },

        CriteriaData::TargetPlayerLessHealth { percent } => {
            target.is_some_and(|t| t.is_player() && t.health_pct <= *percent)
        }

        CriteriaData::SourceAura {
            spell_id,
            effect_index,
        } => actor.is_some_and(|a| a.has_aura(*spell_id, Some(*effect_index))),

        CriteriaData::TargetAura {
            spell_id,
            effect_index,
        } => target.is_some_and(|t| t.has_aura(*spell_id, Some(*effect_index))),

        CriteriaData::Value { value, comparison } => comparison.compare(ctx.misc_value1(), *value),

        CriteriaData::TargetLevel { min_level } => target.is_some_and(|t| t.level >= *min_level),

        CriteriaData::TargetGender { gender } => match target.map(|t| &t.kind) {
            Some(WorldObjectKind::Player {
                gender: target_gender,
                ..
            }) => target_gender == gender,
            _ => false,
        },

        CriteriaData::Script { name } => {
            match ctx.scripts.check(name, criteria_id, ctx.event) {
                Some(result) => result,
                None => {
                    tracing::warn!(criteria_id = %criteria_id, script = %name, "Scripted requirement has no binding");
                    false
                }
            }
        }

        CriteriaData::MapPlayerCount { max_count } => {
            actor.is_some_and(|a| a.map_player_count <= *max_count)
        }

        CriteriaData::TargetTeam { team } => match target.map(|t| &t.kind) {
            Some(WorldObjectKind::Player {
                team: target_team, ..
            }) => target_team == team,
            _ => false,
        },

        CriteriaData::SourceDrunk { state } => actor.is_some_and(|a| a.drunk_state >= *state),

        CriteriaData::Holiday { holiday_id } => ctx.world.is_holiday_active(*holiday_id),

        CriteriaData::BattlegroundLossTeamScore { min, max } => actor
            .and_then(|a| a.battleground)
            .is_some_and(|bg| (*min..=*max).contains(&bg.opposing_team_score)),

        CriteriaData::InstanceScript => {
            let Some(instance_id) = actor.and_then(|a| a.instance_id) else {
                tracing::debug!(criteria_id = %criteria_id, "Instance script requirement outside an instance");
                return false;
            };
            ctx.instance_scripts
                .check_requirement(instance_id, criteria_id, ctx.event)
                .unwrap_or(false)
        }

        CriteriaData::SourceEquippedItem {
            min_item_level,
            min_quality,
        } => ctx
            .event
            .item
            .is_some_and(|item| item.item_level >= *min_item_level && item.quality >= *min_quality),

        CriteriaData::MapId { map_id } => actor.is_some_and(|a| a.map_id == *map_id),

        CriteriaData::SourcePlayerClassRace { class, race } => {
            actor.is_some_and(|a| class_race_matches(*class, *race, a.class, a.race))
        }

        CriteriaData::SourceKnownTitle { title_id } => actor.is_some_and(|a| a.knows_title(*title_id)),

        CriteriaData::GameEvent { event_id } => ctx.world.is_game_event_active(*event_id),

        CriteriaData::SourceItemQuality { quality } => {
            ctx.event.item.is_some_and(|item| item.quality == *quality)
        }

        CriteriaData::SourceLevel { min_level } => actor.is_some_and(|a| a.level >= *min_level),
    }
}

fn class_race_matches(class: u8, race: u8, actual_class: u8, actual_race: u8) -> bool {
    (class == 0 || class == actual_class) && (race == 0 || race == actual_race)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockInstanceScriptPort, MockScriptCheckPort, MockWorldStatePort, NoScripts,
    };
    use criteria_domain::{
        ComparisonOp, CriteriaEntry, CriteriaEvent, CriteriaType, Gender, ItemSnapshot,
        OwnerKinds, ParticipantId, ParticipantSnapshot, Team, WorldObjectSnapshot,
    };

    fn ctx<'a>(event: &'a CriteriaEvent) -> EvaluationContext<'a> {
        EvaluationContext {
            event,
            scripts: &NoScripts,
            instance_scripts: &NoScripts,
            world: &NoScripts,
        }
    }

    fn actor(level: u8) -> ParticipantSnapshot {
        ParticipantSnapshot::new(ParticipantId::new(), level, Team::Horde)
    }

    fn criteria_with(data: Vec<CriteriaData>) -> Criteria {
        Criteria {
            entry: CriteriaEntry::new(CriteriaId::new(1), CriteriaType::KillCreature, 100),
            modifier: None,
            owner_kinds: OwnerKinds::PLAYER,
            data,
            trees: Vec::new(),
        }
    }

    #[test]
    fn empty_set_is_satisfied() {
        let event = CriteriaEvent::new(CriteriaType::KillCreature);
        assert!(conditions_satisfied(&criteria_with(vec![]), &ctx(&event)));
    }

    #[test]
    fn one_failing_predicate_fails_the_set() {
        let event = CriteriaEvent::new(CriteriaType::KillCreature).by(actor(8));
        let criteria = criteria_with(vec![
            CriteriaData::None,
            CriteriaData::SourceLevel { min_level: 10 },
        ]);
        assert!(!conditions_satisfied(&criteria, &ctx(&event)));

        let event = CriteriaEvent::new(CriteriaType::KillCreature).by(actor(12));
        assert!(conditions_satisfied(&criteria, &ctx(&event)));
    }

    #[test]
    fn actor_predicates_fail_without_actor() {
        let event = CriteriaEvent::new(CriteriaType::KillCreature);
        let id = CriteriaId::new(1);
        assert!(!data_meets(&CriteriaData::SourceLevel { min_level: 1 }, id, &ctx(&event)));
        assert!(!data_meets(&CriteriaData::MapId { map_id: 1 }, id, &ctx(&event)));
    }

    #[test]
    fn target_predicates() {
        let id = CriteriaId::new(1);
        let wolf = WorldObjectSnapshot::creature(299, 1, 5).with_health_pct(30);
        let event = CriteriaEvent::new(CriteriaType::KillCreature).on(wolf);
        let c = ctx(&event);
        assert!(data_meets(&CriteriaData::TargetCreature { entry: 299 }, id, &c));
        assert!(!data_meets(&CriteriaData::TargetCreature { entry: 300 }, id, &c));
        assert!(data_meets(&CriteriaData::TargetLevel { min_level: 5 }, id, &c));
        // low health only counts for player targets
        assert!(!data_meets(&CriteriaData::TargetPlayerLessHealth { percent: 50 }, id, &c));

        let player = actor(70)
            .with_class_race(4, 2)
            .with_gender(Gender::Female)
            .with_health_pct(20)
            .as_world_object();
        let event = CriteriaEvent::new(CriteriaType::KillCreature).on(player);
        let c = ctx(&event);
        assert!(data_meets(&CriteriaData::TargetPlayerLessHealth { percent: 20 }, id, &c));
        assert!(data_meets(&CriteriaData::TargetPlayerClassRace { class: 4, race: 0 }, id, &c));
        assert!(!data_meets(&CriteriaData::TargetPlayerClassRace { class: 4, race: 1 }, id, &c));
        assert!(data_meets(&CriteriaData::TargetGender { gender: Gender::Female }, id, &c));
        assert!(data_meets(&CriteriaData::TargetTeam { team: Team::Horde }, id, &c));
        assert!(!data_meets(&CriteriaData::TargetTeam { team: Team::Alliance }, id, &c));
    }

    #[test]
    fn value_comparison_uses_misc_value1() {
        let id = CriteriaId::new(1);
        let event = CriteriaEvent::new(CriteriaType::DamageDealt).with_misc(500, 0);
        let ge = CriteriaData::Value {
            value: 500,
            comparison: ComparisonOp::Ge,
        };
        let gt = CriteriaData::Value {
            value: 500,
            comparison: ComparisonOp::Gt,
        };
        assert!(data_meets(&ge, id, &ctx(&event)));
        assert!(!data_meets(&gt, id, &ctx(&event)));
    }

    #[test]
    fn script_predicate_delegates_and_unbound_fails() {
        let id = CriteriaId::new(1);
        let event = CriteriaEvent::new(CriteriaType::KillCreature);
        let data = CriteriaData::Script {
            name: "flawless".to_string(),
        };

        let mut scripts = MockScriptCheckPort::new();
        scripts
            .expect_check()
            .withf(|name, criteria, _| name == "flawless" && *criteria == CriteriaId::new(1))
            .times(1)
            .returning(|_, _, _| Some(true));
        let c = EvaluationContext {
            scripts: &scripts,
            ..ctx(&event)
        };
        assert!(data_meets(&data, id, &c));

        // NoScripts binds nothing
        assert!(!data_meets(&data, id, &ctx(&event)));
    }

    #[test]
    fn instance_script_needs_an_instance() {
        let id = CriteriaId::new(1);
        let data = CriteriaData::InstanceScript;

        let mut instances = MockInstanceScriptPort::new();
        instances
            .expect_check_requirement()
            .withf(|instance, _, _| *instance == 7)
            .returning(|_, _, _| Some(true));

        let outside = CriteriaEvent::new(CriteriaType::KillCreature).by(actor(10));
        let c = EvaluationContext {
            instance_scripts: &instances,
            ..ctx(&outside)
        };
        assert!(!data_meets(&data, id, &c));

        let inside = CriteriaEvent::new(CriteriaType::KillCreature).by(actor(10).with_instance(7, 5));
        let c = EvaluationContext {
            instance_scripts: &instances,
            ..ctx(&inside)
        };
        assert!(data_meets(&data, id, &c));
    }

    #[test]
    fn world_state_predicates() {
        let id = CriteriaId::new(1);
        let event = CriteriaEvent::new(CriteriaType::KillCreature);
        let mut world = MockWorldStatePort::new();
        world.expect_is_holiday_active().returning(|id| id == 141);
        world.expect_is_game_event_active().returning(|_| false);
        let c = EvaluationContext {
            world: &world,
            ..ctx(&event)
        };
        assert!(data_meets(&CriteriaData::Holiday { holiday_id: 141 }, id, &c));
        assert!(!data_meets(&CriteriaData::Holiday { holiday_id: 1 }, id, &c));
        assert!(!data_meets(&CriteriaData::GameEvent { event_id: 1 }, id, &c));
    }

    #[test]
    fn actor_state_predicates() {
        let id = CriteriaId::new(1);
        let a = actor(80)
            .with_aura(2825, 0)
            .with_drunk_state(2)
            .with_title(42)
            .with_location(571, 4395)
            .with_instance(3, 10)
            .with_battleground(150);
        let item = ItemSnapshot {
            entry: 1,
            item_level: 200,
            quality: 4,
        };
        let event = CriteriaEvent::new(CriteriaType::KillCreature).by(a).with_item(item);
        let c = ctx(&event);

        assert!(data_meets(&CriteriaData::SourceAura { spell_id: 2825, effect_index: 0 }, id, &c));
        assert!(data_meets(&CriteriaData::SourceDrunk { state: 2 }, id, &c));
        assert!(!data_meets(&CriteriaData::SourceDrunk { state: 3 }, id, &c));
        assert!(data_meets(&CriteriaData::SourceKnownTitle { title_id: 42 }, id, &c));
        assert!(data_meets(&CriteriaData::MapId { map_id: 571 }, id, &c));
        assert!(data_meets(&CriteriaData::MapPlayerCount { max_count: 10 }, id, &c));
        assert!(!data_meets(&CriteriaData::MapPlayerCount { max_count: 9 }, id, &c));
        assert!(data_meets(&CriteriaData::BattlegroundLossTeamScore { min: 100, max: 199 }, id, &c));
        assert!(!data_meets(&CriteriaData::BattlegroundLossTeamScore { min: 0, max: 99 }, id, &c));
        assert!(data_meets(
            &CriteriaData::SourceEquippedItem { min_item_level: 187, min_quality: 4 },
            id,
            &c
        ));
        assert!(data_meets(&CriteriaData::SourceItemQuality { quality: 4 }, id, &c));
        assert!(!data_meets(&CriteriaData::SourceItemQuality { quality: 3 }, id, &c));
    }
}
