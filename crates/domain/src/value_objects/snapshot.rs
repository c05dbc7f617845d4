//! Snapshots of the world state an event is evaluated against
//!
//! Event producers capture the acting participant, the context entity and the
//! item involved at the moment the event happens. Evaluators only ever read
//! these; they never reach back into live game objects.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ParticipantId;

/// Participant faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Horde,
    Alliance,
}

impl Team {
    pub const HORDE_CODE: u32 = 67;
    pub const ALLIANCE_CODE: u32 = 469;

    pub fn from_code(code: u32) -> Result<Self, DomainError> {
        match code {
            Self::HORDE_CODE => Ok(Team::Horde),
            Self::ALLIANCE_CODE => Ok(Team::Alliance),
            other => Err(DomainError::validation(format!("unknown team {}", other))),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Team::Horde => Self::HORDE_CODE,
            Team::Alliance => Self::ALLIANCE_CODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
    None,
}

impl Gender {
    pub fn from_code(code: u32) -> Result<Self, DomainError> {
        match code {
            0 => Ok(Gender::Male),
            1 => Ok(Gender::Female),
            2 => Ok(Gender::None),
            other => Err(DomainError::validation(format!("unknown gender {}", other))),
        }
    }
}

/// One active aura effect on a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuraSnapshot {
    pub spell_id: u32,
    pub effect_index: u8,
}

fn has_aura(auras: &[AuraSnapshot], spell_id: u32, effect_index: Option<u8>) -> bool {
    auras.iter().any(|aura| {
        aura.spell_id == spell_id && effect_index.map_or(true, |idx| aura.effect_index == idx)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlegroundSnapshot {
    /// Final score of the team opposing the participant
    pub opposing_team_score: u32,
}

/// The participant whose action produced the event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub level: u8,
    pub class: u8,
    pub race: u8,
    pub gender: Gender,
    pub team: Team,
    pub health_pct: u8,
    #[serde(default)]
    pub auras: Vec<AuraSnapshot>,
    pub map_id: u32,
    pub zone_id: u32,
    /// Instance the participant is in, if the map is instanced
    #[serde(default)]
    pub instance_id: Option<u32>,
    /// Players currently on the participant's map
    #[serde(default)]
    pub map_player_count: u32,
    #[serde(default)]
    pub drunk_state: u8,
    #[serde(default)]
    pub known_titles: Vec<u32>,
    #[serde(default)]
    pub battleground: Option<BattlegroundSnapshot>,
}

impl ParticipantSnapshot {
    pub fn new(id: ParticipantId, level: u8, team: Team) -> Self {
        Self {
            id,
            level,
            class: 0,
            race: 0,
            gender: Gender::Male,
            team,
            health_pct: 100,
            auras: Vec::new(),
            map_id: 0,
            zone_id: 0,
            instance_id: None,
            map_player_count: 0,
            drunk_state: 0,
            known_titles: Vec::new(),
            battleground: None,
        }
    }

    pub fn with_class_race(mut self, class: u8, race: u8) -> Self {
        self.class = class;
        self.race = race;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_health_pct(mut self, pct: u8) -> Self {
        self.health_pct = pct;
        self
    }

    pub fn with_aura(mut self, spell_id: u32, effect_index: u8) -> Self {
        self.auras.push(AuraSnapshot {
            spell_id,
            effect_index,
        });
        self
    }

    pub fn with_location(mut self, map_id: u32, zone_id: u32) -> Self {
        self.map_id = map_id;
        self.zone_id = zone_id;
        self
    }

    pub fn with_instance(mut self, instance_id: u32, map_player_count: u32) -> Self {
        self.instance_id = Some(instance_id);
        self.map_player_count = map_player_count;
        self
    }

    pub fn with_drunk_state(mut self, state: u8) -> Self {
        self.drunk_state = state;
        self
    }

    pub fn with_title(mut self, title: u32) -> Self {
        self.known_titles.push(title);
        self
    }

    pub fn with_battleground(mut self, opposing_team_score: u32) -> Self {
        self.battleground = Some(BattlegroundSnapshot {
            opposing_team_score,
        });
        self
    }

    pub fn has_aura(&self, spell_id: u32, effect_index: Option<u8>) -> bool {
        has_aura(&self.auras, spell_id, effect_index)
    }

    pub fn knows_title(&self, title: u32) -> bool {
        self.known_titles.contains(&title)
    }

    /// The participant seen as the context entity of another participant's event
    pub fn as_world_object(&self) -> WorldObjectSnapshot {
        WorldObjectSnapshot {
            kind: WorldObjectKind::Player {
                class: self.class,
                race: self.race,
                gender: self.gender,
                team: self.team,
            },
            level: self.level,
            health_pct: self.health_pct,
            auras: self.auras.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorldObjectKind {
    Creature { entry: u32, creature_type: u32 },
    Player {
        class: u8,
        race: u8,
        gender: Gender,
        team: Team,
    },
    GameObject { entry: u32 },
}

/// The context entity of an event (kill target, spell target, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObjectSnapshot {
    pub kind: WorldObjectKind,
    pub level: u8,
    pub health_pct: u8,
    #[serde(default)]
    pub auras: Vec<AuraSnapshot>,
}

impl WorldObjectSnapshot {
    pub fn creature(entry: u32, creature_type: u32, level: u8) -> Self {
        Self {
            kind: WorldObjectKind::Creature {
                entry,
                creature_type,
            },
            level,
            health_pct: 100,
            auras: Vec::new(),
        }
    }

    pub fn game_object(entry: u32) -> Self {
        Self {
            kind: WorldObjectKind::GameObject { entry },
            level: 0,
            health_pct: 100,
            auras: Vec::new(),
        }
    }

    pub fn with_health_pct(mut self, pct: u8) -> Self {
        self.health_pct = pct;
        self
    }

    pub fn with_aura(mut self, spell_id: u32, effect_index: u8) -> Self {
        self.auras.push(AuraSnapshot {
            spell_id,
            effect_index,
        });
        self
    }

    pub fn creature_entry(&self) -> Option<u32> {
        match self.kind {
            WorldObjectKind::Creature { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub fn creature_type(&self) -> Option<u32> {
        match self.kind {
            WorldObjectKind::Creature { creature_type, .. } => Some(creature_type),
            _ => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, WorldObjectKind::Player { .. })
    }

    pub fn has_aura(&self, spell_id: u32, effect_index: Option<u8>) -> bool {
        has_aura(&self.auras, spell_id, effect_index)
    }
}

/// The item involved in an item event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub entry: u32,
    pub item_level: u32,
    pub quality: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_codes() {
        assert_eq!(Team::from_code(67), Ok(Team::Horde));
        assert_eq!(Team::from_code(469), Ok(Team::Alliance));
        assert!(Team::from_code(0).is_err());
        assert_eq!(Team::Alliance.code(), 469);
    }

    #[test]
    fn aura_lookup_with_and_without_effect() {
        let p = ParticipantSnapshot::new(ParticipantId::new(), 10, Team::Horde).with_aura(2825, 1);
        assert!(p.has_aura(2825, None));
        assert!(p.has_aura(2825, Some(1)));
        assert!(!p.has_aura(2825, Some(0)));
        assert!(!p.has_aura(1, None));
    }

    #[test]
    fn participant_as_target() {
        let p = ParticipantSnapshot::new(ParticipantId::new(), 42, Team::Alliance)
            .with_class_race(1, 4);
        let target = p.as_world_object();
        assert!(target.is_player());
        assert_eq!(target.level, 42);
        assert_eq!(target.creature_entry(), None);
    }

    #[test]
    fn world_object_deserializes_tagged_kind() {
        let json = r#"{"kind":{"type":"creature","entry":100,"creature_type":7},"level":12,"health_pct":50}"#;
        let target: WorldObjectSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(target.creature_entry(), Some(100));
        assert_eq!(target.creature_type(), Some(7));
        assert!(target.auras.is_empty());
    }
}
