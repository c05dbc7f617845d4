//! Requirement predicates attached to a criteria
//!
//! Each row is decoded into a [`CriteriaData`] variant carrying only its own
//! typed operands. Structural checks happen here; cross-reference checks
//! that need outside knowledge (script bindings) happen in the loader.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::CriteriaId;
use crate::value_objects::{ComparisonOp, CriteriaType, Gender, Team};

/// Highest level a level operand may name
pub const MAX_LEVEL: u64 = 255;
/// Number of aura effect slots per spell
pub const MAX_SPELL_EFFECTS: u64 = 32;
/// Number of item quality grades
pub const MAX_ITEM_QUALITY: u64 = 8;
/// Number of drunk states
pub const MAX_DRUNK_STATE: u64 = 4;

/// Raw predicate kind of a requirement row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaDataType {
    None,
    TargetCreature,
    TargetPlayerClassRace,
    TargetPlayerLessHealth,
    SourceAura,
    TargetAura,
    Value,
    TargetLevel,
    TargetGender,
    Script,
    MapPlayerCount,
    TargetTeam,
    SourceDrunk,
    Holiday,
    BattlegroundLossTeamScore,
    InstanceScript,
    SourceEquippedItem,
    MapId,
    SourcePlayerClassRace,
    SourceKnownTitle,
    GameEvent,
    SourceItemQuality,
    SourceLevel,
}

/// Static requirement row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaDataRow {
    pub criteria_id: CriteriaId,
    pub data_type: CriteriaDataType,
    #[serde(default)]
    pub value1: u64,
    #[serde(default)]
    pub value2: u64,
    #[serde(default)]
    pub script_name: Option<String>,
}

impl CriteriaDataRow {
    pub fn new(criteria_id: CriteriaId, data_type: CriteriaDataType, value1: u64, value2: u64) -> Self {
        Self {
            criteria_id,
            data_type,
            value1,
            value2,
            script_name: None,
        }
    }

    pub fn script(criteria_id: CriteriaId, name: impl Into<String>) -> Self {
        Self {
            criteria_id,
            data_type: CriteriaDataType::Script,
            value1: 0,
            value2: 0,
            script_name: Some(name.into()),
        }
    }
}

/// One requirement predicate with typed operands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaData {
    /// Always satisfied
    None,
    /// Context entity is a creature with this entry
    TargetCreature { entry: u32 },
    /// Context entity is a player of this class and race (0 = any)
    TargetPlayerClassRace { class: u8, race: u8 },
    /// Context entity is a player at or below this health percent
    TargetPlayerLessHealth { percent: u8 },
    SourceAura { spell_id: u32, effect_index: u8 },
    TargetAura { spell_id: u32, effect_index: u8 },
    /// Reported misc value 1 compared against `value`
    Value { value: u64, comparison: ComparisonOp },
    /// Context entity at or above this level
    TargetLevel { min_level: u8 },
    TargetGender { gender: Gender },
    /// Delegated to a named scripted check
    Script { name: String },
    /// At most this many players on the actor's map
    MapPlayerCount { max_count: u32 },
    /// Context entity is a player of this team
    TargetTeam { team: Team },
    /// Actor at or above this drunk state
    SourceDrunk { state: u8 },
    Holiday { holiday_id: u32 },
    /// Opposing team's final battleground score within `min..=max`
    BattlegroundLossTeamScore { min: u32, max: u32 },
    /// Delegated to the actor's instance script
    InstanceScript,
    SourceEquippedItem { min_item_level: u32, min_quality: u8 },
    MapId { map_id: u32 },
    SourcePlayerClassRace { class: u8, race: u8 },
    SourceKnownTitle { title_id: u32 },
    GameEvent { event_id: u32 },
    SourceItemQuality { quality: u8 },
    /// Actor at or above this level
    SourceLevel { min_level: u8 },
}

fn narrow<T: TryFrom<u64>>(row: &CriteriaDataRow, value: u64, what: &str) -> Result<T, DomainError> {
    T::try_from(value).map_err(|_| {
        DomainError::validation(format!(
            "criteria {} {:?}: {} {} out of range",
            row.criteria_id, row.data_type, what, value
        ))
    })
}

fn invalid(row: &CriteriaDataRow, msg: impl std::fmt::Display) -> DomainError {
    DomainError::validation(format!(
        "criteria {} {:?}: {}",
        row.criteria_id, row.data_type, msg
    ))
}

impl CriteriaData {
    /// Decodes and structurally validates a row for a criteria of `criteria_type`
    pub fn from_row(row: &CriteriaDataRow, criteria_type: CriteriaType) -> Result<Self, DomainError> {
        if row.data_type != CriteriaDataType::Script && !criteria_type.supports_requirement_data() {
            return Err(invalid(
                row,
                format!("not supported for criteria type {}", criteria_type),
            ));
        }

        let (v1, v2) = (row.value1, row.value2);
        let data = match row.data_type {
            CriteriaDataType::None => CriteriaData::None,
            CriteriaDataType::TargetCreature => {
                if v1 == 0 {
                    return Err(invalid(row, "creature entry must be set"));
                }
                CriteriaData::TargetCreature {
                    entry: narrow(row, v1, "creature entry")?,
                }
            }
            CriteriaDataType::TargetPlayerClassRace | CriteriaDataType::SourcePlayerClassRace => {
                if v1 == 0 && v2 == 0 {
                    return Err(invalid(row, "class and race are both unset"));
                }
                let class = narrow(row, v1, "class")?;
                let race = narrow(row, v2, "race")?;
                if row.data_type == CriteriaDataType::TargetPlayerClassRace {
                    CriteriaData::TargetPlayerClassRace { class, race }
                } else {
                    CriteriaData::SourcePlayerClassRace { class, race }
                }
            }
            CriteriaDataType::TargetPlayerLessHealth => {
                if v1 > 100 {
                    return Err(invalid(row, format!("health percent {} exceeds 100", v1)));
                }
                CriteriaData::TargetPlayerLessHealth {
                    percent: narrow(row, v1, "health percent")?,
                }
            }
            CriteriaDataType::SourceAura | CriteriaDataType::TargetAura => {
                if v1 == 0 {
                    return Err(invalid(row, "spell id must be set"));
                }
                if v2 >= MAX_SPELL_EFFECTS {
                    return Err(invalid(row, format!("effect index {} out of range", v2)));
                }
                let spell_id = narrow(row, v1, "spell id")?;
                let effect_index = narrow(row, v2, "effect index")?;
                if row.data_type == CriteriaDataType::SourceAura {
                    CriteriaData::SourceAura {
                        spell_id,
                        effect_index,
                    }
                } else {
                    CriteriaData::TargetAura {
                        spell_id,
                        effect_index,
                    }
                }
            }
            CriteriaDataType::Value => CriteriaData::Value {
                value: v1,
                comparison: ComparisonOp::from_code(narrow(row, v2, "comparison")?)
                    .map_err(|e| invalid(row, e))?,
            },
            CriteriaDataType::TargetLevel | CriteriaDataType::SourceLevel => {
                if v1 > MAX_LEVEL {
                    return Err(invalid(row, format!("level {} exceeds {}", v1, MAX_LEVEL)));
                }
                let min_level = narrow(row, v1, "level")?;
                if row.data_type == CriteriaDataType::TargetLevel {
                    CriteriaData::TargetLevel { min_level }
                } else {
                    CriteriaData::SourceLevel { min_level }
                }
            }
            CriteriaDataType::TargetGender => CriteriaData::TargetGender {
                gender: Gender::from_code(narrow(row, v1, "gender")?).map_err(|e| invalid(row, e))?,
            },
            CriteriaDataType::Script => match row.script_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => CriteriaData::Script {
                    name: name.to_string(),
                },
                _ => return Err(invalid(row, "script name must be set")),
            },
            CriteriaDataType::MapPlayerCount => CriteriaData::MapPlayerCount {
                max_count: narrow(row, v1, "player count")?,
            },
            CriteriaDataType::TargetTeam => CriteriaData::TargetTeam {
                team: Team::from_code(narrow(row, v1, "team")?).map_err(|e| invalid(row, e))?,
            },
            CriteriaDataType::SourceDrunk => {
                if v1 >= MAX_DRUNK_STATE {
                    return Err(invalid(row, format!("drunk state {} out of range", v1)));
                }
                CriteriaData::SourceDrunk {
                    state: narrow(row, v1, "drunk state")?,
                }
            }
            CriteriaDataType::Holiday => {
                if v1 == 0 {
                    return Err(invalid(row, "holiday id must be set"));
                }
                CriteriaData::Holiday {
                    holiday_id: narrow(row, v1, "holiday id")?,
                }
            }
            CriteriaDataType::BattlegroundLossTeamScore => {
                if v1 > v2 {
                    return Err(invalid(row, format!("score range {}..={} is empty", v1, v2)));
                }
                CriteriaData::BattlegroundLossTeamScore {
                    min: narrow(row, v1, "min score")?,
                    max: narrow(row, v2, "max score")?,
                }
            }
            CriteriaDataType::InstanceScript => CriteriaData::InstanceScript,
            CriteriaDataType::SourceEquippedItem => {
                if v2 >= MAX_ITEM_QUALITY {
                    return Err(invalid(row, format!("item quality {} out of range", v2)));
                }
                CriteriaData::SourceEquippedItem {
                    min_item_level: narrow(row, v1, "item level")?,
                    min_quality: narrow(row, v2, "item quality")?,
                }
            }
            CriteriaDataType::MapId => {
                if v1 == 0 {
                    return Err(invalid(row, "map id must be set"));
                }
                CriteriaData::MapId {
                    map_id: narrow(row, v1, "map id")?,
                }
            }
            CriteriaDataType::SourceKnownTitle => {
                if v1 == 0 {
                    return Err(invalid(row, "title id must be set"));
                }
                CriteriaData::SourceKnownTitle {
                    title_id: narrow(row, v1, "title id")?,
                }
            }
            CriteriaDataType::GameEvent => {
                if v1 == 0 {
                    return Err(invalid(row, "game event id must be set"));
                }
                CriteriaData::GameEvent {
                    event_id: narrow(row, v1, "game event id")?,
                }
            }
            CriteriaDataType::SourceItemQuality => {
                if v1 >= MAX_ITEM_QUALITY {
                    return Err(invalid(row, format!("item quality {} out of range", v1)));
                }
                CriteriaData::SourceItemQuality {
                    quality: narrow(row, v1, "item quality")?,
                }
            }
        };
        Ok(data)
    }

    /// Name of the scripted check this predicate needs bound, if any
    pub fn script_name(&self) -> Option<&str> {
        match self {
            CriteriaData::Script { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(data_type: CriteriaDataType, v1: u64, v2: u64) -> CriteriaDataRow {
        CriteriaDataRow::new(CriteriaId::new(7), data_type, v1, v2)
    }

    #[test]
    fn health_percent_is_bounded() {
        let ok = CriteriaData::from_row(
            &row(CriteriaDataType::TargetPlayerLessHealth, 35, 0),
            CriteriaType::KillCreature,
        );
        assert_eq!(ok, Ok(CriteriaData::TargetPlayerLessHealth { percent: 35 }));

        let err = CriteriaData::from_row(
            &row(CriteriaDataType::TargetPlayerLessHealth, 101, 0),
            CriteriaType::KillCreature,
        );
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn unsupported_type_rejects_all_but_script() {
        let err = CriteriaData::from_row(
            &row(CriteriaDataType::SourceLevel, 10, 0),
            CriteriaType::CompleteQuest,
        );
        assert!(err.is_err());

        let script = CriteriaData::from_row(
            &CriteriaDataRow::script(CriteriaId::new(7), "achievement_flawless"),
            CriteriaType::CompleteQuest,
        );
        assert_eq!(
            script,
            Ok(CriteriaData::Script {
                name: "achievement_flawless".to_string()
            })
        );
    }

    #[test]
    fn script_requires_name() {
        let mut r = row(CriteriaDataType::Script, 0, 0);
        r.script_name = Some("   ".to_string());
        assert!(CriteriaData::from_row(&r, CriteriaType::KillCreature).is_err());
    }

    #[test]
    fn value_decodes_comparison() {
        let data =
            CriteriaData::from_row(&row(CriteriaDataType::Value, 500, 1), CriteriaType::DamageDealt)
                .unwrap();
        assert_eq!(
            data,
            CriteriaData::Value {
                value: 500,
                comparison: ComparisonOp::Gt
            }
        );
        assert!(
            CriteriaData::from_row(&row(CriteriaDataType::Value, 500, 7), CriteriaType::DamageDealt)
                .is_err()
        );
    }

    #[test]
    fn structural_ranges() {
        let t = CriteriaType::KillCreature;
        assert!(CriteriaData::from_row(&row(CriteriaDataType::TargetAura, 100, 32), t).is_err());
        assert!(CriteriaData::from_row(&row(CriteriaDataType::TargetGender, 3, 0), t).is_err());
        assert!(CriteriaData::from_row(&row(CriteriaDataType::TargetTeam, 68, 0), t).is_err());
        assert!(CriteriaData::from_row(&row(CriteriaDataType::SourceDrunk, 4, 0), t).is_err());
        assert!(
            CriteriaData::from_row(&row(CriteriaDataType::BattlegroundLossTeamScore, 5, 4), t)
                .is_err()
        );
        assert!(CriteriaData::from_row(&row(CriteriaDataType::SourceItemQuality, 8, 0), t).is_err());
        assert!(CriteriaData::from_row(&row(CriteriaDataType::TargetLevel, 256, 0), t).is_err());
        assert!(
            CriteriaData::from_row(&row(CriteriaDataType::TargetPlayerClassRace, 0, 0), t).is_err()
        );
        assert_eq!(
            CriteriaData::from_row(&row(CriteriaDataType::SourceLevel, 10, 0), t),
            Ok(CriteriaData::SourceLevel { min_level: 10 })
        );
    }

    #[test]
    fn row_deserializes_with_defaults() {
        let r: CriteriaDataRow =
            serde_json::from_str(r#"{"criteria_id": 7, "data_type": "instance_script"}"#).unwrap();
        assert_eq!(r.value1, 0);
        assert_eq!(r.script_name, None);
    }
}
