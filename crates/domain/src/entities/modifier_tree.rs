//! Modifier trees - boolean expressions gating an event's values
//!
//! A modifier tree is stored as flat rows linked by `parent`. Each node
//! carries an operator combining its children and, optionally, one typed
//! condition of its own. Rows are decoded into [`ModifierCondition`] once at
//! load time so evaluation never deals with raw operands.

use serde::{Deserialize, Serialize};

use super::criteria::zero_as_none;
use crate::error::DomainError;
use crate::ids::ModifierTreeId;
use crate::value_objects::{ComparisonOp, Team};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierTreeOperator {
    /// The node's condition holds
    #[default]
    SingleTrue,
    /// The node's condition does not hold
    SingleFalse,
    /// Every child holds
    All,
    /// At least `max(amount, 1)` children hold
    Some,
}

/// Raw condition kind of a modifier row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    #[default]
    None,
    MiscValue1,
    MiscValue2,
    ActorLevel,
    TargetLevel,
    ActorHealthPct,
    TargetHealthPct,
    MapPlayerCount,
    ActorClassMask,
    ActorRaceMask,
    TargetCreatureEntry,
    TargetCreatureType,
    TargetIsPlayer,
    ActorMap,
    ActorZone,
    ActorAura,
    TargetAura,
    ActorTeam,
    ActorKnownTitle,
    HolidayActive,
    GameEventActive,
}

/// Static row of a modifier tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierTreeEntry {
    pub id: ModifierTreeId,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub parent: Option<ModifierTreeId>,
    #[serde(default)]
    pub operator: ModifierTreeOperator,
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub kind: ModifierKind,
    #[serde(default)]
    pub asset: u64,
    /// Comparison operator code for comparison kinds (see [`ComparisonOp::from_code`])
    #[serde(default)]
    pub secondary_asset: u32,
}

impl ModifierTreeEntry {
    pub fn new(id: ModifierTreeId, operator: ModifierTreeOperator) -> Self {
        Self {
            id,
            parent: None,
            operator,
            amount: 0,
            kind: ModifierKind::None,
            asset: 0,
            secondary_asset: 0,
        }
    }

    pub fn with_parent(mut self, parent: ModifierTreeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_condition(mut self, kind: ModifierKind, asset: u64, secondary_asset: u32) -> Self {
        self.kind = kind;
        self.asset = asset;
        self.secondary_asset = secondary_asset;
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }
}

/// A modifier node's own condition, with typed operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierCondition {
    Always,
    MiscValue1 { value: u64, op: ComparisonOp },
    MiscValue2 { value: u64, op: ComparisonOp },
    ActorLevel { value: u64, op: ComparisonOp },
    TargetLevel { value: u64, op: ComparisonOp },
    ActorHealthPct { value: u64, op: ComparisonOp },
    TargetHealthPct { value: u64, op: ComparisonOp },
    MapPlayerCount { value: u64, op: ComparisonOp },
    /// Bit `class - 1` set
    ActorClassIn { mask: u64 },
    /// Bit `race - 1` set
    ActorRaceIn { mask: u64 },
    TargetCreatureEntry(u32),
    TargetCreatureType(u32),
    TargetIsPlayer,
    ActorMap(u32),
    ActorZone(u32),
    ActorAura(u32),
    TargetAura(u32),
    ActorTeam(Team),
    ActorKnownTitle(u32),
    HolidayActive(u32),
    GameEventActive(u32),
}

impl ModifierCondition {
    pub fn from_entry(entry: &ModifierTreeEntry) -> Result<Self, DomainError> {
        let value = entry.asset;
        let small = || {
            u32::try_from(value).map_err(|_| {
                DomainError::validation(format!(
                    "modifier {} asset {} out of range for {:?}",
                    entry.id, value, entry.kind
                ))
            })
        };
        let op = || ComparisonOp::from_code(entry.secondary_asset);

        let condition = match entry.kind {
            ModifierKind::None => ModifierCondition::Always,
            ModifierKind::MiscValue1 => ModifierCondition::MiscValue1 { value, op: op()? },
            ModifierKind::MiscValue2 => ModifierCondition::MiscValue2 { value, op: op()? },
            ModifierKind::ActorLevel => ModifierCondition::ActorLevel { value, op: op()? },
            ModifierKind::TargetLevel => ModifierCondition::TargetLevel { value, op: op()? },
            ModifierKind::ActorHealthPct | ModifierKind::TargetHealthPct => {
                if value > 100 {
                    return Err(DomainError::validation(format!(
                        "modifier {} health percent {} exceeds 100",
                        entry.id, value
                    )));
                }
                if entry.kind == ModifierKind::ActorHealthPct {
                    ModifierCondition::ActorHealthPct { value, op: op()? }
                } else {
                    ModifierCondition::TargetHealthPct { value, op: op()? }
                }
            }
            ModifierKind::MapPlayerCount => ModifierCondition::MapPlayerCount { value, op: op()? },
            ModifierKind::ActorClassMask => ModifierCondition::ActorClassIn { mask: value },
            ModifierKind::ActorRaceMask => ModifierCondition::ActorRaceIn { mask: value },
            ModifierKind::TargetCreatureEntry => ModifierCondition::TargetCreatureEntry(small()?),
            ModifierKind::TargetCreatureType => ModifierCondition::TargetCreatureType(small()?),
            ModifierKind::TargetIsPlayer => ModifierCondition::TargetIsPlayer,
            ModifierKind::ActorMap => ModifierCondition::ActorMap(small()?),
            ModifierKind::ActorZone => ModifierCondition::ActorZone(small()?),
            ModifierKind::ActorAura => ModifierCondition::ActorAura(small()?),
            ModifierKind::TargetAura => ModifierCondition::TargetAura(small()?),
            ModifierKind::ActorTeam => ModifierCondition::ActorTeam(Team::from_code(small()?)?),
            ModifierKind::ActorKnownTitle => ModifierCondition::ActorKnownTitle(small()?),
            ModifierKind::HolidayActive => ModifierCondition::HolidayActive(small()?),
            ModifierKind::GameEventActive => ModifierCondition::GameEventActive(small()?),
        };
        Ok(condition)
    }
}
