//! Criteria - a single trackable unit of progress

use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CriteriaId, ModifierTreeId};
use crate::value_objects::{CriteriaFailEvent, CriteriaStartEvent, CriteriaType};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CriteriaFlags: u32 {
        /// A start event restarts the timer of an already started criteria
        const RESET_ON_START = 0x01;
        /// Progress is shown to the client as a progress bar
        const PROGRESS_BAR   = 0x02;
        /// Criteria is not announced to the client
        const HIDDEN         = 0x04;
    }
}

/// Static definition row of a criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaEntry {
    pub id: CriteriaId,
    #[serde(rename = "type")]
    pub criteria_type: CriteriaType,
    /// Required asset (creature entry, quest id, ...), meaning depends on the type
    #[serde(default)]
    pub asset: u64,
    /// Required count when the referencing tree node does not set its own
    #[serde(default)]
    pub amount: u64,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub modifier_tree_id: Option<ModifierTreeId>,
    #[serde(default)]
    pub start_event: Option<CriteriaStartEvent>,
    #[serde(default)]
    pub start_asset: u64,
    /// Timer budget in seconds; 0 = untimed
    #[serde(default)]
    pub start_timer: u32,
    #[serde(default)]
    pub fail_event: Option<CriteriaFailEvent>,
    #[serde(default)]
    pub fail_asset: u64,
    #[serde(default)]
    pub flags: CriteriaFlags,
}

impl CriteriaEntry {
    pub fn new(id: CriteriaId, criteria_type: CriteriaType, asset: u64) -> Self {
        Self {
            id,
            criteria_type,
            asset,
            amount: 0,
            modifier_tree_id: None,
            start_event: None,
            start_asset: 0,
            start_timer: 0,
            fail_event: None,
            fail_asset: 0,
            flags: CriteriaFlags::empty(),
        }
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_modifier_tree(mut self, tree: ModifierTreeId) -> Self {
        self.modifier_tree_id = Some(tree);
        self
    }

    pub fn with_timer(mut self, event: CriteriaStartEvent, asset: u64, seconds: u32) -> Self {
        self.start_event = Some(event);
        self.start_asset = asset;
        self.start_timer = seconds;
        self
    }

    pub fn with_fail_event(mut self, event: CriteriaFailEvent, asset: u64) -> Self {
        self.fail_event = Some(event);
        self.fail_asset = asset;
        self
    }

    pub fn with_flags(mut self, flags: CriteriaFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Timer budget, if the criteria is timed
    pub fn time_limit(&self) -> Option<Duration> {
        (self.start_timer > 0).then(|| Duration::from_secs(u64::from(self.start_timer)))
    }

    pub fn is_timed(&self) -> bool {
        self.start_timer > 0
    }

    /// Structural checks independent of other rows
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.start_timer > 0 && self.start_event.is_none() {
            return Err(DomainError::validation(format!(
                "criteria {} has a start timer but no start event",
                self.id
            )));
        }
        Ok(())
    }
}

pub(crate) fn zero_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: From<u32>,
{
    let raw: Option<u32> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| *value != 0).map(T::from))
}
