//! Criteria trees - how criteria combine into a deliverable

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::criteria::zero_as_none;
use crate::ids::{CriteriaId, CriteriaTreeId};

/// Combination rule of a tree node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaTreeOperator {
    /// The node's own criteria reaches the required amount
    #[default]
    Complete,
    /// The node's own criteria has not reached the required amount
    NotComplete,
    /// Every child is complete
    All,
    /// At least one child is complete
    Any,
    /// Progress summed over the subtree reaches the amount
    Sum,
    /// Highest progress in the subtree reaches the amount
    Highest,
    /// At least `amount` children have any progress
    StartedAtLeast,
    /// At least `amount` children are complete
    CompleteAtLeast,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CriteriaTreeFlags: u32 {
        const PROGRESS_BAR  = 0x0001;
        const HORDE_ONLY    = 0x0002;
        const ALLIANCE_ONLY = 0x0004;
        /// Progress is shown as a whole-number counter
        const SHOW_COUNTER  = 0x0008;
    }
}

/// Static row of a criteria tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaTreeEntry {
    pub id: CriteriaTreeId,
    /// Parent node; absent for a root
    #[serde(default, deserialize_with = "zero_as_none")]
    pub parent: Option<CriteriaTreeId>,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub operator: CriteriaTreeOperator,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub criteria_id: Option<CriteriaId>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub flags: CriteriaTreeFlags,
}

impl CriteriaTreeEntry {
    pub fn root(id: CriteriaTreeId, operator: CriteriaTreeOperator) -> Self {
        Self {
            id,
            parent: None,
            amount: 0,
            operator,
            criteria_id: None,
            order_index: 0,
            flags: CriteriaTreeFlags::empty(),
        }
    }

    /// A `Complete` leaf referencing `criteria`
    pub fn leaf(id: CriteriaTreeId, parent: CriteriaTreeId, criteria: CriteriaId) -> Self {
        Self {
            id,
            parent: Some(parent),
            amount: 0,
            operator: CriteriaTreeOperator::Complete,
            criteria_id: Some(criteria),
            order_index: 0,
            flags: CriteriaTreeFlags::empty(),
        }
    }

    pub fn with_parent(mut self, parent: CriteriaTreeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_criteria(mut self, criteria: CriteriaId) -> Self {
        self.criteria_id = Some(criteria);
        self
    }

    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_order(mut self, order_index: i32) -> Self {
        self.order_index = order_index;
        self
    }
}
