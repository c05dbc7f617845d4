use serde::{Deserialize, Serialize};

use crate::ids::{CriteriaTreeId, ScenarioId, ScenarioStepId};

/// One stage of a staged encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStepEntry {
    pub id: ScenarioStepId,
    pub scenario_id: ScenarioId,
    pub criteria_tree_id: CriteriaTreeId,
    #[serde(default)]
    pub order_index: u32,
    /// Optional side objective; never blocks advancement
    #[serde(default)]
    pub is_bonus: bool,
}

impl ScenarioStepEntry {
    pub fn new(
        id: ScenarioStepId,
        scenario_id: ScenarioId,
        criteria_tree_id: CriteriaTreeId,
        order_index: u32,
    ) -> Self {
        Self {
            id,
            scenario_id,
            criteria_tree_id,
            order_index,
            is_bonus: false,
        }
    }

    pub fn bonus(mut self) -> Self {
        self.is_bonus = true;
        self
    }
}
