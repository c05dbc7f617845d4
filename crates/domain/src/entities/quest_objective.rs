use serde::{Deserialize, Serialize};

use crate::ids::{CriteriaTreeId, QuestId, QuestObjectiveId};

/// A quest objective driven by a criteria tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjectiveEntry {
    pub id: QuestObjectiveId,
    pub quest_id: QuestId,
    pub criteria_tree_id: CriteriaTreeId,
    #[serde(default)]
    pub amount: u64,
}

impl QuestObjectiveEntry {
    pub fn new(id: QuestObjectiveId, quest_id: QuestId, criteria_tree_id: CriteriaTreeId) -> Self {
        Self {
            id,
            quest_id,
            criteria_tree_id,
            amount: 1,
        }
    }
}
