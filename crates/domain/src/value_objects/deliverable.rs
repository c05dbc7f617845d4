use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AchievementId, QuestObjectiveId, ScenarioStepId};
use crate::value_objects::OwnerKind;

/// What completing a root criteria tree delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Deliverable {
    Achievement(AchievementId),
    ScenarioStep(ScenarioStepId),
    QuestObjective(QuestObjectiveId),
}

impl Deliverable {
    /// Owner kind for deliverables whose kind does not depend on row flags
    pub fn fixed_owner_kind(&self) -> Option<OwnerKind> {
        match self {
            Deliverable::Achievement(_) => None,
            Deliverable::ScenarioStep(_) => Some(OwnerKind::Scenario),
            Deliverable::QuestObjective(_) => Some(OwnerKind::QuestObjective),
        }
    }
}

impl fmt::Display for Deliverable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deliverable::Achievement(id) => write!(f, "achievement {}", id),
            Deliverable::ScenarioStep(id) => write!(f, "scenario step {}", id),
            Deliverable::QuestObjective(id) => write!(f, "quest objective {}", id),
        }
    }
}
