//! Owner kinds - the category of entity progress is tracked for

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of owner kinds a criteria or tree applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct OwnerKinds: u32 {
        const PLAYER          = 0x01;
        const ACCOUNT         = 0x02;
        const GUILD           = 0x04;
        const SCENARIO        = 0x08;
        const QUEST_OBJECTIVE = 0x10;
    }
}

/// A single owner kind, as implemented by one tracker type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Player,
    Account,
    Guild,
    Scenario,
    QuestObjective,
}

impl OwnerKind {
    pub fn flag(self) -> OwnerKinds {
        match self {
            OwnerKind::Player => OwnerKinds::PLAYER,
            OwnerKind::Account => OwnerKinds::ACCOUNT,
            OwnerKind::Guild => OwnerKinds::GUILD,
            OwnerKind::Scenario => OwnerKinds::SCENARIO,
            OwnerKind::QuestObjective => OwnerKinds::QUEST_OBJECTIVE,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKind::Player => write!(f, "player"),
            OwnerKind::Account => write!(f, "account"),
            OwnerKind::Guild => write!(f, "guild"),
            OwnerKind::Scenario => write!(f, "scenario"),
            OwnerKind::QuestObjective => write!(f, "quest_objective"),
        }
    }
}
