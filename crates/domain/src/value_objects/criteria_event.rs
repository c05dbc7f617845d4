//! A game event reported to a tracker

use serde::{Deserialize, Serialize};

use super::criteria_type::CriteriaType;
use super::snapshot::{ItemSnapshot, ParticipantSnapshot, WorldObjectSnapshot};

/// One reported occurrence of a criteria-relevant event.
///
/// The meaning of the misc values depends on `criteria_type` (see
/// [`CriteriaType`]); unused values are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaEvent {
    pub criteria_type: CriteriaType,
    #[serde(default)]
    pub misc_value1: u64,
    #[serde(default)]
    pub misc_value2: u64,
    #[serde(default)]
    pub misc_value3: u64,
    /// Participant whose action produced the event
    #[serde(default)]
    pub actor: Option<ParticipantSnapshot>,
    /// Context entity (kill target, spell target, ...)
    #[serde(default)]
    pub target: Option<WorldObjectSnapshot>,
    #[serde(default)]
    pub item: Option<ItemSnapshot>,
}

impl CriteriaEvent {
    pub fn new(criteria_type: CriteriaType) -> Self {
        Self {
            criteria_type,
            misc_value1: 0,
            misc_value2: 0,
            misc_value3: 0,
            actor: None,
            target: None,
            item: None,
        }
    }

    pub fn with_misc(mut self, misc_value1: u64, misc_value2: u64) -> Self {
        self.misc_value1 = misc_value1;
        self.misc_value2 = misc_value2;
        self
    }

    pub fn with_misc3(mut self, misc_value3: u64) -> Self {
        self.misc_value3 = misc_value3;
        self
    }

    pub fn by(mut self, actor: ParticipantSnapshot) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn on(mut self, target: WorldObjectSnapshot) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_item(mut self, item: ItemSnapshot) -> Self {
        self.item = Some(item);
        self
    }

    /// Amount this event contributes, per the type's progress rule
    pub fn progress_amount(&self) -> u64 {
        let (source, _) = self.criteria_type.progress_rule();
        source.pick(self.misc_value1, self.misc_value2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_follows_type_rule() {
        let kill = CriteriaEvent::new(CriteriaType::KillCreature).with_misc(100, 2);
        assert_eq!(kill.progress_amount(), 2);

        let level = CriteriaEvent::new(CriteriaType::ReachLevel).with_misc(80, 0);
        assert_eq!(level.progress_amount(), 80);

        let quest = CriteriaEvent::new(CriteriaType::CompleteQuest).with_misc(1234, 0);
        assert_eq!(quest.progress_amount(), 1);
    }
}
