//! Evaluation of a reported event against static criteria definitions.
//!
//! Everything here is a pure function of its inputs: the registry, the
//! event (with its participant and context snapshots) and the read-only
//! ports. None of it touches tracker state except [`trees`], which reads
//! (never writes) a tracker's progress map.

pub mod conditions;
pub mod modifiers;
pub mod requirements;
pub mod trees;

use criteria_domain::{CriteriaEvent, ParticipantSnapshot, WorldObjectSnapshot};

use crate::infrastructure::ports::{InstanceScriptPort, ScriptCheckPort, WorldStatePort};

/// Everything a predicate may look at while judging one event
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub event: &'a CriteriaEvent,
    pub scripts: &'a dyn ScriptCheckPort,
    pub instance_scripts: &'a dyn InstanceScriptPort,
    pub world: &'a dyn WorldStatePort,
}

impl<'a> EvaluationContext<'a> {
    pub fn actor(&self) -> Option<&'a ParticipantSnapshot> {
        self.event.actor.as_ref()
    }

    pub fn target(&self) -> Option<&'a WorldObjectSnapshot> {
        self.event.target.as_ref()
    }

    pub fn misc_value1(&self) -> u64 {
        self.event.misc_value1
    }

    pub fn misc_value2(&self) -> u64 {
        self.event.misc_value2
    }
}
