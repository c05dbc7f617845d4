//! End-to-end tests over the shipped static dataset.
//!
//! Every test loads `test_data/criteria/*.json` through the production
//! loader, builds a registry and drives real handlers with reported events.
//!
//! # Running
//!
//! ```bash
//! cargo test -p criteria-engine --lib e2e_tests
//! ```
//!
//! # Dataset
//!
//! | Achievement | Criteria | Goal |
//! |---|---|---|
//! | 1 | 1 | kill creature 100 five times |
//! | 2 | 2 | kill creature 200 at level 10 or above |
//! | 3 | 3 | kill creature 300 three times within 30s of script event 42 |
//! | 4 | 4 | earn achievement 1 |
//! | 5 | 5 | reach 20 achievement points |
//! | 6 | 6 | skill line 171 at 300 |
//! | 7 | 7 or 8 | kill creature 400 or 500 (horde only) |
//! | 9 | 9 | deal 5000 damage at level 20 or above |
//! | 10 | 10 | guild: kill creature 600 ten times |
//! | 14 | 14 | statistic: creature 100 kills |
//!
//! Scenario 1 runs step 1 (criteria 11, creature 700 twice) then step 2
//! (criteria 12, creature 800). Quest 1000 has objective 1 (criteria 13,
//! creature 900 four times).


use std::sync::Arc;

use criteria_domain::{AccountId, CriteriaEvent, CriteriaType, ParticipantId, Team};

use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::ports::{CriteriaNotifier, NoScripts};
use crate::infrastructure::static_data::StaticDataSet;
use crate::owners::{ParticipantAchievementHandler, ParticipantAchievements};
use crate::registry::CriteriaRegistry;
use crate::test_fixtures::{fixture_time, test_data_dir, RecordingNotifier};
use crate::tracker::{CriteriaHandler, CriteriaServices};

/// Registry over the test dataset plus the collaborators tests inspect
pub struct E2EContext {
    pub registry: Arc<CriteriaRegistry>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

impl E2EContext {
    pub fn setup() -> Self {
        let data = StaticDataSet::load_dir(&test_data_dir()).expect("test dataset should load");
        Self {
            registry: Arc::new(CriteriaRegistry::build(data, &NoScripts)),
            notifier: Arc::new(RecordingNotifier::default()),
            clock: Arc::new(ManualClock::new(fixture_time())),
        }
    }

    pub fn services(&self) -> CriteriaServices {
        self.services_with(self.notifier.clone())
    }

    pub fn services_with(&self, notifier: Arc<dyn CriteriaNotifier>) -> CriteriaServices {
        CriteriaServices::new(self.registry.clone(), notifier).with_clock(self.clock.clone())
    }

    /// Achievement handler of a fresh participant on `team`
    pub fn participant(&self, team: Team) -> ParticipantAchievementHandler {
        let owner = ParticipantAchievements::new(ParticipantId::new(), AccountId::new(), team);
        CriteriaHandler::new(owner, self.services())
    }
}

pub fn damage_event(actor_level: u8, amount: u64) -> CriteriaEvent {
    CriteriaEvent::new(CriteriaType::DamageDealt)
        .with_misc(amount, 0)
        .by(crate::test_fixtures::participant(actor_level))
}

pub fn skill_event(skill_line: u64, value: u64) -> CriteriaEvent {
    CriteriaEvent::new(CriteriaType::ReachSkillLevel).with_misc(skill_line, value)
}
