//! Per-owner progress on one criteria

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CriteriaId, ParticipantId};

/// Mutable progress of one owner on one criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaProgress {
    pub counter: u64,
    /// Last time the counter changed
    pub date: DateTime<Utc>,
    /// Participant whose event last changed the counter
    pub player: Option<ParticipantId>,
    /// Changed since the last save
    pub changed: bool,
}

impl CriteriaProgress {
    pub fn new(counter: u64, date: DateTime<Utc>, player: Option<ParticipantId>) -> Self {
        Self {
            counter,
            date,
            player,
            changed: true,
        }
    }
}

/// Persisted form of a progress record, as exchanged with storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaProgressRow {
    pub criteria_id: CriteriaId,
    pub counter: u64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub player: Option<ParticipantId>,
}

impl CriteriaProgressRow {
    pub fn from_progress(criteria_id: CriteriaId, progress: &CriteriaProgress) -> Self {
        Self {
            criteria_id,
            counter: progress.counter,
            date: progress.date,
            player: progress.player,
        }
    }

    /// Hydrated record, not marked as changed
    pub fn into_progress(self) -> (CriteriaId, CriteriaProgress) {
        (
            self.criteria_id,
            CriteriaProgress {
                counter: self.counter,
                date: self.date,
                player: self.player,
                changed: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_rows_are_clean() {
        let now = Utc::now();
        let row = CriteriaProgressRow {
            criteria_id: CriteriaId::new(4),
            counter: 3,
            date: now,
            player: None,
        };
        let (id, progress) = row.into_progress();
        assert_eq!(id, CriteriaId::new(4));
        assert!(!progress.changed);
        assert_eq!(progress.counter, 3);
        assert!(CriteriaProgress::new(1, now, None).changed);
    }
}
