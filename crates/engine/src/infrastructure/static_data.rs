//! Static dataset loading from a directory of JSON tables.
//!
//! Each table is one file holding a JSON array of row objects. A missing
//! file is an empty table. Rows are decoded one at a time so a single bad
//! row is logged and dropped instead of failing the whole table.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use criteria_domain::{
    AchievementEntry, CriteriaDataRow, CriteriaEntry, CriteriaTreeEntry, ModifierTreeEntry,
    QuestObjectiveEntry, ScenarioStepEntry,
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON array of rows")]
    NotAnArray { path: PathBuf },
}

/// The tables making up the static dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticTable {
    Criteria,
    CriteriaTrees,
    ModifierTrees,
    CriteriaData,
    Achievements,
    ScenarioSteps,
    QuestObjectives,
}

impl StaticTable {
    pub const ALL: [StaticTable; 7] = [
        StaticTable::Criteria,
        StaticTable::CriteriaTrees,
        StaticTable::ModifierTrees,
        StaticTable::CriteriaData,
        StaticTable::Achievements,
        StaticTable::ScenarioSteps,
        StaticTable::QuestObjectives,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            StaticTable::Criteria => "criteria.json",
            StaticTable::CriteriaTrees => "criteria_trees.json",
            StaticTable::ModifierTrees => "modifier_trees.json",
            StaticTable::CriteriaData => "criteria_data.json",
            StaticTable::Achievements => "achievements.json",
            StaticTable::ScenarioSteps => "scenario_steps.json",
            StaticTable::QuestObjectives => "quest_objectives.json",
        }
    }
}

impl fmt::Display for StaticTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.file_name();
        f.write_str(name.trim_end_matches(".json"))
    }
}

/// Raw rows of every table, before cross-reference resolution
#[derive(Debug, Clone, Default)]
pub struct StaticDataSet {
    pub criteria: Vec<CriteriaEntry>,
    pub criteria_trees: Vec<CriteriaTreeEntry>,
    pub modifier_trees: Vec<ModifierTreeEntry>,
    pub criteria_data: Vec<CriteriaDataRow>,
    pub achievements: Vec<AchievementEntry>,
    pub scenario_steps: Vec<ScenarioStepEntry>,
    pub quest_objectives: Vec<QuestObjectiveEntry>,
    /// Rows dropped because they did not decode, per table
    pub undecodable: BTreeMap<StaticTable, usize>,
}

impl StaticDataSet {
    /// Reads every table from `dir`
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        let mut undecodable = BTreeMap::new();
        let set = Self {
            criteria: read_table(dir, StaticTable::Criteria, &mut undecodable)?,
            criteria_trees: read_table(dir, StaticTable::CriteriaTrees, &mut undecodable)?,
            modifier_trees: read_table(dir, StaticTable::ModifierTrees, &mut undecodable)?,
            criteria_data: read_table(dir, StaticTable::CriteriaData, &mut undecodable)?,
            achievements: read_table(dir, StaticTable::Achievements, &mut undecodable)?,
            scenario_steps: read_table(dir, StaticTable::ScenarioSteps, &mut undecodable)?,
            quest_objectives: read_table(dir, StaticTable::QuestObjectives, &mut undecodable)?,
            undecodable: BTreeMap::new(),
        };
        Ok(Self {
            undecodable,
            ..set
        })
    }
}

fn read_table<T: DeserializeOwned>(
    dir: &Path,
    table: StaticTable,
    undecodable: &mut BTreeMap<StaticTable, usize>,
) -> Result<Vec<T>, LoadError> {
    let path = dir.join(table.file_name());
    if !path.exists() {
        tracing::debug!(table = %table, path = %path.display(), "Static table missing, treating as empty");
        return Ok(Vec::new());
    }

    let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: path.clone(),
            source,
        })?;
    let serde_json::Value::Array(rows) = document else {
        return Err(LoadError::NotAnArray { path });
    };

    let mut decoded = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(row) {
            Ok(row) => decoded.push(row),
            Err(e) => {
                tracing::warn!(table = %table, index, error = %e, "Dropping undecodable static row");
                *undecodable.entry(table).or_insert(0) += 1;
            }
        }
    }

    tracing::debug!(table = %table, rows = decoded.len(), "Static table read");
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, table: StaticTable, body: &str) {
        std::fs::write(dir.path().join(table.file_name()), body).unwrap();
    }

    #[test]
    fn missing_files_are_empty_tables() {
        let dir = TempDir::new().unwrap();
        let set = StaticDataSet::load_dir(dir.path()).unwrap();
        assert!(set.criteria.is_empty());
        assert!(set.achievements.is_empty());
        assert!(set.undecodable.is_empty());
    }

    #[test]
    fn bad_rows_are_dropped_and_counted() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            StaticTable::Criteria,
            r#"[
                {"id": 1, "type": "kill_creature", "asset": 100, "amount": 5},
                {"id": 2, "type": "no_such_type"},
                {"type": "reach_level"}
            ]"#,
        );
        let set = StaticDataSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.criteria.len(), 1);
        assert_eq!(set.undecodable.get(&StaticTable::Criteria), Some(&2));
    }

    #[test]
    fn non_array_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, StaticTable::Achievements, r#"{"id": 1}"#);
        let err = StaticDataSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray { .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, StaticTable::CriteriaTrees, "[{");
        let err = StaticDataSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains("criteria_trees.json"));
    }

    #[test]
    fn table_display_names() {
        assert_eq!(StaticTable::QuestObjectives.to_string(), "quest_objectives");
    }
}
