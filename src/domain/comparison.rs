use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::schema::Table;
use crate::domain::table_diff::TableDiff;

/// Outcome of comparing a baseline snapshot against a live schema.
///
/// Serializes to the persisted comparison document:
/// `{"creation", "master": {"name", "diff", "add", "remove"}, "stats": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub creation: String,
    #[serde(rename = "master")]
    pub target: TargetDiff,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDiff {
    /// Schema name of the live database.
    pub name: String,
    /// Tables present on both sides that differ, in baseline order.
    pub diff: IndexMap<String, TableDiff>,
    /// Baseline tables missing from the live database.
    pub add: Vec<Table>,
    /// Live tables missing from the baseline.
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub tables: TableStats,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableStats {
    pub checked: usize,
    pub changes: usize,
}

impl ComparisonResult {
    /// An empty result stamped with the current local time.
    pub fn new(target_schema: &str) -> Self {
        ComparisonResult {
            creation: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            target: TargetDiff {
                name: target_schema.to_string(),
                diff: IndexMap::new(),
                add: Vec::new(),
                remove: Vec::new(),
            },
            stats: Stats::default(),
        }
    }

    /// `true` when the live schema matches the baseline.
    pub fn is_clean(&self) -> bool {
        self.target.diff.is_empty() && self.target.add.is_empty() && self.target.remove.is_empty()
    }
}
