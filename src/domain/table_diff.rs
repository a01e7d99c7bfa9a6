use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::row::Attributes;
use crate::domain::schema::{Field, Index, Table, Trigger};

/// A single attribute difference. `new` is the baseline (expected) value,
/// `old` is what the live database currently has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub new: Value,
    pub old: Value,
}

/// Attribute name → change.
pub type AttributeChanges = IndexMap<String, ValueChange>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldChanges {
    pub add: Vec<Field>,
    pub change: IndexMap<String, AttributeChanges>,
    pub remove: Vec<String>,
}

/// Something the live side is missing, relative to the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexAddition {
    /// The whole index is missing.
    Index(Index),
    /// One key part is missing from an index that exists on both sides:
    /// the flattened column spec (`order` plus column attributes).
    Column(Attributes),
}

/// Something the live side has that the baseline does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexRemoval {
    /// The whole index, by name.
    Index(String),
    /// One key part of an index that exists on both sides.
    Column { index: String, column: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexChanges {
    pub add: Vec<IndexAddition>,
    /// Index name → attribute → change. When several key parts of the same
    /// index change the same attribute, the last one wins.
    pub change: IndexMap<String, AttributeChanges>,
    pub remove: Vec<IndexRemoval>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerChanges {
    pub add: Vec<Trigger>,
    pub remove: Vec<String>,
}

/// The two raw table records a diff was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAudit {
    pub baseline: Table,
    pub current: Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    pub config: AttributeChanges,
    pub fields: FieldChanges,
    pub index: IndexChanges,
    pub triggers: TriggerChanges,
    pub data: TableAudit,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.change.is_empty() && self.remove.is_empty()
    }
}

impl IndexChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.change.is_empty() && self.remove.is_empty()
    }
}

impl TriggerChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl TableDiff {
    pub fn new(baseline: &Table, current: &Table) -> Self {
        TableDiff {
            config: AttributeChanges::new(),
            fields: FieldChanges::default(),
            index: IndexChanges::default(),
            triggers: TriggerChanges::default(),
            data: TableAudit {
                baseline: baseline.clone(),
                current: current.clone(),
            },
        }
    }

    /// `true` when nothing differs. Empty diffs are not recorded in a
    /// comparison result.
    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
            && self.fields.is_empty()
            && self.index.is_empty()
            && self.triggers.is_empty()
    }

    /// Number of individual entries across all groups.
    pub fn change_count(&self) -> usize {
        self.config.len()
            + self.fields.add.len()
            + self.fields.change.len()
            + self.fields.remove.len()
            + self.index.add.len()
            + self.index.change.len()
            + self.index.remove.len()
            + self.triggers.add.len()
            + self.triggers.remove.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_entries_serialize_untagged() {
        let removals = vec![
            IndexRemoval::Index("idx_old".into()),
            IndexRemoval::Column {
                index: "idx_email".into(),
                column: "tenant_id".into(),
            },
        ];
        assert_eq!(
            serde_json::to_value(&removals).unwrap(),
            json!(["idx_old", {"index": "idx_email", "column": "tenant_id"}])
        );

        let back: Vec<IndexRemoval> =
            serde_json::from_value(json!(["idx_old", {"index": "i", "column": "c"}])).unwrap();
        assert_eq!(back[0], IndexRemoval::Index("idx_old".into()));
    }

    #[test]
    fn value_change_serializes_new_then_old() {
        let c = ValueChange {
            new: json!(0),
            old: json!(1),
        };
        assert_eq!(serde_json::to_string(&c).unwrap(), r#"{"new":0,"old":1}"#);
    }
}
