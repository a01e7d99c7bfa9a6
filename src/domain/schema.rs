use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::row::{take_string, take_u64, take_value, Attributes, RowMap};

// ─── Field ────────────────────────────────────────────────────────────────────

/// One column of a table, as reported by `DESCRIBE`.
///
/// The well-known `DESCRIBE` columns are typed; anything else the server
/// returns is kept verbatim in `other` so newer server versions do not lose
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub extra: String,
    #[serde(flatten)]
    pub other: Attributes,
}

impl Field {
    /// Build a field from a key-normalized `DESCRIBE` row.
    pub fn from_row(mut row: RowMap) -> Result<Self> {
        let name = take_string(&mut row, "field")
            .ok_or_else(|| anyhow!("DESCRIBE row has no `field` column"))?;
        let nullable = take_string(&mut row, "null")
            .map(|s| s.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);

        Ok(Field {
            name,
            column_type: take_string(&mut row, "type").unwrap_or_default(),
            nullable,
            key: take_string(&mut row, "key").unwrap_or_default(),
            default: take_value(&mut row, "default"),
            extra: take_string(&mut row, "extra").unwrap_or_default(),
            other: row,
        })
    }

    /// Every attribute of the field, in a stable order, as compared by the differ.
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::with_capacity(6 + self.other.len());
        attrs.insert("name".into(), json!(self.name));
        attrs.insert("type".into(), json!(self.column_type));
        attrs.insert("nullable".into(), json!(self.nullable));
        attrs.insert("key".into(), json!(self.key));
        attrs.insert("default".into(), self.default.clone());
        attrs.insert("extra".into(), json!(self.extra));
        for (k, v) in &self.other {
            attrs.insert(k.clone(), v.clone());
        }
        attrs
    }
}

// ─── Index ────────────────────────────────────────────────────────────────────

/// One key part of an index, as reported by `SHOW INDEXES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub index_name: String,
    pub column_name: String,
    /// 1-based position within the index.
    pub seq_in_index: u64,
    #[serde(default)]
    pub non_unique: bool,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub cardinality: Value,
    #[serde(default)]
    pub index_type: String,
    #[serde(flatten)]
    pub other: Attributes,
}

impl IndexColumn {
    /// Build an index column from a key-normalized `SHOW INDEXES` row.
    ///
    /// Functional key parts (MySQL 8) have a null `column_name`; their
    /// `expression` text is used as the column identity instead.
    pub fn from_row(mut row: RowMap) -> Result<Self> {
        let index_name = take_string(&mut row, "key_name")
            .ok_or_else(|| anyhow!("SHOW INDEXES row has no `key_name` column"))?;
        let column_name = match take_string(&mut row, "column_name") {
            Some(name) => name,
            None => row
                .get("expression")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    anyhow!("index `{index_name}` has a key part with neither column nor expression")
                })?,
        };
        let seq_in_index = take_u64(&mut row, "seq_in_index")
            .ok_or_else(|| anyhow!("index `{index_name}` has a key part without `seq_in_index`"))?;
        let non_unique = match take_value(&mut row, "non_unique") {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_u64() == Some(1),
            Value::String(s) => s.trim() == "1",
            _ => false,
        };

        Ok(IndexColumn {
            index_name,
            column_name,
            seq_in_index,
            non_unique,
            collation: take_string(&mut row, "collation"),
            cardinality: take_value(&mut row, "cardinality"),
            index_type: take_string(&mut row, "index_type").unwrap_or_default(),
            other: row,
        })
    }

    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::with_capacity(7 + self.other.len());
        attrs.insert("index_name".into(), json!(self.index_name));
        attrs.insert("column_name".into(), json!(self.column_name));
        attrs.insert("seq_in_index".into(), json!(self.seq_in_index));
        attrs.insert("non_unique".into(), json!(self.non_unique));
        attrs.insert("collation".into(), json!(self.collation));
        attrs.insert("cardinality".into(), self.cardinality.clone());
        attrs.insert("index_type".into(), json!(self.index_type));
        for (k, v) in &self.other {
            attrs.insert(k.clone(), v.clone());
        }
        attrs
    }
}

/// Key parts of one index, in key order. Order is significant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    pub columns: Vec<IndexColumn>,
}

impl Index {
    pub fn new(columns: Vec<IndexColumn>) -> Self {
        Self { columns }
    }
}

// ─── Trigger ──────────────────────────────────────────────────────────────────

/// A trigger row from `SHOW TRIGGERS`, kept as an opaque attribute record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger {
    pub attributes: Attributes,
}

impl Trigger {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// The trigger's name (`Trigger` column), or `""` if the row had none.
    pub fn name(&self) -> &str {
        self.attributes
            .get("trigger")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

// ─── Table ────────────────────────────────────────────────────────────────────

/// Table-level attributes compared by the differ.
pub const CONFIG_ATTRIBUTES: [&str; 3] = ["engine", "collation", "comment"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub engine: Option<String>,
    pub version: Option<u64>,
    pub create_time: Option<String>,
    pub row_format: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    /// Lower-cased column name → field, in `DESCRIBE` order.
    #[serde(default)]
    pub fields: IndexMap<String, Field>,
    /// Lower-cased index name → index, in first-seen order.
    #[serde(default)]
    pub indexes: IndexMap<String, Index>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

impl Table {
    /// Start a table from its key-normalized `SHOW TABLE STATUS` row.
    pub fn from_status(name: &str, mut status: RowMap) -> Self {
        Table {
            name: name.to_string(),
            engine: take_string(&mut status, "engine"),
            version: take_u64(&mut status, "version"),
            create_time: take_string(&mut status, "create_time"),
            row_format: take_string(&mut status, "row_format"),
            collation: take_string(&mut status, "collation"),
            comment: take_string(&mut status, "comment"),
            fields: IndexMap::new(),
            indexes: IndexMap::new(),
            triggers: Vec::new(),
        }
    }

    /// Value of one of [`CONFIG_ATTRIBUTES`]; `Null` for unknown names.
    pub fn config_value(&self, attribute: &str) -> Value {
        match attribute {
            "engine" => json!(self.engine),
            "collation" => json!(self.collation),
            "comment" => json!(self.comment),
            _ => Value::Null,
        }
    }

    /// Re-key fields and indexes by their lower-cased names.
    ///
    /// Snapshots built from a live database are already normalized; this is
    /// for documents loaded from disk, which may have been edited by hand.
    pub fn normalize_keys(self) -> Self {
        Table {
            fields: self
                .fields
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            indexes: self
                .indexes
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::lowercase_keys;

    fn row(pairs: &[(&str, Value)]) -> RowMap {
        lowercase_keys(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn field_from_describe_row() {
        let f = Field::from_row(row(&[
            ("Field", json!("email")),
            ("Type", json!("varchar(255)")),
            ("Null", json!("YES")),
            ("Key", json!("UNI")),
            ("Default", Value::Null),
            ("Extra", json!("")),
        ]))
        .unwrap();
        assert_eq!(f.name, "email");
        assert_eq!(f.column_type, "varchar(255)");
        assert!(f.nullable);
        assert_eq!(f.key, "UNI");
        assert_eq!(f.default, Value::Null);
        assert!(f.other.is_empty());
    }

    #[test]
    fn field_keeps_unknown_columns() {
        let f = Field::from_row(row(&[
            ("Field", json!("id")),
            ("Type", json!("int")),
            ("Null", json!("NO")),
            ("Privileges", json!("select,insert")),
        ]))
        .unwrap();
        assert!(!f.nullable);
        assert_eq!(f.other["privileges"], json!("select,insert"));
        assert_eq!(f.attributes()["privileges"], json!("select,insert"));
    }

    #[test]
    fn field_without_name_is_rejected() {
        assert!(Field::from_row(row(&[("Type", json!("int"))])).is_err());
    }

    #[test]
    fn field_serializes_flat() {
        let f = Field::from_row(row(&[
            ("Field", json!("id")),
            ("Type", json!("int")),
            ("Null", json!("NO")),
            ("Comment", json!("pk")),
        ]))
        .unwrap();
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v["type"], json!("int"));
        assert_eq!(v["comment"], json!("pk"));
        let back: Field = serde_json::from_value(v).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn index_column_from_show_indexes_row() {
        let c = IndexColumn::from_row(row(&[
            ("Table", json!("users")),
            ("Non_unique", json!(0)),
            ("Key_name", json!("idx_email")),
            ("Seq_in_index", json!("2")),
            ("Column_name", json!("email")),
            ("Collation", json!("A")),
            ("Cardinality", json!(12)),
            ("Index_type", json!("BTREE")),
        ]))
        .unwrap();
        assert_eq!(c.index_name, "idx_email");
        assert_eq!(c.column_name, "email");
        assert_eq!(c.seq_in_index, 2);
        assert!(!c.non_unique);
        assert_eq!(c.collation.as_deref(), Some("A"));
        assert_eq!(c.other["table"], json!("users"));
    }

    #[test]
    fn functional_key_part_uses_expression() {
        let c = IndexColumn::from_row(row(&[
            ("Key_name", json!("idx_lower")),
            ("Seq_in_index", json!(1)),
            ("Column_name", Value::Null),
            ("Expression", json!("lower(`email`)")),
        ]))
        .unwrap();
        assert_eq!(c.column_name, "lower(`email`)");
    }

    #[test]
    fn trigger_name_comes_from_trigger_column() {
        let t = Trigger::new(row(&[("Trigger", json!("users_bi")), ("Event", json!("INSERT"))]));
        assert_eq!(t.name(), "users_bi");
        assert_eq!(Trigger::default().name(), "");
    }

    #[test]
    fn table_from_status_row() {
        let t = Table::from_status(
            "users",
            row(&[
                ("Name", json!("users")),
                ("Engine", json!("InnoDB")),
                ("Version", json!(10)),
                ("Row_format", json!("Dynamic")),
                ("Create_time", json!("2024-01-02 03:04:05")),
                ("Collation", json!("utf8mb4_general_ci")),
                ("Comment", json!("")),
            ]),
        );
        assert_eq!(t.engine.as_deref(), Some("InnoDB"));
        assert_eq!(t.version, Some(10));
        assert_eq!(t.config_value("collation"), json!("utf8mb4_general_ci"));
        assert_eq!(t.config_value("comment"), json!(""));
        assert_eq!(t.config_value("unknown"), Value::Null);
    }
}
