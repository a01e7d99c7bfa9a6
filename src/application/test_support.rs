//! In-memory doubles shared by the application tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::events::SchemaEvent;
use crate::domain::ports::{Reporter, SchemaConnection};
use crate::domain::row::RowMap;
use crate::domain::schema::{Field, Index, IndexColumn, Table};

/// Connection that answers from a `sql → rows` script and records every
/// statement it receives. Unknown statements fail.
///
/// A statement scripted several times (see [`then`](Self::then)) answers
/// with each response in turn; the last one repeats.
pub struct ScriptedConnection {
    schema: String,
    responses: Mutex<HashMap<String, VecDeque<Vec<RowMap>>>>,
    failures: Mutex<HashMap<String, String>>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedConnection {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            responses: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Script `sql`, replacing any earlier responses.
    pub fn respond(self, sql: &str, rows: Vec<RowMap>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(sql.to_string(), VecDeque::from([rows]));
        self
    }

    /// Queue a follow-up response for `sql`.
    pub fn then(self, sql: &str, rows: Vec<RowMap>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(sql.to_string())
            .or_default()
            .push_back(rows);
        self
    }

    pub fn fail(self, sql: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(sql.to_string(), message.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaConnection for ScriptedConnection {
    async fn execute(&self, sql: &str) -> Result<Vec<RowMap>> {
        self.executed.lock().unwrap().push(sql.to_string());
        if let Some(message) = self.failures.lock().unwrap().get(sql) {
            return Err(anyhow!("{message}"));
        }
        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(sql)
            .ok_or_else(|| anyhow!("unscripted statement: {sql}"))?;
        let rows = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(rows.unwrap_or_default())
    }

    fn schema_name(&self) -> &str {
        &self.schema
    }
}

/// Reporter that keeps `(event name, display text)` pairs.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &SchemaEvent<'_>) {
        self.events
            .lock()
            .unwrap()
            .push((event.name(), event.to_string()));
    }
}

// ─── Row and record fixtures ──────────────────────────────────────────────────

pub fn row(pairs: &[(&str, Value)]) -> RowMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn describe_row(name: &str, ty: &str) -> RowMap {
    row(&[
        ("Field", json!(name)),
        ("Type", json!(ty)),
        ("Null", json!("NO")),
        ("Key", json!("")),
        ("Default", Value::Null),
        ("Extra", json!("")),
    ])
}

pub fn index_row(index: &str, column: &str, seq: u64) -> RowMap {
    row(&[
        ("Table", json!("users")),
        ("Non_unique", json!(1)),
        ("Key_name", json!(index)),
        ("Seq_in_index", json!(seq)),
        ("Column_name", json!(column)),
        ("Collation", json!("A")),
        ("Cardinality", json!(0)),
        ("Index_type", json!("BTREE")),
    ])
}

pub fn status_row(name: &str) -> RowMap {
    row(&[
        ("Name", json!(name)),
        ("Engine", json!("InnoDB")),
        ("Version", json!(10)),
        ("Row_format", json!("Dynamic")),
        ("Create_time", json!("2024-01-02 03:04:05")),
        ("Collation", json!("utf8mb4_general_ci")),
        ("Comment", json!("")),
    ])
}

pub fn field(name: &str, ty: &str) -> Field {
    Field {
        name: name.into(),
        column_type: ty.into(),
        nullable: false,
        key: String::new(),
        default: Value::Null,
        extra: String::new(),
        other: RowMap::new(),
    }
}

pub fn index_column(index: &str, column: &str, seq: u64) -> IndexColumn {
    IndexColumn {
        index_name: index.into(),
        column_name: column.into(),
        seq_in_index: seq,
        non_unique: true,
        collation: Some("A".into()),
        cardinality: json!(0),
        index_type: "BTREE".into(),
        other: RowMap::new(),
    }
}

/// A table with the given fields and indexes (index columns in key order).
pub fn table(name: &str, fields: &[(&str, &str)], indexes: &[(&str, &[&str])]) -> Table {
    let mut t = Table::from_status(name, crate::domain::row::lowercase_keys(status_row(name)));
    for (f, ty) in fields {
        t.fields.insert(f.to_lowercase(), field(f, ty));
    }
    for (idx, cols) in indexes {
        let columns = cols
            .iter()
            .enumerate()
            .map(|(i, c)| index_column(idx, c, i as u64 + 1))
            .collect();
        t.indexes.insert(idx.to_lowercase(), Index::new(columns));
    }
    t
}
