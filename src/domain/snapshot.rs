use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::ports::TableSource;
use crate::domain::schema::Table;

/// Normalized structural capture of one database schema.
///
/// Built by `SnapshotBuilder::build` or loaded from a migration file. Never
/// mutated once built; the differ only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub schema: String,
    pub tables: IndexMap<String, Table>,
}

impl SchemaSnapshot {
    pub fn new(schema: impl Into<String>, tables: IndexMap<String, Table>) -> Self {
        Self {
            schema: schema.into(),
            tables,
        }
    }

    /// Lower-case field and index keys of every table.
    pub fn normalize_keys(self) -> Self {
        SchemaSnapshot {
            schema: self.schema,
            tables: self
                .tables
                .into_iter()
                .map(|(name, table)| (name, table.normalize_keys()))
                .collect(),
        }
    }
}

/// A loaded snapshot can stand in for the live database.
#[async_trait]
impl TableSource for SchemaSnapshot {
    fn schema_name(&self) -> &str {
        &self.schema
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn table(&self, name: &str) -> Result<Option<Table>> {
        Ok(self.tables.get(name).cloned())
    }
}
