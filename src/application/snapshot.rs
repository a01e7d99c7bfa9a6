use anyhow::{Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::events::SchemaEvent;
use crate::domain::ports::{Reporter, SchemaConnection, TableSource};
use crate::domain::row::{lowercase_keys, RowMap};
use crate::domain::schema::{Field, Index, IndexColumn, Table, Trigger};
use crate::domain::snapshot::SchemaSnapshot;
use crate::infrastructure::db::dialect::QueryDialect;
use crate::infrastructure::db::sql_utils::{
    describe_table_query, list_tables_query, show_indexes_query, show_triggers_query,
    table_status_query,
};

// ─────────────────────────────────────────────────────────────────────────────
// SnapshotBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Maps the live schema behind a [`SchemaConnection`] into a [`SchemaSnapshot`].
///
/// # Steps per table
/// 1. `SHOW TABLE STATUS` filtered by name; no row means the table does not
///    exist and [`map_table`](Self::map_table) returns `Ok(None)`.
/// 2. `DESCRIBE` → fields keyed by lower-cased column name.
/// 3. `SHOW INDEXES` → rows grouped by lower-cased index name, each placed at
///    `seq_in_index - 1`.
/// 4. `SHOW TRIGGERS` scoped to schema and table.
///
/// Every row is key-normalized once, right after it comes off the
/// connection. Statements run strictly one after another.
pub struct SnapshotBuilder {
    connection: Arc<dyn SchemaConnection>,
    dialect: Arc<dyn QueryDialect>,
    reporter: Arc<dyn Reporter>,
}

impl SnapshotBuilder {
    pub fn new(
        connection: Arc<dyn SchemaConnection>,
        dialect: Arc<dyn QueryDialect>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            connection,
            dialect,
            reporter,
        }
    }

    /// Map every table of the schema, in `SHOW TABLES` order.
    ///
    /// A table dropped between the listing and its mapping is skipped.
    pub async fn build(&self) -> Result<SchemaSnapshot> {
        let schema = self.connection.schema_name();
        self.reporter
            .report(&SchemaEvent::MappingStarted { schema });

        let mut tables = IndexMap::new();
        for name in self.list_tables().await? {
            if let Some(table) = self.map_table(&name).await? {
                self.reporter
                    .report(&SchemaEvent::TableMapped { table: &name });
                tables.insert(name, table);
            }
        }

        self.reporter.report(&SchemaEvent::MappingFinished {
            schema,
            tables: tables.len(),
        });
        Ok(SchemaSnapshot::new(schema, tables))
    }

    /// Names of all tables, as returned by the server.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self
            .query(&list_tables_query(self.dialect.as_ref()))
            .await
            .context("Failed to list tables")?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some((_, Value::String(name))) => Some(name),
                other => {
                    warn!(row = ?other, "skipping SHOW TABLES row without a table name");
                    None
                }
            })
            .collect())
    }

    /// Map a single table. `Ok(None)` means "not found", which callers treat
    /// as the table having been removed.
    pub async fn map_table(&self, name: &str) -> Result<Option<Table>> {
        let Some(status) = self.table_status(name).await? else {
            self.reporter
                .report(&SchemaEvent::TableNotFound { table: name });
            return Ok(None);
        };

        let mut table = Table::from_status(name, status);
        match self.map_structure(&mut table).await {
            Ok(()) => Ok(Some(table)),
            Err(err) => {
                // Dropped between the status lookup and the structure queries?
                if self.table_status(name).await?.is_some() {
                    return Err(err);
                }
                warn!(table = name, error = %err, "table vanished while mapping");
                self.reporter
                    .report(&SchemaEvent::TableNotFound { table: name });
                Ok(None)
            }
        }
    }

    async fn table_status(&self, name: &str) -> Result<Option<RowMap>> {
        let rows = self
            .query(&table_status_query(name, self.dialect.as_ref()))
            .await
            .with_context(|| format!("Failed to read table status of {name}"))?;
        Ok(rows.into_iter().next())
    }

    async fn map_structure(&self, table: &mut Table) -> Result<()> {
        let dialect = self.dialect.as_ref();
        let name = table.name.clone();

        for row in self.query(&describe_table_query(&name, dialect)).await? {
            let field = Field::from_row(row).with_context(|| format!("Bad column in {name}"))?;
            table.fields.insert(field.name.to_lowercase(), field);
        }

        let columns = self
            .query(&show_indexes_query(&name, dialect))
            .await?
            .into_iter()
            .map(IndexColumn::from_row)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Bad index row in {name}"))?;
        table.indexes = group_indexes(columns);

        let schema = self.connection.schema_name();
        table.triggers = self
            .query(&show_triggers_query(schema, &name, dialect))
            .await?
            .into_iter()
            .map(Trigger::new)
            .collect();

        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<RowMap>> {
        let rows = self.connection.execute(sql).await?;
        Ok(rows.into_iter().map(lowercase_keys).collect())
    }
}

/// Group key parts by lower-cased index name (first-seen order) and order
/// each group by `seq_in_index`. Two parts claiming the same position: the
/// later row wins.
fn group_indexes(columns: Vec<IndexColumn>) -> IndexMap<String, Index> {
    let mut grouped: IndexMap<String, BTreeMap<u64, IndexColumn>> = IndexMap::new();
    for column in columns {
        let position = column.seq_in_index.saturating_sub(1);
        grouped
            .entry(column.index_name.to_lowercase())
            .or_default()
            .insert(position, column);
    }
    grouped
        .into_iter()
        .map(|(name, parts)| (name, Index::new(parts.into_values().collect())))
        .collect()
}

#[async_trait]
impl TableSource for SnapshotBuilder {
    fn schema_name(&self) -> &str {
        self.connection.schema_name()
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        self.list_tables().await
    }

    async fn table(&self, name: &str) -> Result<Option<Table>> {
        self.map_table(name).await
    }
}
