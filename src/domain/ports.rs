use crate::domain::{
    events::SchemaEvent,
    row::RowMap,
    schema::Table,
    table_diff::TableDiff,
};
use anyhow::Result;
use async_trait::async_trait;

/// Port: executes introspection statements (implemented by MysqlConnection)
///
/// Rows come back in server order with the server's own key casing; callers
/// normalize keys themselves.
#[async_trait]
pub trait SchemaConnection: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<RowMap>>;

    /// Name of the schema (database) this connection introspects.
    fn schema_name(&self) -> &str;
}

/// Port: where the differ resolves "current" tables from
/// (implemented by SnapshotBuilder for a live database, and by SchemaSnapshot)
#[async_trait]
pub trait TableSource: Send + Sync {
    fn schema_name(&self) -> &str;

    async fn table_names(&self) -> Result<Vec<String>>;

    /// `Ok(None)` means the table does not exist (or vanished mid-run).
    async fn table(&self, name: &str) -> Result<Option<Table>>;
}

/// Port: per-table structural diff (implemented by SchemaDiffer)
pub trait Differ: Send + Sync {
    fn diff_table(&self, baseline: &Table, current: &Table) -> TableDiff;
}

/// Port: progress and diagnostics sink (implemented by TracingReporter)
pub trait Reporter: Send + Sync {
    fn report(&self, event: &SchemaEvent<'_>);
}

/// Reporter that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &SchemaEvent<'_>) {}
}
