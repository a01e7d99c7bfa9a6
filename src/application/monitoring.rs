use crate::domain::events::SchemaEvent;
use crate::domain::ports::{Differ, Reporter, SchemaConnection};
use crate::domain::{row::RowMap, schema::Table, table_diff::TableDiff};
use crate::infrastructure::db::sql_utils::statement_kind;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, instrument};

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Statement kind (`"DESCRIBE"`, `"SHOW INDEXES"`, ...) or `"diff_table"`.
    pub operation: &'static str,
    /// The SQL text, or the table name for a diff.
    pub subject: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Rows returned by a statement, or changes found by a diff.
    pub count: usize,
}

/// Accumulated timings for one map or compare run.
///
/// Shared across all decorator instances for one run via `Arc<Mutex<_>>`.
/// After the run, pass to [`crate::presentation::cli_summary::print_perf_summary`]
/// to render a human-readable table.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub statements: usize,
    pub total_rows_fetched: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Copy out the current state; an empty report if the lock is poisoned.
    pub fn snapshot(report: &Arc<Mutex<Self>>) -> Self {
        report.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            if timing.operation != "diff_table" {
                r.statements += 1;
                r.total_rows_fetched += timing.count;
            }
            r.timings.push(timing);
        }
    }
}

// ─── MonitoringConnection ────────────────────────────────────────────────────

/// Decorator: wraps any `SchemaConnection`, measures wall time per statement,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringConnection {
    inner: Arc<dyn SchemaConnection>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringConnection {
    pub fn new(inner: Arc<dyn SchemaConnection>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl SchemaConnection for MonitoringConnection {
    #[instrument(
        name = "execute",
        skip(self, sql),
        fields(db.schema = %self.inner.schema_name(), db.statement = statement_kind(sql)),
        level = "debug"
    )]
    async fn execute(&self, sql: &str) -> Result<Vec<RowMap>> {
        let start = Instant::now();
        let rows = self.inner.execute(sql).await?;
        let duration_ms = start.elapsed().as_millis();

        debug!(sql, rows = rows.len(), duration_ms, "statement completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: statement_kind(sql),
                subject: sql.to_string(),
                duration_ms,
                count: rows.len(),
            },
        );

        Ok(rows)
    }

    fn schema_name(&self) -> &str {
        self.inner.schema_name()
    }
}

// ─── MonitoringDiffer ────────────────────────────────────────────────────────

/// Decorator: wraps any `Differ`, measures wall time per `diff_table` call,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringDiffer {
    inner: Arc<dyn Differ>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringDiffer {
    pub fn new(inner: Arc<dyn Differ>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

impl Differ for MonitoringDiffer {
    #[instrument(
        name = "diff_table",
        skip(self, baseline, current),
        fields(
            db.table = %baseline.name,
            baseline.fields = baseline.fields.len(),
            current.fields = current.fields.len(),
        ),
        level = "info"
    )]
    fn diff_table(&self, baseline: &Table, current: &Table) -> TableDiff {
        let start = Instant::now();
        let result = self.inner.diff_table(baseline, current);
        let duration_ms = start.elapsed().as_millis();

        let changes = result.change_count();
        info!(table = %baseline.name, changes, duration_ms, "diff_table completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "diff_table",
                subject: baseline.name.clone(),
                duration_ms,
                count: changes,
            },
        );

        result
    }
}

// ─── TracingReporter ─────────────────────────────────────────────────────────

/// Reporter that forwards every event to `tracing`.
///
/// Structural differences log at `info`, per-table progress at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &SchemaEvent<'_>) {
        let table = event.table().unwrap_or_default();
        match event {
            SchemaEvent::TableMapped { .. } | SchemaEvent::CheckingTable { .. } => {
                debug!(event = event.name(), table, "{event}")
            }
            _ => info!(event = event.name(), table, "{event}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diff::SchemaDiffer;
    use crate::application::test_support::{describe_row, table, ScriptedConnection};
    use crate::domain::ports::NullReporter;
    use crate::infrastructure::config::DiffOptions;

    #[tokio::test]
    async fn connection_timings_are_recorded_per_statement() {
        let report = PerfReport::new();
        let inner = ScriptedConnection::new("shop").respond(
            "DESCRIBE `users`",
            vec![describe_row("id", "int"), describe_row("email", "text")],
        );
        let conn = MonitoringConnection::new(Arc::new(inner), Arc::clone(&report));

        let rows = conn.execute("DESCRIBE `users`").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(conn.schema_name(), "shop");

        let perf = PerfReport::snapshot(&report);
        assert_eq!(perf.statements, 1);
        assert_eq!(perf.total_rows_fetched, 2);
        assert_eq!(perf.timings[0].operation, "DESCRIBE");
        assert_eq!(perf.timings[0].subject, "DESCRIBE `users`");
    }

    #[tokio::test]
    async fn failed_statements_are_not_recorded() {
        let report = PerfReport::new();
        let inner = ScriptedConnection::new("shop").fail("SHOW TABLES", "gone away");
        let conn = MonitoringConnection::new(Arc::new(inner), Arc::clone(&report));

        assert!(conn.execute("SHOW TABLES").await.is_err());
        assert!(PerfReport::snapshot(&report).timings.is_empty());
    }

    #[test]
    fn differ_timings_count_changes_not_statements() {
        let report = PerfReport::new();
        let differ = MonitoringDiffer::new(
            Arc::new(SchemaDiffer::new(DiffOptions::default(), Arc::new(NullReporter))),
            Arc::clone(&report),
        );
        let baseline = table("users", &[("id", "int"), ("email", "text")], &[]);
        let current = table("users", &[("id", "int")], &[]);

        let diff = differ.diff_table(&baseline, &current);
        assert_eq!(diff.fields.add.len(), 1);

        let perf = PerfReport::snapshot(&report);
        assert_eq!(perf.statements, 0);
        assert_eq!(perf.timings[0].operation, "diff_table");
        assert_eq!(perf.timings[0].subject, "users");
        assert_eq!(perf.timings[0].count, 1);
    }
}
