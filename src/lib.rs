use anyhow::{Context, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub mod application;
pub mod domain;
pub mod infrastructure;
#[cfg(feature = "cli")]
pub mod presentation;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of dbmap's internal tracing output.
///
/// Pass to [`init_tracing`] before calling any async entry point.
///
/// | Variant | `tracing` level | When to use                                  |
/// |---------|-----------------|----------------------------------------------|
/// | `Error` | `error`         | `--quiet` / CI scripting                     |
/// | `Info`  | `info`          | Default, shows every structural difference   |
/// | `Debug` | `debug`         | `--verbose`, shows each statement and table  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

#[cfg(feature = "cli")]
impl LogLevel {
    fn filter(self) -> &'static str {
        match self {
            LogLevel::Error => "dbmap=error",
            LogLevel::Info => "dbmap=info",
            LogLevel::Debug => "dbmap=debug",
        }
    }
}

/// Initialise the global `tracing` subscriber for dbmap.
///
/// Respects `RUST_LOG` when set, falling back to `level` otherwise. Call
/// this once at startup; library consumers who manage their own subscriber
/// should skip it.
///
/// Only available with the `cli` feature (pulls in `tracing-subscriber`).
#[cfg(feature = "cli")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.filter().into()),
        )
        .init();
}

// ─── Public API Facade ───

pub use application::diff::{CompareService, SchemaDiffer};
pub use application::monitoring::{PerfReport, TracingReporter};
pub use application::snapshot::SnapshotBuilder;
pub use domain::comparison::{ComparisonResult, Stats, TableStats, TargetDiff};
pub use domain::events::SchemaEvent;
pub use domain::ports::{Differ, NullReporter, Reporter, SchemaConnection, TableSource};
pub use domain::row::{Attributes, RowMap};
pub use domain::schema::{Field, Index, IndexColumn, Table, Trigger};
pub use domain::snapshot::SchemaSnapshot;
pub use domain::table_diff::{
    FieldChanges, IndexAddition, IndexChanges, IndexRemoval, TableDiff, TriggerChanges,
    ValueChange,
};
pub use domain::value_objects::IgnoredAttributes;
pub use infrastructure::config::{AppConfig, Connector, DbConfig, DiffOptions};
pub use infrastructure::store::{load_snapshot, parse_snapshot, save};

use crate::application::monitoring::{MonitoringConnection, MonitoringDiffer};
use crate::infrastructure::db::{client::connect, dialect::from_driver};

// ─── Public entry points ───

/// Map every table of the configured schema into a snapshot.
pub async fn snapshot(cfg: &AppConfig) -> Result<SchemaSnapshot> {
    let (snapshot, _) = snapshot_with_timing(cfg).await?;
    Ok(snapshot)
}

/// Map the configured schema and return a [`PerfReport`] alongside it.
pub async fn snapshot_with_timing(cfg: &AppConfig) -> Result<(SchemaSnapshot, PerfReport)> {
    let report = PerfReport::new();
    let builder = build_builder(cfg, Arc::clone(&report)).await?;
    let snapshot = builder.build().await?;
    Ok((snapshot, PerfReport::snapshot(&report)))
}

/// Map the configured schema and save the snapshot to `output`.
///
/// The file at `output` is truncated if it exists.
pub async fn export_snapshot(cfg: &AppConfig, output: impl AsRef<Path>) -> Result<SchemaSnapshot> {
    let snapshot = snapshot(cfg).await?;
    save(&snapshot, output.as_ref())?;
    Ok(snapshot)
}

/// Compare the baseline file at `baseline` against the live database.
///
/// Use [`compare_with_timing`] if you also want a performance report.
pub async fn compare(cfg: &AppConfig, baseline: impl AsRef<Path>) -> Result<ComparisonResult> {
    let (result, _) = compare_with_timing(cfg, baseline).await?;
    Ok(result)
}

/// Compare against the live database and return the per-statement and
/// per-table timings alongside the result.
///
/// The baseline is loaded before any connection is opened: a malformed
/// baseline aborts the run without touching the database.
pub async fn compare_with_timing(
    cfg: &AppConfig,
    baseline: impl AsRef<Path>,
) -> Result<(ComparisonResult, PerfReport)> {
    let baseline = load_snapshot(baseline)?;

    let report = PerfReport::new();
    let builder = build_builder(cfg, Arc::clone(&report)).await?;
    let differ = Arc::new(MonitoringDiffer::new(
        Arc::new(SchemaDiffer::new(cfg.diff.clone(), Arc::new(TracingReporter))),
        Arc::clone(&report),
    ));

    let service = CompareService::new(differ, Arc::new(TracingReporter));
    let result = service
        .compare(&baseline, &builder)
        .await
        .with_context(|| format!("Failed to compare against {}", cfg.db.master.schema))?;

    Ok((result, PerfReport::snapshot(&report)))
}

/// Compare against the live database and save the result to `output`.
pub async fn compare_to_file(
    cfg: &AppConfig,
    baseline: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ComparisonResult> {
    let result = compare(cfg, baseline).await?;
    save(&result, output.as_ref())?;
    Ok(result)
}

/// Compare a baseline snapshot against any [`TableSource`] (another
/// snapshot, or a [`SnapshotBuilder`] over a custom connection).
pub async fn compare_sources(
    baseline: &SchemaSnapshot,
    current: &dyn TableSource,
    options: &DiffOptions,
) -> Result<ComparisonResult> {
    let differ = Arc::new(SchemaDiffer::new(options.clone(), Arc::new(TracingReporter)));
    CompareService::new(differ, Arc::new(TracingReporter))
        .compare(baseline, current)
        .await
}

// ─── Private helpers ───────────────────────────────────────────────────────────

/// Connect to the configured database and wrap the connection in the
/// monitoring decorator.
async fn build_builder(cfg: &AppConfig, report: Arc<Mutex<PerfReport>>) -> Result<SnapshotBuilder> {
    let db = &cfg.db.master;
    let connection = Arc::new(connect(db).await?);
    Ok(SnapshotBuilder::new(
        Arc::new(MonitoringConnection::new(connection, report)),
        Arc::from(from_driver(&db.driver)),
        Arc::new(TracingReporter),
    ))
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn log_level_filters_target_the_crate() {
        assert_eq!(LogLevel::Error.filter(), "dbmap=error");
        assert_eq!(LogLevel::default().filter(), "dbmap=info");
        assert_eq!(LogLevel::Debug.filter(), "dbmap=debug");
    }
}
