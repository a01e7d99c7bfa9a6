use crate::application::monitoring::PerfReport;
use crate::domain::comparison::ComparisonResult;
use crate::domain::snapshot::SchemaSnapshot;
use colored::*;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TableRow {
    table: String,
    config: String,
    #[tabled(rename = "fields +/~/-")]
    fields: String,
    #[tabled(rename = "index +/~/-")]
    index: String,
    #[tabled(rename = "triggers +/-")]
    triggers: String,
}

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

/// Print a coloured overview of a comparison to stdout.
pub fn print_summary(result: &ComparisonResult) {
    println!();

    println!("{}", "DBMAP SCHEMA COMPARISON".bold().cyan());
    println!(
        "baseline → {}  ({})",
        result.target.name.green(),
        result.creation.dimmed()
    );
    println!();

    if result.is_clean() {
        println!("{}", "Live schema matches the baseline.".italic());
        print_stats(result);
        return;
    }

    for table in &result.target.add {
        println!("  {} {}", "+ missing table".green(), table.name.bold());
    }
    for name in &result.target.remove {
        println!("  {} {}", "- extra table  ".red(), name.bold());
    }
    if !result.target.add.is_empty() || !result.target.remove.is_empty() {
        println!();
    }

    if !result.target.diff.is_empty() {
        let rows: Vec<TableRow> = result
            .target
            .diff
            .iter()
            .map(|(name, d)| TableRow {
                table: name.bold().to_string(),
                config: count(d.config.len()).yellow().to_string(),
                fields: triple(d.fields.add.len(), d.fields.change.len(), d.fields.remove.len()),
                index: triple(d.index.add.len(), d.index.change.len(), d.index.remove.len()),
                triggers: format!(
                    "{}/{}",
                    count(d.triggers.add.len()).green(),
                    count(d.triggers.remove.len()).red()
                ),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..=4)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    print_stats(result);
}

fn print_stats(result: &ComparisonResult) {
    let s = &result.stats.tables;
    let summary_rows = vec![
        SummaryRow {
            metric: "Tables checked".into(),
            value: s.checked.to_string().bold().to_string(),
        },
        SummaryRow {
            metric: "Tables changed".into(),
            value: s.changes.to_string().yellow().to_string(),
        },
        SummaryRow {
            metric: "Tables missing".into(),
            value: result.target.add.len().to_string().green().to_string(),
        },
        SummaryRow {
            metric: "Tables extra".into(),
            value: result.target.remove.len().to_string().red().to_string(),
        },
    ];

    let summary_table = Table::new(summary_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=1)).with(Alignment::right()))
        .to_string();

    println!();
    println!("{summary_table}");
    println!();
}

/// One line per mapped table: field, index and trigger counts.
pub fn print_snapshot_summary(snapshot: &SchemaSnapshot) {
    #[derive(Tabled)]
    struct MappedRow {
        table: String,
        fields: usize,
        indexes: usize,
        triggers: usize,
    }

    println!();
    println!("{} {}", "DBMAP SNAPSHOT".bold().cyan(), snapshot.schema.green());

    let rows: Vec<MappedRow> = snapshot
        .tables
        .values()
        .map(|t| MappedRow {
            table: t.name.bold().to_string(),
            fields: t.fields.len(),
            indexes: t.indexes.len(),
            triggers: t.triggers.len(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!();
}

fn count(n: usize) -> String {
    n.to_string()
}

fn triple(add: usize, change: usize, remove: usize) -> String {
    format!(
        "{}/{}/{}",
        count(add).green(),
        count(change).yellow(),
        count(remove).red()
    )
}

// ─── Performance summary ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PerfRow {
    operation: String,
    subject: String,
    #[tabled(rename = "rows / changes")]
    count: String,
    #[tabled(rename = "time (ms)")]
    duration_ms: String,
}

/// Print a performance timing table to stdout.
pub fn print_perf_summary(report: &PerfReport) {
    if report.timings.is_empty() {
        return;
    }

    println!("{}", "PERFORMANCE".bold().cyan());

    let rows: Vec<PerfRow> = report
        .timings
        .iter()
        .map(|t| PerfRow {
            operation: t.operation.dimmed().to_string(),
            subject: t.subject.bold().to_string(),
            count: t.count.to_string(),
            duration_ms: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();

    println!("{table}");

    println!(
        "  Total: {} statement(s)  ·  {} row(s) fetched  ·  {} ms elapsed",
        report.statements.to_string().bold(),
        report.total_rows_fetched.to_string().bold(),
        format_duration(report.total_ms),
    );
    println!();
}

fn format_duration(ms: u128) -> String {
    if ms >= 1_000 {
        format!("{:.1}s", ms as f64 / 1_000.0).yellow().to_string()
    } else if ms >= 100 {
        ms.to_string().yellow().to_string()
    } else {
        ms.to_string().green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_keeps_counts_in_order() {
        colored::control::set_override(false);
        assert_eq!(triple(1, 2, 3), "1/2/3");
    }

    #[test]
    fn format_duration_switches_to_seconds() {
        colored::control::set_override(false);
        assert_eq!(format_duration(42), "42");
        assert_eq!(format_duration(1_500), "1.5s");
    }
}
