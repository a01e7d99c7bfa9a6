//! # dbmap: library usage example
//!
//! Two common patterns for consuming dbmap as a Rust library:
//!
//! 1. **From a config file**: compare a baseline file against the live schema
//! 2. **Inspect the result**: walk the comparison for custom logic
//!
//! Run with:
//!   cargo run --example compare_as_lib -- dbmap.json migration.json

use anyhow::{bail, Result};
use dbmap::{AppConfig, ComparisonResult, IndexRemoval};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let (Some(config), Some(baseline)) = (args.get(1), args.get(2)) else {
        bail!("usage: compare_as_lib <config> <baseline>");
    };

    let cfg = AppConfig::load(config)?;
    let (result, perf) = dbmap::compare_with_timing(&cfg, baseline).await?;

    inspect(&result);
    println!("{} statement(s) in {} ms", perf.statements, perf.total_ms);

    // Example: fail a deployment pipeline when the live schema drifted
    if !result.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn inspect(result: &ComparisonResult) {
    println!("schema  : {}", result.target.name);
    println!("created : {}", result.creation);
    println!();

    for table in &result.target.add {
        println!("+ CREATE TABLE {}", table.name);
    }
    for name in &result.target.remove {
        println!("- DROP TABLE {name}");
    }

    for (name, diff) in &result.target.diff {
        println!("━━ {name} ━━");

        for (attribute, change) in &diff.config {
            println!("  ~ {attribute}: {} → {}", change.old, change.new);
        }
        for field in &diff.fields.add {
            println!("  + ADD COLUMN {} {}", field.name, field.column_type);
        }
        for (field, changes) in &diff.fields.change {
            for (attribute, change) in changes {
                println!("  ~ {field}.{attribute}: {} → {}", change.old, change.new);
            }
        }
        for field in &diff.fields.remove {
            println!("  - DROP COLUMN {field}");
        }
        for removal in &diff.index.remove {
            match removal {
                IndexRemoval::Index(index) => println!("  - DROP INDEX {index}"),
                IndexRemoval::Column { index, column } => {
                    println!("  - {index}: extra column {column}")
                }
            }
        }

        println!();
    }

    println!(
        "checked {} table(s), {} changed",
        result.stats.tables.checked, result.stats.tables.changes
    );
}
