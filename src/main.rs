use anyhow::Result;
use clap::{Parser, Subcommand};
use dbmap::presentation::cli_summary::{print_perf_summary, print_snapshot_summary, print_summary};
use dbmap::{save, AppConfig, LogLevel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dbmap",
    version,
    about = "dbmap: snapshot a MySQL schema and diff it against a live database."
)]
struct Cli {
    #[arg(short, long, global = true, default_value = "dbmap.json")]
    config: PathBuf,

    /// Log every statement and table as it is processed.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print per-statement and per-table timings.
    #[arg(long, global = true)]
    timing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map the live schema and save it as a baseline snapshot.
    Map {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Compare a baseline snapshot against the live schema.
    Compare {
        #[arg(short, long)]
        baseline: PathBuf,

        #[arg(short, long, default_value = "comparison.json")]
        output: PathBuf,

        /// Print the summary without writing the result file.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LogLevel::Error
    } else if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    dbmap::init_tracing(level);

    let cfg = AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Map { output } => {
            let (snapshot, perf) = dbmap::snapshot_with_timing(&cfg).await?;
            save(&snapshot, &output)?;
            print_snapshot_summary(&snapshot);
            if cli.timing {
                print_perf_summary(&perf);
            }
            println!("Snapshot written to {}", output.display());
        }
        Command::Compare {
            baseline,
            output,
            dry_run,
        } => {
            let (result, perf) = dbmap::compare_with_timing(&cfg, &baseline).await?;
            print_summary(&result);
            if cli.timing {
                print_perf_summary(&perf);
            }
            if dry_run {
                return Ok(());
            }
            save(&result, &output)?;
            println!("Comparison written to {}", output.display());
        }
    }

    Ok(())
}
