use anyhow::{Context, Result};
use clap::Parser;
use gridagg::{AggregationJob, GridCatalog, JobOutcome};
use std::path::PathBuf;

/// Rank grid cells by geotagged post volume and show each cell's top
/// hashtags.
#[derive(Parser, Debug)]
struct Args {
    /// Data file: one JSON post record per line.
    data: PathBuf,
    /// Grid catalog document with cell ids and bounds.
    #[arg(long, default_value = "melbGrid.json")]
    grid: PathBuf,
    /// Scan worker count; defaults to GRIDAGG_WORKERS or the CPU count.
    #[arg(long)]
    workers: Option<usize>,
    /// Rebuild the line-offset index even if a persisted one exists.
    #[arg(long)]
    reindex: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    let args = Args::parse();

    let catalog = GridCatalog::from_json_path(&args.grid)
        .with_context(|| format!("load grid catalog {}", args.grid.display()))?;

    let mut job = AggregationJob::new();
    if let Some(workers) = args.workers {
        job = job.with_workers(workers);
    }
    if args.reindex {
        job = job.with_force_reindex(true);
    }

    let outcome = job.run(&args.data, &catalog)?;
    print_report(&outcome);
    Ok(())
}

fn print_report(outcome: &JobOutcome) {
    println!("Cells ranked by post volume:");
    for (position, cell) in outcome.report.iter().enumerate() {
        println!("{:>3}. {}: {} posts", position + 1, cell.cell_id, cell.post_count);
    }

    println!();
    println!("Top hashtags per cell:");
    for cell in &outcome.report {
        let tags = cell
            .top_hashtags
            .iter()
            .map(|(tag, n)| format!("(#{}, {})", tag, n))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}: [{}]", cell.cell_id, tags);
    }
}
