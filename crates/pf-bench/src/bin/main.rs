//! Standalone benchmark runner for the concentration solvers.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use clap::Parser;
use pf_bench::{BenchmarkSuite, default_benchmarks, run_scenario};

#[derive(Parser)]
#[command(name = "pf-bench")]
#[command(about = "Time serial and parallel per-cell equilibrium solves", long_about = None)]
struct Cli {
    /// Runs per scenario
    #[arg(short, long, default_value_t = 5)]
    runs: usize,

    /// Override the number of grid cells of every scenario
    #[arg(short, long)]
    cells: Option<usize>,

    /// Only run scenarios whose id contains this string
    #[arg(short, long)]
    filter: Option<String>,

    /// Write the JSON baseline here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let benchmarks: Vec<_> = default_benchmarks()
        .into_iter()
        .filter(|s| cli.filter.as_deref().is_none_or(|f| s.id.contains(f)))
        .map(|mut s| {
            if let Some(cells) = cli.cells {
                s.cells = cells;
            }
            s
        })
        .collect();

    eprintln!(
        "Running {} benchmarks, {} runs each...\n",
        benchmarks.len(),
        cli.runs
    );

    let mut results = Vec::new();
    for (idx, scenario) in benchmarks.iter().enumerate() {
        eprint!("[{}/{}] {} ... ", idx + 1, benchmarks.len(), scenario.name);

        match run_scenario(scenario, cli.runs) {
            Ok(result) => {
                let agg = &result.aggregate;
                eprintln!(
                    "OK (serial {:.4}s, parallel {:.4}s median)",
                    agg.serial_time_median_s, agg.parallel_time_median_s
                );
                if let Some(run) = result.runs.first()
                    && run.failed > 0
                {
                    eprintln!("  {} of {} cells did not converge", run.failed, scenario.cells);
                }
                results.push(result);
            }
            Err(e) => {
                eprintln!("FAILED");
                eprintln!("  Error: {}", e);
            }
        }
    }

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let baseline_json = serde_json::to_string_pretty(&BenchmarkSuite {
        timestamp: format!("timestamp_{}", timestamp),
        results,
    })?;

    match cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, baseline_json)?;
            eprintln!("Baseline saved to: {}", path.display());
        }
        None => println!("{baseline_json}"),
    }

    Ok(())
}
