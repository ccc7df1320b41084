/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};

use schedsim::config::{BuiltinSet, WorkloadManager};
use schedsim::cpu::CoreRun;
use schedsim::dispatcher::{Dispatcher, SimulationRun};
use schedsim::process::Tick;
use schedsim::scheduler::SchedulerKind;
use schedsim::stats::{self, ordered_spans, SimulationStats};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Multi-core CPU scheduling simulator.
///
/// Runs every selected algorithm on every selected core count over the same
/// workload and logs a comparison.
///
/// Example:
///   schedsim -w workload.yaml -a fcfs -a rr -c 1 -c 2 -q 2 --report out.yaml
#[derive(Debug, Parser)]
#[command(
    name = "schedsim",
    about = "Multi-core CPU scheduling simulator",
    long_about = None,
)]
struct Cli {
    /// Path to a YAML workload file.
    #[arg(short = 'w', long = "workload", conflicts_with = "set")]
    workload: Option<PathBuf>,

    /// Built-in process set, used when no workload file is given (default: small).
    #[arg(short = 's', long = "set", value_enum)]
    set: Option<BuiltinSet>,

    /// Scheduling algorithm; repeat to compare several. Overrides the workload file.
    #[arg(short = 'a', long = "algorithm", value_enum)]
    algorithms: Vec<SchedulerKind>,

    /// Core count; repeat to compare several. Overrides the workload file.
    #[arg(short = 'c', long = "cores")]
    cores: Vec<usize>,

    /// Round robin quantum. Overrides the workload file.
    #[arg(short = 'q', long = "quantum")]
    quantum: Option<u64>,

    /// Run each core of a simulation on its own task.
    #[arg(short = 'p', long = "parallel", default_value_t = false)]
    parallel: bool,

    /// Log every core's execution spans.
    #[arg(short = 't', long = "timeline", default_value_t = false)]
    timeline: bool,

    /// Write a YAML report (statistics and timelines) to this path.
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Report {
    workload: String,
    results: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    configuration: String,
    stats: SimulationStats,
    /// One `(time, pid)` list per core, idle = -1.
    timelines: Vec<Vec<(Tick, i64)>>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        workload  = ?cli.workload,
        set       = ?cli.set,
        algorithms = ?cli.algorithms,
        cores     = ?cli.cores,
        quantum   = ?cli.quantum,
        parallel  = cli.parallel,
        report    = ?cli.report,
        "Configuration"
    );

    match run(&cli).await {
        Ok(0) => {}
        Ok(failed) => {
            error!("{} configuration(s) failed", failed);
            process::exit(1);
        }
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

/// Run the comparison matrix.  Returns the number of failed configurations.
async fn run(cli: &Cli) -> Result<usize> {
    // ── Load workload ─────────────────────────────────────────────────────────
    let mut workload = WorkloadManager::new();
    match &cli.workload {
        Some(path) => workload
            .load_from_file(path)
            .context("Failed to load workload")?,
        None => workload.load_builtin(cli.set.unwrap_or(BuiltinSet::Small)),
    }

    let settings = workload.settings();
    let algorithms = if cli.algorithms.is_empty() {
        settings.algorithms.clone()
    } else {
        cli.algorithms.clone()
    };
    let core_counts = if cli.cores.is_empty() {
        settings.cores.clone()
    } else {
        cli.cores.clone()
    };
    let quantum = cli.quantum.unwrap_or(settings.quantum);

    // ── Simulate every configuration ──────────────────────────────────────────
    let mut entries = Vec::new();
    let mut failed = 0usize;

    for &kind in &algorithms {
        for &cores in &core_counts {
            let outcome = match Dispatcher::from_kind(cores, kind, Some(quantum)) {
                Ok(dispatcher) if cli.parallel => {
                    dispatcher.run_concurrent(workload.processes()).await
                }
                Ok(dispatcher) => dispatcher.run(workload.processes()),
                Err(e) => Err(e),
            };

            let sim = match outcome {
                Ok(sim) => sim,
                Err(e) => {
                    error!(algorithm = %kind, cores, "✗ simulation failed: {}", e);
                    failed += 1;
                    continue;
                }
            };

            let configuration = format!("{} ({} cores)", sim.policy, cores);
            if cli.timeline {
                log_timelines(&configuration, &sim);
            }

            let stats = stats::compute(&sim);
            entries.push(ReportEntry {
                configuration,
                timelines: sim.timelines(),
                stats,
            });
        }
    }

    // ── Summary ───────────────────────────────────────────────────────────────
    if entries.is_empty() {
        warn!("No configuration completed");
    } else {
        info!("Results for workload '{}':", workload.name());
    }
    for entry in &entries {
        let overall = &entry.stats.overall;
        info!(
            "  {:<28} avg_wait={:>6.2}  avg_tat={:>6.2}  throughput={:.3}  completion={}",
            entry.configuration,
            overall.avg_waiting_time,
            overall.avg_turnaround_time,
            overall.throughput,
            overall.makespan,
        );
    }

    // ── Report ────────────────────────────────────────────────────────────────
    if let Some(path) = &cli.report {
        let report = Report {
            workload: workload.name().to_string(),
            results: entries,
        };
        let yaml = serde_yaml::to_string(&report).context("Failed to serialise report")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Cannot write report: {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(failed)
}

fn log_timelines(configuration: &str, sim: &SimulationRun) {
    info!("Timeline: {}", configuration);
    for core in &sim.cores {
        info!("  core {}: {}", core.core, describe_spans(core));
    }
}

/// `P0[0,3) P1[3,5)` style summary of a core's execution.
fn describe_spans(core: &CoreRun) -> String {
    let spans = ordered_spans(&core.timeline);
    if spans.is_empty() {
        return String::from("idle");
    }
    spans
        .iter()
        .map(|(pid, span)| format!("P{}[{},{})", pid, span.start, span.end))
        .collect::<Vec<_>>()
        .join(" ")
}
