/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Performance statistics derived from a finished [`SimulationRun`].
//!
//! | Metric | Definition |
//! |---|---|
//! | turnaround | `completion − arrival` |
//! | waiting | `max(0, turnaround − burst)` |
//! | response | `start − arrival` |
//! | makespan | latest completion across all cores |
//! | throughput | `completed / makespan` (0 when makespan is 0) |
//! | utilisation | busy ticks / simulated ticks, per core |

pub mod spans;

use serde::Serialize;

use crate::cpu::CoreRun;
use crate::dispatcher::SimulationRun;
use crate::process::{Pid, Process, Tick};
use crate::scheduler::Policy;

pub use spans::{execution_spans, ordered_spans, Span};

/// Timing of one completed process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    pub pid: Pid,
    pub core: usize,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub start_time: Tick,
    pub completion_time: Tick,
    pub turnaround_time: Tick,
    pub waiting_time: Tick,
    pub response_time: Tick,
}

impl ProcessMetrics {
    /// `None` if `process` has not completed.
    pub fn from_process(core: usize, process: &Process) -> Option<Self> {
        Some(Self {
            pid: process.pid,
            core,
            arrival_time: process.arrival_time,
            burst_time: process.burst_time,
            start_time: process.start_time?,
            completion_time: process.completion_time?,
            turnaround_time: process.turnaround_time()?,
            waiting_time: process.waiting_time()?,
            response_time: process.response_time()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreStats {
    pub core: usize,
    pub completed: usize,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub busy_ticks: usize,
    pub idle_ticks: usize,
    pub utilization: f64,
    pub context_switches: usize,
    pub finish_time: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_completed: usize,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    pub makespan: Tick,
    pub throughput: f64,
}

/// Everything a report needs for one policy × core-count configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub policy: Policy,
    pub num_cores: usize,
    pub processes: Vec<ProcessMetrics>,
    pub cores: Vec<CoreStats>,
    pub overall: OverallStats,
}

/// Compute per-process, per-core and overall statistics for `run`.
///
/// Processes without a completion time are left out; a successful run has
/// none.
pub fn compute(run: &SimulationRun) -> SimulationStats {
    let mut processes: Vec<ProcessMetrics> = run
        .cores
        .iter()
        .flat_map(|core| {
            core.processes
                .iter()
                .filter_map(move |p| ProcessMetrics::from_process(core.core, p))
        })
        .collect();
    processes.sort_by_key(|m| m.pid);

    let cores = run.cores.iter().map(core_stats).collect();

    let makespan = run.makespan();
    let total_completed = processes.len();
    let throughput = if makespan > 0 {
        total_completed as f64 / makespan as f64
    } else {
        0.0
    };

    let overall = OverallStats {
        total_completed,
        avg_waiting_time: mean(processes.iter().map(|m| m.waiting_time)),
        avg_turnaround_time: mean(processes.iter().map(|m| m.turnaround_time)),
        avg_response_time: mean(processes.iter().map(|m| m.response_time)),
        makespan,
        throughput,
    };

    SimulationStats {
        policy: run.policy,
        num_cores: run.num_cores,
        processes,
        cores,
        overall,
    }
}

fn core_stats(run: &CoreRun) -> CoreStats {
    let done: Vec<&Process> = run.processes.iter().filter(|p| p.is_completed()).collect();
    let busy_ticks = run.busy_ticks();
    let utilization = if run.timeline.is_empty() {
        0.0
    } else {
        busy_ticks as f64 / run.timeline.len() as f64
    };

    CoreStats {
        core: run.core,
        completed: done.len(),
        avg_waiting_time: mean(done.iter().filter_map(|p| p.waiting_time())),
        avg_turnaround_time: mean(done.iter().filter_map(|p| p.turnaround_time())),
        busy_ticks,
        idle_ticks: run.idle_ticks(),
        utilization,
        context_switches: run.context_switches,
        finish_time: run.finish_time(),
    }
}

/// Arithmetic mean, `0.0` for an empty sequence.
fn mean(values: impl Iterator<Item = Tick>) -> f64 {
    let (sum, count) = values.fold((0u64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::process::ProcessSpec;
    use crate::scheduler::SchedulerKind;

    fn simulate(kind: SchedulerKind, cores: usize, raw: &[(u32, i64, i64)]) -> SimulationStats {
        let specs: Vec<ProcessSpec> = raw
            .iter()
            .map(|&(pid, arrival, burst)| ProcessSpec::new(pid, arrival, burst))
            .collect();
        let run = Dispatcher::from_kind(cores, kind, Some(2))
            .unwrap()
            .run(&specs)
            .unwrap();
        compute(&run)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fcfs_scenario_statistics() {
        let stats = simulate(SchedulerKind::Fcfs, 1, &[(0, 0, 3), (1, 1, 2)]);

        assert_eq!(stats.processes[0].waiting_time, 0);
        assert_eq!(stats.processes[0].turnaround_time, 3);
        assert_eq!(stats.processes[1].waiting_time, 2);
        assert_eq!(stats.processes[1].turnaround_time, 4);

        assert!(approx(stats.overall.avg_waiting_time, 1.0));
        assert!(approx(stats.overall.avg_turnaround_time, 3.5));
        assert_eq!(stats.overall.makespan, 5);
        assert!(approx(stats.overall.throughput, 0.4));
    }

    #[test]
    fn waiting_equals_turnaround_minus_burst() {
        let raw = [(0, 0, 3), (1, 1, 5), (2, 2, 2), (3, 4, 4), (4, 6, 3)];
        for kind in SchedulerKind::ALL {
            let stats = simulate(kind, 2, &raw);
            assert_eq!(stats.overall.total_completed, raw.len(), "{kind}");
            for m in &stats.processes {
                assert_eq!(m.turnaround_time, m.completion_time - m.arrival_time);
                assert_eq!(m.waiting_time, m.turnaround_time - m.burst_time, "{kind}: pid {}", m.pid);
                assert!(m.response_time <= m.waiting_time, "{kind}: pid {}", m.pid);
            }
        }
    }

    #[test]
    fn core_stats_count_busy_and_idle_ticks() {
        let stats = simulate(SchedulerKind::Fcfs, 1, &[(0, 2, 2)]);
        let core = &stats.cores[0];
        assert_eq!(core.busy_ticks, 2);
        assert_eq!(core.idle_ticks, 2);
        assert!(approx(core.utilization, 0.5));
        assert_eq!(core.finish_time, 4);
        assert_eq!(core.context_switches, 0);
    }

    #[test]
    fn idle_core_reports_zeroes() {
        let stats = simulate(SchedulerKind::Sjf, 3, &[(0, 0, 1)]);
        let idle = &stats.cores[2];
        assert_eq!(idle.completed, 0);
        assert!(approx(idle.utilization, 0.0));
        assert!(approx(idle.avg_waiting_time, 0.0));
    }

    #[test]
    fn mean_of_empty_sequence_is_zero() {
        assert!(approx(mean(std::iter::empty()), 0.0));
        assert!(approx(mean([1, 2, 4].into_iter()), 7.0 / 3.0));
    }
}
