/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-core tick engine.
//!
//! A [`Core`] owns its partition of the workload and one scheduler instance,
//! and advances simulated time exactly one tick per loop iteration:
//!
//! ```text
//! RUNNING (completed < total)
//!   1. admit every partition process with arrival_time <= now
//!   2. ask the scheduler for this tick's process
//!   3a. process → stamp start, remaining -= 1, record (now, pid),
//!                 on remaining == 0 stamp completion = now + 1
//!   3b. none    → record (now, idle)
//!   4. now += 1
//! DONE    (completed == total)
//! ```
//!
//! The loop is bounded by a time limit derived from the partition (see
//! [`TIME_LIMIT_FACTOR`]).  Hitting it fails the run with
//! [`SimError::TimeLimitExceeded`]; the partial timeline is discarded.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::error::{ProcessRejection, SimError};
use crate::process::{Pid, Process, Sample, Tick, Timeline};
use crate::scheduler::Scheduler;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Safety bound multiplier.
///
/// Any work-conserving policy finishes a partition by
/// `max_arrival + total_burst`; the loop gives up at this many times that.
pub const TIME_LIMIT_FACTOR: Tick = 4;

// ── CoreRun ───────────────────────────────────────────────────────────────────

/// Result of one core's completed simulation.
#[derive(Debug, Clone, Serialize)]
pub struct CoreRun {
    /// Index of the core within the dispatcher.
    pub core: usize,

    /// One sample per simulated tick, starting at t = 0.
    pub timeline: Timeline,

    /// The core's partition, every record completed, ordered by arrival.
    pub processes: Vec<Process>,

    /// Number of times the CPU moved from one process to a different one.
    /// Idle gaps between two slices of the same process are not counted.
    pub context_switches: usize,
}

impl CoreRun {
    /// Tick at which the last process on this core completed (0 if the core
    /// had nothing to run).
    pub fn finish_time(&self) -> Tick {
        self.processes
            .iter()
            .filter_map(|p| p.completion_time)
            .max()
            .unwrap_or(0)
    }

    pub fn busy_ticks(&self) -> usize {
        self.timeline.iter().filter(|s| !s.is_idle()).count()
    }

    pub fn idle_ticks(&self) -> usize {
        self.timeline.len() - self.busy_ticks()
    }
}

// ── Core ──────────────────────────────────────────────────────────────────────

/// One simulated CPU core.
pub struct Core {
    id: usize,
    /// Process table, sorted by arrival time (stable).  Scheduler slots index
    /// into this vector.
    processes: Vec<Process>,
    scheduler: Box<dyn Scheduler>,
    /// Slots below this index have been offered to the scheduler.
    admit_cursor: usize,
    time_limit: Tick,
}

impl Core {
    /// Create a core over `processes` driven by `scheduler`.
    ///
    /// # Errors
    /// [`SimError::ProcessRejected`] with [`ProcessRejection::DuplicatePid`]
    /// if two processes in the partition share a pid.
    pub fn new(
        id: usize,
        mut processes: Vec<Process>,
        scheduler: Box<dyn Scheduler>,
    ) -> Result<Self, SimError> {
        let mut seen: HashSet<Pid> = HashSet::with_capacity(processes.len());
        for p in &processes {
            if !seen.insert(p.pid) {
                return Err(SimError::ProcessRejected {
                    pid: p.pid,
                    reason: ProcessRejection::DuplicatePid,
                });
            }
        }

        processes.sort_by_key(|p| p.arrival_time);
        let time_limit = default_time_limit(&processes);

        Ok(Self {
            id,
            processes,
            scheduler,
            admit_cursor: 0,
            time_limit,
        })
    }

    /// Override the safety bound on simulated time.
    pub fn with_time_limit(mut self, time_limit: Tick) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn time_limit(&self) -> Tick {
        self.time_limit
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Run the tick loop until every process on this core completes.
    ///
    /// # Errors
    /// [`SimError::TimeLimitExceeded`] if simulated time passes the limit
    /// first.
    pub fn run(mut self) -> Result<CoreRun, SimError> {
        let total = self.processes.len();
        let mut completed = 0usize;
        let mut now: Tick = 0;
        let mut timeline: Timeline = Vec::new();
        let mut last_pid: Option<Pid> = None;
        let mut context_switches = 0usize;

        debug!(
            core = self.id,
            scheduler = self.scheduler.name(),
            processes = total,
            time_limit = self.time_limit,
            "core starting"
        );

        while completed < total {
            if now > self.time_limit {
                warn!(
                    core = self.id,
                    scheduler = self.scheduler.name(),
                    limit = self.time_limit,
                    completed,
                    total,
                    "simulation time limit exceeded — abandoning run"
                );
                return Err(SimError::TimeLimitExceeded {
                    core: self.id,
                    limit: self.time_limit,
                    completed,
                    total,
                });
            }

            self.admit_arrivals(now);

            let picked = self
                .scheduler
                .next_process(now, &self.processes)
                .filter(|&slot| self.processes[slot].is_ready(now));

            match picked {
                Some(slot) => {
                    let process = &mut self.processes[slot];
                    let pid = process.pid;
                    if last_pid.is_some_and(|prev| prev != pid) {
                        context_switches += 1;
                    }
                    last_pid = Some(pid);

                    let done = process.run_tick(now);
                    timeline.push(Sample::busy(now, pid));
                    trace!(core = self.id, t = now, pid, remaining = process.remaining_time, "tick");

                    if done {
                        completed += 1;
                        debug!(
                            core = self.id,
                            pid,
                            completion = ?process.completion_time,
                            turnaround = ?process.turnaround_time(),
                            waiting = ?process.waiting_time(),
                            "✓ process completed"
                        );
                    }
                }
                None => {
                    timeline.push(Sample::idle(now));
                    trace!(core = self.id, t = now, "idle");
                }
            }

            now += 1;
        }

        info!(
            core = self.id,
            scheduler = self.scheduler.name(),
            processes = total,
            ticks = timeline.len(),
            context_switches,
            "core finished"
        );

        Ok(CoreRun {
            core: self.id,
            timeline,
            processes: self.processes,
            context_switches,
        })
    }

    /// Offer every process with `arrival_time <= now` that has not been
    /// offered yet.  The table is arrival-sorted, so arrivals are a
    /// contiguous run starting at the cursor.
    fn admit_arrivals(&mut self, now: Tick) {
        while let Some(process) = self.processes.get(self.admit_cursor) {
            if process.arrival_time > now {
                break;
            }
            if !process.is_completed() {
                self.scheduler.add_process(self.admit_cursor, &self.processes);
                trace!(core = self.id, t = now, pid = process.pid, "admitted");
            }
            self.admit_cursor += 1;
        }
    }
}

/// `TIME_LIMIT_FACTOR × (max_arrival + total_burst)`.
fn default_time_limit(processes: &[Process]) -> Tick {
    let max_arrival = processes.iter().map(|p| p.arrival_time).max().unwrap_or(0);
    let total_burst: Tick = processes.iter().map(|p| p.burst_time).sum();
    TIME_LIMIT_FACTOR.saturating_mul(max_arrival.saturating_add(total_burst))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
