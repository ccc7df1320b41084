/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core process data structures for the simulator.
//!
//! Two distinct types model the two sides of a simulation run:
//!
//! ```text
//! workload  ──(ProcessSpec)──►  Process  ──(Core tick loop)──►  Timeline
//!                                 ↑ working copy                  ↑ output
//!                                 one per run                     (time, pid) samples
//! ```
//!
//! # Ownership model
//! `ProcessSpec` is immutable input and can be shared between any number of
//! runs.  Every run builds fresh `Process` records from the specs, so two
//! simulations of the same workload (e.g. under different policies) never
//! share mutable state.  Each `Process` is owned by exactly one
//! [`Core`](crate::cpu::Core) for the duration of the run.

use serde::{Deserialize, Serialize};

use crate::error::ProcessRejection;

/// Simulated time, in ticks.
pub type Tick = u64;

/// Process identifier, unique within one run.
pub type Pid = u32;

/// Wire value used for an idle tick in exported timelines.
pub const IDLE_PID: i64 = -1;

// ── ProcessSpec (input descriptor) ────────────────────────────────────────────

/// Immutable description of one unit of work, as supplied by a workload.
///
/// Timing fields are signed so that malformed descriptors (negative arrival,
/// zero or negative burst) survive parsing and are rejected with a precise
/// [`ProcessRejection`] instead of an opaque deserialisation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub pid: Pid,
    pub arrival_time: i64,
    pub burst_time: i64,
    /// Reserved; no current policy reads it.
    #[serde(default)]
    pub priority: i32,
}

impl ProcessSpec {
    pub fn new(pid: Pid, arrival_time: i64, burst_time: i64) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            priority: 0,
        }
    }
}

// ── Process (per-run working copy) ────────────────────────────────────────────

/// Mutable simulation record for one process.
///
/// Replaces the "deep copy the whole list" approach with a value built from a
/// [`ProcessSpec`] at the start of every run.  `start_time` and
/// `completion_time` are `Option`s rather than sentinels; waiting and
/// turnaround time are derived on demand so they can never disagree with the
/// stamped timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    pub pid: Pid,
    pub arrival_time: Tick,
    pub burst_time: Tick,
    pub remaining_time: Tick,
    pub priority: i32,
    pub start_time: Option<Tick>,
    pub completion_time: Option<Tick>,
}

impl Process {
    /// Validate `spec` and build a fresh record with `remaining_time = burst_time`.
    pub fn from_spec(spec: &ProcessSpec) -> Result<Self, ProcessRejection> {
        if spec.arrival_time < 0 {
            return Err(ProcessRejection::NegativeArrival {
                arrival_time: spec.arrival_time,
            });
        }
        if spec.burst_time <= 0 {
            return Err(ProcessRejection::NonPositiveBurst {
                burst_time: spec.burst_time,
            });
        }

        let burst = spec.burst_time as Tick;
        Ok(Self {
            pid: spec.pid,
            arrival_time: spec.arrival_time as Tick,
            burst_time: burst,
            remaining_time: burst,
            priority: spec.priority,
            start_time: None,
            completion_time: None,
        })
    }

    /// `true` once the process has arrived and still needs CPU time.
    pub fn is_ready(&self, now: Tick) -> bool {
        self.arrival_time <= now && self.remaining_time > 0
    }

    pub fn is_completed(&self) -> bool {
        self.completion_time.is_some()
    }

    /// Execute one tick starting at `now`.
    ///
    /// Stamps `start_time` on the first call and `completion_time = now + 1`
    /// when `remaining_time` reaches zero.  Returns `true` if this tick
    /// completed the process.
    pub fn run_tick(&mut self, now: Tick) -> bool {
        debug_assert!(
            self.is_ready(now),
            "process {} dispatched at t={} while not ready",
            self.pid,
            now
        );

        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.remaining_time = self.remaining_time.saturating_sub(1);

        if self.remaining_time == 0 && self.completion_time.is_none() {
            self.completion_time = Some(now + 1);
            return true;
        }
        false
    }

    /// `completion_time − arrival_time`, once completed.
    pub fn turnaround_time(&self) -> Option<Tick> {
        self.completion_time
            .map(|done| done.saturating_sub(self.arrival_time))
    }

    /// `max(0, turnaround_time − burst_time)`, once completed.
    pub fn waiting_time(&self) -> Option<Tick> {
        self.turnaround_time()
            .map(|tat| tat.saturating_sub(self.burst_time))
    }

    /// Delay between arrival and first dispatch.
    pub fn response_time(&self) -> Option<Tick> {
        self.start_time
            .map(|start| start.saturating_sub(self.arrival_time))
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// One simulated tick on one core.
///
/// `pid` is `None` for an idle tick.  The `-1` sentinel only appears at the
/// export boundary (see [`Sample::wire_pid`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub time: Tick,
    pub pid: Option<Pid>,
}

impl Sample {
    pub fn busy(time: Tick, pid: Pid) -> Self {
        Self {
            time,
            pid: Some(pid),
        }
    }

    pub fn idle(time: Tick) -> Self {
        Self { time, pid: None }
    }

    pub fn is_idle(&self) -> bool {
        self.pid.is_none()
    }

    /// Pid as exported to external consumers: `-1` marks an idle tick.
    pub fn wire_pid(&self) -> i64 {
        self.pid.map_or(IDLE_PID, i64::from)
    }

    /// `(time, pid)` pair in the exported format.
    pub fn as_pair(&self) -> (Tick, i64) {
        (self.time, self.wire_pid())
    }
}

impl Serialize for Sample {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_pair().serialize(serializer)
    }
}

/// Ordered per-core execution record, one [`Sample`] per simulated tick.
pub type Timeline = Vec<Sample>;

/// Convert a timeline to the exported `(time, pid)` pair format.
pub fn timeline_pairs(timeline: &[Sample]) -> Vec<(Tick, i64)> {
    timeline.iter().map(Sample::as_pair).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
