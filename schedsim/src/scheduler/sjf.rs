/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Shortest job first, on *remaining* time.
//!
//! The minimum is recomputed on every call, so a newly arrived short job
//! takes the CPU at the next tick boundary (SRTF at tick granularity).
//! Ties break on arrival time, then pid.

use std::collections::HashSet;

use tracing::trace;

use super::{Scheduler, Slot};
use crate::process::{Pid, Process, Tick};

#[derive(Debug, Default)]
pub struct Sjf {
    queue: Vec<Slot>,
    admitted: HashSet<Pid>,
}

impl Sjf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Sjf {
    fn name(&self) -> &'static str {
        "sjf"
    }

    fn add_process(&mut self, slot: Slot, table: &[Process]) {
        let process = &table[slot];
        if self.admitted.insert(process.pid) {
            self.queue.push(slot);
            trace!(pid = process.pid, burst = process.burst_time, "sjf: admitted");
        }
    }

    fn next_process(&mut self, now: Tick, table: &[Process]) -> Option<Slot> {
        self.queue.retain(|&s| table[s].remaining_time > 0);
        self.queue
            .iter()
            .copied()
            .filter(|&s| table[s].is_ready(now))
            .min_by_key(|&s| {
                let p = &table[s];
                (p.remaining_time, p.arrival_time, p.pid)
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
