/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! First-come, first-served.
//!
//! The ready queue is kept ordered by `(arrival_time, admission order)`.  Once
//! a process is selected it occupies the `running` slot and is returned on
//! every call until it completes; FCFS never preempts.

use std::collections::HashSet;

use tracing::trace;

use super::{Scheduler, Slot};
use crate::process::{Pid, Process, Tick};

#[derive(Debug, Default)]
pub struct Fcfs {
    /// Admitted slots ordered by arrival, ties in admission order.
    queue: Vec<Slot>,
    admitted: HashSet<Pid>,
    running: Option<Slot>,
}

impl Fcfs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Fcfs {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn add_process(&mut self, slot: Slot, table: &[Process]) {
        let process = &table[slot];
        if !self.admitted.insert(process.pid) {
            return;
        }

        // Insert after every slot with the same or earlier arrival so equal
        // arrivals keep admission order.
        let arrival = process.arrival_time;
        let pos = self
            .queue
            .partition_point(|&s| table[s].arrival_time <= arrival);
        self.queue.insert(pos, slot);
        trace!(pid = process.pid, arrival, position = pos, "fcfs: admitted");
    }

    fn next_process(&mut self, now: Tick, table: &[Process]) -> Option<Slot> {
        if let Some(slot) = self.running {
            if table[slot].is_ready(now) {
                return Some(slot);
            }
            self.running = None;
        }

        self.queue.retain(|&s| table[s].remaining_time > 0);
        self.running = self.queue.iter().copied().find(|&s| table[s].is_ready(now));
        self.running
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
