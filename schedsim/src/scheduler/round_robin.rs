/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Round robin with a fixed quantum.
//!
//! State is a rotation of admitted slots plus a `running` slot with a
//! per-slice tick counter:
//!
//! ```text
//!   running ──(returned each call)──► slice_used += 1
//!      │
//!      ├─ slice_used == quantum      ─┐
//!      └─ remaining_time <= 1        ─┴─► running = None
//!
//!   running == None ──► rotate head → tail until a ready slot is found
//!                       (one full pass without a hit = idle)
//! ```
//!
//! The release on `remaining_time <= 1` happens while the process runs its
//! final tick, so the next call advances the rotation instead of spending a
//! lookup on a finished process.  Not-yet-arrived and finished slots are
//! skipped but stay in the rotation.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use super::{Scheduler, Slot};
use crate::process::{Pid, Process, Tick};

#[derive(Debug)]
pub struct RoundRobin {
    quantum: u64,
    rotation: VecDeque<Slot>,
    admitted: HashSet<Pid>,
    running: Option<Slot>,
    /// Ticks the `running` process has used in its current slice.
    slice_used: u64,
}

impl RoundRobin {
    /// `quantum` must be positive; [`Policy::new`](super::Policy::new)
    /// validates it before construction.
    pub fn new(quantum: u64) -> Self {
        debug_assert!(quantum > 0, "round robin quantum must be positive");
        Self {
            quantum,
            rotation: VecDeque::new(),
            admitted: HashSet::new(),
            running: None,
            slice_used: 0,
        }
    }

    pub fn quantum(&self) -> u64 {
        self.quantum
    }

    /// Account one tick of `slot`'s slice and release the running slot when
    /// the quantum is spent or the process is on its last tick.
    fn charge_slice(&mut self, slot: Slot, table: &[Process]) -> Slot {
        self.slice_used += 1;
        let remaining = table[slot].remaining_time;

        if self.slice_used >= self.quantum || remaining <= 1 {
            trace!(
                pid = table[slot].pid,
                slice_used = self.slice_used,
                remaining,
                "rr: slice ends"
            );
            self.running = None;
            self.slice_used = 0;
        } else {
            self.running = Some(slot);
        }
        slot
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "rr"
    }

    fn add_process(&mut self, slot: Slot, table: &[Process]) {
        let process = &table[slot];
        if self.admitted.insert(process.pid) {
            self.rotation.push_back(slot);
            trace!(pid = process.pid, queued = self.rotation.len(), "rr: admitted");
        }
    }

    fn next_process(&mut self, now: Tick, table: &[Process]) -> Option<Slot> {
        if let Some(slot) = self.running {
            if table[slot].is_ready(now) {
                return Some(self.charge_slice(slot, table));
            }
            self.running = None;
            self.slice_used = 0;
        }

        for _ in 0..self.rotation.len() {
            let slot = self.rotation.pop_front()?;
            self.rotation.push_back(slot);
            if table[slot].is_ready(now) {
                self.slice_used = 0;
                return Some(self.charge_slice(slot, table));
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{drive, table};

    #[test]
    fn alternates_slices_of_quantum_length() {
        let mut procs = table(&[(0, 0, 3), (1, 0, 3)]);
        let picks = drive(&mut RoundRobin::new(2), &mut procs);
        assert_eq!(
            picks,
            vec![Some(0), Some(0), Some(1), Some(1), Some(0), Some(1)]
        );
        assert_eq!(procs[0].completion_time, Some(5));
        assert_eq!(procs[1].completion_time, Some(6));
    }

    #[test]
    fn quantum_one_rotates_every_tick() {
        let mut procs = table(&[(0, 0, 2), (1, 0, 2), (2, 0, 2)]);
        let picks = drive(&mut RoundRobin::new(1), &mut procs);
        assert_eq!(
            picks,
            vec![Some(0), Some(1), Some(2), Some(0), Some(1), Some(2)]
        );
    }

    #[test]
    fn lone_process_keeps_the_cpu_across_slices() {
        let mut procs = table(&[(0, 0, 5)]);
        let picks = drive(&mut RoundRobin::new(2), &mut procs);
        assert_eq!(picks, vec![Some(0); 5]);
    }

    #[test]
    fn releases_running_slot_on_final_tick() {
        let procs = table(&[(0, 0, 1), (1, 0, 4)]);
        let mut rr = RoundRobin::new(4);
        rr.add_process(0, &procs);
        rr.add_process(1, &procs);

        assert_eq!(rr.next_process(0, &procs), Some(0));
        assert!(rr.running.is_none(), "last tick must clear the running slot");
        assert_eq!(rr.slice_used, 0);
    }

    #[test]
    fn skips_unarrived_but_keeps_them_in_rotation() {
        let procs = table(&[(0, 5, 2), (1, 0, 2)]);
        let mut rr = RoundRobin::new(2);
        rr.add_process(0, &procs);
        rr.add_process(1, &procs);

        assert_eq!(rr.next_process(0, &procs), Some(1));
        assert_eq!(rr.rotation.len(), 2);
        assert!(rr.rotation.contains(&0));
    }

    #[test]
    fn full_pass_without_ready_candidate_is_idle() {
        let procs = table(&[(0, 3, 1), (1, 4, 1)]);
        let mut rr = RoundRobin::new(2);
        rr.add_process(0, &procs);
        rr.add_process(1, &procs);
        assert_eq!(rr.next_process(0, &procs), None);
        assert_eq!(rr.next_process(2, &procs), None);
    }

    #[test]
    fn late_arrival_joins_tail_of_rotation() {
        // P2 arrives at t=1 while P0 holds a slice; it runs after P1.
        let mut procs = table(&[(0, 0, 2), (1, 0, 2), (2, 1, 2)]);
        let picks = drive(&mut RoundRobin::new(2), &mut procs);
        assert_eq!(
            picks,
            vec![Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)]
        );
    }

    #[test]
    fn preempts_within_quantum() {
        let mut procs = table(&[(0, 0, 7), (1, 0, 7)]);
        let quantum = 3;
        let picks = drive(&mut RoundRobin::new(quantum), &mut procs);

        // Equal bursts finish on the same slice boundary, so every
        // consecutive run is bounded by the quantum.
        let mut run = 0;
        let mut prev = None;
        for pick in picks {
            run = if pick == prev { run + 1 } else { 1 };
            prev = pick;
            assert!(run <= quantum, "slice of {run} ticks exceeds quantum {quantum}");
        }
    }

    #[test]
    fn re_adding_a_pid_is_a_noop() {
        let procs = table(&[(0, 0, 2)]);
        let mut rr = RoundRobin::new(2);
        rr.add_process(0, &procs);
        rr.add_process(0, &procs);
        assert_eq!(rr.rotation.len(), 1);
    }
}
