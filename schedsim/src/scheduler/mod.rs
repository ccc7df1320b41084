//! Scheduling policies for the per-core simulation.
//!
//! Every policy implements the two-method [`Scheduler`] capability set and is
//! selected at runtime through [`Policy`], never through type inspection.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | Process storage | The owning [`Core`](crate::cpu::Core) keeps the process table; schedulers only hold [`Slot`] indices into it |
//! | Queries | `next_process` reads the table immutably; a policy can reorder its own queue but never touch `remaining_time` |
//! | Admission | Idempotent per pid; admission may precede arrival, selection never does |
//! | Thread safety | `Scheduler: Send` so each core can run on its own task |
//!
//! # Example
//! ```rust
//! use schedsim::scheduler::{Policy, Scheduler, SchedulerKind};
//!
//! let policy = Policy::new(SchedulerKind::RoundRobin, Some(2)).unwrap();
//! let scheduler = policy.build();
//! assert_eq!(scheduler.name(), "rr");
//! ```

pub mod fcfs;
pub mod round_robin;
pub mod sjf;

pub use fcfs::Fcfs;
pub use round_robin::RoundRobin;
pub use sjf::Sjf;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::process::{Process, Tick};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Quantum used for round robin when none is configured.
pub const DEFAULT_QUANTUM: u64 = 4;

/// Index of a process in its core's process table.
pub type Slot = usize;

// ── Scheduler trait ───────────────────────────────────────────────────────────

/// Policy capability set consulted by the core tick loop.
pub trait Scheduler: Send {
    /// Short policy name used in logs (`fcfs`, `rr`, `sjf`).
    fn name(&self) -> &'static str;

    /// Admit the process at `slot` into the ready set.
    ///
    /// Re-admitting a pid that was already admitted is a no-op.
    fn add_process(&mut self, slot: Slot, table: &[Process]);

    /// Pick the process that occupies the CPU during the tick starting at
    /// `now`, or `None` to idle.
    ///
    /// Only processes with `arrival_time <= now` and `remaining_time > 0` are
    /// candidates.
    fn next_process(&mut self, now: Tick, table: &[Process]) -> Option<Slot>;
}

// ── Policy selection ──────────────────────────────────────────────────────────

/// Selector for a scheduling policy, as it appears on the command line and
/// in workload files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum SchedulerKind {
    /// First-come, first-served (non-preemptive).
    #[serde(rename = "fcfs")]
    #[value(name = "fcfs")]
    Fcfs,
    /// Round robin with a fixed quantum.
    #[serde(rename = "rr")]
    #[value(name = "rr")]
    RoundRobin,
    /// Shortest remaining time first.
    #[serde(rename = "sjf")]
    #[value(name = "sjf")]
    Sjf,
}

impl SchedulerKind {
    pub const ALL: [SchedulerKind; 3] = [
        SchedulerKind::Fcfs,
        SchedulerKind::RoundRobin,
        SchedulerKind::Sjf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchedulerKind::Fcfs => "fcfs",
            SchedulerKind::RoundRobin => "rr",
            SchedulerKind::Sjf => "sjf",
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated policy: the selector plus the parameters only some variants
/// take.  Acts as the factory for per-core scheduler instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Policy {
    Fcfs,
    RoundRobin { quantum: u64 },
    Sjf,
}

impl Policy {
    /// Build a policy from a selector and an optional quantum.
    ///
    /// The quantum is ignored for FCFS and SJF.  Round robin falls back to
    /// [`DEFAULT_QUANTUM`] when `quantum` is `None`.
    ///
    /// # Errors
    /// [`SimError::InvalidQuantum`] when round robin is given a quantum of 0.
    pub fn new(kind: SchedulerKind, quantum: Option<u64>) -> Result<Self, SimError> {
        match kind {
            SchedulerKind::Fcfs => Ok(Policy::Fcfs),
            SchedulerKind::Sjf => Ok(Policy::Sjf),
            SchedulerKind::RoundRobin => {
                let quantum = quantum.unwrap_or(DEFAULT_QUANTUM);
                if quantum == 0 {
                    return Err(SimError::InvalidQuantum { quantum });
                }
                Ok(Policy::RoundRobin { quantum })
            }
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        match self {
            Policy::Fcfs => SchedulerKind::Fcfs,
            Policy::RoundRobin { .. } => SchedulerKind::RoundRobin,
            Policy::Sjf => SchedulerKind::Sjf,
        }
    }

    pub fn quantum(&self) -> Option<u64> {
        match self {
            Policy::RoundRobin { quantum } => Some(*quantum),
            _ => None,
        }
    }

    /// Construct a fresh scheduler instance for one core.
    pub fn build(&self) -> Box<dyn Scheduler> {
        match *self {
            Policy::Fcfs => Box::new(Fcfs::new()),
            Policy::RoundRobin { quantum } => Box::new(RoundRobin::new(quantum)),
            Policy::Sjf => Box::new(Sjf::new()),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "FCFS"),
            Policy::RoundRobin { quantum } => write!(f, "Round Robin (q={})", quantum),
            Policy::Sjf => write!(f, "SJF"),
        }
    }
}

// ── Test helpers ──────────────────────────────────────────────────────────────

/// Build a process table from `(pid, arrival, burst)` triples.
#[cfg(test)]
pub(crate) fn table(specs: &[(u32, i64, i64)]) -> Vec<Process> {
    use crate::process::ProcessSpec;

    specs
        .iter()
        .map(|&(pid, arrival, burst)| {
            Process::from_spec(&ProcessSpec::new(pid, arrival, burst)).unwrap()
        })
        .collect()
}

/// Drive `scheduler` the way a core does (admit on arrival, one tick per
/// call) until every process finishes, returning the selected pid per tick.
#[cfg(test)]
pub(crate) fn drive(scheduler: &mut dyn Scheduler, table: &mut [Process]) -> Vec<Option<u32>> {
    let mut picks = Vec::new();
    let mut now: Tick = 0;
    while table.iter().any(|p| !p.is_completed()) {
        for slot in 0..table.len() {
            if table[slot].arrival_time <= now {
                scheduler.add_process(slot, table);
            }
        }
        match scheduler.next_process(now, table) {
            Some(slot) => {
                picks.push(Some(table[slot].pid));
                table[slot].run_tick(now);
            }
            None => picks.push(None),
        }
        now += 1;
        assert!(now < 1_000, "scheduler did not converge");
    }
    picks
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_defaults_quantum() {
        let policy = Policy::new(SchedulerKind::RoundRobin, None).unwrap();
        assert_eq!(policy, Policy::RoundRobin { quantum: DEFAULT_QUANTUM });
    }

    #[test]
    fn round_robin_rejects_zero_quantum() {
        let err = Policy::new(SchedulerKind::RoundRobin, Some(0)).unwrap_err();
        assert_eq!(err, SimError::InvalidQuantum { quantum: 0 });
    }

    #[test]
    fn quantum_is_ignored_outside_round_robin() {
        assert_eq!(Policy::new(SchedulerKind::Fcfs, Some(0)).unwrap(), Policy::Fcfs);
        assert_eq!(Policy::new(SchedulerKind::Sjf, Some(3)).unwrap().quantum(), None);
    }

    #[test]
    fn factory_builds_matching_scheduler() {
        for kind in SchedulerKind::ALL {
            let policy = Policy::new(kind, Some(2)).unwrap();
            assert_eq!(policy.kind(), kind);
            assert_eq!(policy.build().name(), kind.as_str());
        }
    }

    #[test]
    fn kind_parses_from_yaml_names() {
        let kinds: Vec<SchedulerKind> = serde_yaml::from_str("[fcfs, rr, sjf]").unwrap();
        assert_eq!(kinds, SchedulerKind::ALL.to_vec());
    }

    #[test]
    fn display_names_are_human_readable() {
        assert_eq!(Policy::Fcfs.to_string(), "FCFS");
        assert_eq!(Policy::RoundRobin { quantum: 3 }.to_string(), "Round Robin (q=3)");
        assert_eq!(Policy::Sjf.to_string(), "SJF");
    }
}
