/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Multi-core dispatch.
//!
//! [`Dispatcher`] partitions a workload across N simulated cores and runs
//! each core to completion.  The result is a [`SimulationRun`]: one
//! [`CoreRun`] (timeline + finished process records) per core, in core order.
//!
//! # Partitioning
//! Static and decided up front: the validated processes are sorted by
//! arrival time (stable, so equal arrivals keep input order) and sorted index
//! `i` goes to core `i % num_cores`.  There is no rebalancing; a core that
//! draws several long jobs simply finishes later.
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | Stateless `run()`; fresh `Process` records are built from the specs on every call |
//! | Ownership | Every pid is unique in the run, so partitions are disjoint and each `Core` owns its records outright (no locking) |
//! | Parallelism | `run()` is sequential; `run_concurrent()` runs one blocking task per core and joins in core order |
//! | Errors | Configuration and descriptor errors are raised before any core is built |
//!
//! # Example
//! ```rust
//! use schedsim::dispatcher::Dispatcher;
//! use schedsim::process::ProcessSpec;
//! use schedsim::scheduler::{Policy, SchedulerKind};
//!
//! let policy = Policy::new(SchedulerKind::Fcfs, None).unwrap();
//! let dispatcher = Dispatcher::new(2, policy).unwrap();
//! let specs = vec![ProcessSpec::new(0, 0, 3), ProcessSpec::new(1, 1, 2)];
//! let run = dispatcher.run(&specs).unwrap();
//! assert_eq!(run.timelines().len(), 2);
//! ```

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cpu::{Core, CoreRun};
use crate::error::{ProcessRejection, SimError};
use crate::process::{timeline_pairs, Pid, Process, ProcessSpec, Tick};
use crate::scheduler::{Policy, SchedulerKind};

// ── SimulationRun ─────────────────────────────────────────────────────────────

/// Outcome of one dispatcher run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub policy: Policy,
    pub num_cores: usize,
    /// One entry per core, in core order.
    pub cores: Vec<CoreRun>,
}

impl SimulationRun {
    /// Per-core timelines in the exported `(time, pid)` format, idle = `-1`.
    pub fn timelines(&self) -> Vec<Vec<(Tick, i64)>> {
        self.cores
            .iter()
            .map(|core| timeline_pairs(&core.timeline))
            .collect()
    }

    /// Every finished process record, across all cores.
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.cores.iter().flat_map(|core| core.processes.iter())
    }

    /// Latest completion time across all cores.
    pub fn makespan(&self) -> Tick {
        self.cores.iter().map(CoreRun::finish_time).max().unwrap_or(0)
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Multi-core controller: one [`Core`] per requested core, each with a fresh
/// scheduler built from the configured [`Policy`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    num_cores: usize,
    policy: Policy,
    time_limit: Option<Tick>,
}

impl Dispatcher {
    /// # Errors
    /// [`SimError::NoCores`] if `num_cores` is zero.
    pub fn new(num_cores: usize, policy: Policy) -> Result<Self, SimError> {
        if num_cores == 0 {
            return Err(SimError::NoCores);
        }
        Ok(Self {
            num_cores,
            policy,
            time_limit: None,
        })
    }

    /// Build from a policy selector; `quantum` is only used for round robin.
    pub fn from_kind(
        num_cores: usize,
        kind: SchedulerKind,
        quantum: Option<u64>,
    ) -> Result<Self, SimError> {
        Self::new(num_cores, Policy::new(kind, quantum)?)
    }

    /// Override every core's safety bound on simulated time.
    pub fn with_time_limit(mut self, time_limit: Tick) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    // ── Public entry points ───────────────────────────────────────────────────

    /// Simulate `specs` on every core, one core after another.
    ///
    /// # Errors
    /// Configuration and descriptor errors before any simulation;
    /// [`SimError::TimeLimitExceeded`] from the first core that fails to
    /// converge.
    pub fn run(&self, specs: &[ProcessSpec]) -> Result<SimulationRun, SimError> {
        let cores = self.prepare_cores(specs)?;
        let runs = cores
            .into_iter()
            .map(Core::run)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.finish(runs))
    }

    /// Like [`run`](Self::run), but each core runs on its own blocking task.
    ///
    /// Cores share no state, so the result is identical to `run()`.
    pub async fn run_concurrent(&self, specs: &[ProcessSpec]) -> Result<SimulationRun, SimError> {
        let cores = self.prepare_cores(specs)?;

        let handles: Vec<_> = cores
            .into_iter()
            .map(|core| {
                let id = core.id();
                (id, tokio::task::spawn_blocking(move || core.run()))
            })
            .collect();

        let mut runs = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let run = handle.await.map_err(|e| SimError::CoreTaskFailed {
                core: id,
                message: e.to_string(),
            })??;
            runs.push(run);
        }
        Ok(self.finish(runs))
    }

    /// Validate `specs` and split them into one partition per core.
    ///
    /// # Errors
    /// [`SimError::NoProcesses`] for an empty set, [`SimError::ProcessRejected`]
    /// for a malformed or duplicate descriptor.
    pub fn partition(&self, specs: &[ProcessSpec]) -> Result<Vec<Vec<Process>>, SimError> {
        if specs.is_empty() {
            return Err(SimError::NoProcesses);
        }

        let mut seen: HashSet<Pid> = HashSet::with_capacity(specs.len());
        let mut processes = Vec::with_capacity(specs.len());
        for spec in specs {
            let process = Process::from_spec(spec).map_err(|reason| SimError::ProcessRejected {
                pid: spec.pid,
                reason,
            })?;
            if !seen.insert(process.pid) {
                return Err(SimError::ProcessRejected {
                    pid: process.pid,
                    reason: ProcessRejection::DuplicatePid,
                });
            }
            processes.push(process);
        }

        // Stable: equal arrivals keep input order.
        processes.sort_by_key(|p| p.arrival_time);

        let mut partitions: Vec<Vec<Process>> = vec![Vec::new(); self.num_cores];
        for (i, process) in processes.into_iter().enumerate() {
            partitions[i % self.num_cores].push(process);
        }

        for (core, part) in partitions.iter().enumerate() {
            debug!(
                core,
                pids = ?part.iter().map(|p| p.pid).collect::<Vec<_>>(),
                "partition assigned"
            );
        }
        Ok(partitions)
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn prepare_cores(&self, specs: &[ProcessSpec]) -> Result<Vec<Core>, SimError> {
        info!(
            policy = %self.policy,
            cores = self.num_cores,
            processes = specs.len(),
            "=== Dispatcher::run() ==="
        );

        let partitions = self.partition(specs)?;
        if specs.len() < self.num_cores {
            warn!(
                cores = self.num_cores,
                processes = specs.len(),
                "more cores than processes — some cores will stay idle"
            );
        }

        partitions
            .into_iter()
            .enumerate()
            .map(|(id, part)| {
                let core = Core::new(id, part, self.policy.build())?;
                Ok(match self.time_limit {
                    Some(limit) => core.with_time_limit(limit),
                    None => core,
                })
            })
            .collect()
    }

    fn finish(&self, cores: Vec<CoreRun>) -> SimulationRun {
        let run = SimulationRun {
            policy: self.policy,
            num_cores: self.num_cores,
            cores,
        };
        info!(
            policy = %self.policy,
            cores = self.num_cores,
            makespan = run.makespan(),
            "=== Simulation complete ==="
        );
        run
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
