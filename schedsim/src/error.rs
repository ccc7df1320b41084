/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the simulation engine.
//!
//! Two error enums model the two failure layers:
//!
//! * [`ProcessRejection`] — why a single process descriptor was refused
//!   (low-level, carries the offending value).
//! * [`SimError`] — top-level failure returned from
//!   [`Dispatcher::run()`](crate::dispatcher::Dispatcher::run) and
//!   [`Core::run()`](crate::cpu::Core::run).
//!
//! Idle ticks and temporarily empty ready sets are normal states and never
//! produce an error.  The simulation is deterministic, so no variant is
//! retryable: the caller has to change the input or the policy.

use thiserror::Error;

use crate::process::{Pid, Tick};

// ── Descriptor validation ─────────────────────────────────────────────────────

/// Detailed reason why a process descriptor was rejected.
///
/// Carried inside [`SimError::ProcessRejected`] so the caller always knows
/// both *which* process failed and *why*.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessRejection {
    /// `arrival_time` is below zero.
    NegativeArrival { arrival_time: i64 },

    /// `burst_time` is zero or negative; a process must need CPU time.
    NonPositiveBurst { burst_time: i64 },

    /// Another descriptor in the same run already uses this pid.
    DuplicatePid,
}

impl std::fmt::Display for ProcessRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessRejection::NegativeArrival { arrival_time } => {
                write!(f, "arrival time {} is negative", arrival_time)
            }

            ProcessRejection::NonPositiveBurst { burst_time } => {
                write!(f, "burst time {} must be greater than zero", burst_time)
            }

            ProcessRejection::DuplicatePid => {
                write!(f, "pid is already used by another process in this run")
            }
        }
    }
}

// ── Top-level engine errors ───────────────────────────────────────────────────

/// Top-level error type of the simulation engine.
///
/// | Variant | Category |
/// |---|---|
/// | `NoCores` / `NoProcesses` / `InvalidQuantum` | invalid configuration, nothing simulated |
/// | `ProcessRejected` | malformed descriptor, nothing simulated |
/// | `TimeLimitExceeded` | run did not converge |
/// | `CoreTaskFailed` | concurrent core task aborted |
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Zero cores were requested.
    #[error("invalid configuration: at least one core is required")]
    NoCores,

    /// The process set is empty.
    #[error("invalid configuration: process set is empty")]
    NoProcesses,

    /// Round robin was selected with a quantum of zero.
    #[error("invalid configuration: round robin quantum must be positive (got {quantum})")]
    InvalidQuantum { quantum: u64 },

    /// A process descriptor failed validation.
    #[error("process {pid} rejected: {reason}")]
    ProcessRejected { pid: Pid, reason: ProcessRejection },

    /// The safety bound on simulated time was reached before every process
    /// on the core completed.  Points at a pathological input or a policy
    /// that never returns a ready process.
    #[error(
        "core {core} exceeded the simulation time limit of {limit} ticks \
         ({completed}/{total} processes completed)"
    )]
    TimeLimitExceeded {
        core: usize,
        limit: Tick,
        completed: usize,
        total: usize,
    },

    /// A core running on its own task panicked or was cancelled.
    #[error("core {core} task failed: {message}")]
    CoreTaskFailed { core: usize, message: String },
}

impl SimError {
    /// `true` for errors raised before any tick was simulated.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            SimError::NoCores | SimError::NoProcesses | SimError::InvalidQuantum { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_carries_value() {
        let err = SimError::ProcessRejected {
            pid: 4,
            reason: ProcessRejection::NonPositiveBurst { burst_time: 0 },
        };
        assert_eq!(
            err.to_string(),
            "process 4 rejected: burst time 0 must be greater than zero"
        );
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(SimError::NoCores.is_invalid_configuration());
        assert!(SimError::NoProcesses.is_invalid_configuration());
        assert!(SimError::InvalidQuantum { quantum: 0 }.is_invalid_configuration());
        assert!(!SimError::TimeLimitExceeded {
            core: 0,
            limit: 10,
            completed: 0,
            total: 1
        }
        .is_invalid_configuration());
    }
}
