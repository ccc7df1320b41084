/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! schedsim – multi-core CPU scheduling simulator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── process      – ProcessSpec input, Process working copy, timeline samples
//! ├── scheduler/   – Scheduler trait, Policy factory, FCFS / RR / SJF
//! ├── cpu          – single-core tick engine
//! ├── dispatcher   – static partitioning across cores, sequential or concurrent
//! ├── stats/       – per-process, per-core and overall metrics, span reconstruction
//! ├── config/      – YAML workloads and built-in process sets
//! └── error        – engine error types
//! ```

pub mod config;
pub mod cpu;
pub mod dispatcher;
pub mod error;
pub mod process;
pub mod scheduler;
pub mod stats;
