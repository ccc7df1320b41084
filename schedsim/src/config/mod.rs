//! Workload loading and management.
//!
//! A workload is the process set to simulate plus optional defaults for the
//! comparison matrix.  The expected YAML structure is:
//! ```yaml
//! processes:
//!   - { pid: 0, arrival_time: 0, burst_time: 3, priority: 1 }
//!   - { pid: 1, arrival_time: 1, burst_time: 5 }
//! simulation:
//!   algorithms: [fcfs, rr, sjf]
//!   cores: [1, 2]
//!   quantum: 2
//! ```
//!
//! Descriptor values are not validated here; the dispatcher rejects malformed
//! processes with a precise error when a run starts.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::process::ProcessSpec;
use crate::scheduler::{SchedulerKind, DEFAULT_QUANTUM};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Deserialize)]
struct WorkloadFile {
    #[serde(default)]
    processes: Vec<ProcessSpec>,
    #[serde(default)]
    simulation: Option<SimulationEntry>,
}

/// `simulation:` block.  Every field is optional; missing values fall back
/// to [`SimulationSettings::default`].
#[derive(Debug, Deserialize)]
struct SimulationEntry {
    #[serde(default)]
    algorithms: Vec<SchedulerKind>,
    #[serde(default)]
    cores: Vec<usize>,
    quantum: Option<u64>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Comparison matrix defaults: every algorithm is run on every core count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    pub algorithms: Vec<SchedulerKind>,
    pub cores: Vec<usize>,
    /// Round robin quantum.
    pub quantum: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            algorithms: SchedulerKind::ALL.to_vec(),
            cores: vec![1],
            quantum: DEFAULT_QUANTUM,
        }
    }
}

impl SimulationSettings {
    fn from_entry(entry: SimulationEntry) -> Self {
        let defaults = Self::default();
        Self {
            algorithms: if entry.algorithms.is_empty() {
                defaults.algorithms
            } else {
                entry.algorithms
            },
            cores: if entry.cores.is_empty() {
                defaults.cores
            } else {
                entry.cores
            },
            quantum: entry.quantum.unwrap_or(defaults.quantum),
        }
    }
}

/// Process sets compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BuiltinSet {
    /// Five processes with staggered arrivals.
    Small,
    /// Eight processes mixing long and short bursts.
    Fixed,
}

impl BuiltinSet {
    pub fn name(self) -> &'static str {
        match self {
            BuiltinSet::Small => "small",
            BuiltinSet::Fixed => "fixed",
        }
    }

    pub fn processes(self) -> Vec<ProcessSpec> {
        let raw: &[(u32, i64, i64)] = match self {
            BuiltinSet::Small => &[(0, 0, 3), (1, 1, 5), (2, 2, 2), (3, 4, 4), (4, 6, 3)],
            BuiltinSet::Fixed => &[
                (0, 0, 8),
                (1, 1, 4),
                (2, 2, 9),
                (3, 3, 5),
                (4, 4, 2),
                (5, 6, 6),
                (6, 8, 3),
                (7, 10, 1),
            ],
        };
        raw.iter()
            .map(|&(pid, arrival, burst)| ProcessSpec::new(pid, arrival, burst))
            .collect()
    }
}

// ── WorkloadManager ───────────────────────────────────────────────────────────

/// Loads and holds the workload for a simulation session.
#[derive(Debug, Default)]
pub struct WorkloadManager {
    name: String,
    processes: Vec<ProcessSpec>,
    settings: SimulationSettings,

    /// Set to `true` after a successful load.
    loaded: bool,
}

impl WorkloadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces the current workload.
    ///
    /// An empty `processes:` list is accepted with a warning; the dispatcher
    /// rejects it when a run is attempted.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading workload from: {}", path.display());

        // Reset state before (re-)loading
        self.processes.clear();
        self.settings = SimulationSettings::default();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

        let file: WorkloadFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        for spec in &file.processes {
            debug!(
                "  Process: {} | arrival: {} | burst: {} | priority: {}",
                spec.pid, spec.arrival_time, spec.burst_time, spec.priority
            );
        }
        if file.processes.is_empty() {
            warn!("No processes found in workload file: {}", path.display());
        }

        self.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.processes = file.processes;
        if let Some(entry) = file.simulation {
            self.settings = SimulationSettings::from_entry(entry);
        }
        self.loaded = true;

        info!(
            workload = %self.name,
            processes = self.processes.len(),
            algorithms = ?self.settings.algorithms,
            cores = ?self.settings.cores,
            quantum = self.settings.quantum,
            "Workload loaded"
        );
        Ok(())
    }

    /// Replace the current workload with a built-in set and default settings.
    pub fn load_builtin(&mut self, set: BuiltinSet) {
        self.name = set.name().to_string();
        self.processes = set.processes();
        self.settings = SimulationSettings::default();
        self.loaded = true;
        info!(
            workload = %self.name,
            processes = self.processes.len(),
            "Using built-in workload"
        );
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn processes(&self) -> &[ProcessSpec] {
        &self.processes
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_full_workload() {
        let yaml = r#"
processes:
  - { pid: 0, arrival_time: 0, burst_time: 3, priority: 1 }
  - { pid: 1, arrival_time: 1, burst_time: 5 }
  - pid: 2
    arrival_time: 2
    burst_time: 2
simulation:
  algorithms: [rr, sjf]
  cores: [1, 4]
  quantum: 2
"#;
        let f = yaml_tempfile(yaml);
        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert!(mgr.is_loaded());
        assert_eq!(mgr.processes().len(), 3);
        assert_eq!(mgr.processes()[0].priority, 1);
        assert_eq!(mgr.processes()[1].priority, 0, "priority defaults to 0");
        assert_eq!(mgr.processes()[2], ProcessSpec::new(2, 2, 2));

        let settings = mgr.settings();
        assert_eq!(
            settings.algorithms,
            vec![SchedulerKind::RoundRobin, SchedulerKind::Sjf]
        );
        assert_eq!(settings.cores, vec![1, 4]);
        assert_eq!(settings.quantum, 2);
    }

    #[test]
    fn missing_simulation_block_uses_defaults() {
        let f = yaml_tempfile("processes:\n  - { pid: 0, arrival_time: 0, burst_time: 1 }\n");
        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f.path()).unwrap();
        assert_eq!(mgr.settings(), &SimulationSettings::default());
    }

    #[test]
    fn partial_simulation_block_fills_gaps() {
        let yaml = "processes: []\nsimulation:\n  cores: [2]\n";
        let f = yaml_tempfile(yaml);
        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert_eq!(mgr.settings().cores, vec![2]);
        assert_eq!(mgr.settings().algorithms, SchedulerKind::ALL.to_vec());
        assert_eq!(mgr.settings().quantum, DEFAULT_QUANTUM);
    }

    #[test]
    fn empty_process_list_still_loads() {
        let f = yaml_tempfile("processes: []\n");
        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f.path()).unwrap();
        assert!(mgr.is_loaded());
        assert!(mgr.processes().is_empty());
    }

    #[test]
    fn negative_values_survive_parsing() {
        // Rejection happens in the dispatcher, with the offending value.
        let f = yaml_tempfile("processes:\n  - { pid: 3, arrival_time: -2, burst_time: 0 }\n");
        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f.path()).unwrap();
        assert_eq!(mgr.processes()[0].arrival_time, -2);
    }

    #[test]
    fn unknown_algorithm_is_a_parse_error() {
        let f = yaml_tempfile("processes: []\nsimulation:\n  algorithms: [lottery]\n");
        let mut mgr = WorkloadManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn missing_file_returns_error() {
        let mut mgr = WorkloadManager::new();
        let result = mgr.load_from_file(Path::new("/nonexistent/path/workload.yaml"));
        assert!(result.is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        let mut mgr = WorkloadManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn reload_replaces_previous_workload() {
        let f1 = yaml_tempfile("processes:\n  - { pid: 1, arrival_time: 0, burst_time: 1 }\nsimulation:\n  quantum: 7\n");
        let f2 = yaml_tempfile("processes:\n  - { pid: 2, arrival_time: 0, burst_time: 1 }\n");

        let mut mgr = WorkloadManager::new();
        mgr.load_from_file(f1.path()).unwrap();
        assert_eq!(mgr.settings().quantum, 7);

        mgr.load_from_file(f2.path()).unwrap();
        assert_eq!(mgr.processes(), &[ProcessSpec::new(2, 0, 1)]);
        assert_eq!(mgr.settings().quantum, DEFAULT_QUANTUM, "old settings must be gone");
    }

    #[test]
    fn builtin_sets_have_unique_pids() {
        for set in [BuiltinSet::Small, BuiltinSet::Fixed] {
            let mut mgr = WorkloadManager::new();
            mgr.load_builtin(set);
            assert_eq!(mgr.name(), set.name());
            let mut pids: Vec<u32> = mgr.processes().iter().map(|p| p.pid).collect();
            let total = pids.len();
            pids.dedup();
            assert_eq!(pids.len(), total);
        }
        assert_eq!(BuiltinSet::Small.processes().len(), 5);
    }
}
