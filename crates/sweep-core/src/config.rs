/// Sweep configuration: harness command, offsets, reset artifacts.
/// Defaults reproduce the stock five-window sweep over the model suite.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_OFFSETS: [u32; 5] = [1, 200, 400, 600, 800];
pub const DEFAULT_NUM_MODELS: u32 = 200;
pub const DEFAULT_RESULTS_ARTIFACT: &str = "mainTestHarness.pcl";
pub const DEFAULT_LOG_ARTIFACT: &str = "mainTestHarness/mainTestHarness.log";
pub const DEFAULT_HOLDING_DIR: &str = "/tmp";

// ── Public structs ────────────────────────────────────────────────────────────

/// What to do when a sweep invocation exits non-zero or cannot be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Best-effort sweep: record the failure and keep going.
    #[default]
    Continue,
    /// Stop at the first failed sweep invocation and skip the plot step.
    Abort,
}

/// Option spellings understood by the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessFlags {
    pub first_model: String,
    pub num_models: String,
    pub use_existing_data: String,
    pub use_existing_log: String,
    pub plot: String,
}

impl Default for HarnessFlags {
    fn default() -> Self {
        Self {
            first_model: "--firstModel".into(),
            num_models: "--numModel".into(),
            use_existing_data: "--useExistingData".into(),
            use_existing_log: "--useExistingLog".into(),
            plot: "--plot".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Program plus leading arguments, e.g. `["python", "harness.py"]`.
    pub harness: Vec<String>,
    pub flags: HarnessFlags,
    /// Start offsets, processed in exactly this order.
    pub offsets: Vec<u32>,
    /// Model count passed with every sweep invocation.
    pub num_models: u32,
    /// Results file relocated before the sweep.
    pub results_artifact: PathBuf,
    /// Log file relocated before the sweep.
    pub log_artifact: PathBuf,
    /// Destination directory for relocated artifacts.
    pub holding_dir: PathBuf,
    pub policy: FailurePolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            harness: vec!["python".into(), "SBstoat/mainTestHarness.py".into()],
            flags: HarnessFlags::default(),
            offsets: DEFAULT_OFFSETS.to_vec(),
            num_models: DEFAULT_NUM_MODELS,
            results_artifact: PathBuf::from(DEFAULT_RESULTS_ARTIFACT),
            log_artifact: PathBuf::from(DEFAULT_LOG_ARTIFACT),
            holding_dir: PathBuf::from(DEFAULT_HOLDING_DIR),
            policy: FailurePolicy::Continue,
        }
    }
}

impl SweepConfig {
    /// Load a JSON config file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        let text = fs::read_to_string(path).map_err(|source| SweepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| SweepError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The artifacts reset before a sweep, results first.
    pub fn artifacts(&self) -> [&Path; 2] {
        [self.results_artifact.as_path(), self.log_artifact.as_path()]
    }
}
