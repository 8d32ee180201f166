//! Sequential plan execution.
//!
//! Each step runs to completion before the next starts. Relocation problems
//! are logged and recorded, never fatal. Failed sweep invocations are
//! handled according to the configured `FailurePolicy`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{FailurePolicy, SweepConfig};
use crate::error::SweepError;
use crate::launcher::{Launcher, Outcome};
use crate::plan::{Invocation, Step, SweepPlan};
use crate::relocate::{holding_path, relocate, Relocation};

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocateResult {
    Moved { to: PathBuf },
    Absent,
    /// Dry run: the artifact would have been moved here.
    Planned { to: PathBuf },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepRecord {
    Relocate {
        artifact: PathBuf,
        result: RelocateResult,
    },
    Invoke {
        invocation: Invocation,
        args: Vec<String>,
        /// `None` when the process could not be spawned.
        outcome: Option<Outcome>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        elapsed_ms: u64,
    },
}

impl StepRecord {
    fn failed_invocation(&self) -> bool {
        match self {
            StepRecord::Invoke { outcome, .. } => !outcome.is_some_and(Outcome::success),
            StepRecord::Relocate { .. } => false,
        }
    }

    fn exit_code(&self) -> Option<i32> {
        match self {
            StepRecord::Invoke { outcome, .. } => Some(outcome.map_or(1, Outcome::exit_code)),
            StepRecord::Relocate { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepRecord>,
    /// Exit code of the last invocation that ran.
    pub exit_code: i32,
    /// True when `FailurePolicy::Abort` cut the sequence short.
    pub stopped_early: bool,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.steps.iter().filter_map(|s| match s {
            StepRecord::Invoke { invocation, .. } => Some(invocation),
            StepRecord::Relocate { .. } => None,
        })
    }

    pub fn failed_invocations(&self) -> usize {
        self.steps.iter().filter(|s| s.failed_invocation()).count()
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

/// Execute `plan` step by step using `launcher` to start the harness.
///
/// Errors only when the harness command is empty; everything that happens
/// while running is captured in the returned report.
pub fn run_plan(
    cfg: &SweepConfig,
    plan: &SweepPlan,
    launcher: &mut dyn Launcher,
) -> Result<RunReport, SweepError> {
    let (program, lead) = cfg.harness.split_first().ok_or(SweepError::EmptyCommand)?;
    let start = Instant::now();
    let mut steps = Vec::with_capacity(plan.steps.len());
    let mut stopped_early = false;

    for step in &plan.steps {
        let record = match step {
            Step::Relocate(artifact) => reset_artifact(cfg, artifact, launcher.is_live()),
            Step::Invoke(invocation) => {
                let mut args = lead.to_vec();
                args.extend(invocation.args(&cfg.flags));
                invoke(launcher, program, invocation, args)
            }
        };

        let abort = cfg.policy == FailurePolicy::Abort
            && record.failed_invocation()
            && matches!(step, Step::Invoke(inv) if !inv.is_plot());
        steps.push(record);

        if abort {
            warn!("sweep invocation failed; aborting remaining steps");
            stopped_early = true;
            break;
        }
    }

    let exit_code = steps.iter().rev().find_map(StepRecord::exit_code).unwrap_or(0);
    let report = RunReport {
        steps,
        exit_code,
        stopped_early,
        elapsed_ms: millis_since(start),
    };
    info!(
        exit_code = report.exit_code,
        failed = report.failed_invocations(),
        elapsed_ms = report.elapsed_ms,
        "sweep finished"
    );
    Ok(report)
}

fn millis_since(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn reset_artifact(cfg: &SweepConfig, artifact: &Path, live: bool) -> StepRecord {
    let result = if !live {
        let to = holding_path(artifact, &cfg.holding_dir);
        info!(artifact = %artifact.display(), to = %to.display(), "dry run: would relocate");
        RelocateResult::Planned { to }
    } else {
        match relocate(artifact, &cfg.holding_dir) {
            Ok(Relocation::Moved { to }) => {
                info!(artifact = %artifact.display(), to = %to.display(), "relocated");
                RelocateResult::Moved { to }
            }
            Ok(Relocation::Absent) => {
                info!(artifact = %artifact.display(), "nothing to relocate");
                RelocateResult::Absent
            }
            Err(e) => {
                warn!(artifact = %artifact.display(), "relocation failed: {e}");
                RelocateResult::Failed { error: e.to_string() }
            }
        }
    };
    StepRecord::Relocate { artifact: artifact.to_path_buf(), result }
}

fn invoke(
    launcher: &mut dyn Launcher,
    program: &str,
    invocation: &Invocation,
    args: Vec<String>,
) -> StepRecord {
    match invocation {
        Invocation::Sweep { first_model, num_models, .. } => {
            info!(first_model, num_models, "sweep invocation");
        }
        Invocation::Plot => info!("plot invocation"),
    }

    let start = Instant::now();
    let (outcome, error) = match launcher.launch(program, &args) {
        Ok(outcome) => {
            if !outcome.success() {
                warn!(?outcome, "harness exited unsuccessfully");
            }
            (Some(outcome), None)
        }
        Err(e) => {
            warn!("{e}");
            (None, Some(e.to_string()))
        }
    };

    StepRecord::Invoke {
        invocation: invocation.clone(),
        args,
        outcome,
        error,
        elapsed_ms: millis_since(start),
    }
}
