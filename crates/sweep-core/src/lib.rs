//! Sequential parameter sweep over an external test-harness program.
//!
//! A run resets the harness's persisted artifacts, invokes the harness once
//! per start offset, and finishes with a single plot invocation.

pub mod config;
pub mod error;
pub mod launcher;
pub mod plan;
pub mod relocate;
pub mod runner;

pub use config::{FailurePolicy, HarnessFlags, SweepConfig};
pub use error::SweepError;
pub use launcher::{DryRunLauncher, Launcher, Outcome, ProcessLauncher};
pub use plan::{Invocation, Step, SweepPlan};
pub use relocate::{relocate, Relocation};
pub use runner::{run_plan, RelocateResult, RunReport, StepRecord};
