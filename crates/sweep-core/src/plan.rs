/// Sweep plan: the ordered step list executed by the runner.
/// Relocations first, then one sweep invocation per offset, then the plot.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{HarnessFlags, SweepConfig};

/// A single harness invocation, independent of the command that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Invocation {
    Sweep {
        first_model: u32,
        num_models: u32,
        reuse_data: bool,
        reuse_log: bool,
    },
    Plot,
}

impl Invocation {
    /// Harness arguments for this invocation (excluding the harness command).
    pub fn args(&self, flags: &HarnessFlags) -> Vec<String> {
        match *self {
            Invocation::Sweep { first_model, num_models, reuse_data, reuse_log } => {
                let mut args = vec![
                    flags.first_model.clone(),
                    first_model.to_string(),
                    flags.num_models.clone(),
                    num_models.to_string(),
                ];
                if reuse_data {
                    args.push(flags.use_existing_data.clone());
                }
                if reuse_log {
                    args.push(flags.use_existing_log.clone());
                }
                args
            }
            Invocation::Plot => vec![flags.plot.clone()],
        }
    }

    pub fn is_plot(&self) -> bool {
        matches!(self, Invocation::Plot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Move an artifact out of the working tree into the holding directory.
    Relocate(PathBuf),
    Invoke(Invocation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub steps: Vec<Step>,
}

impl SweepPlan {
    pub fn from_config(cfg: &SweepConfig) -> Self {
        let mut steps: Vec<Step> = cfg
            .artifacts()
            .iter()
            .map(|p| Step::Relocate(p.to_path_buf()))
            .collect();

        steps.extend(cfg.offsets.iter().map(|&first_model| {
            Step::Invoke(Invocation::Sweep {
                first_model,
                num_models: cfg.num_models,
                reuse_data: true,
                reuse_log: true,
            })
        }));

        steps.push(Step::Invoke(Invocation::Plot));
        Self { steps }
    }

    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.steps.iter().filter_map(|s| match s {
            Step::Invoke(inv) => Some(inv),
            Step::Relocate(_) => None,
        })
    }
}
