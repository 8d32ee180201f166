/// Sweep runner: resets the harness's persisted state, runs the harness once
/// per start offset, then once more in plot mode.
/// Exits with the exit code of the last invocation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sweep_core::{run_plan, DryRunLauncher, FailurePolicy, Launcher, ProcessLauncher, SweepConfig, SweepPlan};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    /// Keep going after a failed sweep invocation.
    Continue,
    /// Stop at the first failed sweep invocation and skip the plot.
    Abort,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Continue => FailurePolicy::Continue,
            PolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "harness-sweep",
    about = "Run the model test harness over a sweep of start offsets, then plot"
)]
struct Args {
    /// JSON config file; fields not given keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated start offsets, run in the given order.
    #[arg(long, value_delimiter = ',')]
    offsets: Option<Vec<u32>>,

    /// Number of models per sweep invocation.
    #[arg(short = 'n', long)]
    num_models: Option<u32>,

    /// Directory the results and log artifacts are moved into.
    #[arg(long)]
    holding_dir: Option<PathBuf>,

    /// Behaviour when a sweep invocation fails.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Print the harness command lines instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Harness program and leading arguments (after `--`).
    #[arg(last = true)]
    harness: Vec<String>,
}

fn resolve_config(args: &Args) -> Result<SweepConfig> {
    let mut cfg = match &args.config {
        Some(path) => SweepConfig::load(path).context("loading sweep config")?,
        None => SweepConfig::default(),
    };
    if let Some(offsets) = &args.offsets {
        cfg.offsets = offsets.clone();
    }
    if let Some(n) = args.num_models {
        cfg.num_models = n;
    }
    if let Some(dir) = &args.holding_dir {
        cfg.holding_dir = dir.clone();
    }
    if let Some(policy) = args.policy {
        cfg.policy = policy.into();
    }
    if !args.harness.is_empty() {
        cfg.harness = args.harness.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = resolve_config(&args)?;
    let plan = SweepPlan::from_config(&cfg);
    info!(
        offsets = ?cfg.offsets,
        num_models = cfg.num_models,
        policy = ?cfg.policy,
        dry_run = args.dry_run,
        "starting sweep"
    );

    let mut launcher: Box<dyn Launcher> = if args.dry_run {
        Box::new(DryRunLauncher::default())
    } else {
        Box::new(ProcessLauncher)
    };
    let report = run_plan(&cfg, &plan, launcher.as_mut())?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    std::process::exit(report.exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("harness-sweep").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_gives_default_sweep() {
        let cfg = resolve_config(&parse(&[])).unwrap();
        assert_eq!(cfg, SweepConfig::default());
    }

    #[test]
    fn cli_overrides_apply() {
        let args = parse(&[
            "--offsets", "5,1,9", "-n", "10", "--policy", "abort", "--holding-dir", "/var/tmp", "--",
            "python3", "h.py",
        ]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.offsets, vec![5, 1, 9]);
        assert_eq!(cfg.num_models, 10);
        assert_eq!(cfg.policy, FailurePolicy::Abort);
        assert_eq!(cfg.holding_dir, PathBuf::from("/var/tmp"));
        assert_eq!(cfg.harness, vec!["python3", "h.py"]);
    }

    #[test]
    fn cli_overrides_take_precedence_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.json");
        fs::write(&path, r#"{ "offsets": [1, 2], "num_models": 50 }"#).unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "--offsets", "7"]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.offsets, vec![7]);
        assert_eq!(cfg.num_models, 50);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let args = parse(&["--config", "/nonexistent/sweep.json"]);
        assert!(resolve_config(&args).is_err());
    }
}
