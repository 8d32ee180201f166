/// Process launch seam. The runner only ever sees `Launcher`; real runs use
/// `ProcessLauncher`, `--dry-run` uses `DryRunLauncher`.

use std::process::{Command, ExitStatus};

use serde::Serialize;

use crate::error::SweepError;

/// How a harness invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Exited { code: i32 },
    /// Terminated without an exit code (signal).
    Killed,
}

impl Outcome {
    pub fn success(self) -> bool {
        matches!(self, Outcome::Exited { code: 0 })
    }

    /// Exit code to propagate from the runner; signals map to 1.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Exited { code } => code,
            Outcome::Killed => 1,
        }
    }
}

impl From<ExitStatus> for Outcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Outcome::Exited { code },
            None => Outcome::Killed,
        }
    }
}

pub trait Launcher {
    /// Run `program args...` to completion.
    fn launch(&mut self, program: &str, args: &[String]) -> Result<Outcome, SweepError>;

    /// Whether side effects other than process launch (relocation) should happen.
    fn is_live(&self) -> bool {
        true
    }
}

/// Spawns the harness as a child process with inherited stdio and waits for it.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&mut self, program: &str, args: &[String]) -> Result<Outcome, SweepError> {
        let status = Command::new(program).args(args).status().map_err(|source| SweepError::Spawn {
            program: program.to_string(),
            source,
        })?;
        Ok(status.into())
    }
}

/// Prints each command line instead of running it. Every invocation "succeeds".
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    pub lines: Vec<String>,
}

impl Launcher for DryRunLauncher {
    fn launch(&mut self, program: &str, args: &[String]) -> Result<Outcome, SweepError> {
        let line = shell_join(std::iter::once(program).chain(args.iter().map(String::as_str)));
        println!("{line}");
        self.lines.push(line);
        Ok(Outcome::Exited { code: 0 })
    }

    fn is_live(&self) -> bool {
        false
    }
}

pub fn shell_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().map(shell_quote).collect::<Vec<_>>().join(" ")
}

fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:=,".contains(c)) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_join_quotes_only_when_needed() {
        assert_eq!(shell_join(["python", "h.py", "--firstModel", "1"]), "python h.py --firstModel 1");
        assert_eq!(shell_join(["a b", ""]), "'a b' ''");
        assert_eq!(shell_join(["it's"]), r#"'it'"'"'s'"#);
    }

    #[test]
    fn outcome_exit_codes() {
        assert!(Outcome::Exited { code: 0 }.success());
        assert!(!Outcome::Exited { code: 2 }.success());
        assert_eq!(Outcome::Exited { code: 2 }.exit_code(), 2);
        assert!(!Outcome::Killed.success());
        assert_eq!(Outcome::Killed.exit_code(), 1);
    }

    #[test]
    fn dry_run_records_lines() {
        let mut l = DryRunLauncher::default();
        let out = l.launch("python", &["--plot".to_string()]).unwrap();
        assert!(out.success());
        assert!(!l.is_live());
        assert_eq!(l.lines, vec!["python --plot"]);
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_reports_exit_code() {
        let mut l = ProcessLauncher;
        let out = l.launch("sh", &["-c".to_string(), "exit 3".to_string()]).unwrap();
        assert_eq!(out, Outcome::Exited { code: 3 });
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let mut l = ProcessLauncher;
        let err = l.launch("definitely-not-a-real-harness-binary", &[]).unwrap_err();
        assert!(matches!(err, SweepError::Spawn { .. }));
    }
}
