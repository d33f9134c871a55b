//! CLI command execution helpers with automatic timing
//!
//! Wraps the `trimless` binary, pointing it at a test profile, and
//! provides convenient assertion methods.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::TestProfile;

/// CLI command builder with timing
pub struct TrimlessCommand {
    binary_path: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    stdin_data: Option<String>,
}

impl TrimlessCommand {
    /// Create a new command against the given profile
    pub fn new(profile: &TestProfile) -> Self {
        let mut env = HashMap::new();
        env.insert(
            "TRIMLESS_PROFILE".to_string(),
            profile.profile_dir().display().to_string(),
        );

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_trimless")),
            args: vec![
                "--config".to_string(),
                profile.config_file().display().to_string(),
            ],
            env,
            stdin_data: None,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Provide stdin data
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = Some(data.to_string());
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .envs(&self.env)
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().context("Failed to spawn command")?;

        // Closing stdin right away ends `watch` sessions with no input
        if let Some(mut stdin) = child.stdin.take() {
            use std::io::Write;
            if let Some(data) = &self.stdin_data {
                stdin.write_all(data.as_bytes())?;
            }
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text, ignoring colours
    pub fn contains_stdout(&self, text: &str) -> bool {
        strip_ansi(&self.stdout).contains(text)
    }

    /// Check if stderr contains text, ignoring colours
    pub fn contains_stderr(&self, text: &str) -> bool {
        strip_ansi(&self.stderr).contains(text)
    }

    /// Number of stdout lines starting with `prefix`
    pub fn count_lines(&self, prefix: &str) -> usize {
        self.stdout
            .lines()
            .filter(|line| strip_ansi(line).starts_with(prefix))
            .count()
    }
}

/// Remove colour escape sequences
pub fn strip_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// trimless!(profile, "install").assert_success()?;
/// trimless!(profile, "watch").stdin("hash #inbox/ab12\nquit\n").assert_success()?;
/// ```
#[macro_export]
macro_rules! trimless {
    ($profile:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::TrimlessCommand::new($profile);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\u{1b}[32muntrim\u{1b}[39m #inbox/ab"), "untrim #inbox/ab");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_count_lines() {
        let result = CommandResult {
            stdout: "untrim #a\n\u{1b}[32muntrim\u{1b}[39m #b\nundo\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            duration: Duration::from_millis(10),
        };
        assert_eq!(result.count_lines("untrim"), 2);
        assert_eq!(result.count_lines("undo"), 1);
    }

    #[test]
    fn test_contains_ignores_colours() {
        let result = CommandResult {
            stdout: "\u{1b}[32muntrim\u{1b}[39m #inbox/ab12\n".to_string(),
            stderr: "\u{1b}[31merror:\u{1b}[39m Unknown command: bogus\n".to_string(),
            exit_code: 0,
            duration: Duration::from_millis(10),
        };
        assert!(result.contains_stdout("untrim #inbox/ab12"));
        assert!(result.contains_stderr("error: Unknown command"));
    }
}
