//! Test utilities and mocks for unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use capnp_recipe::test_support::{MockRunner, linux_gcc};
//! use capnp_recipe::util::process::ToolOutput;
//!
//! #[test]
//! fn test_example() {
//!     let mut runner = MockRunner::new();
//!     runner.expect_prefix("autoreconf", ToolOutput::failed(1));
//!     runner.set_default(ToolOutput::ok(""));
//!
//!     // Hand `runner` to a BuildSession...
//! }
//! ```

pub mod fixtures;

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ToolOutput, ToolRunner};

pub use fixtures::*;

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    output: ToolOutput,
}

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Program and arguments joined by spaces
    pub command: String,
    pub cwd: Option<std::path::PathBuf>,
    /// Whether output was captured (`output`) or streamed (`status`)
    pub captured: bool,
}

/// Mock tool runner.
///
/// Records every command and answers from the first matching expectation,
/// falling back to the default output. Without a default, an unmatched
/// command is an error, as if the tool were missing.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Vec<Expectation>,
    calls: Vec<RecordedCall>,
    default_output: Option<ToolOutput>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// A runner where every command succeeds.
    pub fn succeeding() -> Self {
        let mut runner = MockRunner::new();
        runner.set_default(ToolOutput::ok(""));
        runner
    }

    pub fn expect(&mut self, cmd: &str, output: ToolOutput) -> &mut Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output)
    }

    pub fn expect_prefix(&mut self, prefix: &str, output: ToolOutput) -> &mut Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    pub fn expect_contains(&mut self, substring: &str, output: ToolOutput) -> &mut Self {
        self.push(CommandPattern::Contains(substring.to_string()), output)
    }

    fn push(&mut self, pattern: CommandPattern, output: ToolOutput) -> &mut Self {
        self.expectations.push(Expectation { pattern, output });
        self
    }

    pub fn set_default(&mut self, output: ToolOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// All commands run so far, in order.
    pub fn calls(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.command.as_str()).collect()
    }

    pub fn recorded(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// How many recorded commands start with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| c.command.starts_with(prefix))
            .count()
    }

    fn run(&mut self, cmd: &ProcessBuilder, captured: bool) -> Result<ToolOutput> {
        let command = cmd.display_command();
        self.calls.push(RecordedCall {
            command: command.clone(),
            cwd: cmd.get_cwd().map(|p| p.to_path_buf()),
            captured,
        });

        if let Some(exp) = self
            .expectations
            .iter()
            .find(|exp| exp.pattern.matches(&command))
        {
            return Ok(exp.output.clone());
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone());
        }

        bail!("unexpected command: {}", command)
    }
}

impl ToolRunner for MockRunner {
    fn status(&mut self, cmd: &ProcessBuilder) -> Result<ToolOutput> {
        self.run(cmd, false)
    }

    fn output(&mut self, cmd: &ProcessBuilder) -> Result<ToolOutput> {
        self.run(cmd, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_matches_in_order() {
        let mut runner = MockRunner::new();
        runner
            .expect("make install", ToolOutput::failed(2))
            .expect_prefix("make", ToolOutput::ok("built"));

        let install = runner.status(&ProcessBuilder::new("make").arg("install")).unwrap();
        let build = runner.output(&ProcessBuilder::new("make").arg("-j4")).unwrap();

        assert_eq!(install.code, Some(2));
        assert_eq!(build.stdout, "built");
        assert_eq!(runner.calls(), vec!["make install", "make -j4"]);
        assert!(!runner.recorded()[0].captured);
    }

    #[test]
    fn test_unexpected_command_fails() {
        let mut runner = MockRunner::new();
        assert!(runner.status(&ProcessBuilder::new("cmake")).is_err());
        assert_eq!(runner.count_prefix("cmake"), 1);
    }
}
