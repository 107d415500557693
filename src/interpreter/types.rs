//! Interpreter Types
//!
//! The command-execution contract the interpreter delegates plain command
//! lines to, and the limits it runs under.

use async_trait::async_trait;

/// Outcome of one delegated command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub succeeded: bool,
    pub output: String,
    pub error_message: Option<String>,
}

impl ExecResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
            error_message: None,
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: String::new(),
            error_message: Some(error_message.into()),
        }
    }
}

/// Command execution interface.
///
/// The interpreter passes the assembled command line verbatim and awaits
/// each call before moving on. Quoting and redirection are up to the
/// implementation.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command_line: &str) -> ExecResult;
}

/// Execution limits configuration.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLimits {
    /// Maximum iterations of a single `for` or `while` loop. `None` is unbounded.
    pub max_loop_iterations: Option<u64>,
}
