// src/commands/types.rs
use async_trait::async_trait;
use std::sync::Arc;
use crate::fs::FileSystem;

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(stdout: String) -> Self {
        Self { stdout, stderr: String::new(), exit_code: 0 }
    }

    pub fn error(stderr: String) -> Self {
        Self { stdout: String::new(), stderr, exit_code: 1 }
    }

    pub fn with_exit_code(stdout: String, stderr: String, exit_code: i32) -> Self {
        Self { stdout, stderr, exit_code }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Everything a command can see while it runs
pub struct CommandContext {
    pub args: Vec<String>,
    pub stdin: String,
    pub cwd: String,
    pub fs: Arc<dyn FileSystem>,
}

impl CommandContext {
    /// Absolute path of `path` as seen from the working directory.
    pub fn resolve(&self, path: &str) -> String {
        self.fs.resolve_path(&self.cwd, path)
    }
}

#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    /// One line shown by `help`
    fn description(&self) -> &'static str;

    /// Synopsis shown by `help NAME`
    fn usage(&self) -> &'static str;

    async fn execute(&self, ctx: CommandContext) -> CommandResult;
}
