//! Toy Shell Environment
//!
//! Main entry point for embedding the shell. Ties together the virtual
//! filesystem, the command registry, the executor and the script interpreter.

use std::sync::Arc;

use crate::commands::create_default_registry;
use crate::executor::ShellExecutor;
use crate::fs::{FileSystem, InMemoryFs, MkdirOptions};
use crate::interpreter::{CommandExecutor, ExecResult, ExecutionLimits, InterpreterError, ScriptInterpreter};

/// Options for creating a [`Shell`].
#[derive(Default)]
pub struct ShellOptions {
    /// Working directory, `/` when unset
    pub cwd: Option<String>,
    /// Target of `cd` and `cd ~`, the working directory when unset
    pub home: Option<String>,
    /// File system instance (defaults to an empty InMemoryFs)
    pub fs: Option<Arc<dyn FileSystem>>,
    /// Execution limits
    pub limits: Option<ExecutionLimits>,
}

pub struct Shell {
    executor: ShellExecutor,
}

impl Shell {
    /// Create a shell. The working and home directories are created if the
    /// filesystem does not have them yet.
    pub async fn new(options: ShellOptions) -> Self {
        let fs: Arc<dyn FileSystem> = options.fs.unwrap_or_else(|| Arc::new(InMemoryFs::new()));
        let cwd = fs.resolve_path("/", options.cwd.as_deref().unwrap_or("/"));
        let home = match options.home {
            Some(home) => fs.resolve_path("/", &home),
            None => cwd.clone(),
        };

        for dir in [&cwd, &home] {
            if let Err(e) = fs.mkdir(dir, &MkdirOptions { recursive: true }).await {
                tracing::warn!(dir = %dir, error = %e, "could not create directory");
            }
        }

        tracing::info!(cwd = %cwd, home = %home, "shell started");
        let executor = ShellExecutor::new(
            fs,
            create_default_registry(),
            cwd,
            home,
            options.limits.unwrap_or_default(),
        );
        Self { executor }
    }

    /// Run a single command line, as typed at the interactive prompt.
    pub async fn exec_line(&self, line: &str) -> ExecResult {
        self.executor.execute(line).await
    }

    /// Run a script. Each call starts with an empty variable environment;
    /// the working directory and files carry over.
    pub async fn run_script(&self, script: &str) -> Result<String, InterpreterError> {
        ScriptInterpreter::new(&self.executor)
            .with_limits(self.executor.limits.clone())
            .interpret(script)
            .await
    }

    pub async fn cwd(&self) -> String {
        self.executor.cwd().await
    }

    pub async fn exit_requested(&self) -> bool {
        self.executor.exit_requested().await
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        self.executor.fs()
    }

    pub fn executor(&self) -> &ShellExecutor {
        &self.executor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults() {
        let shell = Shell::new(ShellOptions::default()).await;
        assert_eq!(shell.cwd().await, "/");
        assert!(!shell.exit_requested().await);
    }

    #[tokio::test]
    async fn test_cwd_is_created() {
        let shell = Shell::new(ShellOptions {
            cwd: Some("/home/user".to_string()),
            ..Default::default()
        })
        .await;
        assert_eq!(shell.cwd().await, "/home/user");
        assert!(shell.fs().stat("/home/user").await.unwrap().is_directory);

        shell.exec_line("cd /").await;
        shell.exec_line("cd").await;
        assert_eq!(shell.cwd().await, "/home/user");
    }

    #[tokio::test]
    async fn test_exec_line_and_run_script_share_state() {
        let shell = Shell::new(ShellOptions::default()).await;
        shell.exec_line("mkdir /data").await;
        let output = shell
            .run_script("cd /data\nfor f in a b do touch $f.txt done\nls")
            .await
            .unwrap();
        assert_eq!(output, "a.txt\nb.txt\n");
        assert_eq!(shell.cwd().await, "/data");
    }

    #[tokio::test]
    async fn test_root_survives_recursive_rm() {
        let shell = Shell::new(ShellOptions::default()).await;
        let output = shell
            .run_script("mkdir /a\nrm -r /\nmkdir /b\ntouch /c\nls /")
            .await
            .unwrap();
        assert_eq!(output, "b/\nc\n");
        assert!(shell.exec_line("mkdir /d").await.succeeded);
    }

    #[tokio::test]
    async fn test_limits_are_applied() {
        let shell = Shell::new(ShellOptions {
            limits: Some(ExecutionLimits {
                max_loop_iterations: Some(3),
            }),
            ..Default::default()
        })
        .await;
        let result = shell.run_script("while x == x do echo y done").await;
        assert_eq!(result, Err(InterpreterError::LoopLimitExceeded { limit: 3 }));
    }
}
