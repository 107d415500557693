//! Command Executor
//!
//! The [`CommandExecutor`] implementation scripts and the interactive shell
//! run against. One command line at a time is parsed, its redirections are
//! applied, and it is dispatched to a builtin or a registered command over a
//! shared virtual filesystem.

pub mod builtins;
pub mod command_line;
pub mod redirections;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::commands::{CommandContext, CommandRegistry, CommandResult};
use crate::fs::FileSystem;
use crate::interpreter::{CommandExecutor, ExecResult, ExecutionLimits};

pub use builtins::Builtin;
pub use command_line::{CommandLine, CommandLineError, Redirect, RedirectKind};

/// Exit code for a name that is neither a builtin nor a registered command
pub const COMMAND_NOT_FOUND: i32 = 127;

/// State that outlives a single command line.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub cwd: String,
    pub home: String,
    /// Directory `cd -` returns to
    pub previous_dir: Option<String>,
    pub exit_requested: bool,
}

pub struct ShellExecutor {
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) registry: CommandRegistry,
    pub(crate) state: RwLock<SessionState>,
    pub(crate) limits: ExecutionLimits,
    pub(crate) script_depth: AtomicUsize,
}

impl ShellExecutor {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        registry: CommandRegistry,
        cwd: impl Into<String>,
        home: impl Into<String>,
        limits: ExecutionLimits,
    ) -> Self {
        Self {
            fs,
            registry,
            state: RwLock::new(SessionState {
                cwd: cwd.into(),
                home: home.into(),
                previous_dir: None,
                exit_requested: false,
            }),
            limits,
            script_depth: AtomicUsize::new(0),
        }
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub async fn cwd(&self) -> String {
        self.state.read().await.cwd.clone()
    }

    pub async fn exit_requested(&self) -> bool {
        self.state.read().await.exit_requested
    }

    /// Run one command line and return the full command result.
    pub async fn run_line(&self, line: &str) -> CommandResult {
        let parsed = match CommandLine::parse(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return CommandResult::success(String::new()),
            Err(e) => return CommandResult::with_exit_code(String::new(), format!("toysh: {}\n", e), 2),
        };

        let cwd = self.cwd().await;
        let stdin = match redirections::read_input(self.fs.as_ref(), &cwd, &parsed.redirects).await {
            Ok(stdin) => stdin.unwrap_or_default(),
            Err(message) => return CommandResult::error(format!("toysh: {}\n", message)),
        };

        tracing::debug!(command = %parsed.name, args = ?parsed.args, "execute");

        let result = if let Some(builtin) = Builtin::from_name(&parsed.name) {
            builtins::run_builtin(self, builtin, &parsed.args).await
        } else if let Some(command) = self.registry.get(&parsed.name) {
            let ctx = CommandContext {
                args: parsed.args.clone(),
                stdin,
                cwd: cwd.clone(),
                fs: self.fs.clone(),
            };
            command.execute(ctx).await
        } else {
            return CommandResult::with_exit_code(
                String::new(),
                format!("Command not found: {}\n", parsed.name),
                COMMAND_NOT_FOUND,
            );
        };

        redirections::apply_output_redirections(self.fs.as_ref(), &cwd, &parsed.redirects, result).await
    }
}

/// A failed command still reports whatever it wrote to stdout.
impl From<CommandResult> for ExecResult {
    fn from(result: CommandResult) -> Self {
        if result.is_success() {
            return ExecResult::success(result.stdout);
        }

        let message = match result.stderr.trim_end() {
            "" => format!("exit code {}", result.exit_code),
            stderr => stderr.to_string(),
        };
        ExecResult {
            succeeded: false,
            output: result.stdout,
            error_message: Some(message),
        }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command_line: &str) -> ExecResult {
        self.run_line(command_line).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_default_registry;
    use crate::fs::InMemoryFs;

    fn executor_with(files: Vec<(&str, &str)>) -> ShellExecutor {
        let fs = InMemoryFs::with_files(files);
        ShellExecutor::new(
            Arc::new(fs),
            create_default_registry(),
            "/home/user",
            "/home/user",
            ExecutionLimits::default(),
        )
    }

    fn executor() -> ShellExecutor {
        executor_with(vec![("/home/user/notes.txt", "remember\n"), ("/tmp/scratch", "")])
    }

    #[tokio::test]
    async fn test_dispatch_registered_command() {
        let exec = executor();
        let result = exec.execute("echo hello world").await;
        assert_eq!(result, ExecResult::success("hello world\n"));
    }

    #[tokio::test]
    async fn test_name_is_case_insensitive() {
        let exec = executor();
        assert!(exec.execute("PWD").await.succeeded);
    }

    #[tokio::test]
    async fn test_blank_line_succeeds_with_no_output() {
        let exec = executor();
        assert_eq!(exec.execute("   ").await, ExecResult::success(""));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let exec = executor();
        let result = exec.execute("frobnicate now").await;
        assert!(!result.succeeded);
        assert_eq!(result.error_message.as_deref(), Some("Command not found: frobnicate"));

        let full = exec.run_line("frobnicate").await;
        assert_eq!(full.exit_code, COMMAND_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error_is_a_failure() {
        let exec = executor();
        let result = exec.execute("echo 'unterminated").await;
        assert!(!result.succeeded);
        assert_eq!(result.error_message.as_deref(), Some("toysh: unterminated ' quote"));
    }

    #[tokio::test]
    async fn test_command_failure_is_reported() {
        let exec = executor();
        let result = exec.execute("cat missing.txt").await;
        assert!(!result.succeeded);
        assert_eq!(
            result.error_message.as_deref(),
            Some("cat: missing.txt: No such file or directory")
        );
    }

    #[tokio::test]
    async fn test_output_redirection() {
        let exec = executor();
        let result = exec.execute("echo first > out.txt").await;
        assert_eq!(result, ExecResult::success(""));
        exec.execute("echo second >> out.txt").await;
        assert_eq!(exec.execute("cat out.txt").await.output, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_input_redirection() {
        let exec = executor();
        assert_eq!(exec.execute("cat -n < notes.txt").await.output, "     1\tremember\n");

        let missing = exec.execute("cat < nope").await;
        assert_eq!(missing.error_message.as_deref(), Some("toysh: nope: No such file or directory"));
    }

    #[tokio::test]
    async fn test_cd_and_pwd() {
        let exec = executor();
        assert!(exec.execute("cd /tmp").await.succeeded);
        assert_eq!(exec.execute("pwd").await.output, "/tmp\n");
        assert_eq!(exec.cwd().await, "/tmp");

        // Relative paths now resolve from /tmp
        assert_eq!(exec.execute("ls").await.output, "scratch\n");
    }

    #[tokio::test]
    async fn test_cd_home_and_back() {
        let exec = executor();
        exec.execute("cd /").await;
        exec.execute("cd ~").await;
        assert_eq!(exec.cwd().await, "/home/user");

        let back = exec.execute("cd -").await;
        assert_eq!(back.output, "/\n");
        assert_eq!(exec.cwd().await, "/");

        exec.execute("cd").await;
        assert_eq!(exec.cwd().await, "/home/user");
    }

    #[tokio::test]
    async fn test_cd_errors() {
        let exec = executor();
        let result = exec.execute("cd nowhere").await;
        assert_eq!(result.error_message.as_deref(), Some("cd: nowhere: No such file or directory"));

        let result = exec.execute("cd notes.txt").await;
        assert_eq!(result.error_message.as_deref(), Some("cd: notes.txt: Not a directory"));

        let result = exec.execute("cd -").await;
        assert_eq!(result.error_message.as_deref(), Some("cd: OLDPWD not set"));
        assert_eq!(exec.cwd().await, "/home/user");
    }

    #[tokio::test]
    async fn test_exit_sets_flag() {
        let exec = executor();
        assert!(!exec.exit_requested().await);
        assert!(exec.execute("exit").await.succeeded);
        assert!(exec.exit_requested().await);
    }

    #[tokio::test]
    async fn test_help_listing() {
        let exec = executor();
        let output = exec.execute("help").await.output;
        assert!(output.starts_with("Available commands:\n\nFile Operations:\n"));
        assert!(output.contains("  cd           Change the working directory\n"));
        assert!(output.contains("Scripting:\n"));
        assert!(output.ends_with("for more information about a specific command.\n"));
    }

    #[tokio::test]
    async fn test_help_for_command() {
        let exec = executor();
        let output = exec.execute("help ls").await.output;
        assert!(output.starts_with("Command: ls\nDescription: List directory contents\nUsage: ls [-a] [-l] [-r] [PATH]...\n"));
        assert!(output.contains("ls -l           # List files with details"));

        let unknown = exec.execute("help nope").await;
        assert_eq!(unknown.error_message.as_deref(), Some("Command not found: nope"));
    }

    #[tokio::test]
    async fn test_script_inline() {
        let exec = executor();
        let result = exec.execute("script -c for x in a b do echo $x done").await;
        assert_eq!(result, ExecResult::success("a\nb\n"));
    }

    #[tokio::test]
    async fn test_script_from_file_shares_session() {
        let exec = executor_with(vec![(
            "/home/user/setup.sh",
            "mkdir -p /work/logs\ncd /work\necho ready > logs/status\n",
        )]);
        let result = exec.execute("script setup.sh").await;
        assert!(result.succeeded);
        assert_eq!(exec.cwd().await, "/work");
        assert_eq!(exec.execute("cat logs/status").await.output, "ready\n");
    }

    #[tokio::test]
    async fn test_script_errors() {
        let exec = executor();
        let missing = exec.execute("script nope.sh").await;
        assert_eq!(missing.error_message.as_deref(), Some("script: nope.sh: No such file or directory"));

        let structural = exec.execute("script -c if a == a then echo x").await;
        assert!(!structural.succeeded);
        assert!(structural.error_message.unwrap().starts_with("script: line 1:"));

        let usage = exec.execute("script").await;
        assert!(!usage.succeeded);
    }

    #[tokio::test]
    async fn test_script_recursion_is_bounded() {
        let exec = executor_with(vec![("/home/user/loop.sh", "script loop.sh\n")]);
        let result = exec.execute("script loop.sh").await;
        // Inner failures are swallowed by each level's interpreter
        assert!(result.succeeded);
        assert_eq!(exec.script_depth.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exec_result_from_failed_command_keeps_stdout() {
        let result: ExecResult = CommandResult::with_exit_code("partial".to_string(), String::new(), 3).into();
        assert_eq!(result.output, "partial");
        assert_eq!(result.error_message.as_deref(), Some("exit code 3"));
    }
}
