//! Redirection Handling
//!
//! - `<`  : feed a file to the command's stdin
//! - `>`  : write stdout to a file
//! - `>>` : append stdout to a file
//! - `2>`, `2>>` : the same for stderr
//!
//! Every output target is created (or truncated for `>`) in order; only the
//! last target of each stream receives the content.

use crate::commands::CommandResult;
use crate::commands::utils::describe_fs_error;
use crate::executor::command_line::{Redirect, RedirectKind};
use crate::fs::FileSystem;

/// Contents for stdin from the last `<` redirection, if any.
pub async fn read_input(fs: &dyn FileSystem, cwd: &str, redirects: &[Redirect]) -> Result<Option<String>, String> {
    let Some(redirect) = redirects.iter().rev().find(|r| r.kind == RedirectKind::Input) else {
        return Ok(None);
    };

    let path = fs.resolve_path(cwd, &redirect.target);
    fs.read_file(&path)
        .await
        .map(Some)
        .map_err(|e| format!("{}: {}", redirect.target, describe_fs_error(&e)))
}

fn is_stdout(kind: RedirectKind) -> bool {
    matches!(kind, RedirectKind::Output | RedirectKind::Append)
}

fn is_stderr(kind: RedirectKind) -> bool {
    matches!(kind, RedirectKind::ErrorOutput | RedirectKind::ErrorAppend)
}

async fn write_target(fs: &dyn FileSystem, path: &str, kind: RedirectKind, content: &str) -> Result<(), String> {
    let written = match kind {
        RedirectKind::Append | RedirectKind::ErrorAppend => fs.append_file(path, content).await,
        _ => fs.write_file(path, content).await,
    };
    written.map_err(|e| describe_fs_error(&e).to_string())
}

/// Route the command's output streams into their redirect targets. A stream
/// that was redirected is emptied in the returned result.
pub async fn apply_output_redirections(
    fs: &dyn FileSystem,
    cwd: &str,
    redirects: &[Redirect],
    mut result: CommandResult,
) -> CommandResult {
    let last_stdout = redirects.iter().rposition(|r| is_stdout(r.kind));
    let last_stderr = redirects.iter().rposition(|r| is_stderr(r.kind));

    let stdout = std::mem::take(&mut result.stdout);
    let stderr = std::mem::take(&mut result.stderr);
    let mut errors = String::new();

    for (i, redirect) in redirects.iter().enumerate() {
        let content = if Some(i) == last_stdout {
            stdout.as_str()
        } else if Some(i) == last_stderr {
            stderr.as_str()
        } else if is_stdout(redirect.kind) || is_stderr(redirect.kind) {
            ""
        } else {
            continue;
        };

        let path = fs.resolve_path(cwd, &redirect.target);
        if let Err(message) = write_target(fs, &path, redirect.kind, content).await {
            tracing::warn!(file = %redirect.target, error = %message, "redirection failed");
            errors.push_str(&format!("{}: {}\n", redirect.target, message));
            result.exit_code = 1;
        }
    }

    if last_stdout.is_none() {
        result.stdout = stdout;
    }
    if last_stderr.is_none() {
        result.stderr = stderr;
    }
    result.stderr.push_str(&errors);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;

    fn redirect(kind: RedirectKind, target: &str) -> Redirect {
        Redirect {
            kind,
            target: target.to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_input() {
        let fs = InMemoryFs::with_files([("/home/in.txt", "data")]);
        let redirects = vec![redirect(RedirectKind::Input, "in.txt")];
        assert_eq!(read_input(&fs, "/home", &redirects).await, Ok(Some("data".to_string())));
        assert_eq!(read_input(&fs, "/home", &[]).await, Ok(None));
    }

    #[tokio::test]
    async fn test_read_input_missing() {
        let fs = InMemoryFs::new();
        let redirects = vec![redirect(RedirectKind::Input, "nope")];
        assert_eq!(
            read_input(&fs, "/", &redirects).await,
            Err("nope: No such file or directory".to_string())
        );
    }

    #[tokio::test]
    async fn test_stdout_to_file_is_not_returned() {
        let fs = InMemoryFs::new();
        let redirects = vec![redirect(RedirectKind::Output, "out.txt")];
        let result = CommandResult::success("hi\n".to_string());
        let result = apply_output_redirections(&fs, "/", &redirects, result).await;

        assert_eq!(result.stdout, "");
        assert_eq!(fs.read_file("/out.txt").await.unwrap(), "hi\n");
    }

    #[tokio::test]
    async fn test_append_and_truncate() {
        let fs = InMemoryFs::with_files([("/log", "old\n"), ("/first", "gone")]);
        let redirects = vec![redirect(RedirectKind::Output, "/first"), redirect(RedirectKind::Append, "/log")];
        let result = CommandResult::success("new\n".to_string());
        apply_output_redirections(&fs, "/", &redirects, result).await;

        assert_eq!(fs.read_file("/log").await.unwrap(), "old\nnew\n");
        assert_eq!(fs.read_file("/first").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_stderr_redirect_leaves_stdout() {
        let fs = InMemoryFs::new();
        let redirects = vec![redirect(RedirectKind::ErrorOutput, "/err")];
        let result = CommandResult::with_exit_code("out".to_string(), "bad\n".to_string(), 1);
        let result = apply_output_redirections(&fs, "/", &redirects, result).await;

        assert_eq!(result.stdout, "out");
        assert_eq!(result.stderr, "");
        assert_eq!(fs.read_file("/err").await.unwrap(), "bad\n");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let fs = InMemoryFs::new();
        let redirects = vec![redirect(RedirectKind::Output, "/missing/out")];
        let result = CommandResult::success("x".to_string());
        let result = apply_output_redirections(&fs, "/", &redirects, result).await;

        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "/missing/out: No such file or directory\n");
    }
}
