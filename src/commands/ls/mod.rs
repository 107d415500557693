// src/commands/ls/mod.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use crate::commands::utils::{describe_fs_error, parse_flags, wants_help};
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::DirentEntry;

pub struct LsCommand;

#[derive(Debug, Default, Clone, Copy)]
struct LsOptions {
    all: bool,
    long: bool,
    reverse: bool,
}

/// Directories first, then by name.
fn compare_entries(a: &DirentEntry, b: &DirentEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.cmp(&b.name))
}

fn display_name(entry: &DirentEntry) -> String {
    if entry.is_directory {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    }
}

fn format_long(entry: &DirentEntry) -> String {
    let kind = if entry.is_directory { 'd' } else { '-' };
    let size = if entry.is_directory {
        String::new()
    } else {
        entry.size.to_string()
    };
    let mtime: DateTime<Utc> = entry.mtime.into();
    format!(
        "{} {:>8} {} {}",
        kind,
        size,
        mtime.format("%b %e %H:%M"),
        display_name(entry)
    )
}

fn format_listing(mut entries: Vec<DirentEntry>, options: LsOptions) -> String {
    if !options.all {
        entries.retain(|e| !e.name.starts_with('.'));
    }
    entries.sort_by(compare_entries);
    if options.reverse {
        entries.reverse();
    }

    let mut out = String::new();
    for entry in &entries {
        if options.long {
            out.push_str(&format_long(entry));
        } else {
            out.push_str(&display_name(entry));
        }
        out.push('\n');
    }
    out
}

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn description(&self) -> &'static str {
        "List directory contents"
    }

    fn usage(&self) -> &'static str {
        "ls [-a] [-l] [-r] [PATH]..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if wants_help(&ctx.args) {
            return CommandResult::success(
                "Usage: ls [OPTION]... [FILE]...\n\n\
                 List information about the FILEs (the current directory by default).\n\n\
                 Options:\n\
                   -a    do not ignore entries starting with .\n\
                   -l    use a long listing format\n\
                   -r    reverse order while sorting\n".to_string()
            );
        }

        let (flags, mut paths) = match parse_flags(&ctx.args, "alr") {
            Ok(parsed) => parsed,
            Err(c) => return CommandResult::error(format!("ls: invalid option -- '{}'\n", c)),
        };
        let options = LsOptions {
            all: flags.contains(&'a'),
            long: flags.contains(&'l'),
            reverse: flags.contains(&'r'),
        };

        if paths.is_empty() {
            paths.push(".".to_string());
        }
        let show_headers = paths.len() > 1;

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for (i, path) in paths.iter().enumerate() {
            let resolved = ctx.resolve(path);
            let stat = match ctx.fs.stat(&resolved).await {
                Ok(stat) => stat,
                Err(e) => {
                    stderr.push_str(&format!("ls: cannot access '{}': {}\n", path, describe_fs_error(&e)));
                    exit_code = 2;
                    continue;
                }
            };

            if stat.is_file {
                let entry = DirentEntry {
                    name: path.clone(),
                    is_file: true,
                    is_directory: false,
                    size: stat.size,
                    mtime: stat.mtime,
                };
                stdout.push_str(&format_listing(vec![entry], LsOptions { all: true, ..options }));
                continue;
            }

            match ctx.fs.readdir_with_file_types(&resolved).await {
                Ok(entries) => {
                    if show_headers {
                        if i > 0 {
                            stdout.push('\n');
                        }
                        stdout.push_str(&format!("{}:\n", path));
                    }
                    stdout.push_str(&format_listing(entries, options));
                }
                Err(e) => {
                    stderr.push_str(&format!("ls: cannot open directory '{}': {}\n", path, describe_fs_error(&e)));
                    exit_code = 2;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use std::sync::Arc;

    fn make_ctx(args: Vec<&str>) -> CommandContext {
        let fs = InMemoryFs::with_files([
            ("/work/b.txt", "bbb"),
            ("/work/a.txt", "a"),
            ("/work/.hidden", ""),
            ("/work/zdir/inner.txt", ""),
            ("/work/adir/inner.txt", ""),
            ("/other/x", ""),
        ]);
        CommandContext {
            args: args.into_iter().map(String::from).collect(),
            stdin: String::new(),
            cwd: "/work".to_string(),
            fs: Arc::new(fs),
        }
    }

    #[tokio::test]
    async fn test_ls_directories_first_then_names() {
        let result = LsCommand.execute(make_ctx(vec![])).await;
        assert_eq!(result.stdout, "adir/\nzdir/\na.txt\nb.txt\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_ls_all_shows_hidden() {
        let result = LsCommand.execute(make_ctx(vec!["-a"])).await;
        assert!(result.stdout.contains(".hidden\n"));
    }

    #[tokio::test]
    async fn test_ls_reverse() {
        let result = LsCommand.execute(make_ctx(vec!["-r"])).await;
        assert_eq!(result.stdout, "b.txt\na.txt\nzdir/\nadir/\n");
    }

    #[tokio::test]
    async fn test_ls_long_format() {
        let result = LsCommand.execute(make_ctx(vec!["-l", "/work"])).await;
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("d "));
        assert!(lines[0].ends_with(" adir/"));
        assert!(lines[3].starts_with("-        3 "));
        assert!(lines[3].ends_with(" b.txt"));
    }

    #[tokio::test]
    async fn test_ls_multiple_paths_have_headers() {
        let result = LsCommand.execute(make_ctx(vec!["adir", "/other"])).await;
        assert_eq!(result.stdout, "adir:\ninner.txt\n\n/other:\nx\n");
    }

    #[tokio::test]
    async fn test_ls_file_operand() {
        let result = LsCommand.execute(make_ctx(vec!["a.txt"])).await;
        assert_eq!(result.stdout, "a.txt\n");
    }

    #[tokio::test]
    async fn test_ls_missing_path() {
        let result = LsCommand.execute(make_ctx(vec!["nope"])).await;
        assert_eq!(result.stderr, "ls: cannot access 'nope': No such file or directory\n");
        assert_eq!(result.exit_code, 2);
    }

    #[tokio::test]
    async fn test_ls_invalid_option() {
        let result = LsCommand.execute(make_ctx(vec!["-z"])).await;
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("invalid option"));
    }
}
