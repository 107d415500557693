// src/commands/rm/mod.rs
use async_trait::async_trait;
use crate::commands::utils::{describe_fs_error, parse_flags, wants_help};
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::{FsError, RmOptions};

pub struct RmCommand;

#[async_trait]
impl Command for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn description(&self) -> &'static str {
        "Remove files or directories"
    }

    fn usage(&self) -> &'static str {
        "rm [-r] [-f] PATH..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if wants_help(&ctx.args) {
            return CommandResult::success(
                "Usage: rm [OPTION]... [FILE]...\n\n\
                 Remove (unlink) the FILE(s).\n\n\
                 Options:\n\
                   -f       ignore nonexistent files\n\
                   -r, -R   remove directories and their contents recursively\n".to_string()
            );
        }

        let (flags, paths) = match parse_flags(&ctx.args, "rRf") {
            Ok(parsed) => parsed,
            Err(c) => return CommandResult::error(format!("rm: invalid option -- '{}'\n", c)),
        };
        let options = RmOptions {
            recursive: flags.iter().any(|f| *f == 'r' || *f == 'R'),
            force: flags.contains(&'f'),
        };

        if paths.is_empty() {
            if options.force {
                return CommandResult::success(String::new());
            }
            return CommandResult::error("rm: missing operand\n".to_string());
        }

        let mut stderr = String::new();
        let mut exit_code = 0;

        for path in &paths {
            match ctx.fs.rm(&ctx.resolve(path), &options).await {
                Ok(()) => {}
                Err(FsError::IsDirectory { .. }) | Err(FsError::NotEmpty { .. }) if !options.recursive => {
                    stderr.push_str(&format!("rm: cannot remove '{}': Is a directory\n", path));
                    exit_code = 1;
                }
                Err(e) => {
                    stderr.push_str(&format!("rm: cannot remove '{}': {}\n", path, describe_fs_error(&e)));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}
