// src/commands/touch/mod.rs
use async_trait::async_trait;
use std::time::SystemTime;
use crate::commands::utils::{describe_fs_error, parse_flags, wants_help};
use crate::commands::{Command, CommandContext, CommandResult};

pub struct TouchCommand;

#[async_trait]
impl Command for TouchCommand {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn description(&self) -> &'static str {
        "Create empty files or update timestamps"
    }

    fn usage(&self) -> &'static str {
        "touch [-c] FILE..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if wants_help(&ctx.args) {
            return CommandResult::success(
                "Usage: touch [OPTION]... FILE...\n\n\
                 Update the modification time of each FILE to the current time.\n\
                 A FILE that does not exist is created empty.\n\n\
                 Options:\n\
                   -c    do not create any files\n".to_string()
            );
        }

        let (flags, files) = match parse_flags(&ctx.args, "c") {
            Ok(parsed) => parsed,
            Err(c) => return CommandResult::error(format!("touch: invalid option -- '{}'\n", c)),
        };
        let no_create = flags.contains(&'c');

        if files.is_empty() {
            return CommandResult::error("touch: missing file operand\n".to_string());
        }

        let now = SystemTime::now();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for file in &files {
            let path = ctx.resolve(file);

            let touched = if ctx.fs.exists(&path).await {
                ctx.fs.utimes(&path, now).await
            } else if no_create {
                continue;
            } else {
                ctx.fs.write_file(&path, "").await
            };

            if let Err(e) = touched {
                stderr.push_str(&format!("touch: cannot touch '{}': {}\n", file, describe_fs_error(&e)));
                exit_code = 1;
            }
        }

        CommandResult::with_exit_code(String::new(), stderr, exit_code)
    }
}
