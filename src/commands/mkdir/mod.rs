// src/commands/mkdir/mod.rs
use async_trait::async_trait;
use crate::commands::utils::{describe_fs_error, parse_flags, wants_help};
use crate::commands::{Command, CommandContext, CommandResult};
use crate::fs::MkdirOptions;

pub struct MkdirCommand;

#[async_trait]
impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn description(&self) -> &'static str {
        "Create directories"
    }

    fn usage(&self) -> &'static str {
        "mkdir [-p] [-v] DIRECTORY..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if wants_help(&ctx.args) {
            return CommandResult::success(
                "Usage: mkdir [OPTION]... DIRECTORY...\n\n\
                 Create the DIRECTORY(ies), if they do not already exist.\n\n\
                 Options:\n\
                   -p    no error if existing, make parent directories as needed\n\
                   -v    print a message for each created directory\n".to_string()
            );
        }

        let (flags, dirs) = match parse_flags(&ctx.args, "pv") {
            Ok(parsed) => parsed,
            Err(c) => return CommandResult::error(format!("mkdir: invalid option -- '{}'\n", c)),
        };
        let options = MkdirOptions { recursive: flags.contains(&'p') };
        let verbose = flags.contains(&'v');

        if dirs.is_empty() {
            return CommandResult::error("mkdir: missing operand\n".to_string());
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for dir in &dirs {
            match ctx.fs.mkdir(&ctx.resolve(dir), &options).await {
                Ok(()) => {
                    if verbose {
                        stdout.push_str(&format!("mkdir: created directory '{}'\n", dir));
                    }
                }
                Err(e) => {
                    stderr.push_str(&format!(
                        "mkdir: cannot create directory '{}': {}\n",
                        dir,
                        describe_fs_error(&e)
                    ));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}
