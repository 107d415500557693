// src/commands/cat/mod.rs
use async_trait::async_trait;
use crate::commands::utils::{describe_fs_error, parse_flags, wants_help};
use crate::commands::{Command, CommandContext, CommandResult};

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn description(&self) -> &'static str {
        "Concatenate files and print them"
    }

    fn usage(&self) -> &'static str {
        "cat [-n] [FILE]..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        if wants_help(&ctx.args) {
            return CommandResult::success(
                "Usage: cat [OPTION]... [FILE]...\n\n\
                 Concatenate FILE(s) to standard output. With no FILE, or when FILE is -, read standard input.\n\n\
                 Options:\n\
                   -n    number all output lines\n".to_string()
            );
        }

        let (flags, mut files) = match parse_flags(&ctx.args, "n") {
            Ok(parsed) => parsed,
            Err(c) => return CommandResult::error(format!("cat: invalid option -- '{}'\n", c)),
        };
        let show_line_numbers = flags.contains(&'n');

        if files.is_empty() {
            files.push("-".to_string());
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;
        let mut line_number = 1;

        for file in &files {
            let content = if file == "-" {
                ctx.stdin.clone()
            } else {
                match ctx.fs.read_file(&ctx.resolve(file)).await {
                    Ok(c) => c,
                    Err(e) => {
                        stderr.push_str(&format!("cat: {}: {}\n", file, describe_fs_error(&e)));
                        exit_code = 1;
                        continue;
                    }
                }
            };

            if show_line_numbers {
                line_number = push_numbered(&mut stdout, &content, line_number);
            } else {
                stdout.push_str(&content);
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}

/// Numbering continues across files; returns the next line number.
fn push_numbered(out: &mut String, content: &str, mut line_number: usize) -> usize {
    for line in content.split_inclusive('\n') {
        out.push_str(&format!("{:>6}\t{}", line_number, line));
        line_number += 1;
    }
    line_number
}
