// src/commands/echo/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, CommandResult};

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "Display a line of text"
    }

    fn usage(&self) -> &'static str {
        "echo [-n] [-e] [TEXT]..."
    }

    async fn execute(&self, ctx: CommandContext) -> CommandResult {
        let args = &ctx.args;
        let mut no_newline = false;
        let mut interpret_escapes = false;
        let mut start_index = 0;

        // Leading flags only; the first other word starts the text
        while let Some(arg) = args.get(start_index) {
            match arg.as_str() {
                "-n" => no_newline = true,
                "-e" => interpret_escapes = true,
                "-E" => interpret_escapes = false,
                "-ne" | "-en" => {
                    no_newline = true;
                    interpret_escapes = true;
                }
                _ => break,
            }
            start_index += 1;
        }

        let mut output = args[start_index..].join(" ");

        if interpret_escapes {
            let (text, stop) = process_escapes(&output);
            if stop {
                return CommandResult::success(text);
            }
            output = text;
        }

        if !no_newline {
            output.push('\n');
        }

        CommandResult::success(output)
    }
}

/// Expand `echo -e` escapes. The flag is true when `\c` cut the output short.
fn process_escapes(input: &str) -> (String, bool) {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            result.push('\\');
            break;
        };

        match next {
            '\\' => result.push('\\'),
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'a' => result.push('\x07'),
            'b' => result.push('\x08'),
            'f' => result.push('\x0c'),
            'v' => result.push('\x0b'),
            'e' | 'E' => result.push('\x1b'),
            'c' => return (result, true),
            '0' => {
                let mut code = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(ch) = char::from_u32(code % 256) {
                    result.push(ch);
                }
            }
            'x' => {
                let mut code = None;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(16)) {
                        Some(d) => {
                            code = Some(code.unwrap_or(0) * 16 + d);
                            chars.next();
                        }
                        None => break,
                    }
                }
                match code.and_then(char::from_u32) {
                    Some(ch) => result.push(ch),
                    None => result.push_str("\\x"),
                }
            }
            other => {
                result.push('\\');
                result.push(other);
            }
        }
    }

    (result, false)
}
