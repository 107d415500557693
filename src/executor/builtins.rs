//! Shell Builtins
//!
//! Commands that need the executor's session state rather than just a
//! [`CommandContext`](crate::commands::CommandContext): `cd`, `help`,
//! `script` and `exit`.

use std::sync::atomic::Ordering;

use crate::commands::utils::describe_fs_error;
use crate::commands::CommandResult;
use crate::executor::ShellExecutor;
use crate::interpreter::ScriptInterpreter;

/// Nested `script` invocations allowed before giving up
pub const MAX_SCRIPT_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Help,
    Script,
    Exit,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Cd, Builtin::Help, Builtin::Script, Builtin::Exit];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cd" => Some(Builtin::Cd),
            "help" => Some(Builtin::Help),
            "script" => Some(Builtin::Script),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Help => "help",
            Builtin::Script => "script",
            Builtin::Exit => "exit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Builtin::Cd => "Change the working directory",
            Builtin::Help => "Show help information for commands",
            Builtin::Script => "Execute a script",
            Builtin::Exit => "Exit the shell",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Builtin::Cd => "cd [PATH | ~ | -]",
            Builtin::Help => "help [COMMAND]",
            Builtin::Script => "script FILE | script -c TEXT",
            Builtin::Exit => "exit",
        }
    }
}

pub async fn run_builtin(executor: &ShellExecutor, builtin: Builtin, args: &[String]) -> CommandResult {
    match builtin {
        Builtin::Cd => cd(executor, args).await,
        Builtin::Help => help(executor, args),
        Builtin::Script => script(executor, args).await,
        Builtin::Exit => {
            executor.state.write().await.exit_requested = true;
            tracing::info!("exit requested");
            CommandResult::success(String::new())
        }
    }
}

// ============================================================================
// cd
// ============================================================================

async fn cd(executor: &ShellExecutor, args: &[String]) -> CommandResult {
    if args.len() > 1 {
        return CommandResult::error("cd: too many arguments\n".to_string());
    }

    let (cwd, home, previous) = {
        let state = executor.state.read().await;
        (state.cwd.clone(), state.home.clone(), state.previous_dir.clone())
    };

    let mut announce = false;
    let target = match args.first().map(String::as_str) {
        None | Some("~") => home,
        Some("-") => match previous {
            Some(dir) => {
                announce = true;
                dir
            }
            None => return CommandResult::error("cd: OLDPWD not set\n".to_string()),
        },
        Some(path) => match path.strip_prefix("~/") {
            Some(rest) => executor.fs.resolve_path(&home, rest),
            None => executor.fs.resolve_path(&cwd, path),
        },
    };

    let shown = args.first().map(String::as_str).unwrap_or("~");
    match executor.fs.stat(&target).await {
        Ok(stat) if stat.is_directory => {}
        Ok(_) => return CommandResult::error(format!("cd: {}: Not a directory\n", shown)),
        Err(e) => return CommandResult::error(format!("cd: {}: {}\n", shown, describe_fs_error(&e))),
    }

    let mut guard = executor.state.write().await;
    let state = &mut *guard;
    state.previous_dir = Some(std::mem::replace(&mut state.cwd, target.clone()));
    tracing::info!(cwd = %target, "changed directory");

    if announce {
        CommandResult::success(format!("{}\n", target))
    } else {
        CommandResult::success(String::new())
    }
}

// ============================================================================
// help
// ============================================================================

const CATEGORIES: &[(&str, &[&str])] = &[
    ("File Operations", &["cat", "ls", "mkdir", "rm", "touch"]),
    ("Navigation", &["cd", "pwd"]),
    ("Output", &["clear", "echo"]),
    ("Scripting", &["exit", "script"]),
    ("Help", &["help"]),
];

fn examples(name: &str) -> &'static [&'static str] {
    match name {
        "ls" => &[
            "ls              # List files in current directory",
            "ls -l           # List files with details",
            "ls /home        # List files in /home directory",
        ],
        "cd" => &[
            "cd /home        # Change to /home directory",
            "cd ..           # Move up one directory",
            "cd ~            # Change to home directory",
        ],
        "cat" => &[
            "cat file.txt    # Display file contents",
            "cat file1 file2 # Display multiple files",
        ],
        "echo" => &[
            "echo hello           # Print a line",
            "echo hi > greet.txt  # Write a line to a file",
        ],
        "mkdir" => &[
            "mkdir dirname   # Create a new directory",
            "mkdir -p a/b/c  # Create nested directories",
        ],
        "rm" => &[
            "rm file.txt     # Remove a file",
            "rm -r dir       # Remove directory recursively",
        ],
        "script" => &[
            "script run.sh                        # Run a script file",
            "script -c 'for i in a b do echo $i done'",
        ],
        _ => &["No examples available"],
    }
}

/// Description and usage for a builtin or registered command.
fn describe(executor: &ShellExecutor, name: &str) -> Option<(&'static str, &'static str)> {
    if let Some(builtin) = Builtin::from_name(name) {
        return Some((builtin.description(), builtin.usage()));
    }
    executor.registry.get(name).map(|cmd| (cmd.description(), cmd.usage()))
}

fn help(executor: &ShellExecutor, args: &[String]) -> CommandResult {
    if let Some(name) = args.first() {
        let name = name.to_lowercase();
        let Some((description, usage)) = describe(executor, &name) else {
            return CommandResult::error(format!("Command not found: {}\n", name));
        };

        let mut out = format!(
            "Command: {}\nDescription: {}\nUsage: {}\n\nExamples:\n",
            name, description, usage
        );
        for example in examples(&name) {
            out.push_str(&format!("  {}\n", example));
        }
        return CommandResult::success(out);
    }

    let mut names: Vec<&str> = executor.registry.names();
    names.extend(Builtin::ALL.iter().map(|b| b.name()));

    let mut out = String::from("Available commands:\n\n");
    let mut listed: Vec<&str> = Vec::new();
    let push_group = |out: &mut String, title: &str, members: &[&str]| {
        let mut members: Vec<&str> = members.to_vec();
        members.sort_unstable();
        if members.is_empty() {
            return;
        }
        out.push_str(&format!("{}:\n", title));
        for member in members {
            if let Some((description, _)) = describe(executor, member) {
                out.push_str(&format!("  {:<12} {}\n", member, description));
            }
        }
        out.push('\n');
    };

    for (title, members) in CATEGORIES {
        let present: Vec<&str> = members.iter().copied().filter(|m| names.contains(m)).collect();
        listed.extend(&present);
        push_group(&mut out, title, &present);
    }
    let others: Vec<&str> = names.iter().copied().filter(|n| !listed.contains(n)).collect();
    push_group(&mut out, "Other", &others);

    out.push_str("Type \"help <command>\" for more information about a specific command.\n");
    CommandResult::success(out)
}

// ============================================================================
// script
// ============================================================================

async fn script(executor: &ShellExecutor, args: &[String]) -> CommandResult {
    let source = match args.first().map(String::as_str) {
        None => return CommandResult::error(format!("usage: {}\n", Builtin::Script.usage())),
        Some("-c") if args.len() < 2 => {
            return CommandResult::error("script: -c requires script text\n".to_string());
        }
        Some("-c") => args[1..].join(" "),
        Some(file) => {
            let cwd = executor.state.read().await.cwd.clone();
            match executor.fs.read_file(&executor.fs.resolve_path(&cwd, file)).await {
                Ok(content) => content,
                Err(e) => {
                    return CommandResult::error(format!("script: {}: {}\n", file, describe_fs_error(&e)));
                }
            }
        }
    };

    let depth = executor.script_depth.fetch_add(1, Ordering::SeqCst);
    let result = if depth >= MAX_SCRIPT_DEPTH {
        CommandResult::error(format!("script: nesting deeper than {} levels\n", MAX_SCRIPT_DEPTH))
    } else {
        let mut interpreter = ScriptInterpreter::new(executor).with_limits(executor.limits.clone());
        match interpreter.interpret(&source).await {
            Ok(output) => CommandResult::success(output),
            Err(e) => {
                tracing::warn!(error = %e, "script failed");
                CommandResult::error(format!("script: {}\n", e))
            }
        }
    };
    executor.script_depth.fetch_sub(1, Ordering::SeqCst);

    result
}
