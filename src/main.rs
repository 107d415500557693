use clap::Parser;
use serde::Serialize;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use toysh::{ExecutionLimits, Shell, ShellOptions};

#[derive(Parser)]
#[command(name = "toysh")]
#[command(about = "A toy scripting shell over an in-memory filesystem")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Working directory inside the virtual filesystem
    #[arg(long = "cwd")]
    cwd: Option<String>,

    /// Abort a loop after this many iterations
    #[arg(long = "max-loop-iterations")]
    max_loop_iterations: Option<u64>,

    /// Print the result as JSON (output, error)
    #[arg(long = "json")]
    json: bool,

    /// Enable debug logging
    #[arg(long = "debug")]
    debug: bool,

    /// Script file to execute (read from the host)
    #[arg()]
    script_file: Option<String>,
}

#[derive(Serialize)]
struct Report {
    output: String,
    error: Option<String>,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

/// Read commands from stdin one line at a time until EOF or `exit`.
async fn interactive(shell: &Shell) {
    let prompt = std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if prompt {
            print!("{}$ ", shell.cwd().await);
            let _ = std::io::stdout().flush();
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stdin");
                break;
            }
        };

        let result = shell.exec_line(&line).await;
        print!("{}", result.output);
        let _ = std::io::stdout().flush();
        if let Some(message) = result.error_message {
            eprintln!("{}", message);
        }

        if shell.exit_requested().await {
            break;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let script = if let Some(s) = cli.script {
        Some(s)
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => Some(content),
            Err(e) => {
                eprintln!("Error: Cannot read script file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let shell = Shell::new(ShellOptions {
        cwd: cli.cwd,
        limits: Some(ExecutionLimits {
            max_loop_iterations: cli.max_loop_iterations,
        }),
        ..Default::default()
    })
    .await;

    let Some(script) = script else {
        interactive(&shell).await;
        return;
    };

    let (output, error) = match shell.run_script(&script).await {
        Ok(output) => (output, None),
        Err(e) => (String::new(), Some(e.to_string())),
    };
    let exit_code = if error.is_some() { 1 } else { 0 };

    if cli.json {
        let report = Report { output, error };
        match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot encode result: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", output);
        if let Some(message) = error {
            eprintln!("toysh: {}", message);
        }
    }

    let _ = std::io::stdout().flush();
    std::process::exit(exit_code);
}
