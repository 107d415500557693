//! toysh - a small scripting shell over a virtual filesystem
//!
//! Scripts are lexed into tokens and executed directly off the token stream.
//! Plain command lines are handed to a pluggable [`CommandExecutor`]; the
//! bundled [`ShellExecutor`] runs them against an in-memory file tree.

pub mod commands;
pub mod executor;
pub mod fs;
pub mod interpreter;
pub mod parser;
pub mod shell;

pub use executor::ShellExecutor;
pub use interpreter::{CommandExecutor, Environment, ExecResult, ExecutionLimits, InterpreterError, ScriptInterpreter};
pub use parser::{tokenize, Token, TokenKind};
pub use shell::{Shell, ShellOptions};
