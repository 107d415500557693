//! Interpreter module
//!
//! Runs toy shell scripts directly off the token stream and delegates
//! plain command lines to a [`CommandExecutor`].

pub mod conditionals;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod types;

pub use conditionals::CompareOp;
pub use environment::{Environment, FunctionDefinition};
pub use errors::{Expected, InterpreterError};
pub use interpreter::ScriptInterpreter;
pub use types::{CommandExecutor, ExecResult, ExecutionLimits};
