// src/commands/mod.rs
pub mod cat;
pub mod clear_cmd;
pub mod echo;
pub mod ls;
pub mod mkdir;
pub mod pwd;
pub mod registry;
pub mod rm;
pub mod touch;
pub mod types;
pub mod utils;

pub use registry::{create_default_registry, CommandRegistry};
pub use types::{Command, CommandContext, CommandResult};
