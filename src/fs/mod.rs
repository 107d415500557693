//! File System Module
//!
//! The virtual file tree shell commands read and write. Nothing touches the
//! host filesystem.

pub mod in_memory_fs;
pub mod types;

pub use in_memory_fs::{dirname, normalize_path, InMemoryFs};
pub use types::*;
