//! File System Types
//!
//! Core types and traits for the virtual file tree the shell commands work on.

use async_trait::async_trait;
use std::time::SystemTime;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },

    #[error("ENOTEMPTY: directory not empty, {operation} '{path}'")]
    NotEmpty { path: String, operation: String },
}

impl FsError {
    pub(crate) fn not_found(path: &str, operation: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn already_exists(path: &str, operation: &str) -> Self {
        FsError::AlreadyExists {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn is_directory(path: &str, operation: &str) -> Self {
        FsError::IsDirectory {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn not_directory(path: &str, operation: &str) -> Self {
        FsError::NotDirectory {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    pub(crate) fn not_empty(path: &str, operation: &str) -> Self {
        FsError::NotEmpty {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }
}

/// File system entry types
#[derive(Debug, Clone)]
pub enum FsEntry {
    File { content: String, mtime: SystemTime },
    Directory { mtime: SystemTime },
}

impl FsEntry {
    pub fn file(content: impl Into<String>) -> Self {
        FsEntry::File {
            content: content.into(),
            mtime: SystemTime::now(),
        }
    }

    pub fn directory() -> Self {
        FsEntry::Directory {
            mtime: SystemTime::now(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FsEntry::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FsEntry::Directory { .. })
    }

    pub fn mtime(&self) -> SystemTime {
        match self {
            FsEntry::File { mtime, .. } | FsEntry::Directory { mtime } => *mtime,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            FsEntry::File { content, .. } => content.len() as u64,
            FsEntry::Directory { .. } => 0,
        }
    }
}

/// File status information
#[derive(Debug, Clone)]
pub struct FsStat {
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
    pub mtime: SystemTime,
}

impl From<&FsEntry> for FsStat {
    fn from(entry: &FsEntry) -> Self {
        FsStat {
            is_file: entry.is_file(),
            is_directory: entry.is_directory(),
            size: entry.size(),
            mtime: entry.mtime(),
        }
    }
}

/// Directory entry with type and metadata
#[derive(Debug, Clone)]
pub struct DirentEntry {
    pub name: String,
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
    pub mtime: SystemTime,
}

/// Options for mkdir operation
#[derive(Debug, Clone, Default)]
pub struct MkdirOptions {
    pub recursive: bool,
}

/// Options for rm operation
#[derive(Debug, Clone, Default)]
pub struct RmOptions {
    pub recursive: bool,
    pub force: bool,
}

/// Abstract filesystem interface that can be implemented by different backends.
///
/// Paths given to the async operations are absolute; callers resolve them
/// against their working directory with [`FileSystem::resolve_path`] first.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the contents of a file
    async fn read_file(&self, path: &str) -> Result<String, FsError>;

    /// Write content to a file, creating it if it doesn't exist
    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError>;

    /// Append content to a file, creating it if it doesn't exist
    async fn append_file(&self, path: &str, content: &str) -> Result<(), FsError>;

    async fn exists(&self, path: &str) -> bool;

    async fn stat(&self, path: &str) -> Result<FsStat, FsError>;

    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError>;

    /// Read directory contents, sorted by name
    async fn readdir_with_file_types(&self, path: &str) -> Result<Vec<DirentEntry>, FsError>;

    /// Remove a file or directory
    async fn rm(&self, path: &str, options: &RmOptions) -> Result<(), FsError>;

    /// Set modification time of a file or directory
    async fn utimes(&self, path: &str, mtime: SystemTime) -> Result<(), FsError>;

    /// Resolve a relative path against a base path
    fn resolve_path(&self, base: &str, path: &str) -> String;
}
