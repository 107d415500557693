//! In-Memory File System Implementation
//!
//! A flat map from normalised absolute path to entry. Parent directories are
//! implied by path prefixes, and `/` always exists.

use std::collections::HashMap;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::*;

/// In-memory virtual file system.
pub struct InMemoryFs {
    data: RwLock<HashMap<String, FsEntry>>,
}

impl InMemoryFs {
    /// Create a filesystem holding only the root directory.
    pub fn new() -> Self {
        let mut data = HashMap::new();
        data.insert("/".to_string(), FsEntry::directory());
        Self {
            data: RwLock::new(data),
        }
    }

    /// Create a filesystem seeded with files; missing parents are created.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut data = HashMap::new();
        data.insert("/".to_string(), FsEntry::directory());
        for (path, content) in files {
            let normalized = normalize_path(path.as_ref());
            ensure_parent_dirs(&mut data, &normalized);
            data.insert(normalized, FsEntry::file(content));
        }
        Self {
            data: RwLock::new(data),
        }
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Path utilities
// ============================================================================

/// Collapse `.`, `..`, duplicate and trailing slashes into an absolute path.
pub fn normalize_path(path: &str) -> String {
    let mut resolved: Vec<&str> = Vec::new();
    for part in path.split('/').filter(|p| !p.is_empty() && *p != ".") {
        if part == ".." {
            resolved.pop();
        } else {
            resolved.push(part);
        }
    }
    format!("/{}", resolved.join("/"))
}

pub fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => normalized[..pos].to_string(),
    }
}

fn child_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{}/", dir)
    }
}

fn ensure_parent_dirs(data: &mut HashMap<String, FsEntry>, path: &str) {
    let dir = dirname(path);
    if dir == "/" || data.contains_key(&dir) {
        return;
    }
    ensure_parent_dirs(data, &dir);
    data.insert(dir, FsEntry::directory());
}

/// The parent of `path` must exist and be a directory before anything can
/// be created inside it.
fn check_parent(data: &HashMap<String, FsEntry>, path: &str, display: &str, operation: &str) -> Result<(), FsError> {
    match data.get(&dirname(path)) {
        Some(FsEntry::Directory { .. }) => Ok(()),
        Some(FsEntry::File { .. }) => Err(FsError::not_directory(display, operation)),
        None => Err(FsError::not_found(display, operation)),
    }
}

// ============================================================================
// FileSystem trait implementation
// ============================================================================

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let data = self.data.read().await;
        match data.get(&normalize_path(path)) {
            Some(FsEntry::File { content, .. }) => Ok(content.clone()),
            Some(FsEntry::Directory { .. }) => Err(FsError::is_directory(path, "read")),
            None => Err(FsError::not_found(path, "open")),
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);
        if let Some(FsEntry::Directory { .. }) = data.get(&normalized) {
            return Err(FsError::is_directory(path, "write"));
        }
        check_parent(&data, &normalized, path, "open")?;
        data.insert(normalized, FsEntry::file(content));
        Ok(())
    }

    async fn append_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);

        match data.get_mut(&normalized) {
            Some(FsEntry::Directory { .. }) => Err(FsError::is_directory(path, "write")),
            Some(FsEntry::File { content: existing, mtime }) => {
                existing.push_str(content);
                *mtime = SystemTime::now();
                Ok(())
            }
            None => {
                check_parent(&data, &normalized, path, "open")?;
                data.insert(normalized, FsEntry::file(content));
                Ok(())
            }
        }
    }

    async fn exists(&self, path: &str) -> bool {
        self.data.read().await.contains_key(&normalize_path(path))
    }

    async fn stat(&self, path: &str) -> Result<FsStat, FsError> {
        let data = self.data.read().await;
        data.get(&normalize_path(path))
            .map(FsStat::from)
            .ok_or_else(|| FsError::not_found(path, "stat"))
    }

    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);

        match data.get(&normalized) {
            Some(FsEntry::File { .. }) => return Err(FsError::already_exists(path, "mkdir")),
            Some(FsEntry::Directory { .. }) if options.recursive => return Ok(()),
            Some(FsEntry::Directory { .. }) => return Err(FsError::already_exists(path, "mkdir")),
            None => {}
        }

        if options.recursive {
            // A file anywhere along the way blocks creation
            let mut current = String::new();
            for part in normalized.split('/').filter(|p| !p.is_empty()) {
                current = format!("{}/{}", current, part);
                match data.get(&current) {
                    Some(FsEntry::File { .. }) => return Err(FsError::not_directory(path, "mkdir")),
                    Some(FsEntry::Directory { .. }) => {}
                    None => {
                        data.insert(current.clone(), FsEntry::directory());
                    }
                }
            }
            return Ok(());
        }

        check_parent(&data, &normalized, path, "mkdir")?;
        data.insert(normalized, FsEntry::directory());
        Ok(())
    }

    async fn readdir_with_file_types(&self, path: &str) -> Result<Vec<DirentEntry>, FsError> {
        let data = self.data.read().await;
        let normalized = normalize_path(path);

        match data.get(&normalized) {
            Some(FsEntry::Directory { .. }) => {}
            Some(FsEntry::File { .. }) => return Err(FsError::not_directory(path, "scandir")),
            None => return Err(FsError::not_found(path, "scandir")),
        }

        let prefix = child_prefix(&normalized);
        let mut entries: Vec<DirentEntry> = data
            .iter()
            .filter_map(|(p, entry)| {
                let name = p.strip_prefix(&prefix)?;
                if name.is_empty() || name.contains('/') {
                    return None;
                }
                Some(DirentEntry {
                    name: name.to_string(),
                    is_file: entry.is_file(),
                    is_directory: entry.is_directory(),
                    size: entry.size(),
                    mtime: entry.mtime(),
                })
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn rm(&self, path: &str, options: &RmOptions) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);

        match data.get(&normalized) {
            None if options.force => return Ok(()),
            None => return Err(FsError::not_found(path, "rm")),
            Some(FsEntry::Directory { .. }) => {
                let prefix = child_prefix(&normalized);
                let children: Vec<String> = data
                    .keys()
                    .filter(|k| k.starts_with(&prefix) && **k != normalized)
                    .cloned()
                    .collect();

                if !options.recursive {
                    return Err(if children.is_empty() {
                        FsError::is_directory(path, "rm")
                    } else {
                        FsError::not_empty(path, "rm")
                    });
                }
                for child in children {
                    data.remove(&child);
                }
            }
            Some(FsEntry::File { .. }) => {}
        }

        // The root is emptied but never removed
        if normalized != "/" {
            data.remove(&normalized);
        }
        Ok(())
    }

    async fn utimes(&self, path: &str, mtime: SystemTime) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        match data.get_mut(&normalize_path(path)) {
            Some(FsEntry::File { mtime: m, .. }) | Some(FsEntry::Directory { mtime: m }) => {
                *m = mtime;
                Ok(())
            }
            None => Err(FsError::not_found(path, "utimes")),
        }
    }

    fn resolve_path(&self, base: &str, path: &str) -> String {
        if path.starts_with('/') {
            normalize_path(path)
        } else {
            normalize_path(&format!("{}/{}", base, path))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
