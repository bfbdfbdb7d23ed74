// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collaborator contracts
//!
//! The engine owns no I/O. Database drivers, the filesystem and the system
//! clipboard are reached through these traits, implemented by the host
//! application.

use async_trait::async_trait;
use log::info;
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ClipboardError, DatabaseError, PersistenceError};
use crate::result::ResultSet;

/// One database connection.
///
/// `execute_query` may hand back a result the connection still references;
/// the engine copies it before storing it on a query.
#[async_trait]
pub trait Database: Send + Sync {
    async fn execute_query(&self, text: &str) -> Result<Arc<ResultSet>, DatabaseError>;

    /// The "preview top rows" statement for `table`
    async fn default_select_query(&self, table: &str) -> Result<String, DatabaseError>;
}

/// Raw text load/save at user-chosen paths
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String, PersistenceError>;

    async fn write_text(&self, path: &Path, contents: &str) -> Result<(), PersistenceError>;
}

/// Accepts one string payload
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// [`FileStore`] over the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileStore;

#[async_trait]
impl FileStore for FsFileStore {
    async fn read_text(&self, path: &Path) -> Result<String, PersistenceError> {
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn write_text(&self, path: &Path, contents: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, contents).await?;
        info!("Saved {} bytes to {}", contents.len(), path.display());
        Ok(())
    }
}

/// Clipboard that keeps the last payload in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}

/// Append `.{extension}` unless `path` already ends with it.
///
/// `report.txt` becomes `report.txt.sql`; the existing extension is kept.
pub fn with_extension_enforced(path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().map_or(false, |ext| ext == extension) {
        return path;
    }
    let mut raw: OsString = path.into_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// File name without directory or extension, used as a display name
pub fn display_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
