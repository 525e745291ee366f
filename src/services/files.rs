use crate::error::AppError;
use crate::utils::path::{lexical_normalize, resolve_within};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Metadata for one filesystem object under the data root. Built per
/// request from a stat, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub is_directory: bool,
}

/// A directory listing with unreadable entries called out explicitly
/// instead of disappearing into logs.
#[derive(Debug, Default)]
pub struct DirListing {
    pub entries: Vec<FileEntry>,
    pub skipped: Vec<String>,
}

/// Read-only file access scoped to a single root directory.
#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
}

impl FileService {
    /// The root is canonicalized up front so containment checks compare
    /// real paths. It must exist.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            root: root.as_ref().canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied relative path, rejecting anything that
    /// would land outside the root.
    pub fn resolve(&self, candidate: &str) -> Result<PathBuf, AppError> {
        resolve_within(&self.root, candidate)
    }

    /// List the immediate children of `candidate` (non-recursive). An entry
    /// whose metadata cannot be read is skipped, not fatal.
    pub async fn list_dir(&self, candidate: &str) -> Result<DirListing, AppError> {
        let dir = self.resolve(candidate)?;

        let meta = match fs::metadata(&dir).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("Directory not found".to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        if !meta.is_dir() {
            return Err(AppError::NotADirectory(
                "Path is not a directory".to_string(),
            ));
        }

        let mut read_dir = fs::read_dir(&dir).await?;
        let mut listing = DirListing::default();

        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(_) => {
                    listing.skipped.push(name);
                    continue;
                }
            };

            let rel_path = lexical_normalize(&Path::new(candidate).join(&name))
                .to_string_lossy()
                .to_string();

            listing.entries.push(FileEntry {
                name,
                size: metadata.len(),
                path: rel_path,
                last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                is_directory: metadata.is_dir(),
            });
        }

        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}
