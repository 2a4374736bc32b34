//! Archive of generated and uploaded files.
//!
//! [`DiskArchive`] writes `<id>.bin` plus a `<id>.json` metadata sidecar
//! under its root directory; listing scans the sidecars.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use detailhq_core::files::{normalize_path, path_matches, FileRecord};
use detailhq_core::hashing::sha256_hex;
use detailhq_core::types::{new_id, EntityId};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive metadata error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    NotFound(EntityId),
}

#[async_trait]
pub trait FileArchive: Send + Sync {
    /// Store `bytes` and return the new record.
    async fn store(
        &self,
        name: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRecord, ArchiveError>;

    /// Records under `path_prefix` (everything when `None`), newest first.
    async fn list(&self, path_prefix: Option<&str>) -> Result<Vec<FileRecord>, ArchiveError>;

    /// A record and its bytes.
    async fn fetch(&self, id: EntityId) -> Result<(FileRecord, Vec<u8>), ArchiveError>;
}

fn new_record(name: &str, path: &str, content_type: &str, bytes: &[u8]) -> FileRecord {
    FileRecord {
        id: new_id(),
        name: name.trim().to_string(),
        path: normalize_path(path),
        content_type: content_type.to_string(),
        size: bytes.len() as u64,
        sha256: sha256_hex(bytes),
        created_at: Utc::now(),
    }
}

fn filter_sorted(records: impl IntoIterator<Item = FileRecord>, prefix: Option<&str>) -> Vec<FileRecord> {
    let mut out: Vec<FileRecord> = records
        .into_iter()
        .filter(|r| prefix.is_none_or(|p| path_matches(&r.path, p)))
        .collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    out
}

// ---------------------------------------------------------------------------
// MemoryArchive
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryArchive {
    files: RwLock<HashMap<EntityId, (FileRecord, Vec<u8>)>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileArchive for MemoryArchive {
    async fn store(
        &self,
        name: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRecord, ArchiveError> {
        let record = new_record(name, path, content_type, &bytes);
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(record.id, (record.clone(), bytes));
        Ok(record)
    }

    async fn list(&self, path_prefix: Option<&str>) -> Result<Vec<FileRecord>, ArchiveError> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        Ok(filter_sorted(
            files.values().map(|(r, _)| r.clone()).collect::<Vec<_>>(),
            path_prefix,
        ))
    }

    async fn fetch(&self, id: EntityId) -> Result<(FileRecord, Vec<u8>), ArchiveError> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files.get(&id).cloned().ok_or(ArchiveError::NotFound(id))
    }
}

// ---------------------------------------------------------------------------
// DiskArchive
// ---------------------------------------------------------------------------

pub struct DiskArchive {
    root: PathBuf,
}

impl DiskArchive {
    /// Open the archive, creating `root` if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn data_path(&self, id: EntityId) -> PathBuf {
        self.root.join(format!("{id}.bin"))
    }

    fn meta_path(&self, id: EntityId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

#[async_trait]
impl FileArchive for DiskArchive {
    async fn store(
        &self,
        name: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRecord, ArchiveError> {
        let record = new_record(name, path, content_type, &bytes);
        // Bytes first: a sidecar always points at complete data.
        tokio::fs::write(self.data_path(record.id), &bytes).await?;
        tokio::fs::write(self.meta_path(record.id), serde_json::to_vec_pretty(&record)?).await?;
        tracing::debug!(file_id = %record.id, path = %record.path, size = record.size, "File archived");
        Ok(record)
    }

    async fn list(&self, path_prefix: Option<&str>) -> Result<Vec<FileRecord>, ArchiveError> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let bytes = tokio::fs::read(&path).await?;
                match serde_json::from_slice::<FileRecord>(&bytes) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable sidecar");
                    }
                }
            }
        }
        Ok(filter_sorted(records, path_prefix))
    }

    async fn fetch(&self, id: EntityId) -> Result<(FileRecord, Vec<u8>), ArchiveError> {
        let meta = match tokio::fs::read(self.meta_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound(id))
            }
            Err(e) => return Err(e.into()),
        };
        let record: FileRecord = serde_json::from_slice(&meta)?;
        let bytes = tokio::fs::read(self.data_path(id)).await?;
        Ok((record, bytes))
    }
}
