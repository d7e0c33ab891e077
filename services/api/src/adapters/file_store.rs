//! services/api/src/adapters/file_store.rs
//!
//! Stores uploads on the local disk, one directory per session.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use examease_core::ports::{FileStore, PortError, PortResult};
use regex::Regex;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::LazyLock;
use uuid::Uuid;

static RE_UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]").expect("valid filename regex"));

/// Builds the on-disk name for an upload: `<unix-millis>-<sanitized original name>`.
pub fn stored_filename(original_name: &str, uploaded_at: DateTime<Utc>) -> String {
    let sanitized = RE_UNSAFE_FILENAME_CHARS.replace_all(original_name, "_");
    format!("{}-{}", uploaded_at.timestamp_millis(), sanitized)
}

#[derive(Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, session_id: Uuid, filename: &str, data: &[u8]) -> PortResult<String> {
        let dir = self.root.join(session_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(filename);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn read(&self, path: &str) -> PortResult<Bytes> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PortError::NotFound(format!("File {} not found", path)))
            }
            Err(e) => Err(PortError::Unexpected(format!("Failed to read {}: {}", path, e))),
        }
    }

    async fn remove(&self, path: &str) -> PortResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!("Failed to remove {}: {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stored_names_are_prefixed_and_sanitized() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            stored_filename("Unit 3 notes (final).pdf", at),
            "1700000000123-Unit_3_notes__final_.pdf"
        );
        assert_eq!(stored_filename("../../etc/passwd", at), "1700000000123-.._.._etc_passwd");
    }

    #[tokio::test]
    async fn files_round_trip_under_the_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let session = Uuid::new_v4();

        let path = store.save(session, "paper.txt", b"What is a heap?").await.unwrap();
        assert!(path.contains(&session.to_string()));
        assert_eq!(&store.read(&path).await.unwrap()[..], b"What is a heap?");

        store.remove(&path).await.unwrap();
        assert!(matches!(store.read(&path).await, Err(PortError::NotFound(_))));
        // Removing twice is not an error.
        store.remove(&path).await.unwrap();
    }
}
