//! File-backed checkpoint store

use crate::{ArtifactLayout, StoreError};
use folio_domain::traits::CheckpointStore;
use folio_domain::DocumentId;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Checkpoint store writing one small text file per document.
///
/// `advance` writes to a sibling temp file, syncs it, and renames it over the
/// checkpoint, so a crash leaves either the old or the new cursor on disk.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    layout: ArtifactLayout,
}

impl FileCheckpointStore {
    /// Create a store over `layout`'s progress directory
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Checkpoint path for `document`
    pub fn path_for(&self, document: &DocumentId) -> PathBuf {
        self.layout.checkpoint_path(document)
    }

    /// Whether a cursor has been stored for `document`
    pub fn exists(&self, document: &DocumentId) -> bool {
        self.path_for(document).is_file()
    }
}

impl CheckpointStore for FileCheckpointStore {
    type Error = StoreError;

    fn read(&self, document: &DocumentId) -> Result<usize, Self::Error> {
        let path = self.path_for(document);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        content
            .trim()
            .parse::<usize>()
            .map_err(|_| StoreError::CorruptCheckpoint {
                path,
                content: content.trim().to_string(),
            })
    }

    fn advance(&mut self, document: &DocumentId, next_cursor: usize) -> Result<(), Self::Error> {
        let current = self.read(document)?;
        if next_cursor < current {
            return Err(StoreError::Regression {
                document: document.to_string(),
                current,
                requested: next_cursor,
            });
        }

        let path = self.path_for(document);
        write_atomically(&path, next_cursor.to_string().as_bytes())?;
        debug!(document = %document, cursor = next_cursor, "Checkpoint advanced");
        Ok(())
    }

    fn clear(&mut self, document: &DocumentId) -> Result<(), Self::Error> {
        let path = self.path_for(document);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    file.write_all(contents).map_err(|e| StoreError::io(&tmp, e))?;
    file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileCheckpointStore {
        FileCheckpointStore::new(ArtifactLayout::new(
            dir.path().join("output"),
            dir.path().join("progress"),
        ))
    }

    #[test]
    fn test_read_absent_is_zero() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert_eq!(store.read(&DocumentId::new("doc.txt")).unwrap(), 0);
        assert!(!store.exists(&DocumentId::new("doc.txt")));
    }

    #[test]
    fn test_advance_then_read() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let doc = DocumentId::new("doc.txt");

        store.advance(&doc, 0).unwrap();
        store.advance(&doc, 4).unwrap();

        assert_eq!(store.read(&doc).unwrap(), 4);
        assert_eq!(fs::read_to_string(store.path_for(&doc)).unwrap(), "4");
    }

    #[test]
    fn test_advance_rejects_regression() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let doc = DocumentId::new("doc.txt");

        store.advance(&doc, 5).unwrap();
        let result = store.advance(&doc, 2);
        assert!(matches!(
            result,
            Err(StoreError::Regression { current: 5, requested: 2, .. })
        ));
        assert_eq!(store.read(&doc).unwrap(), 5);
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let doc = DocumentId::new("doc.txt");
        let path = store.path_for(&doc);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "three").unwrap();

        assert!(matches!(
            store.read(&doc),
            Err(StoreError::CorruptCheckpoint { content, .. }) if content == "three"
        ));
    }

    #[test]
    fn test_read_tolerates_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let doc = DocumentId::new("doc.txt");
        let path = store.path_for(&doc);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "7\n").unwrap();

        assert_eq!(store.read(&doc).unwrap(), 7);
    }

    #[test]
    fn test_clear_removes_checkpoint() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let doc = DocumentId::new("doc.txt");

        store.advance(&doc, 3).unwrap();
        store.clear(&doc).unwrap();
        assert_eq!(store.read(&doc).unwrap(), 0);

        // Clearing twice is fine
        store.clear(&doc).unwrap();
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir);
        let doc = DocumentId::new("doc.txt");
        store.advance(&doc, 1).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path().join("progress"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
