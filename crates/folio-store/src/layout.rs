//! Deterministic artifact naming

use folio_domain::DocumentId;
use std::path::{Path, PathBuf};

/// Where a document's output table and checkpoint live.
///
/// Both names are keyed by the full file name, so two documents share an
/// artifact only if they share a file name. For `kaplan_uAPI.txt` and suffix `_UPI`:
/// - table: `{output_dir}/kaplan_uAPI.txt_UPI.csv`
/// - checkpoint: `{progress_dir}/kaplan_uAPI.txt_UPI.progress`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    output_dir: PathBuf,
    progress_dir: PathBuf,
    suffix: String,
}

impl ArtifactLayout {
    /// Layout with no artifact suffix
    pub fn new(output_dir: impl Into<PathBuf>, progress_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            progress_dir: progress_dir.into(),
            suffix: String::new(),
        }
    }

    /// Append `suffix` to every artifact name
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Output table path
    pub fn table_path(&self, document: &DocumentId) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.csv", document.as_str(), self.suffix))
    }

    /// Checkpoint path
    pub fn checkpoint_path(&self, document: &DocumentId) -> PathBuf {
        self.progress_dir
            .join(format!("{}{}.progress", document.as_str(), self.suffix))
    }

    /// Directory holding output tables
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory holding checkpoints
    pub fn progress_dir(&self) -> &Path {
        &self.progress_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming() {
        let layout = ArtifactLayout::new("output", "data/progress");
        let doc = DocumentId::new("bibliographies.txt");

        assert_eq!(layout.table_path(&doc), PathBuf::from("output/bibliographies.txt.csv"));
        assert_eq!(
            layout.checkpoint_path(&doc),
            PathBuf::from("data/progress/bibliographies.txt.progress")
        );
    }

    #[test]
    fn test_suffixed_naming() {
        let layout = ArtifactLayout::new("output", "data/progress").with_suffix("_sanitized");
        let doc = DocumentId::new("matthews.txt");

        assert_eq!(layout.table_path(&doc), PathBuf::from("output/matthews.txt_sanitized.csv"));
        assert_eq!(
            layout.checkpoint_path(&doc),
            PathBuf::from("data/progress/matthews.txt_sanitized.progress")
        );
    }

    #[test]
    fn test_distinct_documents_get_distinct_paths() {
        let layout = ArtifactLayout::new("out", "progress");
        let a = DocumentId::new("a.txt");
        let b = DocumentId::new("b.txt");
        assert_ne!(layout.table_path(&a), layout.table_path(&b));
        assert_ne!(layout.checkpoint_path(&a), layout.checkpoint_path(&b));
    }

    #[test]
    fn test_same_stem_different_extension_gets_distinct_tables() {
        let layout = ArtifactLayout::new("out", "progress");
        let text = DocumentId::new("matthews.txt");
        let markdown = DocumentId::new("matthews.md");

        assert_ne!(layout.table_path(&text), layout.table_path(&markdown));
        assert_ne!(layout.checkpoint_path(&text), layout.checkpoint_path(&markdown));
        assert_eq!(layout.table_path(&markdown), PathBuf::from("out/matthews.md.csv"));
    }
}
