//! Recursive discovery of CCDA documents.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{IngestError, Result};

/// Extensions treated as CCDA documents, compared ASCII case-insensitively.
pub const DOCUMENT_EXTENSIONS: [&str; 2] = ["ccda", "xml"];

/// Returns true when the path has one of [`DOCUMENT_EXTENSIONS`].
pub fn is_document_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Lists every CCDA document under `root`, at any depth.
///
/// Returns files sorted by their path relative to `root` so reports are
/// reproducible across platforms. Entries that cannot be read are logged and
/// skipped.
pub fn discover_documents(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry_result in WalkDir::new(root).follow_links(true) {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(error) => {
                warn!(
                    path = ?error.path(),
                    error = %error,
                    "skipping unreadable directory entry"
                );
                continue;
            }
        };

        // Skip directories
        if !entry.file_type().is_file() {
            continue;
        }

        if is_document_path(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| {
        let left = a.strip_prefix(root).unwrap_or(a);
        let right = b.strip_prefix(root).unwrap_or(b);
        left.cmp(right)
    });
    debug!(root = %root.display(), file_count = files.len(), "discovered documents");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "<ClinicalDocument/>").unwrap();
    }

    #[test]
    fn test_is_document_path() {
        assert!(is_document_path(Path::new("a/b/patient.xml")));
        assert!(is_document_path(Path::new("patient.ccda")));
        assert!(is_document_path(Path::new("PATIENT.XML")));
        assert!(is_document_path(Path::new("patient.CCDA")));
        assert!(!is_document_path(Path::new("patient.json")));
        assert!(!is_document_path(Path::new("patient.xml.bak")));
        assert!(!is_document_path(Path::new("xml")));
    }

    #[test]
    fn test_discover_sorted_and_recursive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.xml");
        touch(dir.path(), "a.ccda");
        touch(dir.path(), "nested/deeper/c.xml");
        touch(dir.path(), "nested/notes.txt");

        let files = discover_documents(dir.path()).unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.ccda"),
                PathBuf::from("b.xml"),
                PathBuf::from("nested/deeper/c.xml"),
            ]
        );
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(discover_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("doc.xml");
        std::fs::write(&file_path, "data").unwrap();

        let result = discover_documents(&file_path);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }
}
