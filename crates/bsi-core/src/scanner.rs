//! Directory scanner for discovering source files

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions the loader can read
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "txt", "xlsx", "xls", "xlsm", "ods"];

/// Whether a path has a readable extension (case-insensitive)
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Recursively collect every readable source file under `root`, sorted by path.
///
/// Office lock files (`~$name.xlsx`) and hidden files are skipped. Sorting
/// makes the order, and so the first-writer-wins outcome of description
/// merging, independent of the filesystem.
pub fn discover_sources<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::FileNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') || n.starts_with("~$"));
        if !hidden && is_supported(path) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a.csv")));
        assert!(is_supported(Path::new("b.XLSX")));
        assert!(is_supported(Path::new("c.ods")));
        assert!(!is_supported(Path::new("d.pdf")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.csv"), "x").unwrap();
        fs::write(dir.path().join("a.xlsx"), "x").unwrap();
        fs::write(dir.path().join("sub").join("c.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.pdf"), "x").unwrap();
        fs::write(dir.path().join("~$a.xlsx"), "x").unwrap();
        fs::write(dir.path().join(".hidden.csv"), "x").unwrap();

        let files = discover_sources(dir.path()).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a.xlsx"),
                dir.path().join("b.csv"),
                dir.path().join("sub").join("c.csv"),
            ]
        );
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_sources(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
