//! Enumerates source documents. See [`list_documents`].

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The file extension stripped from a source document's file name to get its
/// base name.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Returns every file under `root`, recursing through subdirectories. Entries
/// are visited in file-name order so repeated runs over the same tree report
/// documents in the same order. Fails if `root` doesn't exist or any directory
/// beneath it can't be read.
pub fn list_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for result in WalkDir::new(root).sort_by_file_name() {
        let entry = result?;
        if entry.file_type().is_file() {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

/// Returns the base name of a source document: its file name with a trailing
/// [`MARKDOWN_EXTENSION`] removed. Other extensions are kept as part of the
/// name.
pub fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.strip_suffix(MARKDOWN_EXTENSION) {
        Some(stem) => stem.to_owned(),
        None => file_name,
    }
}

/// The result of enumerating source documents.
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the source tree can't be walked.
#[derive(Debug, thiserror::Error)]
#[error("Enumerating source documents: {0}")]
pub struct Error(#[from] walkdir::Error);

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_documents_recurses() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("notes/deep"))?;
        fs::write(dir.path().join("b.md"), "b")?;
        fs::write(dir.path().join("a.md"), "a")?;
        fs::write(dir.path().join("notes/c.md"), "c")?;
        fs::write(dir.path().join("notes/deep/d.md"), "d")?;

        let documents: Vec<PathBuf> = list_documents(dir.path())?
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_owned())
            .collect();

        assert_eq!(
            documents,
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("b.md"),
                PathBuf::from("notes/c.md"),
                PathBuf::from("notes/deep/d.md"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_list_documents_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_documents(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("posts/Hello World.md")), "Hello World");
        assert_eq!(base_name(Path::new("notes.txt")), "notes.txt");
        assert_eq!(base_name(Path::new("archive.md.bak")), "archive.md.bak");
    }
}
