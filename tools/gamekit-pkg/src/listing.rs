///
/// # Directory Listing
///
/// One traversal producer for every package listing. `list_entries` walks a
/// folder recursively and yields files lazily as `DirEntry` values; the
/// stream is finite and single-pass. `EntryStream::collect_sorted` drains it
/// into a list ordered by relative name.
///
/// A root that does not exist yields nothing, since optional package
/// folders such as `icons/` may be absent.
///

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::PackageError;

#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Path relative to the listing root, `/`-separated.
    pub name: String,
    pub path: PathBuf,
    pub metadata: Metadata,
}

pub struct EntryStream {
    root: PathBuf,
    walker: Option<walkdir::IntoIter>,
    extensions: Vec<String>,
}

pub fn list_entries(root: &Path, extensions: &[String]) -> EntryStream {
    let walker = root
        .is_dir()
        .then(|| WalkDir::new(root).sort_by_file_name().into_iter());

    EntryStream {
        root: root.to_path_buf(),
        walker,
        extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
    }
}

pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_error(root: &Path, err: walkdir::Error) -> PackageError {
    let path = err.path().unwrap_or(root).to_path_buf();
    PackageError::Io {
        path,
        source: err.into(),
    }
}

impl Iterator for EntryStream {
    type Item = Result<DirEntry, PackageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let walker = self.walker.as_mut()?;

        for entry in walker.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(walk_error(&self.root, e))),
            };

            if !entry.file_type().is_file() || !has_extension(entry.path(), &self.extensions) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => return Some(Err(walk_error(&self.root, e))),
            };

            return Some(Ok(DirEntry {
                name: relative_name(&self.root, entry.path()),
                path: entry.path().to_path_buf(),
                metadata,
            }));
        }

        None
    }
}

impl EntryStream {
    pub fn collect_sorted(self) -> Result<Vec<DirEntry>, PackageError> {
        let root = self.root.clone();
        let mut entries = self.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(root = %root.display(), count = entries.len(), "listed entries");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let entries = list_entries(&temp_dir.path().join("icons"), &[])
            .collect_sorted()
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_recursive_listing_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("images/ui")).unwrap();
        fs::write(root.join("images/ui/button.PNG"), b"png").unwrap();
        fs::write(root.join("images/bg.jpg"), b"jpg").unwrap();
        fs::write(root.join("notes.txt"), b"txt").unwrap();

        let entries = list_entries(root, &exts(&["png", "jpg"])).collect_sorted().unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["images/bg.jpg", "images/ui/button.PNG"]);
        assert_eq!(entries[0].metadata.len(), 3);
    }

    #[test]
    fn test_empty_extension_list_accepts_all_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.bin"), b"").unwrap();
        fs::write(temp_dir.path().join("b"), b"").unwrap();
        fs::create_dir_all(temp_dir.path().join("dir")).unwrap();

        let entries = list_entries(temp_dir.path(), &[]).collect_sorted().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_stream_is_lazy_and_single_pass() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.js"), b"").unwrap();
        fs::write(temp_dir.path().join("b.js"), b"").unwrap();

        let mut stream = list_entries(temp_dir.path(), &exts(&["js"]));
        assert_eq!(stream.next().unwrap().unwrap().name, "a.js");
        assert_eq!(stream.next().unwrap().unwrap().name, "b.js");
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }
}
