//! Walks the content tree. Every file yields a [`Entry::File`] with its raw
//! bytes and derived url; every directory below the root that has no explicit
//! index file (`index.md` or `index.html`) yields an [`Entry::Placeholder`] to
//! be filled in by [`crate::aggregate`]. Entries come out depth-first with
//! siblings in file-name order, so repeated builds see the same order.

use crate::markdown::CONTENT_EXTENSIONS;
use crate::url::{self, INDEX};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One content file read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// The path relative to the content root.
    pub relative_path: PathBuf,
    pub url: String,

    /// The extension without the dot, or `""`.
    pub extension: String,
    pub contents: Vec<u8>,
}

impl SourceFile {
    /// The file name without its extension, used as the fallback title.
    pub fn stem(&self) -> &str {
        url::base_name(&self.url)
    }
}

/// An item discovered in the content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    File(SourceFile),

    /// A directory without an index. `scope` is its path relative to the
    /// content root (e.g. `notes/sub`) and `url` the index url it will get.
    Placeholder { scope: String, url: String },
}

/// Scans the content tree rooted at `root`.
pub fn scan(root: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for result in WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = result?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::InvalidFileName(entry.path().to_owned()))?;

        if entry.file_type().is_dir() {
            if has_index(entry.path()) {
                continue;
            }
            let scope = url::scope_from_relative_dir(relative)
                .ok_or_else(|| Error::InvalidFileName(relative.to_owned()))?;
            log::debug!("Directory `{}` has no index; will aggregate", scope);
            entries.push(Entry::Placeholder {
                url: url::index_url(&scope),
                scope,
            });
        } else {
            entries.push(Entry::File(read_file(entry.path(), relative)?));
        }
    }
    Ok(entries)
}

fn read_file(path: &Path, relative: &Path) -> Result<SourceFile> {
    let url = url::from_relative_path(relative)
        .ok_or_else(|| Error::InvalidFileName(relative.to_owned()))?;
    let extension = match relative.extension() {
        None => String::new(),
        Some(ext) => ext
            .to_str()
            .ok_or_else(|| Error::InvalidFileName(relative.to_owned()))?
            .to_owned(),
    };
    let contents = std::fs::read(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })?;
    Ok(SourceFile {
        relative_path: relative.to_owned(),
        url,
        extension,
        contents,
    })
}

fn has_index(dir: &Path) -> bool {
    CONTENT_EXTENSIONS
        .iter()
        .any(|ext| dir.join(format!("{}.{}", INDEX, ext)).is_file())
}

/// The result of a fallible scan.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to traverse or read the content tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a content file can't be read.
    #[error("reading `{}`: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when walking the content tree fails.
    #[error("walking content directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a content path isn't valid UTF-8.
    #[error("invalid file name: {}", .0.display())]
    InvalidFileName(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, contents: &str) -> std::io::Result<()> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn urls(entries: &[Entry]) -> Vec<&str> {
        entries
            .iter()
            .map(|e| match e {
                Entry::File(f) => f.url.as_str(),
                Entry::Placeholder { url, .. } => url.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_scan() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write(root, "about.md", "about")?;
        write(root, "notes/note2.md", "two")?;
        write(root, "notes/note1.md", "one")?;
        write(root, "notes/sub/deep.html", "<p>deep</p>")?;
        write(root, "projects/index.md", "projects")?;
        write(root, "projects/quire.md", "quire")?;

        let entries = scan(root)?;
        assert_eq!(
            vec![
                "/about",
                "/notes/index",
                "/notes/note1",
                "/notes/note2",
                "/notes/sub/index",
                "/notes/sub/deep",
                "/projects/index",
                "/projects/quire",
            ],
            urls(&entries)
        );

        match &entries[5] {
            Entry::File(file) => {
                assert_eq!("html", file.extension);
                assert_eq!(b"<p>deep</p>".to_vec(), file.contents);
                assert_eq!("deep", file.stem());
            }
            other => panic!("expected a file, got {:?}", other),
        }
        match &entries[4] {
            Entry::Placeholder { scope, .. } => assert_eq!("notes/sub", scope),
            other => panic!("expected a placeholder, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            scan(&dir.path().join("missing")),
            Err(Error::WalkDir(_))
        ));
    }
}
