//! Helpers for deriving page urls from source paths and for walking the
//! directory structure encoded in a url. Page urls always begin with `/`, use
//! forward slashes, and carry no extension (e.g., `notes/a.md` becomes
//! `/notes/a`). Directory scopes are the same paths without the leading slash,
//! with the content root represented by the empty string.

use std::path::{Component, Path};

/// The last url segment that marks an index page.
pub const INDEX: &str = "index";

/// Derives the url for a file at `relative_path` (relative to the content
/// root) by stripping its extension and prefixing `/`. Returns [`None`] if any
/// path component isn't valid UTF-8.
pub fn from_relative_path(relative_path: &Path) -> Option<String> {
    let without_extension = relative_path.with_extension("");
    let mut url = String::new();
    for component in without_extension.components() {
        if let Component::Normal(part) = component {
            url.push('/');
            url.push_str(part.to_str()?);
        }
    }
    if url.is_empty() {
        url.push('/');
    }
    Some(url)
}

/// Converts a directory path relative to some root into a scope string
/// (`notes/sub`, or `""` for the root itself).
pub fn scope_from_relative_dir(relative_dir: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative_dir.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    Some(parts.join("/"))
}

/// Returns the directory scope containing the page at `url`, e.g. `notes/sub`
/// for `/notes/sub/page` and `""` for `/about`.
pub fn parent_scope(url: &str) -> &str {
    let trimmed = url.trim_start_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[..i],
        None => "",
    }
}

/// Returns the scope one level above `scope`, or [`None`] at the root.
pub fn parent_of_scope(scope: &str) -> Option<&str> {
    if scope.is_empty() {
        return None;
    }
    Some(match scope.rfind('/') {
        Some(i) => &scope[..i],
        None => "",
    })
}

/// Returns the last segment of `url`.
pub fn base_name(url: &str) -> &str {
    match url.rfind('/') {
        Some(i) => &url[i + 1..],
        None => url,
    }
}

/// Returns the url of the index page for the directory `scope`.
pub fn index_url(scope: &str) -> String {
    if scope.is_empty() {
        format!("/{}", INDEX)
    } else {
        format!("/{}/{}", scope, INDEX)
    }
}

/// Reports whether `url` names a page anywhere below the directory `scope`.
/// Segments must match whole, so `/notes-old/a` isn't under `notes`.
pub fn is_under(url: &str, scope: &str) -> bool {
    if scope.is_empty() {
        return url.starts_with('/');
    }
    match url.strip_prefix('/').and_then(|u| u.strip_prefix(scope)) {
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_relative_path() {
        assert_eq!(
            Some(String::from("/notes/note1")),
            from_relative_path(&PathBuf::from("notes").join("note1.md"))
        );
        assert_eq!(
            Some(String::from("/about")),
            from_relative_path(Path::new("about.html"))
        );
        assert_eq!(
            Some(String::from("/archive.tar")),
            from_relative_path(Path::new("archive.tar.gz"))
        );
    }

    #[test]
    fn test_parent_scope() {
        assert_eq!("notes/sub", parent_scope("/notes/sub/page"));
        assert_eq!("notes", parent_scope("/notes/index"));
        assert_eq!("", parent_scope("/about"));
    }

    #[test]
    fn test_parent_of_scope() {
        assert_eq!(Some("notes"), parent_of_scope("notes/sub"));
        assert_eq!(Some(""), parent_of_scope("notes"));
        assert_eq!(None, parent_of_scope(""));
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("/notes/a", "notes"));
        assert!(is_under("/notes/sub/b", "notes"));
        assert!(!is_under("/notes-old/a", "notes"));
        assert!(!is_under("/notes", "notes"));
    }

    #[test]
    fn test_index_url() {
        assert_eq!("/notes/index", index_url("notes"));
        assert_eq!("/index", index_url(""));
    }
}
