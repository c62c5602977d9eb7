//! Loads the site configuration. A project is a directory holding (by
//! default) `content/`, `templates/`, and `assets/`, plus an optional
//! `quire.yaml`:
//!
//! ```yaml
//! title: My Site
//! description: Notes and such
//! author:
//!   name: Ada
//!   email: ada@example.org
//! base_url: example.org
//! include_drafts: false
//! output_directory: public
//! layout: layout
//! recent_pages: 5
//! feeds: true
//! ```
//!
//! Every field is optional. Relative directories are resolved against the
//! directory holding `quire.yaml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The project file name.
pub const PROJECT_FILE: &str = "quire.yaml";

/// The site author, used for feeds.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct Project {
    title: String,
    description: String,
    author: Option<Author>,
    base_url: String,
    include_drafts: bool,
    content_directory: PathBuf,
    templates_directory: PathBuf,
    static_directory: PathBuf,
    output_directory: PathBuf,
    layout: String,
    recent_pages: usize,
    feeds: bool,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            title: String::new(),
            description: String::new(),
            author: None,
            base_url: String::from("localhost:8080"),
            include_drafts: false,
            content_directory: PathBuf::from("content"),
            templates_directory: PathBuf::from("templates"),
            static_directory: PathBuf::from("assets"),
            output_directory: PathBuf::from("public"),
            layout: String::from("layout"),
            recent_pages: 5,
            feeds: false,
        }
    }
}

/// The resolved build configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub title: String,
    pub description: String,
    pub author: Option<Author>,

    /// The host page urls are appended to in feeds.
    pub base_url: String,

    /// Keep pages whose metadata sets `draft: true`.
    pub include_drafts: bool,
    pub content_directory: PathBuf,
    pub templates_directory: PathBuf,

    /// Copied to `{output_directory}/static` when it exists.
    pub static_directory: PathBuf,

    /// Deleted and recreated on every build.
    pub output_directory: PathBuf,

    /// The name of the template invoked to render each page.
    pub layout: String,
    pub recent_pages: usize,
    pub feeds: bool,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads the
    /// first one found. Without one, `dir` is the project root and every
    /// setting takes its default.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        log::info!("No {} found; using defaults for {}", PROJECT_FILE, dir.display());
        Ok(Config::from_project(Project::default(), dir))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|err| Error::Parse {
                path: path.to_owned(),
                err,
            })?
        };
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        log::info!("Loaded {}", path.display());
        Ok(Config::from_project(project, root))
    }

    /// A configuration with every default, rooted at `root`.
    pub fn with_root(root: &Path) -> Config {
        Config::from_project(Project::default(), root)
    }

    fn from_project(project: Project, root: &Path) -> Config {
        Config {
            title: project.title,
            description: project.description,
            author: project.author,
            base_url: project.base_url,
            include_drafts: project.include_drafts,
            content_directory: root.join(project.content_directory),
            templates_directory: root.join(project.templates_directory),
            static_directory: root.join(project.static_directory),
            output_directory: root.join(project.output_directory),
            layout: project.layout,
            recent_pages: project.recent_pages,
            feeds: project.feeds,
        }
    }
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("opening project file `{}`: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },

    #[error("parsing project file `{}`: {err}", .path.display())]
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::with_root(Path::new("/site"));
        assert_eq!(Path::new("/site/content"), config.content_directory);
        assert_eq!(Path::new("/site/templates"), config.templates_directory);
        assert_eq!(Path::new("/site/public"), config.output_directory);
        assert_eq!("localhost:8080", config.base_url);
        assert!(!config.include_drafts);
        assert_eq!("layout", config.layout);
    }

    #[test]
    fn test_from_directory_walks_up() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "title: Notes\nauthor:\n  name: Ada\ninclude_drafts: true\noutput_directory: out\nunknown: 1\n",
        )?;
        let nested = dir.path().join("content/notes");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!("Notes", config.title);
        assert!(config.include_drafts);
        assert_eq!(Some(String::from("Ada")), config.author.map(|a| a.name));
        assert_eq!(dir.path().join("out"), config.output_directory);
        assert_eq!(dir.path().join("content"), config.content_directory);
        Ok(())
    }

    #[test]
    fn test_malformed_project_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, "include_drafts: [")?;
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::Parse { .. })
        ));
        Ok(())
    }
}
