//! Discovers and compiles the template tree. Each template file is indexed by
//! its directory scope (its position relative to the template root) and its
//! [`TemplateKind`], which comes from the file name:
//!
//! ```text
//! templates/
//! ├── base/              # shared partials, compiled into every template
//! │   └── layout.html    # e.g. {{define "layout"}}<html>...{{end}}
//! ├── _index.html        # (scope "", Index)
//! ├── _single.html       # (scope "", Single)
//! ├── _list.html         # (scope "", List)
//! └── notes/
//!     ├── _single.html   # (scope "notes", Single)
//!     └── _gallery.html  # (scope "notes", Named("gallery"))
//! ```
//!
//! Every file below a directory named `base` is a partial rather than a
//! template. Partials are concatenated (in path order) ahead of each template's
//! own source before compiling. If the combined source defines a template named
//! after the configured layout entry point, rendering invokes that and the
//! template's own top-level text is dropped; otherwise the top-level text is
//! rendered directly.

use crate::url;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The reserved directory name holding shared partials.
pub const PARTIALS_DIRECTORY: &str = "base";

const TEMPLATE_EXTENSION: &str = "html";

/// The role a template plays.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Explicit index pages (`index.md`, `index.html`).
    Index,

    /// Authored pages.
    Single,

    /// Aggregate pages.
    List,

    /// A template requested by name from a page's metadata.
    Named(String),
}

impl TemplateKind {
    /// Maps a template name (`single`, `_single`, `_single.html`, `gallery`,
    /// ...) to its kind.
    pub fn from_name(name: &str) -> TemplateKind {
        let name = name.trim_start_matches('_');
        let name = name
            .strip_suffix(".html")
            .unwrap_or(name);
        match name {
            "index" => TemplateKind::Index,
            "single" => TemplateKind::Single,
            "list" => TemplateKind::List,
            other => TemplateKind::Named(other.to_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TemplateKind::Index => "index",
            TemplateKind::Single => "single",
            TemplateKind::List => "list",
            TemplateKind::Named(name) => name,
        }
    }

    /// The conventional file name for this kind, e.g. `_single.html`.
    pub fn file_name(&self) -> String {
        format!("_{}.{}", self.name(), TEMPLATE_EXTENSION)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a compiled template is entered at render time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryPoint {
    /// Invoke the named (`{{define}}`d) template.
    Layout(String),

    /// Render the template's top-level text.
    Standalone,
}

/// A compiled template.
pub struct Template {
    pub scope: String,
    pub kind: TemplateKind,
    pub source_path: PathBuf,
    pub entry_point: EntryPoint,
    compiled: gtmpl::Template,
}

impl Template {
    /// Compiles `source` together with the shared `partials` source. See the
    /// module documentation for how the entry point is chosen.
    pub fn compile(
        scope: String,
        kind: TemplateKind,
        source_path: PathBuf,
        source: &str,
        partials: &str,
        layout: &str,
    ) -> Result<Template> {
        let mut text = String::with_capacity(partials.len() + source.len());
        text.push_str(partials);
        text.push_str(source);

        let compile_err = |err| Error::Compile {
            path: source_path.clone(),
            err,
        };
        let mut compiled = gtmpl::Template::default();
        compiled.parse(text).map_err(compile_err)?;

        // A second parse replaces the top-level tree, so in layout mode only
        // the layout invocation renders.
        let entry_point = if !layout.is_empty() && compiled.tree_set.contains_key(layout) {
            compiled
                .parse(format!("{{{{template \"{}\" .}}}}", layout))
                .map_err(compile_err)?;
            EntryPoint::Layout(layout.to_owned())
        } else {
            EntryPoint::Standalone
        };

        Ok(Template {
            scope,
            kind,
            source_path,
            entry_point,
            compiled,
        })
    }

    /// Executes the template's entry point against `context`, writing the
    /// result to `w`.
    pub fn execute<W: std::io::Write>(&self, w: &mut W, context: gtmpl::Value) -> std::result::Result<(), String> {
        let context = gtmpl::Context::from(context)?;
        self.compiled.execute(w, &context)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Template")
            .field("scope", &self.scope)
            .field("kind", &self.kind)
            .field("source_path", &self.source_path)
            .field("entry_point", &self.entry_point)
            .finish()
    }
}

/// Indexes compiled templates by `(scope, kind)`.
#[derive(Default, Debug)]
pub struct TemplateRegistry {
    templates: HashMap<(String, TemplateKind), Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `root`, collecting partials from `base` directories and compiling
    /// every other `.html` file with them. `layout` names the entry point.
    pub fn discover(root: &Path, layout: &str) -> Result<TemplateRegistry> {
        let mut partials = String::new();
        let mut sources = Vec::new();

        for result in WalkDir::new(root)
            .min_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            // strip_prefix shouldn't fail since `root` is always an ancestor
            // of the walked entries
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| Error::InvalidFileName(entry.path().to_owned()))?
                .to_owned();

            if is_partial(&relative) {
                log::debug!("Discovered partial {}", relative.display());
                partials.push_str(read(entry.path())?.trim_end());
            } else if relative.extension().map_or(false, |ext| ext == TEMPLATE_EXTENSION) {
                sources.push(relative);
            } else {
                log::debug!("Ignoring non-template file {}", relative.display());
            }
        }

        let mut registry = TemplateRegistry::new();
        for relative in sources {
            let invalid = || Error::InvalidFileName(relative.clone());
            let stem = relative
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(invalid)?;
            let scope = url::scope_from_relative_dir(relative.parent().unwrap_or_else(|| Path::new("")))
                .ok_or_else(invalid)?;
            let kind = TemplateKind::from_name(stem);
            let path = root.join(&relative);
            let template = Template::compile(scope, kind, path.clone(), read(&path)?.trim_end(), &partials, layout)?;
            log::debug!(
                "Discovered template {} (scope `{}`, kind {})",
                relative.display(),
                template.scope,
                template.kind
            );
            registry.insert(template);
        }
        Ok(registry)
    }

    /// Adds `template`, replacing any template with the same scope and kind.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        let key = (template.scope.clone(), template.kind.clone());
        let path = template.source_path.clone();
        let replaced = self.templates.insert(key, template);
        if let Some(old) = &replaced {
            log::debug!(
                "Template {} replaces {}",
                path.display(),
                old.source_path.display()
            );
        }
        replaced
    }

    pub fn get(&self, scope: &str, kind: &TemplateKind) -> Option<&Template> {
        self.templates.get(&(scope.to_owned(), kind.clone()))
    }

    pub fn remove(&mut self, scope: &str, kind: &TemplateKind) -> Option<Template> {
        self.templates.remove(&(scope.to_owned(), kind.clone()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn is_partial(relative: &Path) -> bool {
    relative
        .parent()
        .map_or(false, |dir| dir.components().any(|c| c.as_os_str() == PARTIALS_DIRECTORY))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error discovering or compiling templates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a template file can't be read.
    #[error("reading template `{}`: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when walking the template tree fails.
    #[error("walking template directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Returned when a template path isn't valid UTF-8.
    #[error("invalid template file name: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// Returned when a template fails to parse.
    #[error("compiling template `{}`: {err}", .path.display())]
    Compile { path: PathBuf, err: String },
}
