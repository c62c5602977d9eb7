use crate::page::{PageId, PageStore};
use crate::template::{TemplateKind, TemplateRegistry};
use crate::value::page_context;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Responsible for templating pages and writing them to disk as HTML files.
pub struct Writer<'a> {
    /// The directory the site is written into. A page with url `/a/b` is
    /// written to `{output_directory}/a/b.html`.
    pub output_directory: &'a Path,

    pub templates: &'a TemplateRegistry,
    pub pages: &'a PageStore,

    /// The most recent pages, exposed as `recent` to Index-kind pages.
    pub recent: &'a [PageId],
}

impl Writer<'_> {
    /// Takes a single page, templates it, and writes it to disk. Returns the
    /// path of the written file.
    fn write_page(&self, id: PageId) -> Result<PathBuf> {
        let page = &self.pages[id];
        let kind = page.template_kind();
        let template = page
            .template_scope
            .as_deref()
            .and_then(|scope| self.templates.get(scope, &kind))
            .ok_or_else(|| Error::Unresolved {
                url: page.url.clone(),
                kind: kind.clone(),
            })?;

        let recent = match kind {
            TemplateKind::Index => Some(self.recent),
            _ => None,
        };
        let context = page_context(self.pages, id, recent);

        let path = output_path(self.output_directory, &page.url);
        let io_err = |err| Error::Io {
            path: path.clone(),
            err,
        };
        let mut w = BufWriter::new(File::create(&path).map_err(io_err)?);
        template
            .execute(&mut w, context)
            .map_err(|err| Error::Template {
                url: page.url.clone(),
                template: template.source_path.clone(),
                err,
            })?;
        w.flush().map_err(io_err)?;
        Ok(path)
    }

    /// Writes every page in `ids`, creating parent directories as needed.
    /// Stops at the first failure; files written before it stay on disk.
    pub fn write_pages(&self, ids: &[PageId]) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for &id in ids {
            let path = output_path(self.output_directory, &self.pages[id].url);
            if let Some(dir) = path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            let written = self.write_page(id)?;
            log::info!("Wrote {}", written.display());
        }
        Ok(())
    }
}

/// Returns the file a page with `url` is written to.
pub fn output_path(output_directory: &Path, url: &str) -> PathBuf {
    output_directory.join(format!("{}.html", url.trim_start_matches('/')))
}

/// Blows away `dir` (if it exists) and recreates it empty.
pub fn reset_output(dir: &Path) -> Result<()> {
    let clean = |err| Error::Clean {
        path: dir.to_owned(),
        err,
    };
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(clean(e)),
    }
    std::fs::create_dir_all(dir).map_err(clean)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error executing a page's template.
    #[error("rendering `{url}` with `{}`: {err}", .template.display())]
    Template {
        url: String,
        template: PathBuf,
        err: String,
    },

    /// Returned when a page reaches rendering without a resolved template.
    #[error("page `{url}` has no resolved `{kind}` template")]
    Unresolved { url: String, kind: TemplateKind },

    /// Returned for I/O problems while cleaning the output directory.
    #[error("cleaning directory `{}`: {err}", .path.display())]
    Clean { path: PathBuf, err: std::io::Error },

    /// An error writing the output files.
    #[error("writing `{}`: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::parse_date;
    use crate::page::Page;
    use crate::template::Template;

    #[test]
    fn test_output_path() {
        assert_eq!(
            Path::new("/out").join("notes/index.html"),
            output_path(Path::new("/out"), "/notes/index")
        );
    }

    #[test]
    fn test_reset_output() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("public");
        std::fs::create_dir_all(out.join("stale"))?;
        std::fs::write(out.join("stale/old.html"), "old")?;

        reset_output(&out)?;
        assert!(out.is_dir());
        assert_eq!(0, std::fs::read_dir(&out)?.count());

        reset_output(&dir.path().join("fresh"))?;
        assert!(dir.path().join("fresh").is_dir());
        Ok(())
    }

    #[test]
    fn test_write_pages() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut templates = TemplateRegistry::new();
        templates.insert(Template::compile(
            String::new(),
            TemplateKind::Single,
            PathBuf::from("_single.html"),
            "<h1>{{.title}}</h1>{{.body}}",
            "",
            "layout",
        )?);

        let mut pages = PageStore::new();
        let mut page = Page::detail(
            String::from("/notes/deep/a"),
            String::from("A"),
            parse_date("2023-01-01").ok_or("bad date")?,
            String::from("<p>a</p>"),
        );
        page.template_scope = Some(String::new());
        let (id, _) = pages.insert(page);
        let (unresolved, _) = pages.insert(Page::detail(
            String::from("/b"),
            String::from("B"),
            parse_date("2023-01-01").ok_or("bad date")?,
            String::new(),
        ));

        let writer = Writer {
            output_directory: dir.path(),
            templates: &templates,
            pages: &pages,
            recent: &[],
        };
        writer.write_pages(&[id])?;
        assert_eq!(
            "<h1>A</h1><p>a</p>",
            std::fs::read_to_string(dir.path().join("notes/deep/a.html"))?
        );

        assert!(matches!(
            writer.write_pages(&[unresolved]),
            Err(Error::Unresolved { .. })
        ));
        Ok(())
    }
}
