//! Exports the [`Site`] orchestrator and the [`build_site`] convenience
//! function, which stitch together the high-level steps of a build: indexing
//! the template tree ([`crate::template`]), scanning and parsing content
//! ([`crate::scan`], [`crate::metadata`], [`crate::markdown`]), dropping
//! drafts, synthesizing aggregate pages ([`crate::aggregate`]), resolving
//! every page's template ([`crate::resolve`]), ordering, and finally writing
//! pages, static assets, and feeds to disk ([`crate::write`], [`crate::feed`]).
//!
//! A build moves through the [`Phase`]s in order. It stops at the first fatal
//! error, which reports the phase it happened in, and a [`Site`] is never
//! built twice.

use crate::aggregate::{self, Placeholder};
use crate::config::Config;
use crate::feed::{self, write_feed, FeedConfig};
use crate::markdown::{ContentRenderer, SourceFormat};
use crate::metadata::{self, PageMetadata};
use crate::order;
use crate::page::{Content, Page, PageId, PageStore};
use crate::resolve::{resolve, TemplateNotFound};
use crate::scan::{self, Entry, SourceFile};
use crate::template::{self, TemplateRegistry};
use crate::url;
use crate::write::{self, output_path, reset_output, Writer};
use chrono::Utc;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// The name of the directory under the output root that static assets are
/// copied into.
pub const STATIC_OUTPUT_DIRECTORY: &str = "static";

/// The file each aggregate directory's feed is written to.
pub const FEED_FILE: &str = "feed.xml";

/// The stages of a build, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ScanningTemplates,
    ScanningContent,
    Filtering,
    SynthesizingAggregates,
    ResolvingTemplates,
    Ordering,
    Rendering,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::ScanningTemplates => "scanning templates",
            Phase::ScanningContent => "scanning content",
            Phase::Filtering => "filtering",
            Phase::SynthesizingAggregates => "synthesizing aggregates",
            Phase::ResolvingTemplates => "resolving templates",
            Phase::Ordering => "ordering",
            Phase::Rendering => "rendering",
            Phase::Done => "done",
            Phase::Failed => "failed",
        })
    }
}

/// Owns the pages and templates of one build.
pub struct Site<'a> {
    config: &'a Config,
    renderer: ContentRenderer,
    templates: TemplateRegistry,
    pages: PageStore,
    placeholders: Vec<Placeholder>,
    aggregates: Vec<PageId>,

    /// Every page id, most recent first. Filled during [`Phase::Ordering`].
    sorted: Vec<PageId>,
    phase: Phase,
}

impl<'a> Site<'a> {
    pub fn new(config: &'a Config) -> Site<'a> {
        Site {
            config,
            renderer: ContentRenderer::new(),
            templates: TemplateRegistry::new(),
            pages: PageStore::new(),
            placeholders: Vec::new(),
            aggregates: Vec::new(),
            sorted: Vec::new(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Runs every phase up to and including [`Phase::Ordering`]. Nothing is
    /// written to disk.
    pub fn build(&mut self) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(self.invalid_state());
        }
        let result = self.build_phases();
        self.finish(result)
    }

    /// Writes a built site to the output directory and moves to
    /// [`Phase::Done`].
    pub fn render(&mut self) -> Result<()> {
        if self.phase != Phase::Ordering {
            return Err(self.invalid_state());
        }
        let result = self.render_phase();
        let result = self.finish(result);
        if result.is_ok() {
            self.enter(Phase::Done);
        }
        result
    }

    /// Returns up to `count` authored pages, most recent first, optionally
    /// restricted to a content type. Empty until the site is built.
    pub fn recent_pages(&self, count: usize, content_type: Option<&str>) -> Vec<&Page> {
        order::most_recent(&self.sorted, &self.pages, count, content_type)
            .into_iter()
            .map(|id| &self.pages[id])
            .collect()
    }

    fn enter(&mut self, phase: Phase) {
        log::info!("Phase: {}", phase);
        self.phase = phase;
    }

    fn invalid_state(&self) -> Error {
        Error {
            phase: self.phase,
            kind: ErrorKind::InvalidState,
        }
    }

    fn finish(&mut self, result: std::result::Result<(), ErrorKind>) -> Result<()> {
        result.map_err(|kind| {
            let phase = self.phase;
            self.phase = Phase::Failed;
            Error { phase, kind }
        })
    }

    fn build_phases(&mut self) -> std::result::Result<(), ErrorKind> {
        self.enter(Phase::ScanningTemplates);
        self.templates =
            TemplateRegistry::discover(&self.config.templates_directory, &self.config.layout)?;
        log::info!("Indexed {} templates", self.templates.len());

        self.enter(Phase::ScanningContent);
        for entry in scan::scan(&self.config.content_directory)? {
            match entry {
                Entry::File(file) => self.ingest(file)?,
                Entry::Placeholder { scope, url } => {
                    self.placeholders.push(Placeholder { scope, url })
                }
            }
        }
        log::info!("Loaded {} pages", self.pages.len());

        self.enter(Phase::Filtering);
        if !self.config.include_drafts {
            self.drop_drafts();
        }

        self.enter(Phase::SynthesizingAggregates);
        self.aggregates = aggregate::synthesize(&mut self.pages, &self.placeholders, Utc::now());

        self.enter(Phase::ResolvingTemplates);
        let ids: Vec<PageId> = self.pages.ids().collect();
        for id in ids {
            let page = &self.pages[id];
            let kind = page.template_kind();
            let template = resolve(&self.templates, &page.url, &kind)?;
            log::debug!(
                "{} renders with {}",
                page.url,
                template.source_path.display()
            );
            let scope = template.scope.clone();
            if let Some(page) = self.pages.get_mut(id) {
                page.template_scope = Some(scope);
            }
        }

        self.enter(Phase::Ordering);
        let mut sorted: Vec<PageId> = self.pages.ids().collect();
        order::sort_recent_first(&mut sorted, &self.pages);
        self.sorted = sorted;
        Ok(())
    }

    // Removes draft pages. A directory whose only index was a draft gets an
    // aggregate instead.
    fn drop_drafts(&mut self) {
        let before = self.pages.len();
        let draft_indexes: Vec<String> = self
            .pages
            .iter()
            .filter(|(_, page)| page.draft && url::base_name(&page.url) == url::INDEX)
            .map(|(_, page)| page.url.clone())
            .collect();
        self.pages.retain(|page| !page.draft);
        log::info!("Dropped {} drafts", before - self.pages.len());

        for index_url in draft_indexes {
            let scope = url::parent_scope(&index_url);
            if scope.is_empty()
                || self.pages.by_url(&index_url).is_some()
                || self.placeholders.iter().any(|p| p.url == index_url)
            {
                continue;
            }
            log::debug!("Index {} is a draft; will aggregate", index_url);
            self.placeholders.push(Placeholder {
                scope: scope.to_owned(),
                url: index_url,
            });
        }
    }

    // Turns one content file into a page. Files with an unsupported extension
    // are skipped.
    fn ingest(&mut self, file: SourceFile) -> std::result::Result<(), ErrorKind> {
        let path = self.config.content_directory.join(&file.relative_path);
        let format = match SourceFormat::from_extension(&file.extension) {
            Ok(format) => format,
            Err(err) => {
                log::warn!("Skipping `{}`: {}", path.display(), err);
                return Ok(());
            }
        };

        let stem = file.stem().to_owned();
        let text = String::from_utf8(file.contents).map_err(|err| {
            ErrorKind::Scan(scan::Error::Io {
                path: path.clone(),
                err: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
            })
        })?;
        let (front_matter, body) = metadata::split(&text);
        let metadata = match front_matter {
            Some(front_matter) => {
                PageMetadata::parse(front_matter).map_err(|err| ErrorKind::Metadata {
                    path: path.clone(),
                    err,
                })?
            }
            None => PageMetadata::default(),
        };

        let created_at = metadata.created_at();
        let page = Page {
            url: file.url,
            title: metadata.title.unwrap_or(stem),
            created_at,
            content_type: metadata.content_type,
            draft: metadata.draft,
            template_override: metadata.template,
            content: Content::Body(self.renderer.render(format, body)),
            template_scope: None,
        };
        log::debug!("Loaded {} from {}", page.url, path.display());

        let (_, replaced) = self.pages.insert(page);
        if let Some(replaced) = replaced {
            log::warn!(
                "`{}` replaces an earlier page with url {}",
                path.display(),
                replaced.url
            );
        }
        Ok(())
    }

    fn render_phase(&mut self) -> std::result::Result<(), ErrorKind> {
        self.enter(Phase::Rendering);
        let output = &self.config.output_directory;

        // Blow away the old output so no stale pages survive.
        reset_output(output)?;

        if self.config.static_directory.is_dir() {
            copy_dir(
                &self.config.static_directory,
                &output.join(STATIC_OUTPUT_DIRECTORY),
            )?;
        }

        let recent = order::most_recent(
            &self.sorted,
            &self.pages,
            self.config.recent_pages,
            None,
        );
        let writer = Writer {
            output_directory: output,
            templates: &self.templates,
            pages: &self.pages,
            recent: &recent,
        };
        writer.write_pages(&self.sorted)?;

        if self.config.feeds {
            self.write_feeds()?;
        }
        Ok(())
    }

    fn write_feeds(&self) -> std::result::Result<(), ErrorKind> {
        let config = FeedConfig {
            title: &self.config.title,
            description: &self.config.description,
            author: self.config.author.as_ref(),
            base_url: &self.config.base_url,
        };
        for &id in &self.aggregates {
            let page_path = output_path(&self.config.output_directory, &self.pages[id].url);
            let path = match page_path.parent() {
                Some(dir) => dir.join(FEED_FILE),
                None => continue,
            };
            let feed_err = |err| ErrorKind::Feed {
                path: path.clone(),
                err,
            };
            let file = File::create(&path).map_err(|err| feed_err(feed::Error::Io(err)))?;
            write_feed(&config, &self.pages, id, BufWriter::new(file)).map_err(feed_err)?;
            log::info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

/// Builds the site described by `config`: [`Site::build`] followed by
/// [`Site::render`].
pub fn build_site(config: &Config) -> Result<()> {
    let mut site = Site::new(config);
    site.build()?;
    site.render()
}

fn copy_dir(src: &Path, dst: &Path) -> std::result::Result<(), ErrorKind> {
    std::fs::create_dir_all(dst).map_err(static_err(dst))?;
    for entry in std::fs::read_dir(src).map_err(static_err(src))? {
        let entry = entry.map_err(static_err(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type().map_err(static_err(&from))?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(static_err(&from))?;
        }
    }
    Ok(())
}

fn static_err(path: &Path) -> impl FnOnce(std::io::Error) -> ErrorKind {
    let path = path.to_owned();
    move |err| ErrorKind::Static { path, err }
}

/// The result of a build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal build error and the phase it stopped the build in.
#[derive(Debug, thiserror::Error)]
#[error("{phase}: {kind}")]
pub struct Error {
    pub phase: Phase,
    pub kind: ErrorKind,
}

/// The cause of a fatal build error.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Returned for problems reading the content tree.
    #[error(transparent)]
    Scan(#[from] scan::Error),

    /// Returned for malformed front matter.
    #[error("parsing front matter of `{}`: {err}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        err: metadata::Error,
    },

    /// Returned for problems reading or compiling the template tree.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned when a page has no template to render it.
    #[error(transparent)]
    TemplateNotFound(#[from] TemplateNotFound),

    /// Returned for problems rendering pages or cleaning the output directory.
    #[error(transparent)]
    Write(#[from] write::Error),

    #[error("writing feed `{}`: {err}", .path.display())]
    Feed {
        path: PathBuf,
        #[source]
        err: feed::Error,
    },

    /// Returned for problems copying static assets.
    #[error("copying static asset `{}`: {err}", .path.display())]
    Static {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when a [`Site`] is built twice, or rendered before it is built.
    #[error("site is not in a state for this operation")]
    InvalidState,
}
