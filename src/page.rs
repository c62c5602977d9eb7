//! Defines the [`Page`] record and the [`PageStore`] that owns every page for
//! the duration of a build. Pages refer to each other (aggregate link lists)
//! by [`PageId`] into the store rather than by reference.

use crate::template::TemplateKind;
use crate::url;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::Index;

/// Identifies a page within a [`PageStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

/// What a page renders: an authored body, or (for aggregates) an ordered list
/// of other pages.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Body(String),
    Links(Vec<PageId>),
}

/// Represents one output page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// Unique key, e.g. `/notes/note1`. The page is written to
    /// `{output}{url}.html`.
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,

    /// Free-form classification from the `type` metadata field.
    pub content_type: String,
    pub draft: bool,

    /// The template name requested by the page's metadata, if any.
    pub template_override: Option<String>,
    pub content: Content,

    /// Set once templates are resolved: the scope of the winning template.
    pub template_scope: Option<String>,
}

impl Page {
    /// Creates an authored (detail) page.
    pub fn detail(url: String, title: String, created_at: DateTime<Utc>, body: String) -> Page {
        Page {
            url,
            title,
            created_at,
            content_type: String::new(),
            draft: false,
            template_override: None,
            content: Content::Body(body),
            template_scope: None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.content, Content::Links(_))
    }

    pub fn body(&self) -> Option<&str> {
        match &self.content {
            Content::Body(body) => Some(body),
            Content::Links(_) => None,
        }
    }

    pub fn links(&self) -> &[PageId] {
        match &self.content {
            Content::Links(links) => links,
            Content::Body(_) => &[],
        }
    }

    /// The template kind this page renders with: an explicit override, else
    /// `List` for aggregates, `Index` for explicit index pages, and `Single`
    /// for everything else.
    pub fn template_kind(&self) -> TemplateKind {
        if let Some(name) = &self.template_override {
            return TemplateKind::from_name(name);
        }
        if self.is_aggregate() {
            TemplateKind::List
        } else if url::base_name(&self.url) == url::INDEX {
            TemplateKind::Index
        } else {
            TemplateKind::Single
        }
    }
}

/// Owns every [`Page`] of a build, keyed by url and kept in insertion order.
#[derive(Default, Debug)]
pub struct PageStore {
    pages: Vec<Page>,
    by_url: HashMap<String, PageId>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `page`. If a page with the same url already exists it is
    /// replaced in place (keeping its position) and the old page is returned.
    pub fn insert(&mut self, page: Page) -> (PageId, Option<Page>) {
        match self.by_url.get(&page.url) {
            Some(&id) => {
                let old = std::mem::replace(&mut self.pages[id.0], page);
                (id, Some(old))
            }
            None => {
                let id = PageId(self.pages.len());
                self.by_url.insert(page.url.clone(), id);
                self.pages.push(page);
                (id, None)
            }
        }
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.get(id.0)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.get_mut(id.0)
    }

    pub fn id_of(&self, url: &str) -> Option<PageId> {
        self.by_url.get(url).copied()
    }

    pub fn by_url(&self, url: &str) -> Option<&Page> {
        self.id_of(url).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates pages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PageId, &Page)> {
        self.pages.iter().enumerate().map(|(i, p)| (PageId(i), p))
    }

    pub fn ids(&self) -> impl Iterator<Item = PageId> {
        (0..self.pages.len()).map(PageId)
    }

    /// Drops every page for which `keep` returns false. Ids are reassigned, so
    /// this must run before any page records links to another.
    pub fn retain<F: FnMut(&Page) -> bool>(&mut self, keep: F) {
        self.pages.retain(keep);
        self.by_url = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.url.clone(), PageId(i)))
            .collect();
    }
}

impl Index<PageId> for PageStore {
    type Output = Page;

    fn index(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }
}
