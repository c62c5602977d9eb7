//! Synthesizes the listing page for every content directory that has no index
//! of its own. An aggregate links (most recent first) every authored page
//! anywhere below its directory, including pages in nested subdirectories.

use crate::order;
use crate::page::{Content, Page, PageId, PageStore};
use crate::url;
use chrono::{DateTime, Utc};

/// A directory awaiting its aggregate page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// The directory relative to the content root, e.g. `notes/sub`.
    pub scope: String,

    /// The aggregate's url, e.g. `/notes/sub/index`.
    pub url: String,
}

/// Creates one aggregate page per placeholder and returns their ids. A
/// placeholder whose url is already taken (e.g. by an index page added after
/// scanning) is skipped. `now` is the creation time of every synthesized page.
pub fn synthesize(
    pages: &mut PageStore,
    placeholders: &[Placeholder],
    now: DateTime<Utc>,
) -> Vec<PageId> {
    // Links are gathered against the authored pages only, before any aggregate
    // is inserted.
    let authored: Vec<PageId> = pages
        .iter()
        .filter(|(_, p)| !p.is_aggregate())
        .map(|(id, _)| id)
        .collect();

    let mut created = Vec::with_capacity(placeholders.len());
    for placeholder in placeholders {
        if let Some(existing) = pages.by_url(&placeholder.url) {
            log::info!("Page {} already exists; not aggregating", existing.url);
            continue;
        }

        let mut links: Vec<PageId> = authored
            .iter()
            .copied()
            .filter(|id| {
                let page = &pages[*id];
                page.url != placeholder.url && url::is_under(&page.url, &placeholder.scope)
            })
            .collect();
        order::sort_recent_first(&mut links, pages);

        let page = Page {
            url: placeholder.url.clone(),
            title: title_case(url::base_name(&placeholder.scope)),
            created_at: now,
            content_type: String::new(),
            draft: false,
            template_override: None,
            content: Content::Links(links),
            template_scope: None,
        };
        log::debug!(
            "Generated aggregate {} with {} links",
            page.url,
            page.links().len()
        );
        let (id, _) = pages.insert(page);
        created.push(id);
    }
    created
}

/// Upper-cases the first character of `name`.
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
