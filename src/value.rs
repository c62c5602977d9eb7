//! Converts pages into the [`Value`]s templates are executed against. Every
//! page exposes `title`, `createdAt` (RFC 3339), `date` (`YYYY-MM-DD`), `url`,
//! `type`, `draft`, `body`, and `links`. Detail pages get an empty `links`
//! list and aggregates an empty `body`, so one layout can serve both; an
//! aggregate's `links` lists its linked pages in order.

use crate::page::{Page, PageId, PageStore};
use gtmpl::Value;
use std::collections::HashMap;

/// Builds the rendering context for the page `id`. `recent`, if given, is
/// exposed as the `recent` list.
pub fn page_context(pages: &PageStore, id: PageId, recent: Option<&[PageId]>) -> Value {
    let page = &pages[id];
    let mut m = summary(page);
    m.insert("links".to_owned(), list(pages, page.links()));
    if let Some(recent) = recent {
        m.insert("recent".to_owned(), list(pages, recent));
    }
    Value::Object(m)
}

fn list(pages: &PageStore, ids: &[PageId]) -> Value {
    Value::Array(ids.iter().map(|id| Value::Object(summary(&pages[*id]))).collect())
}

// The fields shared by a page's own context and its appearances in other
// pages' link lists.
fn summary(page: &Page) -> HashMap<String, Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), Value::String(page.title.clone()));
    m.insert("createdAt".to_owned(), Value::String(page.created_at.to_rfc3339()));
    m.insert(
        "date".to_owned(),
        Value::String(page.created_at.format("%Y-%m-%d").to_string()),
    );
    m.insert("url".to_owned(), Value::String(page.url.clone()));
    m.insert("type".to_owned(), Value::String(page.content_type.clone()));
    m.insert("draft".to_owned(), Value::Bool(page.draft));
    m.insert(
        "body".to_owned(),
        Value::String(page.body().unwrap_or_default().to_owned()),
    );
    m
}
