//! Chronological page ordering: most recent first, with pages that share a
//! timestamp left in collection order.

use crate::page::{PageId, PageStore};

/// Sorts `ids` by creation time, newest first. The sort is stable.
pub fn sort_recent_first(ids: &mut [PageId], pages: &PageStore) {
    ids.sort_by(|a, b| pages[*b].created_at.cmp(&pages[*a].created_at));
}

/// Returns up to `count` ids from `sorted` (already in recency order) whose
/// page has `content_type`, or any type when `content_type` is [`None`].
/// Aggregate pages are never included.
pub fn most_recent(
    sorted: &[PageId],
    pages: &PageStore,
    count: usize,
    content_type: Option<&str>,
) -> Vec<PageId> {
    sorted
        .iter()
        .copied()
        .filter(|id| {
            let page = &pages[*id];
            !page.is_aggregate() && content_type.map_or(true, |t| page.content_type == t)
        })
        .take(count)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metadata::parse_date;
    use crate::page::Page;

    fn store(pages: &[(&str, &str, &str)]) -> PageStore {
        let mut store = PageStore::new();
        for (url, date, content_type) in pages {
            let mut page = Page::detail(
                url.to_string(),
                url.to_string(),
                parse_date(date).expect("valid date"),
                String::new(),
            );
            page.content_type = content_type.to_string();
            store.insert(page);
        }
        store
    }

    fn urls(ids: &[PageId], pages: &PageStore) -> Vec<String> {
        ids.iter().map(|id| pages[*id].url.clone()).collect()
    }

    #[test]
    fn test_sort_recent_first() {
        let pages = store(&[
            ("/t1", "2023-01-01", ""),
            ("/t3", "2023-03-01", ""),
            ("/t2", "2023-02-01", ""),
        ]);
        let mut ids: Vec<PageId> = pages.ids().collect();
        sort_recent_first(&mut ids, &pages);
        assert_eq!(vec!["/t3", "/t2", "/t1"], urls(&ids, &pages));
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let pages = store(&[
            ("/b", "2023-01-01", ""),
            ("/newer", "2023-06-01", ""),
            ("/a", "2023-01-01", ""),
            ("/c", "2023-01-01", ""),
        ]);
        let mut ids: Vec<PageId> = pages.ids().collect();
        sort_recent_first(&mut ids, &pages);
        assert_eq!(vec!["/newer", "/b", "/a", "/c"], urls(&ids, &pages));
    }

    #[test]
    fn test_most_recent() {
        let pages = store(&[
            ("/t1", "2023-01-01", "post"),
            ("/t2", "2023-02-01", "note"),
            ("/t3", "2023-03-01", "post"),
        ]);
        let mut ids: Vec<PageId> = pages.ids().collect();
        sort_recent_first(&mut ids, &pages);

        assert_eq!(vec!["/t3", "/t2"], urls(&most_recent(&ids, &pages, 2, None), &pages));
        assert_eq!(
            vec!["/t3", "/t1"],
            urls(&most_recent(&ids, &pages, 5, Some("post")), &pages)
        );
        assert!(most_recent(&ids, &pages, 0, None).is_empty());
    }
}
