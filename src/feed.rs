//! Support for creating Atom feeds from an aggregate page's links.

use crate::config::Author;
use crate::page::{PageId, PageStore};
use crate::url::{self as page_url, INDEX};
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person, Text};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::io::Write;
use url::Url;

/// Bundled site-level metadata for creating a feed.
pub struct FeedConfig<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub author: Option<&'a Author>,

    /// The host (optionally with a scheme) that page urls are appended to.
    pub base_url: &'a str,
}

/// Creates a feed for the aggregate page `aggregate` and writes the result to
/// `w`. Entries are the aggregate's links in order, skipping index pages.
pub fn write_feed<W: Write>(
    config: &FeedConfig,
    pages: &PageStore,
    aggregate: PageId,
    w: W,
) -> Result<()> {
    let mut w = feed(config, pages, aggregate)?.write_to(w)?;
    w.flush()?;
    Ok(())
}

fn feed(config: &FeedConfig, pages: &PageStore, aggregate: PageId) -> Result<Feed> {
    let page = &pages[aggregate];
    let base = base_url(config.base_url)?;
    let entries = page
        .links()
        .iter()
        .map(|id| &pages[*id])
        .filter(|p| page_url::base_name(&p.url) != INDEX)
        .map(|p| {
            let href = absolute(&base, &p.url)?;
            let date = fixed(p.created_at);
            let mut entry = Entry::default();
            entry.set_id(href.clone());
            entry.set_title(p.title.clone());
            entry.set_updated(date);
            entry.set_published(Some(date));
            entry.set_authors(people(config.author));
            entry.set_links(vec![alternate(href)]);
            Ok(entry)
        })
        .collect::<Result<Vec<Entry>>>()?;

    let home = absolute(&base, &page.url)?;
    let mut feed = Feed::default();
    feed.set_title(format!("{}{}", title_prefix(config.title), page.title));
    feed.set_id(home.clone());
    feed.set_updated(fixed(Utc::now()));
    feed.set_authors(people(config.author));
    feed.set_links(vec![alternate(home)]);
    if !config.description.is_empty() {
        feed.set_subtitle(Some(Text::plain(config.description)));
    }
    feed.set_entries(entries);
    Ok(feed)
}

fn fixed(date: DateTime<Utc>) -> DateTime<FixedOffset> {
    date.with_timezone(&Utc.fix())
}

fn title_prefix(site_title: &str) -> String {
    if site_title.is_empty() {
        String::new()
    } else {
        format!("{}: ", site_title)
    }
}

fn alternate(href: String) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel("alternate");
    link
}

fn people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => {
            let mut person = Person::default();
            person.set_name(author.name.clone());
            person.set_email(author.email.clone());
            vec![person]
        }
        None => Vec::new(),
    }
}

// `localhost:8080` and `https://example.org` are both accepted; a bare host
// gets `http://`.
fn base_url(base: &str) -> Result<Url> {
    let with_scheme = if base.contains("://") {
        base.to_owned()
    } else {
        format!("http://{}", base)
    };
    Ok(Url::parse(&with_scheme)?)
}

fn absolute(base: &Url, url: &str) -> Result<String> {
    Ok(base.join(url)?.to_string())
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, and URL
/// parsing issues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] AtomError),

    /// Returned when the base url or a page url can't be made absolute.
    #[error("invalid feed url: {0}")]
    Url(#[from] url::ParseError),
}
