//! The library code for the `quire` static site generator. A build turns a
//! content tree into a tree of HTML files in a handful of steps:
//!
//! 1. Indexing templates by directory scope and kind ([`crate::template`])
//! 2. Scanning content files and parsing their front matter ([`crate::scan`],
//!    [`crate::metadata`], [`crate::markdown`])
//! 3. Synthesizing a listing page for every directory without an index
//!    ([`crate::aggregate`])
//! 4. Resolving each page's template ([`crate::resolve`])
//! 5. Writing every page to disk ([`crate::write`])
//!
//! The fourth step is the interesting one. A page is rendered with the
//! template of its kind found closest to it: the page's own directory first,
//! then each ancestor, then the template root. So `templates/notes/_single.html`
//! renders `content/notes/a.md` and `content/notes/deep/b.md`, while
//! `templates/_single.html` renders everything else.
//!
//! [`build::Site`] owns the pages and templates for the duration of a build
//! and drives the steps in order.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod aggregate;
pub mod build;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod metadata;
pub mod order;
pub mod page;
pub mod resolve;
pub mod scan;
pub mod template;
pub mod url;
pub mod value;
pub mod write;

pub use build::{build_site, Site};
pub use config::Config;
