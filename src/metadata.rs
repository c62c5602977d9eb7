//! Defines the [`PageMetadata`] contract and the logic for splitting a content
//! file into its front matter and body. A content file may start with a
//! metadata block fenced by `---` lines:
//!
//! ```md
//! ---
//! {"title": "Hello, world!", "date": "2023-01-01", "type": "post"}
//! ---
//! # Hello
//!
//! World
//! ```
//!
//! The block is YAML, so any JSON object is also accepted. Files that don't
//! start with a fence (or never close it) are all body.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::time::UNIX_EPOCH;

/// The newest metadata version this crate understands.
pub const METADATA_VERSION: u32 = 1;

const FENCE: &str = "---";

/// Every field a page's front matter may carry. Unknown fields are ignored.
///
/// | field      | default                                   |
/// |------------|-------------------------------------------|
/// | `version`  | [`METADATA_VERSION`]                      |
/// | `title`    | the source file's stem (applied by caller)|
/// | `date`     | none (the caller picks the fallback)      |
/// | `type`     | `""`                                      |
/// | `draft`    | `false`                                   |
/// | `template` | none                                      |
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct PageMetadata {
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(default, alias = "Title")]
    pub title: Option<String>,

    #[serde(
        default,
        alias = "Date",
        alias = "createdAt",
        deserialize_with = "deserialize_date"
    )]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, rename = "type", alias = "Type", alias = "contentType")]
    pub content_type: String,

    #[serde(default, alias = "Draft")]
    pub draft: bool,

    #[serde(default, alias = "Template", alias = "TmplName")]
    pub template: Option<String>,
}

impl PageMetadata {
    /// Parses the text between the fences. Whitespace-only metadata yields the
    /// defaults.
    pub fn parse(text: &str) -> Result<PageMetadata> {
        if text.trim().is_empty() {
            return Ok(PageMetadata::default());
        }
        let metadata: PageMetadata = serde_yaml::from_str(text)?;
        match metadata.version {
            Some(v) if v > METADATA_VERSION => Err(Error::UnsupportedVersion(v)),
            _ => Ok(metadata),
        }
    }

    /// The creation time to use for an authored page: the `date` field if
    /// present, else the Unix epoch.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.date.unwrap_or_else(|| DateTime::<Utc>::from(UNIX_EPOCH))
    }
}

/// Splits `input` into `(metadata, body)`. The metadata is [`None`] unless the
/// first line is exactly `---` and a later line closes the block.
pub fn split(input: &str) -> (Option<&str>, &str) {
    let mut lines = input.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) => line,
        None => return (None, input),
    };
    if !is_fence(first) {
        return (None, input);
    }

    let metadata_start = first.len();
    let mut offset = metadata_start;
    for line in lines {
        if is_fence(line) {
            return (
                Some(&input[metadata_start..offset]),
                &input[offset + line.len()..],
            );
        }
        offset += line.len();
    }
    (None, input)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\n').trim_end_matches('\r') == FENCE
}

/// Parses a timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS`, or `YYYY-MM-DD`
/// form. The latter two are taken to be UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
        return Some(date_time.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let midnight = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => match parse_date(&s) {
            Some(date) => Ok(Some(date)),
            None => Err(D::Error::custom(format!("invalid date `{}`", s))),
        },
    }
}

/// The result of a fallible metadata operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents malformed front matter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the metadata isn't valid YAML/JSON or a field has the
    /// wrong shape.
    #[error("malformed metadata: {0}")]
    Deserialize(#[from] serde_yaml::Error),

    /// Returned when the metadata declares a version newer than
    /// [`METADATA_VERSION`].
    #[error("unsupported metadata version {0} (newest supported is {})", METADATA_VERSION)]
    UnsupportedVersion(u32),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_with_front_matter() {
        let (metadata, body) = split("---\n{\"title\": \"Hi\"}\n---\nbody\n");
        assert_eq!(Some("{\"title\": \"Hi\"}\n"), metadata);
        assert_eq!("body\n", body);
    }

    #[test]
    fn test_split_without_front_matter() {
        let input = "# Title\n\nno metadata here\n";
        assert_eq!((None, input), split(input));
    }

    #[test]
    fn test_split_single_fence_is_all_body() {
        let input = "---\ntitle: never closed\n";
        assert_eq!((None, input), split(input));
    }

    #[test]
    fn test_split_keeps_later_rules_in_body() {
        let (metadata, body) = split("---\ntitle: a\n---\nabove\n---\nbelow\n");
        assert_eq!(Some("title: a\n"), metadata);
        assert_eq!("above\n---\nbelow\n", body);
    }

    #[test]
    fn test_split_crlf() {
        let (metadata, body) = split("---\r\ntitle: a\r\n---\r\nbody");
        assert_eq!(Some("title: a\r\n"), metadata);
        assert_eq!("body", body);
    }

    #[test]
    fn test_parse_json_metadata() -> Result<()> {
        let metadata = PageMetadata::parse(
            r#"{"title": "Note", "date": "2023-02-01", "type": "post", "draft": true, "extra": 1}"#,
        )?;
        assert_eq!(Some(String::from("Note")), metadata.title);
        assert_eq!("post", metadata.content_type);
        assert!(metadata.draft);
        assert_eq!(parse_date("2023-02-01T00:00:00Z"), metadata.date);
        Ok(())
    }

    #[test]
    fn test_parse_yaml_aliases() -> Result<()> {
        let metadata = PageMetadata::parse("Title: Old\nDate: 2021-04-16T10:00:00Z\nTmplName: gallery\n")?;
        assert_eq!(Some(String::from("Old")), metadata.title);
        assert_eq!(Some(String::from("gallery")), metadata.template);
        assert_eq!(parse_date("2021-04-16 10:00:00"), metadata.date);
        Ok(())
    }

    #[test]
    fn test_parse_defaults() -> Result<()> {
        let metadata = PageMetadata::parse("  \n")?;
        assert_eq!(PageMetadata::default(), metadata);
        assert!(!metadata.draft);
        assert_eq!(DateTime::<Utc>::from(UNIX_EPOCH), metadata.created_at());
        Ok(())
    }

    #[test]
    fn test_parse_date_forms() {
        let midnight = parse_date("2023-01-01T00:00:00+00:00");
        assert!(midnight.is_some());
        assert_eq!(midnight, parse_date("2023-01-01"));
        assert_eq!(midnight, parse_date("2023-01-01 00:00:00"));
        assert_eq!(None, parse_date("01/01/2023"));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            PageMetadata::parse("{\"title\": "),
            Err(Error::Deserialize(_))
        ));
        assert!(matches!(
            PageMetadata::parse("date: yesterday"),
            Err(Error::Deserialize(_))
        ));
    }

    #[test]
    fn test_parse_future_version() {
        assert!(matches!(
            PageMetadata::parse("version: 2"),
            Err(Error::UnsupportedVersion(2))
        ));
    }
}
