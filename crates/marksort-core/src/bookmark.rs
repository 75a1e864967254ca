//! Bookmark record.
//!
//! A single exported bookmark. The URL is the identity of a bookmark and the
//! `domain` is derived from it once, at construction; neither can be changed
//! afterwards.

use serde::Serialize;
use url::Url;

/// A bookmark as read from an export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    url: String,
    pub title: String,
    /// `ADD_DATE` token from the export, passed through unchanged.
    pub added_at: Option<String>,
    /// `ICON` reference from the export, passed through unchanged.
    pub icon: Option<String>,
    domain: String,
}

impl Bookmark {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let domain = extract_domain(&url);
        Self {
            url,
            title: title.into(),
            added_at: None,
            icon: None,
            domain,
        }
    }

    pub fn with_added_at(mut self, added_at: impl Into<String>) -> Self {
        self.added_at = Some(added_at.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Host of the URL without a leading `www.`, or empty if there is none.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Label used when rendering: the title, or the URL if the title is empty.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// Extract the host component of `url`, stripping a leading `www.`.
///
/// Returns an empty string for URLs that cannot be parsed or carry no host
/// (`javascript:`, `data:`, relative paths, ...).
pub fn extract_domain(url: &str) -> String {
    // Unicode form, not punycode.
    let host = match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(|h| idna::domain_to_unicode(h).0),
        Err(_) => None,
    };

    match host {
        Some(host) => host
            .strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(host),
        None => String::new(),
    }
}
