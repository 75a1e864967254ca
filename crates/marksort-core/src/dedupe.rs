//! Duplicate detection.
//!
//! Identity is the exact URL string: no normalization of scheme, trailing
//! slash or query.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::bookmark::Bookmark;

/// Result of [`dedupe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    /// First occurrence of every URL, in input order.
    pub unique: Vec<Bookmark>,
    /// Every later occurrence, in input order.
    pub duplicates: Vec<Bookmark>,
}

/// Split `bookmarks` into first occurrences and repeats, keeping order.
pub fn dedupe(bookmarks: Vec<Bookmark>) -> Deduplicated {
    let mut seen: HashSet<String> = HashSet::with_capacity(bookmarks.len());
    let mut result = Deduplicated::default();

    for bookmark in bookmarks {
        if seen.insert(bookmark.url().to_string()) {
            result.unique.push(bookmark);
        } else {
            result.duplicates.push(bookmark);
        }
    }

    result
}

/// Bookmarks whose URLs only differ in the `#fragment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentGroup<'a> {
    /// URL with the fragment removed.
    pub base_url: String,
    pub bookmarks: Vec<&'a Bookmark>,
}

/// Group bookmarks by URL without fragment.
///
/// Only groups with more than one member are returned, largest first; groups
/// of equal size keep first-seen order. Nothing is removed, this is a report.
pub fn fragment_duplicates(bookmarks: &[Bookmark]) -> Vec<FragmentGroup<'_>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Bookmark>> = HashMap::new();

    for bookmark in bookmarks {
        let base = strip_fragment(bookmark.url());
        if !groups.contains_key(base) {
            order.push(base.to_string());
        }
        groups.entry(base.to_string()).or_default().push(bookmark);
    }

    let mut result: Vec<FragmentGroup<'_>> = order
        .into_iter()
        .filter_map(|base_url| {
            let bookmarks = groups.remove(&base_url)?;
            (bookmarks.len() > 1).then_some(FragmentGroup {
                base_url,
                bookmarks,
            })
        })
        .collect();

    result.sort_by(|a, b| b.bookmarks.len().cmp(&a.bookmarks.len()));
    result
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map(|(base, _)| base).unwrap_or(url)
}

/// Summary of an imported bookmark list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub unique: usize,
    pub duplicates: usize,
    /// Bookmark count per non-empty domain.
    pub domains: BTreeMap<String, usize>,
}

impl ImportStats {
    pub fn collect(bookmarks: &[Bookmark]) -> Self {
        let unique = bookmarks
            .iter()
            .map(|b| b.url())
            .collect::<HashSet<_>>()
            .len();

        let mut domains = BTreeMap::new();
        for bookmark in bookmarks.iter().filter(|b| !b.domain().is_empty()) {
            *domains.entry(bookmark.domain().to_string()).or_insert(0) += 1;
        }

        Self {
            total: bookmarks.len(),
            unique,
            duplicates: bookmarks.len() - unique,
            domains,
        }
    }

    pub fn domains_count(&self) -> usize {
        self.domains.len()
    }

    /// The `n` most bookmarked domains, ties by name.
    pub fn top_domains(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self
            .domains
            .iter()
            .map(|(d, c)| (d.as_str(), *c))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}
