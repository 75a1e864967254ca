//! Folder organizer.
//!
//! Turns a [`Classification`] into a folder tree:
//!
//! 1. one folder per main category, one child folder per subcategory;
//! 2. per main folder, a lone subfolder is flattened into its parent, and
//!    when there are several, subfolders with fewer than `min_group_size`
//!    bookmarks are merged into the parent;
//! 3. bookmarks and folders are sorted across the whole tree.
//!
//! ```rust
//! use marksort_core::{Bookmark, CategoryPath, Classification, Organizer};
//!
//! let mut classification = Classification::new();
//! classification.push(
//!     CategoryPath::with_sub("Dev", "Repos"),
//!     Bookmark::new("https://github.com/a", "A"),
//! );
//!
//! let root = Organizer::default().organize(classification);
//! let dev = root.subfolder("Dev").unwrap();
//! assert!(dev.subfolders().is_empty());
//! assert_eq!(dev.bookmarks().len(), 1);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bookmark::Bookmark;
use crate::category::Classification;

/// Subfolders below this size are merged into their parent.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 3;

/// Name of the root folder (the bookmark toolbar).
pub const DEFAULT_ROOT_NAME: &str = "书签栏";

/// A folder in the output tree. Only the organizer builds and changes folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    name: String,
    bookmarks: Vec<Bookmark>,
    subfolders: Vec<Folder>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bookmarks: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn subfolders(&self) -> &[Folder] {
        &self.subfolders
    }

    pub fn subfolder(&self, name: &str) -> Option<&Folder> {
        self.subfolders.iter().find(|f| f.name == name)
    }

    /// Bookmarks in this folder and all folders below it.
    pub fn total_count(&self) -> usize {
        self.bookmarks.len()
            + self
                .subfolders
                .iter()
                .map(Folder::total_count)
                .sum::<usize>()
    }

    /// Every bookmark in the tree, depth first, own bookmarks first.
    pub fn all_bookmarks(&self) -> Vec<&Bookmark> {
        let mut out: Vec<&Bookmark> = self.bookmarks.iter().collect();
        for sub in &self.subfolders {
            out.extend(sub.all_bookmarks());
        }
        out
    }

    fn subfolder_mut_or_insert(&mut self, name: &str) -> &mut Folder {
        let idx = match self.subfolders.iter().position(|f| f.name == name) {
            Some(idx) => idx,
            None => {
                self.subfolders.push(Folder::new(name));
                self.subfolders.len() - 1
            }
        };
        &mut self.subfolders[idx]
    }

    fn sort(&mut self, order: SortOrder) {
        self.bookmarks.sort_by(|a, b| order.compare(a, b));
        self.subfolders.sort_by(|a, b| a.name.cmp(&b.name));
        for sub in &mut self.subfolders {
            sub.sort(order);
        }
    }
}

/// Bookmark order inside a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Domain, then title ignoring case
    #[default]
    Domain,
    /// Title ignoring case
    Title,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Title => "title",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "domain" => Some(Self::Domain),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    fn compare(&self, a: &Bookmark, b: &Bookmark) -> Ordering {
        let by_title = || a.title.to_lowercase().cmp(&b.title.to_lowercase());
        match self {
            Self::Domain => a.domain().cmp(b.domain()).then_with(by_title),
            Self::Title => by_title(),
        }
    }
}

/// Builds normalized folder trees.
#[derive(Debug, Clone)]
pub struct Organizer {
    min_group_size: usize,
    sort_order: SortOrder,
    root_name: String,
}

impl Default for Organizer {
    fn default() -> Self {
        Self {
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            sort_order: SortOrder::default(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

impl Organizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_group_size(mut self, min_group_size: usize) -> Self {
        self.min_group_size = min_group_size;
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Group, normalize and sort.
    pub fn organize(&self, classification: Classification) -> Folder {
        let mut root = self.group(classification);
        for folder in &mut root.subfolders {
            self.normalize(folder);
        }
        root.sort(self.sort_order);
        debug!(
            folders = root.subfolders.len(),
            bookmarks = root.total_count(),
            "Organized bookmark tree"
        );
        root
    }

    /// Place every group in its folder without normalizing or sorting.
    ///
    /// Folders appear in first-encounter order and bookmarks in the order the
    /// classification holds them. Empty groups create no folder, and a blank
    /// subcategory files its bookmarks directly under the main folder.
    pub fn group(&self, classification: Classification) -> Folder {
        let mut root = Folder::new(self.root_name.clone());

        for (path, bookmarks) in classification.into_groups() {
            if bookmarks.is_empty() {
                continue;
            }
            let main = root.subfolder_mut_or_insert(&path.main);
            match path.sub.filter(|s| !s.trim().is_empty()) {
                Some(sub) => main.subfolder_mut_or_insert(&sub).bookmarks.extend(bookmarks),
                None => main.bookmarks.extend(bookmarks),
            }
        }

        root
    }

    /// Flatten a lone subfolder, or merge undersized ones into `folder`.
    fn normalize(&self, folder: &mut Folder) {
        let subfolders = std::mem::take(&mut folder.subfolders);

        if subfolders.len() == 1 {
            for sub in subfolders {
                debug!(folder = %folder.name, sub = %sub.name, "Flattening single subfolder");
                folder.bookmarks.extend(sub.bookmarks);
            }
            return;
        }

        for sub in subfolders {
            if sub.bookmarks.len() < self.min_group_size {
                debug!(
                    folder = %folder.name,
                    sub = %sub.name,
                    size = sub.bookmarks.len(),
                    "Merging small subfolder into parent"
                );
                folder.bookmarks.extend(sub.bookmarks);
            } else {
                folder.subfolders.push(sub);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{CategoryPath, Classify, RuleClassifier};
    use crate::dedupe::dedupe;
    use std::collections::HashSet;

    fn bookmarks(prefix: &str, n: usize) -> Vec<Bookmark> {
        (0..n)
            .map(|i| Bookmark::new(format!("https://{prefix}.com/{i}"), format!("{prefix}{i}")))
            .collect()
    }

    fn titles(folder: &Folder) -> Vec<&str> {
        folder.bookmarks().iter().map(|b| b.title.as_str()).collect()
    }

    fn names(folder: &Folder) -> Vec<&str> {
        folder.subfolders().iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_single_subfolder_is_flattened() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S"), bookmarks("a", 2));

        let root = Organizer::default().organize(classification);
        let x = root.subfolder("X").unwrap();
        assert!(x.subfolders().is_empty());
        assert_eq!(titles(x), vec!["a0", "a1"]);
    }

    #[test]
    fn test_single_large_subfolder_is_flattened_too() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::main_only("X"), bookmarks("direct", 1));
        classification.extend(CategoryPath::with_sub("X", "S"), bookmarks("s", 5));

        let root = Organizer::default().organize(classification);
        let x = root.subfolder("X").unwrap();
        assert!(x.subfolders().is_empty());
        assert_eq!(x.bookmarks().len(), 6);
    }

    #[test]
    fn test_small_subfolders_are_merged() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S1"), bookmarks("a", 2));
        classification.extend(CategoryPath::with_sub("X", "S2"), bookmarks("b", 5));

        let root = Organizer::default().organize(classification);
        let x = root.subfolder("X").unwrap();
        assert_eq!(names(x), vec!["S2"]);
        assert_eq!(x.subfolder("S2").unwrap().bookmarks().len(), 5);
        assert_eq!(titles(x), vec!["a0", "a1"]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S1"), bookmarks("a", 3));
        classification.extend(CategoryPath::with_sub("X", "S2"), bookmarks("b", 3));

        let root = Organizer::default().organize(classification);
        assert_eq!(names(root.subfolder("X").unwrap()), vec!["S1", "S2"]);
    }

    #[test]
    fn test_all_small_subfolders_merge_away() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S1"), bookmarks("a", 1));
        classification.extend(CategoryPath::with_sub("X", "S2"), bookmarks("b", 2));

        let root = Organizer::default()
            .with_min_group_size(5)
            .organize(classification);
        let x = root.subfolder("X").unwrap();
        assert!(x.subfolders().is_empty());
        assert_eq!(x.bookmarks().len(), 3);
    }

    #[test]
    fn test_custom_threshold() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S1"), bookmarks("a", 1));
        classification.extend(CategoryPath::with_sub("X", "S2"), bookmarks("b", 1));

        let root = Organizer::default()
            .with_min_group_size(1)
            .organize(classification);
        assert_eq!(names(root.subfolder("X").unwrap()), vec!["S1", "S2"]);
    }

    #[test]
    fn test_group_preserves_insertion_order() {
        let mut classification = Classification::new();
        classification.push(
            CategoryPath::main_only("Zed"),
            Bookmark::new("https://z.com/2", "second"),
        );
        classification.push(
            CategoryPath::with_sub("Alpha", "Sub"),
            Bookmark::new("https://a.com/", "alpha"),
        );
        classification.push(
            CategoryPath::main_only("Zed"),
            Bookmark::new("https://a.com/1", "first"),
        );

        let root = Organizer::default().group(classification);
        assert_eq!(names(&root), vec!["Zed", "Alpha"]);
        assert_eq!(titles(root.subfolder("Zed").unwrap()), vec!["second", "first"]);
        assert_eq!(names(root.subfolder("Alpha").unwrap()), vec!["Sub"]);
    }

    #[test]
    fn test_empty_groups_create_no_folder() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("Ghost", "Nothing"), Vec::new());
        classification.extend(CategoryPath::main_only("Real"), bookmarks("r", 1));

        let root = Organizer::default().organize(classification);
        assert_eq!(names(&root), vec!["Real"]);
        assert_eq!(root.total_count(), 1);
    }

    #[test]
    fn test_blank_subcategory_goes_to_main_folder() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", ""), bookmarks("blank", 1));
        classification.extend(CategoryPath::with_sub("X", "  "), bookmarks("space", 1));
        classification.extend(CategoryPath::with_sub("X", "S"), bookmarks("s", 3));
        classification.extend(CategoryPath::with_sub("X", "T"), bookmarks("t", 3));

        let grouped = Organizer::default().group(classification.clone());
        let x = grouped.subfolder("X").unwrap();
        assert_eq!(names(x), vec!["S", "T"]);
        assert_eq!(titles(x), vec!["blank0", "space0"]);

        let root = Organizer::default()
            .with_min_group_size(1)
            .organize(classification);
        let x = root.subfolder("X").unwrap();
        assert_eq!(names(x), vec!["S", "T"]);
        assert_eq!(x.bookmarks().len(), 2);
    }

    #[test]
    fn test_sorting_by_domain_then_title() {
        let mut classification = Classification::new();
        classification.extend(
            CategoryPath::main_only("X"),
            vec![
                Bookmark::new("https://b.com/1", "beta"),
                Bookmark::new("https://a.com/1", "zulu"),
                Bookmark::new("https://a.com/2", "Alpha"),
                Bookmark::new("https://b.com/2", "Able"),
            ],
        );
        classification.extend(CategoryPath::main_only("B"), bookmarks("q", 1));
        classification.extend(CategoryPath::main_only("A"), bookmarks("p", 1));

        let root = Organizer::default().organize(classification);
        assert_eq!(names(&root), vec!["A", "B", "X"]);
        assert_eq!(
            titles(root.subfolder("X").unwrap()),
            vec!["Alpha", "zulu", "Able", "beta"]
        );
    }

    #[test]
    fn test_sorting_by_title() {
        let mut classification = Classification::new();
        classification.extend(
            CategoryPath::main_only("X"),
            vec![
                Bookmark::new("https://b.com/1", "beta"),
                Bookmark::new("https://a.com/1", "zulu"),
                Bookmark::new("https://a.com/2", "Alpha"),
            ],
        );

        let root = Organizer::default()
            .with_sort_order(SortOrder::Title)
            .organize(classification);
        assert_eq!(
            titles(root.subfolder("X").unwrap()),
            vec!["Alpha", "beta", "zulu"]
        );
    }

    #[test]
    fn test_subfolders_sorted_recursively() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "Zeta"), bookmarks("z", 3));
        classification.extend(CategoryPath::with_sub("X", "Beta"), bookmarks("b", 3));

        let root = Organizer::default().organize(classification);
        assert_eq!(names(root.subfolder("X").unwrap()), vec!["Beta", "Zeta"]);
    }

    #[test]
    fn test_root_name() {
        let root = Organizer::default().organize(Classification::new());
        assert_eq!(root.name(), DEFAULT_ROOT_NAME);
        assert_eq!(root.total_count(), 0);

        let root = Organizer::default()
            .with_root_name("Toolbar")
            .organize(Classification::new());
        assert_eq!(root.name(), "Toolbar");
    }

    #[test]
    fn test_no_bookmark_lost_or_duplicated() {
        let mut input = Vec::new();
        for host in ["github.com", "leetcode.cn", "juejin.cn", "example.org", "figma.com"] {
            for i in 0..4 {
                input.push(Bookmark::new(format!("https://{host}/{i}"), format!("{host} {i}")));
            }
        }
        input.push(Bookmark::new("", ""));
        let expected: HashSet<String> = input.iter().map(|b| b.url().to_string()).collect();

        let classification = RuleClassifier::builtin().classify_batch(input);
        let total = classification.total();
        let root = Organizer::default().organize(classification);

        assert_eq!(root.total_count(), total);
        let urls: Vec<&str> = root.all_bookmarks().iter().map(|b| b.url()).collect();
        assert_eq!(urls.len(), expected.len());
        let seen: HashSet<String> = urls.iter().map(|u| u.to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_sibling_names_unique() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::with_sub("X", "S"), bookmarks("a", 3));
        classification.extend(CategoryPath::main_only("X"), bookmarks("b", 1));
        classification.extend(CategoryPath::with_sub("X", "T"), bookmarks("c", 3));
        classification.extend(CategoryPath::with_sub("Y", "S"), bookmarks("d", 1));

        let root = Organizer::default().organize(classification);
        let top: HashSet<&str> = names(&root).into_iter().collect();
        assert_eq!(top.len(), root.subfolders().len());
        assert_eq!(names(root.subfolder("X").unwrap()), vec!["S", "T"]);
    }

    #[test]
    fn test_organize_is_deterministic() {
        let input = vec![
            Bookmark::new("https://github.com/a", "A"),
            Bookmark::new("https://juejin.cn/1", "J"),
            Bookmark::new("https://tradingview.com/x", "T"),
        ];
        let classifier = RuleClassifier::builtin();
        let first = Organizer::default().organize(classifier.classify_batch(input.clone()));
        let second = Organizer::default().organize(classifier.classify_batch(input));
        assert_eq!(first, second);
    }

    #[test]
    fn test_end_to_end_example() {
        let input = vec![
            Bookmark::new("https://github.com/a", "A"),
            Bookmark::new("https://github.com/a", "A-dup"),
            Bookmark::new("https://leetcode.cn/x", "X"),
        ];

        let deduped = dedupe(input);
        assert_eq!(deduped.duplicates.len(), 1);
        assert_eq!(deduped.duplicates[0].title, "A-dup");

        let classification = RuleClassifier::builtin().classify_batch(deduped.unique);
        assert!(classification
            .get(&CategoryPath::with_sub("技术学习", "代码仓库"))
            .is_some());
        assert!(classification
            .get(&CategoryPath::with_sub("学习资源", "算法刷题"))
            .is_some());

        let root = Organizer::default().organize(classification);
        assert_eq!(names(&root), vec!["学习资源", "技术学习"]);
        for folder in root.subfolders() {
            assert!(folder.subfolders().is_empty());
            assert_eq!(folder.bookmarks().len(), 1);
        }
        assert_eq!(titles(root.subfolder("技术学习").unwrap()), vec!["A"]);
        assert_eq!(titles(root.subfolder("学习资源").unwrap()), vec!["X"]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("Domain"), Some(SortOrder::Domain));
        assert_eq!(SortOrder::parse("title"), Some(SortOrder::Title));
        assert_eq!(SortOrder::parse("size"), None);
    }
}
