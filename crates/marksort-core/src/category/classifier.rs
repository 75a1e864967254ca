//! Category Classifier
//!
//! Maps bookmarks to a `(main, sub)` category path and groups them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bookmark::Bookmark;

use super::builtin::UNGROUPED_LABEL;
use super::rules::{MatchTarget, RuleSet};

/// Classification mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Rule table matching (deterministic, default)
    #[default]
    #[serde(alias = "rule")]
    Rules,
    /// Classification through the Claude CLI
    #[serde(alias = "ai")]
    Llm,
}

impl ClassificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Llm => "llm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "rules" | "rule" => Some(Self::Rules),
            "llm" | "ai" => Some(Self::Llm),
            _ => None,
        }
    }
}

/// Main category plus optional subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CategoryPath {
    pub main: String,
    pub sub: Option<String>,
}

impl CategoryPath {
    pub fn new(main: impl Into<String>, sub: Option<String>) -> Self {
        Self {
            main: main.into(),
            sub,
        }
    }

    pub fn main_only(main: impl Into<String>) -> Self {
        Self::new(main, None)
    }

    pub fn with_sub(main: impl Into<String>, sub: impl Into<String>) -> Self {
        Self::new(main, Some(sub.into()))
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}/{}", self.main, sub),
            None => write!(f, "{}", self.main),
        }
    }
}

/// Bookmarks grouped by category path.
///
/// Groups iterate in first-insertion order; bookmarks inside a group keep the
/// order they were pushed in.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    groups: Vec<(CategoryPath, Vec<Bookmark>)>,
    index: HashMap<CategoryPath, usize>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: CategoryPath, bookmark: Bookmark) {
        self.group_mut(path).push(bookmark);
    }

    /// Append several bookmarks to one group. An empty iterator still
    /// registers the key.
    pub fn extend(&mut self, path: CategoryPath, bookmarks: impl IntoIterator<Item = Bookmark>) {
        self.group_mut(path).extend(bookmarks);
    }

    fn group_mut(&mut self, path: CategoryPath) -> &mut Vec<Bookmark> {
        let idx = match self.index.get(&path) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.index.insert(path.clone(), idx);
                self.groups.push((path, Vec::new()));
                idx
            }
        };
        &mut self.groups[idx].1
    }

    pub fn get(&self, path: &CategoryPath) -> Option<&[Bookmark]> {
        self.index
            .get(path)
            .map(|&idx| self.groups[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryPath, &[Bookmark])> {
        self.groups.iter().map(|(p, b)| (p, b.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &CategoryPath> {
        self.groups.iter().map(|(p, _)| p)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of bookmarks across all groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, b)| b.len()).sum()
    }

    pub fn into_groups(self) -> Vec<(CategoryPath, Vec<Bookmark>)> {
        self.groups
    }

    /// Per-category counts.
    pub fn stats(&self) -> CategoryStats {
        let mut categories: BTreeMap<String, CategoryStat> = BTreeMap::new();
        for (path, bookmarks) in &self.groups {
            let stat = categories.entry(path.main.clone()).or_default();
            stat.total += bookmarks.len();
            let label = path.sub.as_deref().unwrap_or(UNGROUPED_LABEL);
            *stat.subcategories.entry(label.to_string()).or_insert(0) += bookmarks.len();
        }
        CategoryStats { categories }
    }
}

/// Counts for one main category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub total: usize,
    /// Subcategory name (or `未分组`) to bookmark count.
    pub subcategories: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryStats {
    pub categories: BTreeMap<String, CategoryStat>,
}

impl CategoryStats {
    pub fn get(&self, main: &str) -> Option<&CategoryStat> {
        self.categories.get(main)
    }

    /// Entries by descending total, ties broken by name.
    pub fn by_total(&self) -> Vec<(&str, &CategoryStat)> {
        let mut entries: Vec<_> = self
            .categories
            .iter()
            .map(|(name, stat)| (name.as_str(), stat))
            .collect();
        entries.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(|s| s.total).sum()
    }
}

/// Anything that can put a bookmark into a category.
///
/// The organizer only ever sees the resulting [`Classification`], so rule
/// based and LLM based classifiers are interchangeable.
pub trait Classify {
    fn classify(&self, bookmark: &Bookmark) -> CategoryPath;

    /// Classify every bookmark and group them, keeping input order inside
    /// each group.
    fn classify_batch(&self, bookmarks: Vec<Bookmark>) -> Classification {
        let mut classification = Classification::new();
        for bookmark in bookmarks {
            let path = self.classify(&bookmark);
            classification.push(path, bookmark);
        }
        classification
    }
}

/// First-match classifier over a [`RuleSet`].
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    rules: RuleSet,
}

impl RuleClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        Self::new(RuleSet::builtin())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.rules.names()
    }
}

impl Classify for RuleClassifier {
    fn classify(&self, bookmark: &Bookmark) -> CategoryPath {
        let url = bookmark.url().to_lowercase();
        let title = bookmark.title.to_lowercase();
        let domain = bookmark.domain().to_lowercase();
        let target = MatchTarget {
            url: &url,
            title: &title,
            domain: &domain,
        };

        for cat in self.rules.categories() {
            if !cat.predicate.matches(&target) {
                continue;
            }
            let sub = cat
                .subcategories
                .iter()
                .find(|s| s.predicate.matches(&target))
                .map(|s| s.name.clone());
            return CategoryPath::new(cat.name.clone(), sub);
        }

        CategoryPath::main_only(self.rules.default_category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::rules::{CategoryRule, Predicate, SubcategoryRule};

    fn classify_url(url: &str, title: &str) -> CategoryPath {
        RuleClassifier::builtin().classify(&Bookmark::new(url, title))
    }

    fn two_category_rules() -> RuleSet {
        RuleSet::new(
            vec![
                CategoryRule {
                    name: "ByKeyword".to_string(),
                    predicate: Predicate::new(&[], &["rustacean"], &[]),
                    subcategories: Vec::new(),
                },
                CategoryRule {
                    name: "ByDomain".to_string(),
                    predicate: Predicate::new(&["crates.io"], &[], &[]),
                    subcategories: vec![SubcategoryRule {
                        name: "Crates".to_string(),
                        predicate: Predicate::new(&["crates.io"], &[], &[]),
                    }],
                },
            ],
            "Other",
        )
        .unwrap()
    }

    #[test]
    fn test_github_goes_to_code_repositories() {
        assert_eq!(
            classify_url("https://github.com/a", "A"),
            CategoryPath::with_sub("技术学习", "代码仓库")
        );
    }

    #[test]
    fn test_leetcode_goes_to_algorithms() {
        assert_eq!(
            classify_url("https://leetcode.cn/x", "X"),
            CategoryPath::with_sub("学习资源", "算法刷题")
        );
    }

    #[test]
    fn test_first_subcategory_wins() {
        // juejin matches both 掘金 and the js keyword of 前端开发; 掘金 is declared first
        assert_eq!(
            classify_url("https://juejin.cn/post/1", "React hooks"),
            CategoryPath::with_sub("技术学习", "掘金")
        );
    }

    #[test]
    fn test_main_without_subcategory_match() {
        assert_eq!(
            classify_url("https://www.wikipedia.org/", "Wiki"),
            CategoryPath::main_only("工作相关")
        );
    }

    #[test]
    fn test_no_match_falls_back_to_default() {
        assert_eq!(
            classify_url("https://example.org/", "Sample"),
            CategoryPath::main_only("其他")
        );
    }

    #[test]
    fn test_empty_url_still_classifies() {
        let b = Bookmark::new("", "");
        assert_eq!(b.domain(), "");
        assert_eq!(
            RuleClassifier::builtin().classify(&b),
            CategoryPath::main_only("其他")
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            classify_url("HTTPS://GITHUB.COM/A", "A"),
            CategoryPath::with_sub("技术学习", "代码仓库")
        );
    }

    #[test]
    fn test_declaration_order_beats_match_kind() {
        let classifier = RuleClassifier::new(two_category_rules());
        let b = Bookmark::new("https://crates.io/crates/serde", "for every rustacean");
        assert_eq!(classifier.classify(&b), CategoryPath::main_only("ByKeyword"));

        let b = Bookmark::new("https://crates.io/crates/serde", "serde");
        assert_eq!(
            classifier.classify(&b),
            CategoryPath::with_sub("ByDomain", "Crates")
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = RuleClassifier::builtin();
        let b = Bookmark::new("https://tradingview.com/chart", "Chart");
        let first = classifier.classify(&b);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&b), first);
        }
    }

    #[test]
    fn test_classify_batch_groups_in_input_order() {
        let classifier = RuleClassifier::builtin();
        let bookmarks = vec![
            Bookmark::new("https://github.com/a", "A"),
            Bookmark::new("https://example.org/1", "One"),
            Bookmark::new("https://github.com/b", "B"),
            Bookmark::new("https://example.org/2", "Two"),
        ];

        let classification = classifier.classify_batch(bookmarks);
        assert_eq!(classification.len(), 2);
        assert_eq!(classification.total(), 4);

        let paths: Vec<_> = classification.paths().cloned().collect();
        assert_eq!(
            paths,
            vec![
                CategoryPath::with_sub("技术学习", "代码仓库"),
                CategoryPath::main_only("其他"),
            ]
        );

        let repos = classification.get(&paths[0]).unwrap();
        let titles: Vec<_> = repos.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        let other = classification.get(&paths[1]).unwrap();
        let titles: Vec<_> = other.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_stats_from_classification() {
        let mut classification = Classification::new();
        classification.push(
            CategoryPath::with_sub("Dev", "Repos"),
            Bookmark::new("https://github.com/a", "a"),
        );
        classification.push(
            CategoryPath::with_sub("Dev", "Repos"),
            Bookmark::new("https://github.com/b", "b"),
        );
        classification.push(
            CategoryPath::main_only("Dev"),
            Bookmark::new("https://dev.to/", "dev"),
        );
        classification.push(
            CategoryPath::main_only("Other"),
            Bookmark::new("https://example.org/", "x"),
        );

        let stats = classification.stats();
        let dev = stats.get("Dev").unwrap();
        assert_eq!(dev.total, 3);
        assert_eq!(dev.subcategories.get("Repos"), Some(&2));
        assert_eq!(dev.subcategories.get(UNGROUPED_LABEL), Some(&1));
        assert_eq!(stats.get("Other").unwrap().total, 1);
        assert_eq!(stats.total(), classification.total());

        let order: Vec<_> = stats.by_total().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["Dev", "Other"]);

        // recomputing gives the same result
        assert_eq!(classification.stats(), stats);
    }

    #[test]
    fn test_extend_registers_empty_group() {
        let mut classification = Classification::new();
        classification.extend(CategoryPath::main_only("Empty"), Vec::new());
        assert_eq!(classification.len(), 1);
        assert_eq!(classification.total(), 0);
        assert_eq!(classification.stats().get("Empty").unwrap().total, 0);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(ClassificationMode::parse("rules"), Some(ClassificationMode::Rules));
        assert_eq!(ClassificationMode::parse("LLM"), Some(ClassificationMode::Llm));
        assert_eq!(ClassificationMode::parse("magic"), None);
        assert_eq!(ClassificationMode::Llm.as_str(), "llm");
    }

    #[test]
    fn test_path_display() {
        assert_eq!(CategoryPath::with_sub("A", "B").to_string(), "A/B");
        assert_eq!(CategoryPath::main_only("A").to_string(), "A");
    }
}
