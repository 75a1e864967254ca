//! # Category Module
//!
//! Assigns every bookmark a category path: a main category and, optionally,
//! one subcategory below it.
//!
//! ## Module layout
//!
//! - `builtin`: the built-in category table
//! - `rules`: rule sets (built-in or loaded from a TOML file)
//! - `classifier`: classification results and the rule classifier
//! - `llm_classifier`: classification through a language model
//!
//! ## Usage
//!
//! ### Rule classification
//!
//! ```rust
//! use marksort_core::category::{CategoryPath, Classify, RuleClassifier};
//! use marksort_core::Bookmark;
//!
//! let classifier = RuleClassifier::builtin();
//! let path = classifier.classify(&Bookmark::new("https://github.com/rust-lang/rust", "rust"));
//! assert_eq!(path, CategoryPath::with_sub("技术学习", "代码仓库"));
//!
//! let names = classifier.category_names();
//! assert_eq!(names[0], "技术学习");
//! ```
//!
//! ### LLM classification (needs the Claude CLI)
//!
//! ```rust,ignore
//! use marksort_core::category::{Classify, LlmClassifier, RuleSet};
//! use marksort_core::{ClaudeCli, LlmConfig};
//!
//! let backend = ClaudeCli::detect(".")?;
//! let classifier = LlmClassifier::new(backend, RuleSet::builtin(), LlmConfig::default());
//! let classification = classifier.classify_batch(bookmarks);
//! ```

mod builtin;
mod classifier;
mod llm_classifier;
mod rules;

// Re-exports
pub use builtin::{
    BuiltinCategory, BuiltinSubcategory, BUILTIN_CATEGORIES, DEFAULT_CATEGORY, UNCATEGORIZED,
    UNGROUPED_LABEL,
};
pub use classifier::{
    CategoryPath, CategoryStat, CategoryStats, Classification, ClassificationMode, Classify,
    RuleClassifier,
};
pub use llm_classifier::LlmClassifier;
pub use rules::{
    CategoryConfigEntry, CategoryRule, MatchTarget, Predicate, RuleSet, RuleSetConfig,
    SubcategoryConfigEntry, SubcategoryRule,
};
