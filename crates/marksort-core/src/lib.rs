pub mod bookmark;
pub mod category;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod llm;
pub mod netscape;
pub mod organizer;
pub mod pipeline;

pub use bookmark::{extract_domain, Bookmark};
pub use config::{ClassifierConfig, Config, OrganizeConfig};
pub use dedupe::{dedupe, fragment_duplicates, Deduplicated, FragmentGroup, ImportStats};
pub use error::{MarksortError, Result};
pub use llm::{
    check_claude_cli, execute_claude, require_claude_cli, ClaudeCli, LlmBackend, LlmConfig,
};
pub use netscape::NetscapeWriter;
pub use organizer::{Folder, Organizer, SortOrder, DEFAULT_MIN_GROUP_SIZE, DEFAULT_ROOT_NAME};
pub use pipeline::{build_classifier, SelectedClassifier, SortReport};

// Category system
pub use category::{
    CategoryPath, CategoryStat, CategoryStats, Classification, ClassificationMode, Classify,
    LlmClassifier, RuleClassifier, RuleSet, BUILTIN_CATEGORIES, DEFAULT_CATEGORY,
};
