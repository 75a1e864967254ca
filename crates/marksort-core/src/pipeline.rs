//! Import → dedupe → classify → organize.

use std::path::Path;

use tracing::{debug, warn};

use crate::bookmark::Bookmark;
use crate::category::{
    CategoryStats, ClassificationMode, Classify, LlmClassifier, RuleClassifier, RuleSet,
};
use crate::dedupe::{dedupe, fragment_duplicates, ImportStats};
use crate::llm::{ClaudeCli, LlmConfig};
use crate::organizer::{Folder, Organizer};

/// Everything a sort run produced.
#[derive(Debug, Clone)]
pub struct SortReport {
    /// Stats over the raw input, before dedupe.
    pub import_stats: ImportStats,
    /// Dropped repeats, in input order.
    pub duplicates: Vec<Bookmark>,
    /// Groups of kept bookmarks that only differ in the URL fragment.
    pub fragment_duplicates: usize,
    pub category_stats: CategoryStats,
    pub root: Folder,
}

/// Run the whole pipeline over `bookmarks`.
pub fn run(
    bookmarks: Vec<Bookmark>,
    classifier: &dyn Classify,
    organizer: &Organizer,
) -> SortReport {
    let import_stats = ImportStats::collect(&bookmarks);

    let deduped = dedupe(bookmarks);
    let fragment_groups = fragment_duplicates(&deduped.unique).len();
    debug!(
        unique = deduped.unique.len(),
        duplicates = deduped.duplicates.len(),
        fragment_groups,
        "Deduplicated bookmarks"
    );

    let classification = classifier.classify_batch(deduped.unique);
    let category_stats = classification.stats();
    debug!(groups = classification.len(), "Classified bookmarks");

    let root = organizer.organize(classification);

    SortReport {
        import_stats,
        duplicates: deduped.duplicates,
        fragment_duplicates: fragment_groups,
        category_stats,
        root,
    }
}

/// A classifier plus the mode it actually runs in.
pub struct SelectedClassifier {
    pub classifier: Box<dyn Classify>,
    pub mode: ClassificationMode,
}

/// Build the classifier for `mode`.
///
/// LLM mode needs the Claude CLI; without it the rule classifier is used and a
/// warning is logged. Callers compare [`SelectedClassifier::mode`] with the
/// requested one to tell the user.
pub fn build_classifier(
    mode: ClassificationMode,
    rules: RuleSet,
    llm: &LlmConfig,
    working_dir: &Path,
) -> SelectedClassifier {
    match mode {
        ClassificationMode::Rules => rule_classifier(rules),
        ClassificationMode::Llm => match ClaudeCli::detect(working_dir) {
            Ok(backend) => SelectedClassifier {
                classifier: Box::new(LlmClassifier::new(backend, rules, llm.clone())),
                mode: ClassificationMode::Llm,
            },
            Err(e) => {
                warn!(error = %e, "LLM classification unavailable, using rules");
                rule_classifier(rules)
            }
        },
    }
}

fn rule_classifier(rules: RuleSet) -> SelectedClassifier {
    SelectedClassifier {
        classifier: Box::new(RuleClassifier::new(rules)),
        mode: ClassificationMode::Rules,
    }
}
