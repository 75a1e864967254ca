//! LLM Classifier
//!
//! Asks an [`LlmBackend`] to pick categories from the rule set's names. Answers
//! are checked against the rule set, so the output has the same shape as the
//! rule based classifier.
//!
//! Failure policy:
//! - a batch request is retried `max_attempts` times with exponential backoff;
//! - after that, every bookmark of the batch is asked for on its own;
//! - a single request that fails puts the bookmark into the default category;
//! - bookmarks a successful batch answer leaves out go to `未分类`.

use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bookmark::Bookmark;
use crate::error::{MarksortError, Result};
use crate::llm::{LlmBackend, LlmConfig};

use super::builtin::UNCATEGORIZED;
use super::classifier::{CategoryPath, Classification, Classify};
use super::rules::RuleSet;

#[derive(Debug, Deserialize)]
struct LlmChoice {
    main: Option<String>,
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmBatchResponse {
    #[serde(default)]
    results: Vec<LlmBatchEntry>,
}

#[derive(Debug, Deserialize)]
struct LlmBatchEntry {
    index: usize,
    main: Option<String>,
    sub: Option<String>,
}

#[derive(Debug, Serialize)]
struct PromptItem<'a> {
    index: usize,
    title: &'a str,
    url: &'a str,
    domain: &'a str,
}

pub struct LlmClassifier<B: LlmBackend> {
    backend: B,
    rules: RuleSet,
    config: LlmConfig,
}

impl<B: LlmBackend> LlmClassifier<B> {
    pub fn new(backend: B, rules: RuleSet, config: LlmConfig) -> Self {
        Self {
            backend,
            rules,
            config,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn category_overview(&self) -> String {
        self.rules
            .categories()
            .iter()
            .map(|cat| {
                let subs: Vec<&str> = cat.subcategories.iter().map(|s| s.name.as_str()).collect();
                if subs.is_empty() {
                    format!("- {}: (no subcategories)", cat.name)
                } else {
                    format!("- {}: {}", cat.name, subs.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn instructions(&self) -> String {
        format!(
            r#"You sort browser bookmarks into categories using their title, URL and domain.

## Available Categories

{overview}

## Rules

1. Judge mainly by domain and URL, use the title as a hint.
2. Prefer a subcategory whenever one fits.
3. If nothing fits, use "{default}" as the main category.
4. Only use the category names listed above, spelled exactly.
5. Output ONLY JSON, no other text."#,
            overview = self.category_overview(),
            default = self.rules.default_category(),
        )
    }

    fn single_prompt(&self, bookmark: &Bookmark) -> String {
        format!(
            r#"{instructions}

## Bookmark

Title: {title}
URL: {url}
Domain: {domain}

## Output Format

{{"main": "main category", "sub": "subcategory or null"}}
"#,
            instructions = self.instructions(),
            title = bookmark.title,
            url = bookmark.url(),
            domain = bookmark.domain(),
        )
    }

    fn batch_prompt(&self, batch: &[Bookmark], offset: usize) -> Result<String> {
        let items: Vec<PromptItem<'_>> = batch
            .iter()
            .enumerate()
            .map(|(i, b)| PromptItem {
                index: offset + i,
                title: &b.title,
                url: b.url(),
                domain: b.domain(),
            })
            .collect();
        let listing = serde_json::to_string_pretty(&items)?;

        Ok(format!(
            r#"{instructions}

## Bookmarks ({count})

{listing}

## Output Format

{{
  "results": [
    {{"index": 0, "main": "main category", "sub": "subcategory or null"}}
  ]
}}
Return one entry per bookmark, using the index given above.
"#,
            instructions = self.instructions(),
            count = batch.len(),
        ))
    }

    /// Check an answer against the rule set.
    fn resolve(&self, main: Option<String>, sub: Option<String>) -> CategoryPath {
        let Some(rule) = main.as_deref().and_then(|m| self.rules.get(m)) else {
            return CategoryPath::main_only(self.rules.default_category());
        };
        let sub = sub.filter(|s| rule.subcategory(s).is_some());
        CategoryPath::new(rule.name.clone(), sub)
    }

    fn request_single(&self, bookmark: &Bookmark) -> Result<CategoryPath> {
        let output = self.backend.complete(&self.single_prompt(bookmark))?;
        let choice: LlmChoice = serde_json::from_str(extract_json_from_output(&output))
            .map_err(|e| MarksortError::MalformedLlmResponse {
                message: e.to_string(),
            })?;
        Ok(self.resolve(choice.main, choice.sub))
    }

    fn request_batch(&self, batch: &[Bookmark], offset: usize) -> Result<Vec<CategoryPath>> {
        let output = self.backend.complete(&self.batch_prompt(batch, offset)?)?;
        let response: LlmBatchResponse = serde_json::from_str(extract_json_from_output(&output))
            .map_err(|e| MarksortError::MalformedLlmResponse {
                message: e.to_string(),
            })?;

        let mut slots: Vec<Option<CategoryPath>> = vec![None; batch.len()];
        for entry in response.results {
            let Some(slot) = entry
                .index
                .checked_sub(offset)
                .and_then(|i| slots.get_mut(i))
            else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(self.resolve(entry.main, entry.sub));
            }
        }

        let missing = slots.iter().filter(|s| s.is_none()).count();
        if missing > 0 {
            debug!(missing, offset, "LLM response left bookmarks out");
        }

        Ok(slots
            .into_iter()
            .map(|s| s.unwrap_or_else(|| CategoryPath::main_only(UNCATEGORIZED)))
            .collect())
    }

    fn classify_chunk(&self, batch: &[Bookmark], offset: usize) -> Vec<CategoryPath> {
        let attempts = self.config.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.request_batch(batch, offset) {
                Ok(paths) => return paths,
                Err(e) => {
                    warn!(attempt, attempts, offset, error = %e, "LLM batch classification failed");
                    if attempt < attempts {
                        thread::sleep(self.config.backoff(attempt));
                    }
                }
            }
        }

        warn!(
            count = batch.len(),
            "Falling back to one LLM request per bookmark"
        );
        batch.iter().map(|b| self.classify(b)).collect()
    }
}

impl<B: LlmBackend> Classify for LlmClassifier<B> {
    fn classify(&self, bookmark: &Bookmark) -> CategoryPath {
        match self.request_single(bookmark) {
            Ok(path) => path,
            Err(e) => {
                warn!(url = bookmark.url(), error = %e, "LLM classification failed, using default category");
                CategoryPath::main_only(self.rules.default_category())
            }
        }
    }

    fn classify_batch(&self, bookmarks: Vec<Bookmark>) -> Classification {
        let batch_size = self.config.batch_size.max(1);
        let mut paths = Vec::with_capacity(bookmarks.len());
        for (n, chunk) in bookmarks.chunks(batch_size).enumerate() {
            paths.extend(self.classify_chunk(chunk, n * batch_size));
        }

        let mut classification = Classification::new();
        for (bookmark, path) in bookmarks.into_iter().zip(paths) {
            classification.push(path, bookmark);
        }
        classification
    }
}

/// Pull the JSON object out of an LLM answer.
fn extract_json_from_output(output: &str) -> &str {
    if let Some(start) = output.find("```json") {
        let start = start + 7;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find("```") {
        let start = start + 3;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find('{') {
        if let Some(end) = output.rfind('}') {
            if end > start {
                return &output[start..=end];
            }
        }
    }
    output.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned answers and records the prompts it was given.
    struct ScriptedBackend {
        replies: RefCell<VecDeque<std::result::Result<String, String>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<std::result::Result<&str, &str>>) -> Self {
            Self {
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl LlmBackend for ScriptedBackend {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match self.replies.borrow_mut().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(MarksortError::ClaudeExecutionFailed { message }),
                None => Err(MarksortError::ClaudeExecutionFailed {
                    message: "script exhausted".to_string(),
                }),
            }
        }
    }

    fn config(batch_size: usize, max_attempts: u32) -> LlmConfig {
        LlmConfig {
            batch_size,
            max_attempts,
            backoff_ms: 0,
        }
    }

    fn bookmarks() -> Vec<Bookmark> {
        vec![
            Bookmark::new("https://github.com/a", "A"),
            Bookmark::new("https://example.org/", "Example"),
            Bookmark::new("https://leetcode.cn/x", "X"),
        ]
    }

    fn titles(classification: &Classification, path: &CategoryPath) -> Vec<String> {
        classification
            .get(path)
            .unwrap_or_default()
            .iter()
            .map(|b| b.title.clone())
            .collect()
    }

    #[test]
    fn test_batch_answers_are_validated() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"results": [
            {"index": 0, "main": "技术学习", "sub": "代码仓库"},
            {"index": 1, "main": "Made Up", "sub": "代码仓库"},
            {"index": 2, "main": "学习资源", "sub": "bogus"}
        ]}"#)]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 3));

        let classification = classifier.classify_batch(bookmarks());
        assert_eq!(classification.total(), 3);
        assert_eq!(
            titles(&classification, &CategoryPath::with_sub("技术学习", "代码仓库")),
            vec!["A"]
        );
        assert_eq!(
            titles(&classification, &CategoryPath::main_only("其他")),
            vec!["Example"]
        );
        assert_eq!(
            titles(&classification, &CategoryPath::main_only("学习资源")),
            vec!["X"]
        );
        assert_eq!(backend.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_missing_indices_go_to_uncategorized() {
        let backend = ScriptedBackend::new(vec![Ok(
            r#"{"results": [{"index": 1, "main": "AI工具", "sub": null}, {"index": 7, "main": "AI工具"}]}"#,
        )]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 1));

        let classification = classifier.classify_batch(bookmarks());
        assert_eq!(
            titles(&classification, &CategoryPath::main_only(UNCATEGORIZED)),
            vec!["A", "X"]
        );
        assert_eq!(
            titles(&classification, &CategoryPath::main_only("AI工具")),
            vec!["Example"]
        );
    }

    #[test]
    fn test_retries_then_succeeds() {
        let backend = ScriptedBackend::new(vec![
            Ok("I'm sorry, I can't do JSON today"),
            Err("timeout"),
            Ok(r#"```json
{"results": [
  {"index": 0, "main": "技术学习", "sub": "代码仓库"},
  {"index": 1, "main": "其他"},
  {"index": 2, "main": "学习资源", "sub": "算法刷题"}
]}
```"#),
        ]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 3));

        let classification = classifier.classify_batch(bookmarks());
        assert_eq!(backend.prompts.borrow().len(), 3);
        assert_eq!(
            titles(&classification, &CategoryPath::with_sub("学习资源", "算法刷题")),
            vec!["X"]
        );
    }

    #[test]
    fn test_falls_back_to_single_requests_then_default() {
        let backend = ScriptedBackend::new(vec![
            Err("down"),
            Err("still down"),
            Ok(r#"{"main": "技术学习", "sub": "代码仓库"}"#),
            Err("flaky"),
            Ok(r#"Sure! {"main": "学习资源", "sub": "算法刷题"}"#),
        ]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 2));

        let classification = classifier.classify_batch(bookmarks());
        assert_eq!(backend.prompts.borrow().len(), 5);
        assert_eq!(classification.total(), 3);
        assert_eq!(
            titles(&classification, &CategoryPath::with_sub("技术学习", "代码仓库")),
            vec!["A"]
        );
        assert_eq!(
            titles(&classification, &CategoryPath::main_only("其他")),
            vec!["Example"]
        );
        assert_eq!(
            titles(&classification, &CategoryPath::with_sub("学习资源", "算法刷题")),
            vec!["X"]
        );
    }

    #[test]
    fn test_batches_use_global_indices_and_keep_order() {
        let backend = ScriptedBackend::new(vec![
            Ok(r#"{"results": [{"index": 0, "main": "AI工具"}, {"index": 1, "main": "AI工具"}]}"#),
            Ok(r#"{"results": [{"index": 2, "main": "AI工具"}]}"#),
        ]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(2, 1));

        let classification = classifier.classify_batch(bookmarks());
        assert_eq!(backend.prompts.borrow().len(), 2);
        assert!(backend.prompts.borrow()[1].contains("\"index\": 2"));
        assert_eq!(
            titles(&classification, &CategoryPath::main_only("AI工具")),
            vec!["A", "Example", "X"]
        );
    }

    #[test]
    fn test_single_classify_never_fails() {
        let backend = ScriptedBackend::new(vec![Err("no network")]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 3));

        let path = classifier.classify(&Bookmark::new("https://github.com/a", "A"));
        assert_eq!(path, CategoryPath::main_only("其他"));
    }

    #[test]
    fn test_prompt_lists_categories() {
        let backend = ScriptedBackend::new(vec![Ok(r#"{"main": "其他"}"#)]);
        let classifier = LlmClassifier::new(&backend, RuleSet::builtin(), config(100, 3));

        classifier.classify(&Bookmark::new("https://github.com/a", "A"));
        let prompts = backend.prompts.borrow();
        assert!(prompts[0].contains("- 技术学习: 掘金, V2EX"));
        assert!(prompts[0].contains("URL: https://github.com/a"));
        assert!(prompts[0].contains("\"其他\""));
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json_from_output("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json_from_output("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(
            extract_json_from_output("Here: {\"a\": {\"b\": 2}} done"),
            "{\"a\": {\"b\": 2}}"
        );
        assert_eq!(extract_json_from_output("  plain  "), "plain");
    }
}
