//! Category Rule Set
//!
//! The validated, immutable rule tree the classifier evaluates. Built either
//! from the builtin table or from a TOML file:
//!
//! ```toml
//! default_category = "Other"
//!
//! [[categories]]
//! name = "Dev"
//! domains = ["github.com"]
//! keywords = ["rust"]
//! url_patterns = ["/docs/"]
//!
//! [[categories.subcategories]]
//! name = "Repos"
//! domains = ["github.com"]
//! ```
//!
//! Arrays of tables keep declaration order, which decides precedence.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MarksortError, Result};

use super::builtin::{BuiltinCategory, BuiltinSubcategory, BUILTIN_CATEGORIES, DEFAULT_CATEGORY};

/// Lower-cased view of a bookmark used for matching.
#[derive(Debug, Clone, Copy)]
pub struct MatchTarget<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub domain: &'a str,
}

/// Disjunction of the three matcher kinds. All needles are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    domains: Vec<String>,
    keywords: Vec<String>,
    url_patterns: Vec<String>,
}

impl Predicate {
    pub fn new<S: AsRef<str>>(domains: &[S], keywords: &[S], url_patterns: &[S]) -> Self {
        let lower = |items: &[S]| {
            items
                .iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect::<Vec<_>>()
        };
        Self {
            domains: lower(domains),
            keywords: lower(keywords),
            url_patterns: lower(url_patterns),
        }
    }

    /// `target` must already be lower-cased.
    pub fn matches(&self, target: &MatchTarget<'_>) -> bool {
        if self.domains.iter().any(|d| target.domain.contains(d.as_str())) {
            return true;
        }

        if self.keywords.iter().any(|k| {
            target.url.contains(k.as_str())
                || target.title.contains(k.as_str())
                || target.domain.contains(k.as_str())
        }) {
            return true;
        }

        self.url_patterns
            .iter()
            .any(|p| target.url.contains(p.as_str()))
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn url_patterns(&self) -> &[String] {
        &self.url_patterns
    }

    fn needles(&self) -> impl Iterator<Item = &String> {
        self.domains
            .iter()
            .chain(self.keywords.iter())
            .chain(self.url_patterns.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryRule {
    pub name: String,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub predicate: Predicate,
    pub subcategories: Vec<SubcategoryRule>,
}

impl CategoryRule {
    pub fn subcategory(&self, name: &str) -> Option<&SubcategoryRule> {
        self.subcategories.iter().find(|s| s.name == name)
    }
}

impl From<&BuiltinSubcategory> for SubcategoryRule {
    fn from(builtin: &BuiltinSubcategory) -> Self {
        Self {
            name: builtin.name.to_string(),
            predicate: Predicate::new(builtin.domains, builtin.keywords, &[]),
        }
    }
}

impl From<&BuiltinCategory> for CategoryRule {
    fn from(builtin: &BuiltinCategory) -> Self {
        Self {
            name: builtin.name.to_string(),
            predicate: Predicate::new(builtin.domains, builtin.keywords, builtin.url_patterns),
            subcategories: builtin.subcategories.iter().map(SubcategoryRule::from).collect(),
        }
    }
}

/// Validated rule tree. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    categories: Vec<CategoryRule>,
    default_category: String,
}

impl RuleSet {
    /// Validate and build a rule set.
    ///
    /// Rejects empty names, duplicate names at the same level, empty matcher
    /// strings and an empty default category.
    pub fn new(categories: Vec<CategoryRule>, default_category: impl Into<String>) -> Result<Self> {
        let default_category = default_category.into();
        if default_category.trim().is_empty() {
            return Err(invalid("default category must not be empty"));
        }

        let mut seen = HashSet::new();
        for cat in &categories {
            if cat.name.trim().is_empty() {
                return Err(invalid("category name must not be empty"));
            }
            if !seen.insert(cat.name.as_str()) {
                return Err(invalid(format!("duplicate category '{}'", cat.name)));
            }
            check_needles(&cat.name, &cat.predicate)?;

            let mut seen_subs = HashSet::new();
            for sub in &cat.subcategories {
                if sub.name.trim().is_empty() {
                    return Err(invalid(format!(
                        "subcategory name under '{}' must not be empty",
                        cat.name
                    )));
                }
                if !seen_subs.insert(sub.name.as_str()) {
                    return Err(invalid(format!(
                        "duplicate subcategory '{}' under '{}'",
                        sub.name, cat.name
                    )));
                }
                check_needles(&format!("{}/{}", cat.name, sub.name), &sub.predicate)?;
            }
        }

        Ok(Self {
            categories,
            default_category,
        })
    }

    /// The bundled rule table.
    pub fn builtin() -> Self {
        Self {
            categories: BUILTIN_CATEGORIES.iter().map(CategoryRule::from).collect(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn from_config(config: RuleSetConfig) -> Result<Self> {
        let categories = config
            .categories
            .into_iter()
            .map(|entry| CategoryRule {
                predicate: Predicate::new(
                    &entry.domains[..],
                    &entry.keywords[..],
                    &entry.url_patterns[..],
                ),
                name: entry.name,
                subcategories: entry
                    .subcategories
                    .into_iter()
                    .map(|sub| SubcategoryRule {
                        predicate: Predicate::new(
                            &sub.domains[..],
                            &sub.keywords[..],
                            &sub.url_patterns[..],
                        ),
                        name: sub.name,
                    })
                    .collect(),
            })
            .collect();

        Self::new(
            categories,
            config
                .default_category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        )
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RuleSetConfig = toml::from_str(content)?;
        Self::from_config(config)
    }

    /// Load a rule set from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: RuleSetConfig =
            toml::from_str(&content).map_err(|e| MarksortError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_config(config)
    }

    pub fn to_config(&self) -> RuleSetConfig {
        RuleSetConfig {
            default_category: Some(self.default_category.clone()),
            categories: self
                .categories
                .iter()
                .map(|cat| CategoryConfigEntry {
                    name: cat.name.clone(),
                    domains: cat.predicate.domains.clone(),
                    keywords: cat.predicate.keywords.clone(),
                    url_patterns: cat.predicate.url_patterns.clone(),
                    subcategories: cat
                        .subcategories
                        .iter()
                        .map(|sub| SubcategoryConfigEntry {
                            name: sub.name.clone(),
                            domains: sub.predicate.domains.clone(),
                            keywords: sub.predicate.keywords.clone(),
                            url_patterns: sub.predicate.url_patterns.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_config())?)
    }

    /// Same rules, different fallback category.
    pub fn with_default_category(self, default_category: impl Into<String>) -> Result<Self> {
        Self::new(self.categories, default_category)
    }

    /// Main categories in evaluation order.
    pub fn categories(&self) -> &[CategoryRule] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn invalid(message: impl Into<String>) -> MarksortError {
    MarksortError::InvalidRuleSet {
        message: message.into(),
    }
}

fn check_needles(owner: &str, predicate: &Predicate) -> Result<()> {
    if predicate.needles().any(|n| n.is_empty()) {
        return Err(invalid(format!("empty matcher string in '{}'", owner)));
    }
    Ok(())
}

// ============================================================================
// TOML shape
// ============================================================================

/// On-disk rule set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryConfigEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfigEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<SubcategoryConfigEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryConfigEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url_patterns: Vec<String>,
}
