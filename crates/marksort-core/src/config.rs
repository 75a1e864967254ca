use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::{ClassificationMode, RuleSet};
use crate::error::{MarksortError, Result};
use crate::llm::LlmConfig;
use crate::organizer::{Organizer, SortOrder, DEFAULT_MIN_GROUP_SIZE, DEFAULT_ROOT_NAME};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# marksort configuration file
# Location: ~/.marksort/config.toml

[classifier]
# How bookmarks are classified: "rules" or "llm"
# "llm" needs the claude CLI and falls back to "rules" without it
mode = "rules"

# Custom rule set (TOML); the built-in table is used when unset
# Example: rules_file = "/home/me/.marksort/rules.toml"

# Category for bookmarks no rule matches
# Example: default_category = "Other"

[organize]
# Subfolders with fewer bookmarks than this are merged into their parent
min_group_size = 3

# Bookmark order inside a folder: "domain" or "title"
sort = "domain"

# Name of the top-level folder in the written file
root_name = "书签栏"

[llm]
# Bookmarks per request
batch_size = 1000

# Attempts per batch before classifying bookmarks one by one
max_attempts = 3

# Delay before the first retry, doubled after every failure
backoff_ms = 500
"#;

/// Global configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub organize: OrganizeConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Classification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub mode: ClassificationMode,

    /// Rule set file replacing the built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,

    /// Overrides the rule set's default category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,
}

/// Folder tree settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeConfig {
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default = "default_root_name")]
    pub root_name: String,
}

fn default_min_group_size() -> usize {
    DEFAULT_MIN_GROUP_SIZE
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            min_group_size: default_min_group_size(),
            sort: SortOrder::default(),
            root_name: default_root_name(),
        }
    }
}

const KEYS: &[&str] = &[
    "classifier.mode",
    "classifier.rules_file",
    "classifier.default_category",
    "organize.min_group_size",
    "organize.sort",
    "organize.root_name",
    "llm.batch_size",
    "llm.max_attempts",
    "llm.backoff_ms",
];

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| MarksortError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| MarksortError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Effective configuration as TOML, defaults included
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    ///
    /// Unset optional values read as an empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "classifier.mode" => self.classifier.mode.as_str().to_string(),
            "classifier.rules_file" => self
                .classifier
                .rules_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "classifier.default_category" => {
                self.classifier.default_category.clone().unwrap_or_default()
            }
            "organize.min_group_size" => self.organize.min_group_size.to_string(),
            "organize.sort" => self.organize.sort.as_str().to_string(),
            "organize.root_name" => self.organize.root_name.clone(),
            "llm.batch_size" => self.llm.batch_size.to_string(),
            "llm.max_attempts" => self.llm.max_attempts.to_string(),
            "llm.backoff_ms" => self.llm.backoff_ms.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a config value by dot-notation key
    ///
    /// An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();
        let invalid = || MarksortError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "classifier.mode" => {
                self.classifier.mode = ClassificationMode::parse(trimmed).ok_or_else(invalid)?;
            }
            "classifier.rules_file" => {
                self.classifier.rules_file =
                    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            }
            "classifier.default_category" => {
                self.classifier.default_category =
                    (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            "organize.min_group_size" => {
                self.organize.min_group_size = parse_positive(trimmed).ok_or_else(invalid)?;
            }
            "organize.sort" => {
                self.organize.sort = SortOrder::parse(trimmed).ok_or_else(invalid)?;
            }
            "organize.root_name" => {
                if trimmed.is_empty() {
                    return Err(invalid());
                }
                self.organize.root_name = trimmed.to_string();
            }
            "llm.batch_size" => {
                self.llm.batch_size = parse_positive(trimmed).ok_or_else(invalid)?;
            }
            "llm.max_attempts" => {
                self.llm.max_attempts = parse_positive(trimmed).ok_or_else(invalid)?;
            }
            "llm.backoff_ms" => {
                self.llm.backoff_ms = trimmed.parse().map_err(|_| invalid())?;
            }
            _ => {
                return Err(MarksortError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }

    /// Rule set for classification: the configured file or the built-in
    /// table, with the default category override applied.
    ///
    /// A relative `rules_file` is resolved against `base_dir`.
    pub fn rule_set(&self, base_dir: &Path) -> Result<RuleSet> {
        let rules = match &self.classifier.rules_file {
            Some(file) => RuleSet::load(&base_dir.join(file))?,
            None => RuleSet::builtin(),
        };

        match &self.classifier.default_category {
            Some(default) => rules.with_default_category(default.clone()),
            None => Ok(rules),
        }
    }

    /// Organizer carrying the `[organize]` settings.
    pub fn organizer(&self) -> Organizer {
        Organizer::new()
            .with_min_group_size(self.organize.min_group_size)
            .with_sort_order(self.organize.sort)
            .with_root_name(self.organize.root_name.clone())
    }
}

fn parse_positive<T>(value: &str) -> Option<T>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    value.parse::<T>().ok().filter(|v| *v > T::default())
}
