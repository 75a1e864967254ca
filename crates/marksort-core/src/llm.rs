//! LLM Integration Module
//!
//! Runs prompts through the Claude CLI (`claude --print`). The classifier only
//! talks to the [`LlmBackend`] trait, so tests can swap in a scripted backend.
//!
//! ## Usage
//!
//! ### Checking for the CLI
//!
//! ```rust
//! use marksort_core::check_claude_cli;
//!
//! let available = check_claude_cli();
//! println!("Claude CLI available: {}", available);
//! ```
//!
//! ### LlmConfig
//!
//! ```rust
//! use marksort_core::LlmConfig;
//!
//! let config = LlmConfig::default();
//! assert_eq!(config.batch_size, 1000);
//! assert_eq!(config.max_attempts, 3);
//! ```
//!
//! ### Full example (needs the CLI)
//!
//! ```rust,ignore
//! use marksort_core::{ClaudeCli, LlmBackend};
//!
//! let backend = ClaudeCli::new(".");
//! let reply = backend.complete("Your prompt here")?;
//! println!("{}", reply);
//! ```

use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MarksortError, Result};

// ============================================================================
// Configuration
// ============================================================================

/// LLM classification settings (`[llm]` in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bookmarks per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Attempts per batch before falling back to one request per bookmark
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts, doubled after every failure
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_batch_size() -> usize {
    1000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl LlmConfig {
    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Something that turns a prompt into a completion.
pub trait LlmBackend {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<T: LlmBackend + ?Sized> LlmBackend for &T {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

/// [`LlmBackend`] backed by the `claude` executable.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    working_dir: PathBuf,
}

impl ClaudeCli {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Like [`ClaudeCli::new`], but fails if the CLI is not installed.
    pub fn detect(working_dir: impl Into<PathBuf>) -> Result<Self> {
        require_claude_cli()?;
        Ok(Self::new(working_dir))
    }
}

impl LlmBackend for ClaudeCli {
    fn complete(&self, prompt: &str) -> Result<String> {
        execute_claude(&self.working_dir, prompt)
    }
}

// ============================================================================
// CLI Operations
// ============================================================================

/// Check whether the Claude CLI is available.
///
/// Runs `claude --version` and reports whether it succeeded.
pub fn check_claude_cli() -> bool {
    Command::new("claude")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a prompt through the Claude CLI.
///
/// # Arguments
/// * `working_dir` - working directory for the child process
/// * `prompt` - prompt written to stdin
///
/// # Returns
/// The CLI's stdout
///
/// # Errors
/// * `ClaudeExecutionFailed` - spawning, writing the prompt or the process itself failed
pub fn execute_claude(working_dir: &Path, prompt: &str) -> Result<String> {
    let mut cmd = Command::new("claude");
    cmd.arg("--print");
    cmd.current_dir(working_dir);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| MarksortError::ClaudeExecutionFailed {
            message: format!("Failed to spawn claude: {}", e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .map_err(|e| MarksortError::ClaudeExecutionFailed {
                message: format!("Failed to write prompt: {}", e),
            })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| MarksortError::ClaudeExecutionFailed {
            message: format!("Execution failed: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MarksortError::ClaudeExecutionFailed {
            message: format!("Claude exited with error: {}", stderr),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Fail with `ClaudeNotFound` unless the Claude CLI is available.
pub fn require_claude_cli() -> Result<()> {
    if !check_claude_cli() {
        return Err(MarksortError::ClaudeNotFound);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
