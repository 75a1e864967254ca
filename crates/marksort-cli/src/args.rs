use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use marksort_core::{ClassificationMode, SortOrder};

#[derive(Parser)]
#[command(name = "marksort")]
#[command(about = "Sort exported browser bookmarks into a categorized folder tree")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Base directory (default: ~/.marksort)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Rules,
    Llm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Domain,
    Title,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dedupe, classify and organize a bookmark export into a new file
    Sort {
        /// Bookmark export (default: the only *.html file in the current directory)
        input: Option<PathBuf>,

        /// Output file (default: <YYYYmmdd_HHMMSS>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Classification mode (default: from config)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Rule set file replacing the built-in categories
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Subfolders smaller than this are merged into their parent
        #[arg(long, value_name = "N")]
        min_group_size: Option<usize>,

        /// Bookmark order inside folders
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Show the resulting tree without writing a file
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show import statistics and duplicates
    Stats {
        /// Bookmark export
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how bookmarks would be classified
    Classify {
        /// Bookmark export
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Rule set file replacing the built-in categories
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Inspect rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// Print the active rule set as TOML
    Dump,

    /// Validate a rule set file
    Check {
        /// Rule set file (TOML)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration as TOML
    Show,

    /// Get a config value
    Get {
        /// Config key (e.g., organize.min_group_size)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., organize.sort)
        key: String,

        /// Value to set (e.g., "title"); empty clears optional keys
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with a commented template
    Init,
}

impl From<ModeArg> for ClassificationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Rules => ClassificationMode::Rules,
            ModeArg::Llm => ClassificationMode::Llm,
        }
    }
}

impl From<SortArg> for SortOrder {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Domain => SortOrder::Domain,
            SortArg::Title => SortOrder::Title,
        }
    }
}
