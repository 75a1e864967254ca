use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use marksort_core::config::Config;
use marksort_core::netscape::{self, NetscapeWriter};
use marksort_core::pipeline::{self, SortReport};
use marksort_core::{
    build_classifier, dedupe, fragment_duplicates, Bookmark, CategoryStats, ClassificationMode,
    Folder, ImportStats, MarksortError, Result, RuleSet,
};

mod args;
use args::{Cli, Commands, ConfigAction, ModeArg, RulesAction, Shell, SortArg};

/// Titles longer than this are cut in listings.
const TITLE_WIDTH: usize = 60;

struct SortOptions {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    mode: Option<ModeArg>,
    rules: Option<PathBuf>,
    min_group_size: Option<usize>,
    sort: Option<SortArg>,
    dry_run: bool,
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);
    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Sort {
            input,
            output,
            mode,
            rules,
            min_group_size,
            sort,
            dry_run,
        }) => handle_sort(
            &base_dir,
            SortOptions {
                input,
                output,
                mode,
                rules,
                min_group_size,
                sort,
                dry_run,
                verbose: cli.verbose,
            },
        ),
        Some(Commands::Stats { input, json }) => handle_stats(&input, json),
        Some(Commands::Classify { input, json, rules }) => {
            handle_classify(&base_dir, &input, json, rules.as_deref())
        }
        Some(Commands::Rules { action }) => handle_rules(action, &base_dir),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "marksort", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    dirs::home_dir()
        .map(|h| h.join(".marksort"))
        .unwrap_or_else(|| PathBuf::from(".marksort"))
}

// ============================================================================
// Input / output
// ============================================================================

fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf> {
    match input {
        Some(path) if path.exists() => Ok(path),
        Some(path) => Err(MarksortError::InputNotFound { path }),
        None => find_single_export(Path::new(".")),
    }
}

/// The only `*.html` file in `dir`.
fn find_single_export(dir: &Path) -> Result<PathBuf> {
    let pattern = glob::Pattern::escape(&dir.to_string_lossy()) + "/*.html";

    let mut candidates: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(MarksortError::InputNotFound {
            path: dir.join("*.html"),
        }),
        1 => Ok(candidates.remove(0)),
        found => Err(MarksortError::AmbiguousInput { found, candidates }),
    }
}

fn default_output_name() -> PathBuf {
    PathBuf::from(format!(
        "{}.html",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn load_rules(config: &Config, base_dir: &Path, rules_file: Option<&Path>) -> Result<RuleSet> {
    let Some(path) = rules_file else {
        return config.rule_set(base_dir);
    };

    if !path.exists() {
        return Err(MarksortError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let rules = RuleSet::load(path)?;
    match &config.classifier.default_category {
        Some(default) => rules.with_default_category(default.clone()),
        None => Ok(rules),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn handle_sort(base_dir: &Path, opts: SortOptions) -> Result<()> {
    let config = Config::load(base_dir)?;
    debug!(path = %Config::path(base_dir).display(), "Loaded config");
    let input = resolve_input(opts.input)?;
    let rules = load_rules(&config, base_dir, opts.rules.as_deref())?;

    let mut organizer = config.organizer();
    if let Some(size) = opts.min_group_size {
        if size == 0 {
            return Err(MarksortError::InvalidConfigValue {
                key: "min-group-size".to_string(),
                value: size.to_string(),
            });
        }
        organizer = organizer.with_min_group_size(size);
    }
    if let Some(sort) = opts.sort {
        organizer = organizer.with_sort_order(sort.into());
    }

    let requested = opts
        .mode
        .map(ClassificationMode::from)
        .unwrap_or(config.classifier.mode);

    println!();
    println!("Input: {}", input.display().to_string().cyan());
    if opts.dry_run {
        println!("{}", "(dry run)".yellow());
    }

    let bookmarks = netscape::read_file(&input)?;

    let work_dir = std::env::current_dir()?;
    let selected = build_classifier(requested, rules, &config.llm, &work_dir);
    if selected.mode != requested {
        println!(
            "{} Claude CLI not available, using rule classification",
            "[WARN]".yellow().bold()
        );
    }
    println!("Mode: {}", selected.mode.as_str());

    let report = pipeline::run(bookmarks, selected.classifier.as_ref(), &organizer);

    print_import_summary(&report);
    print_category_stats(&report.category_stats);

    println!();
    println!("Folders:");
    print_tree(&report.root, 1, opts.verbose);

    if opts.dry_run {
        println!();
        return Ok(());
    }

    let output = opts.output.unwrap_or_else(default_output_name);
    NetscapeWriter::new().write_file(&report.root, &output)?;

    println!();
    println!("{} {}", "Written:".green(), output.display());
    println!("Import it from your browser's bookmark manager.");

    Ok(())
}

fn handle_stats(input: &Path, json: bool) -> Result<()> {
    let bookmarks = netscape::read_file(input)?;
    let stats = ImportStats::collect(&bookmarks);
    let deduped = dedupe(bookmarks);
    let fragments = fragment_duplicates(&deduped.unique);

    if json {
        let value = serde_json::json!({
            "total": stats.total,
            "unique": stats.unique,
            "duplicates": deduped
                .duplicates
                .iter()
                .map(|b| serde_json::json!({ "url": b.url(), "title": b.title }))
                .collect::<Vec<_>>(),
            "fragment_duplicates": fragments
                .iter()
                .map(|g| serde_json::json!({
                    "base_url": g.base_url,
                    "urls": g.bookmarks.iter().map(|b| b.url()).collect::<Vec<_>>(),
                }))
                .collect::<Vec<_>>(),
            "domains": stats.domains,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("Total: {}", stats.total);
    println!("Unique: {}", stats.unique);
    println!("Duplicates: {}", stats.duplicates);
    println!("Domains: {}", stats.domains_count());

    if !deduped.duplicates.is_empty() {
        println!();
        println!("{}", "Duplicates:".yellow());
        print_bookmarks(&deduped.duplicates);
    }

    if !fragments.is_empty() {
        println!();
        println!("{}", "Same page, different #fragment:".yellow());
        for group in &fragments {
            println!("  {} ({})", group.base_url.cyan(), group.bookmarks.len());
            for bookmark in &group.bookmarks {
                println!("    {}", bookmark.url());
            }
        }
    }

    println!();
    println!("Top domains:");
    for (domain, count) in stats.top_domains(10) {
        println!("  {:>5}  {}", count, domain);
    }
    println!();

    Ok(())
}

fn handle_classify(
    base_dir: &Path,
    input: &Path,
    json: bool,
    rules_file: Option<&Path>,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let rules = load_rules(&config, base_dir, rules_file)?;
    let bookmarks = dedupe(netscape::read_file(input)?).unique;

    let work_dir = std::env::current_dir()?;
    let selected = build_classifier(config.classifier.mode, rules, &config.llm, &work_dir);
    let stats = selected.classifier.classify_batch(bookmarks).stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_category_stats(&stats);
    println!();
    Ok(())
}

fn handle_rules(action: RulesAction, base_dir: &Path) -> Result<()> {
    match action {
        RulesAction::Dump => {
            let config = Config::load(base_dir)?;
            let rules = config.rule_set(base_dir)?;
            print!("{}", rules.to_toml()?);
        }
        RulesAction::Check { file } => {
            let rules = load_rules(&Config::default(), base_dir, Some(&file))?;
            let subcategories: usize = rules
                .categories()
                .iter()
                .map(|c| c.subcategories.len())
                .sum();
            println!(
                "{} {} ({} categories, {} subcategories, default '{}')",
                "Valid:".green(),
                file.display(),
                rules.categories().len(),
                subcategories,
                rules.default_category()
            );
        }
    }

    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load(base_dir)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(MarksortError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_import_summary(report: &SortReport) {
    let stats = &report.import_stats;

    println!();
    println!("Total: {}", stats.total);
    println!("Unique: {}", stats.total - report.duplicates.len());
    if !report.duplicates.is_empty() {
        println!(
            "{} {}",
            "Removed duplicates:".yellow(),
            report.duplicates.len()
        );
        print_bookmarks(&report.duplicates);
    }
    if report.fragment_duplicates > 0 {
        println!(
            "{} {} (kept, see `marksort stats`)",
            "Fragment-only duplicates:".yellow(),
            report.fragment_duplicates
        );
    }
}

fn print_category_stats(stats: &CategoryStats) {
    println!();
    println!("Categories:");
    for (name, stat) in stats.by_total() {
        println!("  {} ({})", name.cyan().bold(), stat.total);

        let mut subs: Vec<(&String, &usize)> = stat.subcategories.iter().collect();
        subs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (sub, count) in subs {
            println!("    └─ {}: {}", sub, count);
        }
    }
}

fn print_tree(folder: &Folder, depth: usize, with_bookmarks: bool) {
    let indent = "  ".repeat(depth);
    println!("{}{} ({})", indent, folder.name().bold(), folder.total_count());

    for sub in folder.subfolders() {
        print_tree(sub, depth + 1, with_bookmarks);
    }
    if with_bookmarks {
        for bookmark in folder.bookmarks() {
            println!("{}  - {}", indent, truncate(bookmark.label(), TITLE_WIDTH));
        }
    }
}

fn print_bookmarks(bookmarks: &[Bookmark]) {
    for bookmark in bookmarks {
        println!("  - {}", truncate(&bookmark.title, TITLE_WIDTH));
        println!("    {}", bookmark.url().dimmed());
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width).collect();
    cut.push('…');
    cut
}
