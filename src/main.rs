use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use snippet_patcher::config::{load_rule_sets, LoadedRuleSets};
use snippet_patcher::{
    builtin, logging, NoMatchPolicy, PatchError, PatchOptions, PatchReport, Patcher,
};
use std::env;
use std::path::{Path, PathBuf};

const TARGET_ENV: &str = "SNIPPET_PATCHER_TARGET";
const SUCCESS_MESSAGE: &str = "File updated successfully!";

#[derive(Parser)]
#[command(name = "snippet-patcher")]
#[command(about = "Rewrite a known code snippet inside a source file", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the target file in place
    Apply {
        /// File to patch (falls back to $SNIPPET_PATCHER_TARGET)
        file: Option<PathBuf>,

        /// Rule set file, or a directory of *.toml rule sets (built-in rule if omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// What to do when a rule matches nothing: ignore, warn or error
        #[arg(long)]
        on_no_match: Option<NoMatchPolicy>,

        /// Dry run - show what would be changed without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Report how often each rule matches, without writing
    Check {
        /// File to inspect (falls back to $SNIPPET_PATCHER_TARGET)
        file: Option<PathBuf>,

        /// Rule set file, or a directory of *.toml rule sets (built-in rule if omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// List the rules that would be applied
    List {
        /// Rule set file, or a directory of *.toml rule sets (built-in rule if omitted)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Apply {
            file,
            rules,
            on_no_match,
            dry_run,
            diff,
        } => cmd_apply(file, rules, on_no_match, dry_run, diff),

        Commands::Check { file, rules } => cmd_check(file, rules),

        Commands::List { rules } => cmd_list(rules),
    }
}

/// Helper: Load rules from `--rules`, or fall back to the built-in set.
///
/// The first rule set declaring `on_no_match` decides the policy; the CLI flag
/// overrides it.
fn load_rules(path: Option<&Path>) -> Result<LoadedRuleSets> {
    match path {
        Some(path) => Ok(load_rule_sets(path)?),
        None => Ok(LoadedRuleSets {
            rules: builtin::all(),
            on_no_match: None,
        }),
    }
}

/// Resolve the target file.
///
/// Priority order:
/// 1. Explicit positional argument
/// 2. SNIPPET_PATCHER_TARGET environment variable
fn resolve_target(cli_file: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_file {
        return Ok(path);
    }

    if let Ok(env_path) = env::var(TARGET_ENV) {
        if !env_path.trim().is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}",
        "No target file given.".red(),
        "Try one of:".bold(),
        "1. Pass it explicitly: snippet-patcher apply path/to/App.tsx",
        "2. Set environment variable: export SNIPPET_PATCHER_TARGET=path/to/App.tsx"
    )
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_outcomes(report: &PatchReport, policy: NoMatchPolicy) {
    for outcome in &report.outcomes {
        if outcome.matches > 0 {
            println!(
                "{} {}: {} match(es) rewritten",
                "✓".green(),
                outcome.rule_id,
                outcome.matches
            );
        } else if policy != NoMatchPolicy::Ignore {
            println!(
                "{} {}: {}",
                "⊙".yellow(),
                outcome.rule_id,
                "no match, pattern not found".yellow()
            );
        }
    }
}

fn cmd_apply(
    file: Option<PathBuf>,
    rules: Option<PathBuf>,
    on_no_match: Option<NoMatchPolicy>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let target = resolve_target(file)?;
    let loaded = load_rules(rules.as_deref())?;
    let policy = on_no_match.or(loaded.on_no_match).unwrap_or_default();

    println!("Target: {}", target.display());
    println!("Rules: {}", loaded.rules.len());
    if dry_run {
        println!("{}", "[DRY RUN - the file will not be modified]".cyan());
    }
    println!();

    let patcher = Patcher::new(loaded.rules).with_options(PatchOptions {
        on_no_match: policy,
        dry_run,
    });

    let report = match patcher.patch_file(&target) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            match &e {
                PatchError::NoMatch { file, rule_id } => {
                    eprintln!("  {}", "CONFLICT: pattern matched no locations".red());
                    eprintln!("  Rule: {}", rule_id);
                    eprintln!("  File: {}", file.display());
                    eprintln!("  Possible causes:");
                    eprintln!("    - The file was already patched");
                    eprintln!("    - The snippet was edited or reformatted");
                    eprintln!("  The file was not modified.");
                }
                e if e.is_not_found() => {
                    eprintln!("  Check the path; the file is never created.");
                }
                _ => {}
            }
            std::process::exit(1);
        }
    };

    print_outcomes(&report, policy);

    if show_diff && report.changed() {
        display_diff(&report.file, &report.original, &report.patched);
    }

    println!();
    if report.written {
        println!("{}", SUCCESS_MESSAGE.green());
    } else {
        println!(
            "{}",
            format!("{} match(es) would be rewritten", report.total_matches()).cyan()
        );
    }

    Ok(())
}

fn cmd_check(file: Option<PathBuf>, rules: Option<PathBuf>) -> Result<()> {
    let target = resolve_target(file)?;
    let loaded = load_rules(rules.as_deref())?;
    let patcher = Patcher::new(loaded.rules);

    println!("{}", "Checking rules...".bold());
    println!("Target: {}", target.display());
    println!();

    let outcomes = patcher.check_file(&target)?;

    let mut unmatched = 0;
    for outcome in &outcomes {
        if outcome.matches > 0 {
            println!(
                "{} {}: {} match(es)",
                "✓".green(),
                outcome.rule_id,
                outcome.matches
            );
        } else {
            println!("{} {}: no match", "✗".red(), outcome.rule_id);
            unmatched += 1;
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} matching",
        format!("{}", outcomes.len() - unmatched).green()
    );
    println!("  {} without match", format!("{}", unmatched).red());

    if unmatched > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(rules: Option<PathBuf>) -> Result<()> {
    let loaded = load_rules(rules.as_deref())?;

    for rule in &loaded.rules {
        println!("{}", rule.id().bold());
        println!("  pattern: {}", rule.pattern().dimmed());
    }

    if let Some(policy) = loaded.on_no_match {
        println!();
        println!("on_no_match: {}", policy);
    }

    Ok(())
}
