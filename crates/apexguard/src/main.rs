use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use apexguard_domain::{scan_with_threshold, RuleCatalog, DEFAULT_COMPLEXITY_THRESHOLD};
use apexguard_fix::{rollback, FixEngine, RollbackOutcome};
use apexguard_types::{ScanReceipt, ToolMeta, Violation};

mod report;

#[derive(Parser)]
#[command(name = "apexguard")]
#[command(about = "Salesforce Apex static analysis and auto-remediation", long_about = None)]
struct Cli {
    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory of Apex sources, optionally applying auto-fixes.
    Scan(ScanArgs),

    /// Restore one file from its pre-fix backup.
    Rollback(RollbackArgs),

    /// Print the built-in rule catalog.
    Rules(RulesArgs),

    /// Show detailed information about a specific rule.
    Explain(ExplainArgs),
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Directory containing Apex source files (.cls, .trigger).
    #[arg(long, short = 'd')]
    directory: PathBuf,

    /// Apply auto-fixes for safe and partial rules after detection.
    #[arg(long)]
    fix: bool,

    /// Where to write the HTML report.
    #[arg(long, short = 'o', default_value = "apex_analysis_report.html")]
    output: PathBuf,

    /// Also write the scan receipt as JSON.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Backup root; every file is copied here before it is modified.
    #[arg(long, default_value = ".apexguard-backup")]
    backup_dir: PathBuf,

    /// Cognitive complexity score above which a method is flagged.
    #[arg(long, default_value_t = DEFAULT_COMPLEXITY_THRESHOLD)]
    complexity_threshold: u32,
}

#[derive(Parser, Debug)]
struct RollbackArgs {
    /// The source file to restore.
    file: PathBuf,

    /// Backup root the file was backed up into.
    #[arg(long, default_value = ".apexguard-backup")]
    backup_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RulesArgs {
    #[arg(long, value_enum, default_value_t = RulesFormat::Text)]
    format: RulesFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RulesFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
struct ExplainArgs {
    /// Rule id, e.g. ApexSharingViolation.
    rule_id: String,
}

fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Scan(args) => cmd_scan(args),
        Commands::Rollback(args) => {
            cmd_rollback(args)?;
            Ok(0)
        }
        Commands::Rules(args) => {
            cmd_rules(args)?;
            Ok(0)
        }
        Commands::Explain(args) => {
            cmd_explain(args)?;
            Ok(0)
        }
    }
}

/// Initialize tracing/logging based on CLI flags.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "apexguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn cmd_scan(args: ScanArgs) -> Result<i32> {
    let catalog = RuleCatalog::built_in();
    let files = discover_files(&args.directory)?;
    info!(files = files.len(), directory = %args.directory.display(), "scan started");

    let mut violations: Vec<Violation> = Vec::new();
    let mut files_scanned = 0u32;
    for file in &files {
        files_scanned += 1;
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(err) => {
                warn!(file = %file.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let path_str = file.to_string_lossy();
        violations.extend(scan_with_threshold(
            &catalog,
            &path_str,
            &content,
            args.complexity_threshold,
        ));
    }

    let fix_summary = if args.fix && !violations.is_empty() {
        let engine = FixEngine::new(&args.backup_dir);
        Some(engine.fix_all(&catalog, &mut violations))
    } else {
        None
    };

    let receipt = ScanReceipt::from_violations(tool_meta(), files_scanned, violations);

    let html = report::render_html(&catalog, &receipt);
    fs::write(&args.output, html)
        .with_context(|| format!("write report {}", args.output.display()))?;

    if let Some(json_path) = &args.json {
        let rendered = serde_json::to_string_pretty(&receipt).context("render receipt json")?;
        fs::write(json_path, rendered)
            .with_context(|| format!("write receipt {}", json_path.display()))?;
    }

    println!(
        "Scanned {} file(s): {} violation(s) found",
        receipt.stats.files_scanned, receipt.stats.total_violations
    );
    if let Some(summary) = fix_summary {
        println!(
            "Auto-fix: {} fixed, {} require manual attention",
            summary.fixed, summary.failed
        );
        println!("Backups written to {}", args.backup_dir.display());
    }
    println!("Report written to {}", args.output.display());

    Ok(0)
}

/// Walks the target directory in deterministic (name-sorted) order,
/// collecting Apex sources. A missing directory is fatal; an error on an
/// individual entry is logged and skipped.
fn discover_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        bail!(
            "target directory {} does not exist or is not a directory",
            directory.display()
        );
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_apex_source(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_apex_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cls") || ext.eq_ignore_ascii_case("trigger"))
}

fn cmd_rollback(args: RollbackArgs) -> Result<()> {
    match rollback(&args.backup_dir, &args.file)? {
        RollbackOutcome::Restored => {
            println!("Restored {} from backup", args.file.display());
        }
        RollbackOutcome::NoBackup => {
            println!(
                "No backup found for {} under {}",
                args.file.display(),
                args.backup_dir.display()
            );
        }
    }
    Ok(())
}

fn cmd_rules(args: RulesArgs) -> Result<()> {
    let catalog = RuleCatalog::built_in();

    match args.format {
        RulesFormat::Text => {
            for rule in catalog.all() {
                println!(
                    "{:<22} {:<9} fix:{:<8} {}",
                    rule.id,
                    rule.severity.as_str(),
                    rule.fix_capability.as_str(),
                    rule.description
                );
            }
        }
        RulesFormat::Json => {
            let entries: Vec<serde_json::Value> = catalog
                .all()
                .iter()
                .map(|rule| {
                    serde_json::json!({
                        "rule_id": rule.id,
                        "severity": rule.severity.as_str(),
                        "fix_capability": rule.fix_capability.as_str(),
                        "description": rule.description,
                        "remediation_guidance": rule.remediation_guidance,
                    })
                })
                .collect();
            let rendered =
                serde_json::to_string_pretty(&entries).context("render rules json")?;
            println!("{rendered}");
        }
    }

    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> Result<()> {
    let catalog = RuleCatalog::built_in();

    match catalog.lookup(&args.rule_id) {
        Some(rule) => {
            print!("{}", format_rule_explanation(rule));
            Ok(())
        }
        None => {
            let suggestions = find_similar_rules(&args.rule_id, &catalog);
            let mut msg = format!("Rule '{}' not found.", args.rule_id);

            if !suggestions.is_empty() {
                msg.push_str("\n\nDid you mean one of these?\n");
                for s in &suggestions {
                    msg.push_str(&format!("  - {s}\n"));
                }
            }

            msg.push_str("\nUse 'apexguard rules' to list all available rules.");

            bail!("{}", msg);
        }
    }
}

/// Format rule explanation for display.
fn format_rule_explanation(rule: &apexguard_domain::Rule) -> String {
    let mut out = String::new();

    out.push_str(&format!("Rule: {}\n", rule.id));
    out.push_str(&format!("Severity: {}\n", rule.severity.as_str()));
    out.push_str(&format!(
        "Fix capability: {}\n",
        rule.fix_capability.as_str()
    ));
    out.push_str(&format!("\nDescription:\n  {}\n", rule.description));
    out.push_str(&format!("\nRemediation:\n  {}\n", rule.remediation_guidance));

    out
}

/// Case-insensitive fuzzy candidates for a mistyped rule id: substring
/// containment either way, or a shared prefix of at least four characters.
fn find_similar_rules<'a>(query: &str, catalog: &'a RuleCatalog) -> Vec<&'a str> {
    let query = query.to_lowercase();
    catalog
        .all()
        .iter()
        .map(|rule| rule.id)
        .filter(|id| {
            let id_lower = id.to_lowercase();
            id_lower.contains(&query)
                || query.contains(&id_lower)
                || id_lower
                    .chars()
                    .zip(query.chars())
                    .take_while(|(a, b)| a == b)
                    .count()
                    >= 4
        })
        .collect()
}
