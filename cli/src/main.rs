//! tcp - Tree Copy
//!
//! Copy a directory tree with conflict policies, exclusions and bounded
//! parallelism, powered by treecopy.

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use treecopy::{
    CaseSensitivity, ConflictPrompter, CopyOptions, CopyResult, Error as TreecopyError, ErrorCode,
    UpdateMode, copy_directory, expand_home,
};

const SCHEMA_VERSION: &str = "1.0";

/// tcp - Parallel directory-tree copy
///
/// Copies every file and directory under SOURCE into DEST. Existing files
/// are skipped unless another update mode is chosen, so an interrupted copy
/// can simply be re-run.
///
/// Usage:
///   tcp SOURCE DEST
///   tcp SOURCE DEST -u if-newer -x node_modules -x target -j 8
#[derive(Parser, Debug)]
#[command(name = "tcp", version, about, long_about = None)]
struct Args {
    /// Source directory
    source: PathBuf,

    /// Destination directory (created if missing)
    destination: PathBuf,

    /// What to do with files that already exist at the destination
    #[arg(short = 'u', long = "update", value_enum, default_value = "skip")]
    update: UpdateChoice,

    /// Directory name (or glob) to leave out, with everything beneath it
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Only copy entries directly under SOURCE
    #[arg(long)]
    no_recurse: bool,

    /// Maximum number of concurrent copy workers (1 = sequential)
    #[arg(short = 'j', long = "throttle", default_value = "1", value_parser = parse_throttle)]
    throttle: usize,

    /// Report what would be copied without writing anything
    #[arg(short = 'n', long = "what-if", alias = "dry-run")]
    what_if: bool,

    /// Do not carry source timestamps over to copied files
    #[arg(long)]
    no_times: bool,

    /// Sync each file to disk before it is renamed into place
    #[arg(long)]
    fsync: bool,

    /// Match exclusion patterns case-sensitively
    #[arg(long, conflicts_with = "ignore_case")]
    case_sensitive: bool,

    /// Match exclusion patterns case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable the progress spinner and warnings
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Log every entry as it is processed
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UpdateChoice {
    /// Leave existing files alone (default, enables resume)
    Skip,
    /// Replace existing files
    Overwrite,
    /// Replace existing files only when the source is newer
    IfNewer,
    /// Ask before replacing each existing file
    Prompt,
}

impl UpdateChoice {
    fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::IfNewer => "if_newer",
            Self::Prompt => "prompt",
        }
    }
}

impl From<UpdateChoice> for UpdateMode {
    fn from(choice: UpdateChoice) -> Self {
        match choice {
            UpdateChoice::Skip => UpdateMode::Skip,
            UpdateChoice::Overwrite => UpdateMode::Overwrite,
            UpdateChoice::IfNewer => UpdateMode::IfNewer,
            UpdateChoice::Prompt => UpdateMode::Prompt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to copy {}: {source}", .path.display())]
    CopyDirectory { path: PathBuf, source: TreecopyError },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::CopyDirectory { source, .. } => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::IoError,
        }
    }
}

/// Asks on the terminal whether to replace an existing file.
///
/// Declines without asking when stdin is not a terminal, so a piped or
/// scheduled run never blocks.
struct TerminalPrompter;

impl ConflictPrompter for TerminalPrompter {
    fn confirm(&self, destination: &Path) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return false;
        }

        let mut stderr = io::stderr().lock();
        if write!(stderr, "Overwrite {}? [y/N] ", destination.display()).is_err()
            || stderr.flush().is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn parse_throttle(value: &str) -> std::result::Result<usize, String> {
    let n: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if n == 0 {
        return Err("throttle must be at least 1".to_owned());
    }
    Ok(n)
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidInput => 2,
        _ => 1,
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    match run(&args) {
        Ok(result) if result.errors > 0 => std::process::exit(1),
        Ok(_) => {}
        Err(error) => {
            if args.output == OutputMode::Json {
                // Best effort: the human-readable line below still goes out.
                let _ = print_json_value(&json!({
                    "schema_version": SCHEMA_VERSION,
                    "mode": mode_str(&args),
                    "error": {
                        "code": error.code().as_str(),
                        "message": error.to_string(),
                    },
                }));
            }
            eprintln!("error[{}]: {}", error.code(), error);
            std::process::exit(exit_code_for(error.code()));
        }
    }
}

/// Route library warnings and per-entry progress to stderr.
///
/// `-q` keeps only errors, `-v` shows every entry, `RUST_LOG` overrides
/// both.
fn init_logging(args: &Args) {
    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> CliResult<CopyResult> {
    let source = expand_home(&args.source);
    let destination = expand_home(&args.destination);
    let options = build_options(args);
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        ?options,
        "starting copy"
    );

    let show_spinner = args.output == OutputMode::Human
        && !args.quiet
        && !args.verbose
        && !matches!(args.update, UpdateChoice::Prompt);
    let pb = if show_spinner {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}");
        if let Ok(style) = style {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Copying {}...", source.display()));
            Some(pb)
        } else {
            None
        }
    } else {
        None
    };

    let copy_result = copy_directory(&source, &destination, &options);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let result = copy_result.map_err(|source_error| CliError::CopyDirectory {
        path: source.clone(),
        source: source_error,
    })?;

    match args.output {
        OutputMode::Human => print_result(&result, args.what_if),
        OutputMode::Json => print_json_value(&result_to_json(
            &result,
            args,
            &source,
            &destination,
        ))?,
    }

    Ok(result)
}

fn build_options(args: &Args) -> CopyOptions {
    let mut options = CopyOptions::default()
        .with_throttle(args.throttle)
        .with_update_mode(args.update.into());

    for pattern in &args.exclude {
        options = options.with_exclude(pattern.as_str());
    }
    if args.no_recurse {
        options = options.without_recursion();
    }
    if args.what_if {
        options = options.with_dry_run();
    }
    if args.no_times {
        options = options.without_timestamps();
    }
    if args.fsync {
        options = options.with_fsync();
    }
    if args.case_sensitive {
        options = options.with_case_sensitivity(CaseSensitivity::Sensitive);
    } else if args.ignore_case {
        options = options.with_case_sensitivity(CaseSensitivity::Insensitive);
    }
    if matches!(args.update, UpdateChoice::Prompt) {
        options = options.with_prompter(Arc::new(TerminalPrompter));
    }

    options
}

fn mode_str(args: &Args) -> &'static str {
    if args.what_if { "dry_run" } else { "execute" }
}

fn result_to_json(result: &CopyResult, args: &Args, source: &Path, destination: &Path) -> Value {
    json!({
        "schema_version": SCHEMA_VERSION,
        "mode": mode_str(args),
        "source": display_path(source),
        "destination": display_path(destination),
        "update_mode": args.update.as_str(),
        "result": {
            "total_files": result.total_files,
            "total_directories": result.total_directories,
            "files_skipped": result.files_skipped,
            "files_overwritten": result.files_overwritten,
            "excluded_directories": result.excluded_directories,
            "errors": result.errors,
            "bytes_copied": result.bytes_copied,
            "duration_ms": u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
        },
    })
}

fn print_result(result: &CopyResult, dry_run: bool) {
    if dry_run {
        println!("What if: nothing was written");
    } else if result.total_files == 0 && result.total_directories == 0 && result.errors == 0 {
        if result.files_skipped > 0 {
            println!(
                "Nothing to copy ({} files already exist)",
                result.files_skipped
            );
        } else {
            println!("Nothing to copy");
        }
        return;
    } else {
        println!("Copy completed in {:?}", result.duration);
    }

    println!("  Files copied:        {}", result.total_files);
    println!("  Files overwritten:   {}", result.files_overwritten);
    println!("  Files skipped:       {}", result.files_skipped);
    println!("  Directories created: {}", result.total_directories);
    println!("  Excluded dirs:       {}", result.excluded_directories);
    println!("  Errors:              {}", result.errors);
    println!("  Total size:          {}", format_bytes(result.bytes_copied));
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
