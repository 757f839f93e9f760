use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use jobfiles_protocol::{serialize_json, serialize_json_pretty};
use jobfiles_resolver::EngineConfig;
use serde::Serialize;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::flags::TreeView;

mod commands;
mod flags;

const CONFIG_ENV: &str = "JOBFILES_CONFIG";
const ASSET_ROOT_ENV: &str = "JOBFILES_ASSET_ROOT";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "jobfiles")]
#[command(about = "Project folder, file tree and document path resolution", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file (overrides JOBFILES_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Asset root directory (overrides JOBFILES_ASSET_ROOT and the config file)
    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the job number from a folder or project name
    #[command(name = "job-number")]
    JobNumber(JobNumberArgs),

    /// Normalize the first drawing number found in some text
    #[command(name = "drawing-number")]
    DrawingNumber(DrawingNumberArgs),

    /// Locate a project's folder on the asset root
    Folder(ProjectArgs),

    /// Build a project's file tree
    Tree(TreeArgs),

    /// Resolve the path of a document from its record
    #[command(name = "doc-path")]
    DocPath(DocPathArgs),

    /// Validate and normalize a document path
    #[command(name = "check-path")]
    CheckPath(CheckPathArgs),
}

#[derive(Args)]
struct JobNumberArgs {
    /// Folder or project name
    name: String,
}

#[derive(Args)]
struct DrawingNumberArgs {
    /// Text containing a drawing number
    text: String,
}

#[derive(Args)]
struct ProjectArgs {
    /// Job number (e.g. U2524)
    #[arg(long)]
    job: String,

    /// Project display name
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
struct TreeArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Detail (full depth) or sidebar (shallow, filtered) view
    #[arg(long, value_enum, default_value = "detail")]
    view: TreeView,

    /// Override the depth budget of the chosen view
    #[arg(long)]
    depth: Option<usize>,
}

#[derive(Args)]
struct DocPathArgs {
    /// Document record as JSON (reads stdin when omitted)
    #[arg(long)]
    record: Option<String>,

    /// Predict from naming conventions only, without probing the asset root
    #[arg(long)]
    no_probe: bool,

    /// Include every synthesized candidate in the output
    #[arg(long)]
    candidates: bool,
}

#[derive(Args)]
struct CheckPathArgs {
    /// Path or URL to check
    path: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let pretty = cli.pretty;
    match cli.command {
        Commands::JobNumber(args) => emit(&commands::job_number(&args.name), pretty),
        Commands::DrawingNumber(args) => emit(&commands::drawing_number(&args.text), pretty),
        Commands::CheckPath(args) => {
            let config = load_config(cli.config, cli.asset_root)?;
            emit(&commands::check_path(&config, &args.path), pretty)
        }
        Commands::Folder(args) => {
            let config = load_config(cli.config, cli.asset_root)?;
            let output = commands::folder(config, &args.job, args.name.as_deref())?;
            emit(&output, pretty)
        }
        Commands::Tree(args) => {
            let config = load_config(cli.config, cli.asset_root)?;
            let output = commands::tree(
                config,
                &args.project.job,
                args.project.name.as_deref(),
                args.view,
                args.depth,
            )?;
            emit(&output, pretty)
        }
        Commands::DocPath(args) => {
            let config = load_config(cli.config, cli.asset_root)?;
            let raw = read_record(args.record)?;
            let output = commands::doc_path(config, &raw, !args.no_probe, args.candidates)?;
            emit(&output, pretty)
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serialize_json_pretty(value)?
    } else {
        serialize_json(value)?
    };
    print_stdout(&text)
}

fn load_config(config: Option<PathBuf>, asset_root: Option<PathBuf>) -> Result<EngineConfig> {
    let config_path = config.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let mut config = match config_path {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(root) = asset_root.or_else(|| env::var_os(ASSET_ROOT_ENV).map(PathBuf::from)) {
        config = config.with_asset_root(root);
    }
    config.validate().context("Invalid configuration")?;
    log::debug!("Asset root: {}", config.asset_root.display());
    Ok(config)
}

fn read_record(record: Option<String>) -> Result<String> {
    if let Some(raw) = record {
        if let Some(path) = raw.strip_prefix('@') {
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read record from {path}"));
        }
        return Ok(raw);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read record from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Document record is empty. Provide --record or pipe JSON via stdin.");
    }

    Ok(buffer)
}
