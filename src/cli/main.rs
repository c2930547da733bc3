use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use exif_remover::config::Config;
use exif_remover::error::{Error, ErrorKind};
use exif_remover::exif::{self, ImageMetadataEngine};
use exif_remover::paths::{self, SourceTarget, display_path};
use exif_remover::pipeline::{self, FileOutcome, OutcomeStatus};

// Flags compose freely, so clap's own help/version handling (which exits
// immediately) is replaced by plain boolean flags.
#[derive(Parser, Debug)]
#[command(
    name = "exifremover",
    about = "Remove EXIF metadata from an image or from every image in a folder",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// show version
    #[arg(short = 'v', long)]
    version: bool,

    /// print help message
    #[arg(short = 'h', long)]
    help: bool,

    /// show exif data
    #[arg(short = 's', long = "show-exif", value_name = "filename")]
    show_exif: Option<PathBuf>,

    /// delete all exif data of given file(s)
    #[arg(short = 'd', long = "delete-exif", value_name = "filename")]
    delete_exif: Option<PathBuf>,

    /// save changed image(s) into file or folder
    #[arg(long, value_name = "filename")]
    dest: Option<PathBuf>,

    /// Verbose output
    #[arg(long)]
    verbose: bool,

    /// Print the folder results as JSON
    #[arg(long)]
    json: bool,

    /// Do not print the banner
    #[arg(long)]
    no_banner: bool,
}

fn main() -> ExitCode {
    let args: Vec<OsString> = normalize_args(std::env::args_os());
    let config = Config::default();

    if !args.iter().any(|a| a == "--no-banner") {
        println!("{}", config.banner);
    }

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            let err = Error::new(ErrorKind::ParseError, first_line(&e.to_string()));
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match run(&cli, &config, args.len() <= 1) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}

/// Run the requested actions in order. Returns `false` when some files of a folder failed.
fn run(cli: &Cli, config: &Config, no_args: bool) -> Result<bool> {
    if cli.version {
        println!("{}", config.version);
    }

    if cli.help || no_args {
        Cli::command().override_usage(config.usage).print_help()?;
        println!();
    }

    if let Some(ref path) = cli.show_exif {
        show_exif(path)?;
    }

    if let Some(ref path) = cli.delete_exif {
        return delete_exif(path, cli.dest.as_deref(), config, cli.json);
    }

    Ok(true)
}

fn show_exif(path: &Path) -> Result<()> {
    paths::classify(path)?;
    let report = exif::read_metadata(path)?;
    println!("{report}");
    Ok(())
}

fn delete_exif(source: &Path, dest: Option<&Path>, config: &Config, json: bool) -> Result<bool> {
    let source = paths::classify(source)?;
    let target = paths::resolve_destination(&source, dest, config)?;

    match source {
        SourceTarget::Directory(ref dir) => {
            if target.redirected {
                log::info!("Writing results to {}", target.path.display());
            }
            let result = pipeline::run_batch(&ImageMetadataEngine, dir, &target.path, |outcome| {
                print_outcome(outcome, json)
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.outcomes)?);
            }
            log::info!(
                "Done: {} succeeded, {} failed",
                result.succeeded(),
                result.failed()
            );
            Ok(result.failed() == 0)
        }
        SourceTarget::SingleFile(ref file) => {
            exif::strip_and_save(file, &target.path)?;
            println!(
                "All EXIF data successfully removed from {}",
                display_path(file).display()
            );
            println!("Result saved in {}", display_path(&target.path).display());
            Ok(true)
        }
    }
}

/// Report one file of a folder run. With `--json` stdout carries only the JSON array.
fn print_outcome(outcome: &FileOutcome, json: bool) {
    match outcome.status {
        OutcomeStatus::Success => {
            let dest = outcome.destination.as_deref().unwrap_or(&outcome.path);
            let line = format!("created file {}", display_path(dest).display());
            if json {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        OutcomeStatus::ReadError => {
            eprintln!("Can not convert or read file {}", display_path(&outcome.path).display());
        }
        OutcomeStatus::WriteError => {
            eprintln!("Unable to remove EXIF data from {}", display_path(&outcome.path).display());
        }
    }
}

/// Accept the single-dash `-dest` spelling alongside `--dest`.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|a| if a == "-dest" { OsString::from("--dest") } else { a })
        .collect()
}

fn first_line(s: &str) -> &str {
    let line = s.lines().next().unwrap_or(s);
    line.strip_prefix("error: ").unwrap_or(line)
}
