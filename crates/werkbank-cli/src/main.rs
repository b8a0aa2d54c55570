// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Werkbank: everyday file tools for images and PDFs.
//
// Entry point. Parses arguments, initialises logging, loads settings, and
// dispatches to one tool.

mod services;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use werkbank_core::error::{Result, WerkbankError};
use werkbank_core::human_errors::humanize_error;
use werkbank_core::types::{AcceptPolicy, OutputFormat};
use werkbank_core::WerkbankConfig;
use werkbank_document::format_file_size;

use services::app_services::{self, AppServices};
use services::data_dir;
use state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "werkbank",
    version,
    about = "Convert and compress images, merge and split PDFs",
    propagate_version = true
)]
struct Cli {
    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true, env = "WERKBANK_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert images between PNG, JPEG, WebP and ICO.
    Convert {
        /// PNG, JPEG or WebP files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target format.
        #[arg(long, value_enum, default_value = "png")]
        to: FormatArg,
        /// Directory for the converted file or archive.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Shrink images to JPEG within the configured bounds.
    Compress {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// JPEG quality in percent.
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
        /// Print the results as JSON.
        #[arg(long)]
        json: bool,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Join PDFs in the order given.
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy selected pages of a PDF into a new file.
    Extract {
        file: PathBuf,
        /// Page range such as "1-3,5,7".
        #[arg(short, long)]
        pages: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the page count of a PDF.
    Info { file: PathBuf },
    /// Manage the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
    Webp,
    Ico,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpg => OutputFormat::Jpeg,
            FormatArg::Webp => OutputFormat::Webp,
            FormatArg::Ico => OutputFormat::Ico,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write the default settings.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings.
    Show,
    /// Print where the settings file lives.
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "Werkbank starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}", humanize_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(data_dir::default_config_path);

    // A broken settings file must not block writing a fresh one.
    let mut svc = match cli.command {
        Command::Config {
            action: ConfigAction::Init { .. },
        } => AppServices::with_config(WerkbankConfig::default(), config_path),
        _ => AppServices::init(config_path)?,
    };

    match cli.command {
        Command::Convert { files, to, output } => {
            let format = OutputFormat::from(to);
            let mut state = select(&svc, AcceptPolicy::ConvertibleImage, &files)?;
            let outcome = svc.convert(&mut state, format, &output)?;
            for name in &outcome.failed {
                eprintln!("Skipped {name}: could not be converted");
            }
            if let Some(status) = &state.status_message {
                println!("{status}: {}", outcome.path.display());
            }
        }
        Command::Compress {
            files,
            quality,
            json,
            output,
        } => {
            let mut state = select(&svc, AcceptPolicy::AnyImage, &files)?;
            let outputs = svc.compress(&mut state, quality, &output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outputs)?);
            } else {
                for out in &outputs {
                    println!(
                        "{}: {} -> {} ({} saved, {}) {}",
                        out.source,
                        format_file_size(out.report.original_size),
                        format_file_size(out.report.compressed_size),
                        out.savings,
                        out.tier,
                        out.path.display()
                    );
                }
            }
        }
        Command::Merge { files, output } => {
            let mut state = select(&svc, AcceptPolicy::Pdf, &files)?;
            svc.merge(&mut state, output)?;
            if let Some(status) = &state.status_message {
                println!("{status}");
            }
        }
        Command::Extract {
            file,
            pages,
            output,
        } => {
            let mut state = select(&svc, AcceptPolicy::Pdf, std::slice::from_ref(&file))?;
            let outcome = svc.extract(&mut state, &pages, output)?;
            if !outcome.rejected.is_empty() {
                eprintln!("Ignored: {}", outcome.rejected.join(", "));
            }
            println!(
                "Extracted {} page(s): {}",
                outcome.pages.len(),
                outcome.path.display()
            );
        }
        Command::Info { file } => {
            let pages = app_services::page_count(&file)?;
            println!("{}: {pages} page(s)", file.display());
        }
        Command::Config { action } => match action {
            ConfigAction::Init { force } => {
                let path = svc.init_config(force)?;
                println!("Wrote {}", path.display());
            }
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(svc.config())?);
            }
            ConfigAction::Path => {
                println!("{}", svc.config_path().display());
            }
        },
    }
    Ok(())
}

/// Build the state for one tool and add `files` to its selection.
///
/// Fails when files were given but none of them is of an accepted type.
fn select(svc: &AppServices, policy: AcceptPolicy, files: &[PathBuf]) -> Result<AppState> {
    let mut state = AppState::new(svc.config().clone(), policy);
    let accepted = state.selection.extend(files);
    tracing::debug!(accepted, given = files.len(), "Selection built");
    if accepted == 0 && !files.is_empty() {
        let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        return Err(WerkbankError::UnsupportedFile(names.join(", ")));
    }
    Ok(state)
}
