use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

mod catalog;
mod config;
mod error;
mod fetcher;
mod orchestrator;
mod report;
mod utils;

use catalog::Catalog;
use config::{FetchConfig, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS};
use error::RunError;
use fetcher::HttpFetcher;
use orchestrator::{Orchestrator, RunSummary};

/// Fetch a catalog of artwork images into per-artist folders
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Show debug logs
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download every catalog image, using the placeholder where one cannot be fetched
    Fetch {
        /// Directory to save images into
        #[arg(short, long, default_value = config::DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// JSON catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Placeholder URL used when an image cannot be downloaded
        #[arg(long)]
        fallback: Option<String>,

        /// Tries per image before giving up
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: u32,

        /// Base backoff in seconds; attempt N waits N times this
        #[arg(long, default_value_t = DEFAULT_BACKOFF_SECS)]
        backoff: u64,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: u64,

        /// Number of images to download at once
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        jobs: u64,

        /// Also write the run summary as JSON to this file
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Exit with status 1 if any image ends up missing
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the catalog categories and their image counts
    List {
        /// JSON catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Attempt failures are warnings, so they show without --verbose
    let filter = if args.verbose {
        EnvFilter::new("art_fetch=debug")
    } else {
        EnvFilter::new("art_fetch=warn")
    };
    // stderr, so log lines stay off the progress bar and the stdout report
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Fetch {
            output,
            catalog,
            fallback,
            max_attempts,
            backoff,
            timeout,
            jobs,
            summary_json,
            strict,
        } => {
            let mut catalog = load_catalog(catalog.as_deref())?;
            if let Some(fallback) = fallback {
                catalog = catalog.with_fallback(fallback);
                catalog.validate().context("Invalid --fallback")?;
            }

            let config = FetchConfig {
                max_attempts,
                backoff: Duration::from_secs(backoff),
                timeout: Duration::from_secs(timeout),
                output_dir: output,
                jobs: jobs as usize,
            };

            println!("Output: {}", config.output_dir.display());
            println!(
                "Downloading {} images from {} categories. This may take a few minutes...\n",
                catalog.total_items(),
                catalog.categories.len()
            );

            let token = CancellationToken::new();
            let interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling downloads");
                    interrupt.cancel();
                }
            });

            let fetcher = HttpFetcher::new(&config, token)?;
            let orchestrator = Orchestrator::new(fetcher, &config)
                .with_progress(progress_bar(catalog.total_items()));

            let run_report = match orchestrator.run(&catalog).await {
                Ok(run_report) => run_report,
                Err(RunError::Cancelled { completed }) => {
                    eprintln!(
                        "\nInterrupted after {} of {} images",
                        completed,
                        catalog.total_items()
                    );
                    return Ok(ExitCode::from(EXIT_INTERRUPTED));
                }
                Err(e) => return Err(e).context("Download run failed"),
            };

            println!("\n{}", report::render_summary(&run_report, &config.output_dir));

            if let Some(path) = summary_json {
                report::write_summary_json(&path, &run_report, &config.output_dir)?;
                println!("Summary written to {}", path.display());
            }

            return Ok(ExitCode::from(exit_status(&run_report.summary(), strict)));
        }
        Commands::List { catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            for category in &catalog.categories {
                println!("{} ({} images)", category.name, category.urls.len());
            }
            println!("Placeholder: {}", catalog.fallback);
        }
    }

    Ok(ExitCode::SUCCESS)
}

const EXIT_MISSING: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

/// Best effort by default; `--strict` fails the run when anything is missing
fn exit_status(summary: &RunSummary, strict: bool) -> u8 {
    if strict && summary.missing > 0 {
        EXIT_MISSING
    } else {
        0
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => Catalog::embedded().context("Built-in catalog is invalid"),
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn summary(missing: usize) -> RunSummary {
        RunSummary {
            ok: 3,
            placeholder: 1,
            missing,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_missing_items_only_fail_strict_runs() {
        assert_eq!(exit_status(&summary(0), false), 0);
        assert_eq!(exit_status(&summary(2), false), 0);
        assert_eq!(exit_status(&summary(0), true), 0);
        assert_eq!(exit_status(&summary(2), true), EXIT_MISSING);
        assert_eq!(EXIT_INTERRUPTED, 130);
    }

    #[test]
    fn test_fetch_defaults_match_config_defaults() {
        let args = Args::try_parse_from(["art-fetch", "fetch"]).unwrap();
        let defaults = FetchConfig::default();

        match args.command {
            Commands::Fetch {
                output,
                catalog,
                fallback,
                max_attempts,
                backoff,
                timeout,
                jobs,
                summary_json,
                strict,
            } => {
                assert_eq!(output, defaults.output_dir);
                assert_eq!(max_attempts, defaults.max_attempts);
                assert_eq!(Duration::from_secs(backoff), defaults.backoff);
                assert_eq!(Duration::from_secs(timeout), defaults.timeout);
                assert_eq!(jobs as usize, defaults.jobs);
                assert!(catalog.is_none());
                assert!(fallback.is_none());
                assert!(summary_json.is_none());
                assert!(!strict);
            }
            other => panic!("expected fetch, got {:?}", other),
        }
        assert!(!args.verbose);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "art-fetch", "fetch", "-o", "out", "-c", "cat.json", "-j", "4", "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Commands::Fetch {
                output,
                catalog,
                jobs,
                ..
            } => {
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(catalog, Some(PathBuf::from("cat.json")));
                assert_eq!(jobs, 4);
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_attempts_jobs_and_timeout() {
        for flag in ["--max-attempts", "--jobs", "--timeout"] {
            let result = Args::try_parse_from(["art-fetch", "fetch", flag, "0"]);
            assert!(result.is_err(), "{} 0 should be rejected", flag);
        }
    }

    #[test]
    fn test_list_takes_catalog() {
        let args = Args::try_parse_from(["art-fetch", "list", "-c", "cat.json"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::List { catalog: Some(ref path) } if path == &PathBuf::from("cat.json")
        ));
    }
}
