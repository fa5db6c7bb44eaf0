//! CLI argument parsing and command dispatch

use crate::archive::GitHubUploader;
use crate::config::{data_dir, Config};
use crate::delivery::{DeliveryEngine, DeliveryOptions, LogNotifier};
use crate::sheet::{HttpSheetTransport, MapStore, SheetMapCache};
use crate::submit::{PipelineSettings, Submission, SubmissionPipeline, SubmitOutcome, SubmittedLedger};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "solvetrack")]
#[command(about = "Archive solutions and record them on the tracking sheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the sheet map for the configured group and cache it
    Sync,
    /// Archive a captured submission and deliver its tracking record
    Submit {
        /// Path to a JSON file describing the captured submission
        #[arg(short, long)]
        file: PathBuf,
        /// Do not raise a notification on delivery failure
        #[arg(long)]
        no_notify: bool,
    },
    /// Show the cached sheet map state
    Status,
}

/// Log filter for the chosen verbosity.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let data_dir = data_dir()?;

    let transport = Arc::new(HttpSheetTransport::new(config.sheet.endpoint.as_str())?);
    let cache = Arc::new(SheetMapCache::new(MapStore::new(&data_dir)?, transport.clone()));

    match cli.command {
        Commands::Sync => {
            let map = cache
                .refresh(&config.identity.group)
                .await
                .context("Could not fetch the sheet map; check the group and endpoint")?;
            println!(
                "Synced group {}: {} students, {} problems",
                config.identity.group,
                map.students.len(),
                map.problems.len()
            );
            Ok(())
        }
        Commands::Status => {
            match cache.get() {
                Some((map, group)) => println!(
                    "Cached map for group {}: {} students, {} problems",
                    group,
                    map.students.len(),
                    map.problems.len()
                ),
                None => println!("No cached sheet map; run `solvetrack sync` first"),
            }
            Ok(())
        }
        Commands::Submit { file, no_notify } => {
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read submission file {}", file.display()))?;
            let submission: Submission = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse submission file {}", file.display()))?;

            let uploader = Arc::new(GitHubUploader::new(config.archive_token()?)?);
            let engine = DeliveryEngine::new(transport, cache.clone(), Arc::new(LogNotifier))
                .with_busy_policy(config.delivery.busy_backoff, config.delivery.busy_cap());
            let pipeline = SubmissionPipeline::new(
                PipelineSettings {
                    group: config.identity.group.clone(),
                    student_name: config.identity.student_name.clone(),
                    repo: config.archive.repo.clone(),
                    folder_path: config.archive.folder_path.clone(),
                },
                uploader,
                cache,
                engine,
                SubmittedLedger::new(&data_dir)?,
            );

            pipeline.warm().await;
            let outcome = pipeline
                .submit(
                    &submission,
                    DeliveryOptions {
                        suppress_notification: no_notify,
                    },
                )
                .await?;
            match outcome {
                SubmitOutcome::Tracked { archive_url } => {
                    println!("Archived and tracked: {archive_url}");
                }
                SubmitOutcome::ArchivedOnly {
                    archive_url,
                    message,
                } => {
                    println!("Archived (not tracked): {archive_url}");
                    println!("{message}");
                }
            }
            Ok(())
        }
    }
}
