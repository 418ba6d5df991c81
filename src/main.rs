use std::{path::PathBuf, sync::Arc};

use cairn::{
    config::{CairnConfig, ObjectStoreConfig},
    db::DbPool,
    models::UploadedArtifact,
    observability,
    services::{BackupServiceError, Services},
    storage::DefaultConnector,
};
use clap::Parser;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// CLI arguments for Cairn
#[derive(Parser, Debug)]
#[command(version, about = "Cairn backup catalog and retention", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "cairn.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Record a completed upload, then enforce the job's retention
    Record {
        /// Job trigger the backup belongs to
        #[arg(short, long)]
        trigger: String,
        /// Object key of the uploaded artifact
        #[arg(short, long)]
        file: String,
        /// Override the job's adapter
        #[arg(long)]
        adapter: Option<String>,
        /// Override the job's bucket
        #[arg(long)]
        bucket: Option<String>,
    },
    /// List backups for a trigger, newest first
    List {
        #[arg(short, long)]
        trigger: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show backup counts per trigger
    Triggers {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Re-run retention for a trigger using its configured limit
    ///
    /// Finishes a retention pass that stopped on an error, without
    /// recording a new backup.
    Prune {
        #[arg(short, long)]
        trigger: String,
    },
    /// Destroy every backup for a trigger
    Purge {
        #[arg(short, long)]
        trigger: String,
        /// Confirm the purge
        #[arg(long)]
        yes: bool,
    },
    /// Run database migrations and exit
    Migrate,
    /// Check that the catalog database is reachable
    Check,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match CairnConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                args.config.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = observability::init_tracing(&config.observability.logging) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    tracing::debug!(config_file = %args.config.display(), "Configuration loaded");

    if let Err(e) = run_command(args.command, &config).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(command: Command, config: &CairnConfig) -> CliResult {
    let db = Arc::new(DbPool::from_config(&config.database).await?);
    let services = Services::new(Arc::clone(&db), Arc::new(DefaultConnector));
    let connection: &ObjectStoreConfig = &config.object_store;

    match command {
        Command::Migrate => {
            tracing::info!("Running database migrations");
            db.run_migrations().await?;
            tracing::info!("Database migrations completed successfully");
            Ok(())
        }
        Command::Check => {
            db.health_check().await?;
            println!("Catalog is reachable");
            Ok(())
        }
        Command::Record {
            trigger,
            file,
            adapter,
            bucket,
        } => {
            let artifact = build_artifact(config, &trigger, file, adapter, bucket)?;
            match services.backups.record(&artifact, connection).await {
                Ok(recorded) => {
                    println!(
                        "Recorded {} ({}) for {}",
                        recorded.record.filename, recorded.record.id, recorded.record.trigger
                    );
                    if let Some(keep) = recorded.retention.keep_backups {
                        println!(
                            "Storage for {} is limited to {} backups; removed {}",
                            trigger, keep, recorded.retention.purged
                        );
                    }
                    Ok(())
                }
                Err(BackupServiceError::Retention { record, source }) => {
                    println!("Recorded {} ({}) for {}", record.filename, record.id, record.trigger);
                    Err(format!(
                        "retention failed after {} removals: {}; run `cairn prune --trigger {}` to retry",
                        source.purged(),
                        source,
                        trigger
                    )
                    .into())
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::List { trigger, json } => {
            let backups = services.backups.list(&trigger).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&backups)?);
            } else if backups.is_empty() {
                println!("No backups for {}", trigger);
            } else {
                for b in &backups {
                    println!(
                        "{}  {}  {}/{}",
                        b.created_at.to_rfc3339(),
                        b.id,
                        b.bucket,
                        b.filename
                    );
                }
            }
            Ok(())
        }
        Command::Triggers { json } => {
            let triggers = services.backups.triggers().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&triggers)?);
            } else {
                for t in &triggers {
                    println!("{}  {}  {}", t.trigger, t.count, t.latest_at.to_rfc3339());
                }
            }
            Ok(())
        }
        Command::Prune { trigger } => {
            let job = config.job(&trigger)?;
            let report = services
                .backups
                .prune(&trigger, job.keep_backups, connection)
                .await?;
            if report.is_disabled() {
                println!("Retention is disabled for {}", trigger);
            } else {
                println!(
                    "Removed {} of {} backups for {}; {} remain",
                    report.purged,
                    report.total,
                    trigger,
                    report.remaining()
                );
            }
            Ok(())
        }
        Command::Purge { trigger, yes } => {
            if !yes {
                return Err(format!("refusing to purge {} without --yes", trigger).into());
            }
            let report = services.backups.destroy_all(&trigger, connection).await?;
            println!(
                "Destroyed {} of {} backups for {}",
                report.purged, report.requested, trigger
            );
            Ok(())
        }
    }
}

/// Describe an upload from its job config, with CLI overrides.
///
/// A trigger without a `[jobs]` entry needs both overrides and never
/// enforces retention.
fn build_artifact(
    config: &CairnConfig,
    trigger: &str,
    file: String,
    adapter: Option<String>,
    bucket: Option<String>,
) -> Result<UploadedArtifact, Box<dyn std::error::Error>> {
    let mut artifact = match config.job(trigger) {
        Ok(job) => UploadedArtifact::from_job(trigger, job, file),
        Err(e) => {
            let (Some(adapter), Some(bucket)) = (adapter.clone(), bucket.clone()) else {
                return Err(e.into());
            };
            UploadedArtifact {
                trigger: trigger.to_string(),
                adapter,
                final_file: file,
                bucket,
                keep_backups: None,
            }
        }
    };
    if let Some(adapter) = adapter {
        artifact.adapter = adapter;
    }
    if let Some(bucket) = bucket {
        artifact.bucket = bucket;
    }
    Ok(artifact)
}
