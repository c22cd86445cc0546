//! `portfolio-admin`: maintenance commands against the configured content
//! store. Reads the same configuration as the API server.
//!
//! ```bash
//! portfolio-admin seed data/seed.json --replace
//! portfolio-admin diagnose
//! portfolio-admin reconcile --grace-secs 0
//! portfolio-admin issue-token --subject alice --ttl-hours 2
//! ```

use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Context};
use chrono::Duration as ChronoDuration;
use clap::{Parser, Subcommand};
use portfolio_content::{
    auth::jwt::JwtService,
    background_task::reconcile_orphans,
    constants::DEFAULT_TOKEN_SUBJECT,
    content_store::ContentStore,
    entities::{
        document::{Collection, ContentKind, ListOrder},
        experience::{Experience, ExperienceDraft},
        photo::{Photo, PhotoDraft},
        project::{GameProject, ProjectDraft, WebsiteProject},
        tool::{Skill, Tech, Tool, ToolDraft},
    },
    errors::AppError,
    gallery::CategoryFilter,
    settings::AppConfig,
    use_cases::{content::ContentHandler, form::FormController},
};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

#[derive(Parser)]
#[command(name = "portfolio-admin", version, about = "Maintenance commands for the portfolio content store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load documents from a JSON seed file.
    ///
    /// The file maps collection names to lists of drafts, the same shape the
    /// admin forms submit.
    Seed {
        file: PathBuf,

        /// Delete the existing documents of every seeded collection first.
        #[arg(long)]
        replace: bool,

        /// Validate the file without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check store connectivity and report per-collection counts.
    Diagnose,

    /// Delete uploaded blobs that no document references.
    Reconcile {
        /// Override the configured grace period.
        #[arg(long)]
        grace_secs: Option<u64>,
    },

    /// Mint a bearer token for the admin API.
    IssueToken {
        #[arg(long, default_value = DEFAULT_TOKEN_SUBJECT)]
        subject: String,

        /// Override the configured lifetime.
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    websites: Vec<ProjectDraft>,
    games: Vec<ProjectDraft>,
    experiences: Vec<ExperienceDraft>,
    tools: Vec<ToolDraft>,
    skills: Vec<ToolDraft>,
    techs: Vec<ToolDraft>,
    photos: Vec<PhotoDraft>,
}

#[derive(Debug, Serialize)]
struct CollectionReport {
    collection: Collection,
    stored: usize,
    readable: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let config = AppConfig::new().context("Configuration error")?;

    match command {
        Commands::IssueToken { subject, ttl_hours } => {
            let service = JwtService::new(&config);
            let ttl = ChronoDuration::hours(ttl_hours.unwrap_or(config.admin_token_ttl_hours));
            let issued = service.issue_with_ttl(&subject, ttl).context("Could not issue token")?;
            println!("{}", issued.access_token);
            Ok(())
        }
        Commands::Seed { file, replace, dry_run } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let seed: SeedFile = serde_json::from_str(&raw).context("Invalid seed file")?;

            if dry_run {
                validate_seed(&seed)?;
                println!("Seed file is valid");
                return Ok(());
            }

            let content = connect(&config).await?;
            seed_all(&content, &config, seed, replace).await?;
            Ok(())
        }
        Commands::Diagnose => {
            let content = connect(&config).await?;
            diagnose(&content).await
        }
        Commands::Reconcile { grace_secs } => {
            let content = connect(&config).await?;
            let grace = Duration::from_secs(grace_secs.unwrap_or(config.orphan_grace_secs));
            let report = reconcile_orphans(&content, grace).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.failed.is_empty() {
                bail!("{} blobs could not be removed", report.failed.len());
            }
            Ok(())
        }
    }
}

async fn connect(config: &AppConfig) -> Result<ContentStore, AppError> {
    let content = ContentStore::connect(config).await?;
    if !content.documents.is_durable() {
        eprintln!("warning: the memory store is local to this process; nothing written here persists");
    }
    Ok(content)
}

fn validate_seed(seed: &SeedFile) -> Result<(), AppError> {
    use validator::Validate;

    seed.websites.iter().chain(&seed.games).try_for_each(Validate::validate)?;
    seed.experiences.iter().try_for_each(Validate::validate)?;
    seed.tools.iter().chain(&seed.skills).chain(&seed.techs).try_for_each(Validate::validate)?;
    seed.photos.iter().try_for_each(Validate::validate)?;
    Ok(())
}

async fn seed_collection<K: ContentKind>(
    content: &ContentStore,
    config: &AppConfig,
    drafts: Vec<K::Draft>,
    replace: bool,
) -> Result<(), AppError> {
    if drafts.is_empty() {
        return Ok(());
    }

    let handler = ContentHandler::<K>::new(content.clone(), config.max_upload_bytes);

    if replace {
        let existing = handler.list(ListOrder::Natural, &CategoryFilter::All).await?;
        for document in &existing {
            handler.delete(&document.id).await?;
        }
        println!("{}: removed {} existing documents", K::COLLECTION, existing.len());
    }

    let mut form = FormController::new(handler);
    let total = drafts.len();
    for draft in drafts {
        form.start_new(draft);
        form.submit().await?;
    }

    println!("{}: seeded {} documents", K::COLLECTION, total);
    Ok(())
}

async fn seed_all(content: &ContentStore, config: &AppConfig, seed: SeedFile, replace: bool) -> Result<(), AppError> {
    seed_collection::<WebsiteProject>(content, config, seed.websites, replace).await?;
    seed_collection::<GameProject>(content, config, seed.games, replace).await?;
    seed_collection::<Experience>(content, config, seed.experiences, replace).await?;
    seed_collection::<Tool>(content, config, seed.tools, replace).await?;
    seed_collection::<Skill>(content, config, seed.skills, replace).await?;
    seed_collection::<Tech>(content, config, seed.techs, replace).await?;
    seed_collection::<Photo>(content, config, seed.photos, replace).await?;
    Ok(())
}

async fn collection_report<K: ContentKind>(content: &ContentStore) -> Result<CollectionReport, AppError> {
    let handler = ContentHandler::<K>::new(content.clone(), 0);
    let stored = handler.count().await?;
    let readable = handler.list(ListOrder::Natural, &CategoryFilter::All).await?.len();

    Ok(CollectionReport { collection: K::COLLECTION, stored, readable })
}

async fn diagnose(content: &ContentStore) -> anyhow::Result<()> {
    let status = content.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    if !status.reachable {
        bail!("Document store is not reachable");
    }

    let reports = vec![
        collection_report::<WebsiteProject>(content).await?,
        collection_report::<GameProject>(content).await?,
        collection_report::<Experience>(content).await?,
        collection_report::<Tool>(content).await?,
        collection_report::<Skill>(content).await?,
        collection_report::<Tech>(content).await?,
        collection_report::<Photo>(content).await?,
    ];
    println!("{}", serde_json::to_string_pretty(&reports)?);

    let malformed: usize = reports.iter().map(|r| r.stored.saturating_sub(r.readable)).sum();
    if malformed > 0 {
        bail!("{} stored documents do not match their schema", malformed);
    }
    Ok(())
}
