// src/cli.rs
use crate::analysis::{GeminiClient, InterviewAnalyzer, InterviewData, SkillGapAnalyzer};
use crate::core::{ConfigManager, Database, FsOps};
use crate::experiences::legacy::parse_document;
use crate::experiences::{
    ExperienceRepository, ExperienceSections, ExportDocument, InterviewExperience, NewExperience,
};
use crate::file_utils::extract_text_from_file;
use crate::web::start_web_server;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "interview-hub")]
#[command(about = "Share, search and analyze interview experiences")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Overrides the database path from config.yaml
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// List experiences, optionally filtered
    List {
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Show a single experience
    Show { id: i64 },
    /// Share a new experience
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        /// Full narrative; takes precedence over the section flags
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        rounds: Option<String>,
        #[arg(long)]
        technical: Option<String>,
        #[arg(long)]
        system_design: Option<String>,
        #[arg(long)]
        behavioral: Option<String>,
        #[arg(long)]
        overall: Option<String>,
    },
    /// Import a browser storage dump or an export file
    Import { file: PathBuf },
    /// Export all experiences as JSON, into the configured export
    /// directory unless a file is given
    Export { file: Option<PathBuf> },
    /// Compare a résumé file against a target role
    SkillGap {
        #[arg(long)]
        resume: PathBuf,
        #[arg(long)]
        role: String,
    },
    /// Analyze a stored experience with the AI service
    Analyze { id: i64 },
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    if let Some(path) = cli.database_path {
        config.environment.database_path = path;
    }

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            start_web_server(&config, port).await
        }

        Command::List { query } => {
            let db = open_database(&config, true).await?;
            let experiences = ExperienceRepository::new(db.pool())
                .list(query.as_deref())
                .await?;

            if experiences.is_empty() {
                println!("No interview experiences found");
            }
            for experience in &experiences {
                println!("{}", summary_line(experience));
            }
            Ok(())
        }

        Command::Show { id } => {
            let db = open_database(&config, true).await?;
            let experience = ExperienceRepository::new(db.pool())
                .get(id)
                .await?
                .with_context(|| format!("Interview experience {} not found", id))?;

            println!("{}\n", summary_line(&experience));
            println!("{}", experience.experience);
            Ok(())
        }

        Command::Add {
            company,
            position,
            experience,
            rounds,
            technical,
            system_design,
            behavioral,
            overall,
        } => {
            let db = open_database(&config, false).await?;
            let new = NewExperience {
                company,
                position,
                experience,
                sections: ExperienceSections {
                    interview_rounds: rounds,
                    technical_questions: technical,
                    system_design,
                    behavioral_questions: behavioral,
                    overall_experience: overall,
                },
            };

            let created = ExperienceRepository::new(db.pool()).create(&new).await?;
            println!("✅ Shared experience #{}", created.id);
            Ok(())
        }

        Command::Import { file } => {
            let db = open_database(&config, false).await?;
            let summary = import_file(&db, &file).await?;

            println!("✅ Imported {} experiences", summary.imported);
            if !summary.skipped_ids.is_empty() {
                println!("   Skipped existing ids: {:?}", summary.skipped_ids);
            }
            if summary.rejected > 0 {
                println!("   Rejected {} records without usable text", summary.rejected);
            }
            Ok(())
        }

        Command::Export { file } => {
            let file = export_target(&config, file);
            let db = open_database(&config, false).await?;
            let count = export_file(&db, &file).await?;
            println!("✅ Exported {} experiences to {}", count, file.display());
            Ok(())
        }

        Command::SkillGap { resume, role } => {
            let bytes = FsOps::read_bytes_safe(&resume).await?;
            let file_name = resume.to_string_lossy();
            let text = extract_text_from_file(&file_name, None, &bytes)
                .with_context(|| format!("Failed to read résumé {}", resume.display()))?;

            let client = GeminiClient::new(&config.gemini)?;
            let report = SkillGapAnalyzer::new(&client).run(&text, &role).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Command::Analyze { id } => {
            let db = open_database(&config, true).await?;
            let experience = ExperienceRepository::new(db.pool())
                .get(id)
                .await?
                .with_context(|| format!("Interview experience {} not found", id))?;

            let client = GeminiClient::new(&config.gemini)?;
            let analysis = InterviewAnalyzer::new(&client)
                .analyze(&InterviewData::from(&experience))
                .await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
    }
}

async fn open_database(config: &ConfigManager, seed: bool) -> Result<Database> {
    let db = Database::new(&config.environment.database_path).await?;
    if seed && config.server.seed_data {
        ExperienceRepository::new(db.pool()).seed_if_empty().await?;
    }
    Ok(db)
}

async fn import_file(
    db: &Database,
    file: &Path,
) -> Result<crate::experiences::ImportSummary> {
    let content = FsOps::read_file_safe(file).await?;
    let (records, rejected) = parse_document(&content)?;
    info!("Parsed {} records from {}", records.len(), file.display());
    ExperienceRepository::new(db.pool())
        .import(records, rejected)
        .await
}

async fn export_file(db: &Database, file: &Path) -> Result<usize> {
    let experiences = ExperienceRepository::new(db.pool()).list(None).await?;
    let count = experiences.len();
    let document = ExportDocument::new(experiences);
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize export")?;
    FsOps::write_file_safe(file, &json).await?;
    Ok(count)
}

fn export_target(config: &ConfigManager, file: Option<PathBuf>) -> PathBuf {
    file.unwrap_or_else(|| {
        config.environment.export_path.join(format!(
            "interview_experiences_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    })
}

fn summary_line(experience: &InterviewExperience) -> String {
    format!(
        "#{:<4} {} - {} ({}, {} comments)",
        experience.id, experience.company, experience.position, experience.date, experience.comments
    )
}
