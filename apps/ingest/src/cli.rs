use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use crate::analyze::schema;
use crate::config::Config;
use crate::errors::PipelineError;
use crate::pipeline::{Pipeline, RunOptions};
use crate::state::PipelineState;

#[derive(Parser)]
#[command(name = "resume-ingest")]
#[command(version, about = "Turn the site's resume PDF into downloadable formats")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Site public directory; overrides PUBLIC_DIR
    #[arg(long, global = true)]
    pub public_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run extract, analyze, generate and report
    Run {
        /// PDF to process instead of <public>/default_resume.pdf
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Re-extract even when the fingerprint is unchanged
        #[arg(long)]
        force_refresh: bool,
        /// Skip the analysis cache for this run
        #[arg(long)]
        no_cache: bool,
    },
    /// Extract text only and print the content fingerprint
    Extract {
        #[arg(long)]
        pdf: Option<PathBuf>,
        #[arg(long)]
        force_refresh: bool,
    },
    /// Check a resume JSON file against the schema
    Validate { file: PathBuf },
}

impl Cli {
    /// Applies flags that override environment configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.public_dir {
            config.public_dir = dir.clone();
        }
        if let Command::Run { no_cache: true, .. } = self.command {
            config.cache_enabled = false;
        }
    }
}

fn report_failure(e: PipelineError) -> anyhow::Error {
    error!(code = e.code(), "{e}");
    e.into()
}

pub async fn handle_command(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Run {
            pdf, force_refresh, ..
        } => {
            let pipeline = Pipeline::new(PipelineState::from_config(config)?);
            let summary = pipeline
                .run(&RunOptions { pdf, force_refresh })
                .await
                .map_err(report_failure)?;
            info!(
                "Resume processing completed ({} formats)",
                summary.generation.format_count
            );
        }

        Command::Extract { pdf, force_refresh } => {
            let pipeline = Pipeline::new(PipelineState::from_config(config)?);
            let extraction = pipeline
                .extract(&RunOptions { pdf, force_refresh })
                .await
                .map_err(report_failure)?;
            if extraction.provenance.is_fallback() {
                warn!("Extraction used fallback text: {}", extraction.provenance);
            }
            println!("{}", extraction.content_fingerprint);
        }

        Command::Validate { file } => {
            let body = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&body)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;

            let check = schema::validate(&value);
            if check.outcome.success {
                let note = if check.outcome.repaired { " (after repairing skills)" } else { "" };
                println!("{}: valid{note}", file.display());
            } else {
                for issue in &check.outcome.issues {
                    println!("{}: {}", issue.path, issue.message);
                }
                bail!("{} failed validation", file.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "resume-ingest",
            "run",
            "--pdf",
            "cv.pdf",
            "--force-refresh",
            "--no-cache",
            "--public-dir",
            "site",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.public_dir, PathBuf::from("site"));
        assert!(!config.cache_enabled);
        match cli.command {
            Command::Run {
                pdf, force_refresh, ..
            } => {
                assert_eq!(pdf, Some(PathBuf::from("cv.pdf")));
                assert!(force_refresh);
            }
            _ => panic!("expected run"),
        }
    }

    #[tokio::test]
    async fn test_validate_command_exit_status() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        let resume = crate::analyze::simulated::simulated_resume();
        tokio::fs::write(&good, serde_json::to_string(&resume).unwrap())
            .await
            .unwrap();
        tokio::fs::write(&bad, r#"{"name": ""}"#).await.unwrap();

        let run = |file: PathBuf| {
            handle_command(
                Cli {
                    command: Command::Validate { file },
                    public_dir: None,
                },
                Config::default(),
            )
        };
        assert!(run(good).await.is_ok());
        assert!(run(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_run_without_pdf_fails() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            public_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["resume-ingest", "run"]).unwrap();
        let err = handle_command(cli, config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingInput(_))
        ));
    }
}
