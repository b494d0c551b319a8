//! claimwright CLI: invention memos and patent drafts from a local Ollama model.

mod config;
mod display;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use claimwright_ai::{
    DocumentKind, GenerateResponse, GenerationBackend, Generator, OllamaClient,
};
use claimwright_core::{ParsedDocument, extract_claims, parse_sections};
use claimwright_export::{
    DraftHeader, default_export_path, export_draft_docx, export_memo_docx,
    format_draft_for_export,
};
use tracing::info;

use crate::config::{BackendArgs, ExportArgs, GenerateArgs, read_to_string};

#[derive(Parser)]
#[command(
    name = "claimwright",
    version,
    about = "Invention memos and patent drafts from a local Ollama model"
)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that Ollama is running and the model is pulled.
    Health,

    /// Generate an invention disclosure memo.
    Memo(GenerateArgs),

    /// Generate a patent application draft.
    Draft {
        #[command(flatten)]
        args: GenerateArgs,

        /// Also write a plain-text copy with a header banner.
        #[arg(long)]
        text_out: Option<PathBuf>,
    },

    /// Split saved model output into its `##` sections.
    Sections {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Extract numbered claims from saved draft output.
    Claims {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Ask the model to list the patent citations mentioned in a file.
    Cite { file: PathBuf },

    /// Export saved model output to DOCX.
    Export(ExportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Health => {
            let client = OllamaClient::new(cli.backend.ollama_config());
            let healthy = client.check_health().await;
            let models = client.list_models().await.unwrap_or_default();
            display::print_health(client.base_url(), client.model(), healthy, &models);
            return Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        Commands::Memo(args) => {
            let generator = generator(&cli.backend);
            let request = args.request()?;
            let memo = generator
                .generate_memo(&request)
                .await
                .context("memo generation failed")?;

            if let Some(path) = &args.export {
                let written =
                    export_memo_docx(&memo.text, &memo.citations, path, args.title.as_deref())
                        .context("exporting memo")?;
                info!(path = %written.display(), "memo exported");
            }

            if args.json {
                let response = GenerateResponse::from(memo);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                display::print_memo(&memo);
            }
        }

        Commands::Draft { args, text_out } => {
            let generator = generator(&cli.backend);
            let request = args.request()?;
            let draft = generator
                .generate_draft(&request)
                .await
                .context("draft generation failed")?;

            if let Some(path) = &args.export {
                let written = export_draft_docx(
                    &draft.text,
                    &draft.citations,
                    path,
                    args.title.as_deref(),
                    &args.inventors,
                )
                .context("exporting draft")?;
                info!(path = %written.display(), "draft exported");
            }

            if let Some(path) = &text_out {
                let header = DraftHeader {
                    title: args.title.clone(),
                    inventors: args.inventors.clone(),
                    filing_date: Some(Local::now().format("%Y-%m-%d").to_string()),
                };
                let text = format_draft_for_export(&draft.text, Some(&header));
                std::fs::write(path, text)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "plain-text draft written");
            }

            if args.json {
                let response = GenerateResponse::from(draft);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                display::print_draft(&draft);
            }
        }

        Commands::Sections { file, json } => {
            let text = read_to_string(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ParsedDocument::parse(&text))?);
            } else {
                display::print_sections(&parse_sections(&text));
            }
        }

        Commands::Claims { file, json } => {
            let claims = extract_claims(&read_to_string(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&claims)?);
            } else {
                display::print_claims(&claims);
            }
        }

        Commands::Cite { file } => {
            let text = read_to_string(&file)?;
            if text.trim().is_empty() {
                anyhow::bail!("{} is empty", file.display());
            }
            let result = generator(&cli.backend)
                .extract_citations(&text)
                .await
                .context("citation extraction failed")?;
            println!("{}", result.text);
        }

        Commands::Export(args) => {
            let content = read_to_string(&args.file)?;
            let citations = args.citations()?;
            let kind = DocumentKind::from(args.kind);
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| default_export_path(&args.export_dir, kind.as_str(), Utc::now()));

            let written = match kind {
                DocumentKind::Memo => {
                    export_memo_docx(&content, &citations, &output, args.title.as_deref())
                }
                DocumentKind::Draft => export_draft_docx(
                    &content,
                    &citations,
                    &output,
                    args.title.as_deref(),
                    &args.inventors,
                ),
            }
            .with_context(|| format!("exporting {}", kind.label()))?;
            println!("{}", written.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn generator(backend: &BackendArgs) -> Generator<OllamaClient> {
    Generator::new(OllamaClient::new(backend.ollama_config()))
        .with_retry_policy(backend.retry_policy())
        .with_settings(backend.settings())
}

#[cfg(test)]
mod tests {
    use claimwright_core::Mode;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_memo_with_globals() {
        let cli = Cli::try_parse_from([
            "claimwright",
            "--model",
            "llama3.2:latest",
            "memo",
            "--description",
            "A drone that avoids obstacles using cameras and LIDAR.",
            "--mode",
            "detailed",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.backend.model, "llama3.2:latest");
        match cli.command {
            Commands::Memo(args) => {
                assert_eq!(args.mode, Mode::Detailed);
                assert!(args.json);
            }
            _ => panic!("expected memo"),
        }
    }

    #[test]
    fn description_and_input_conflict() {
        let result = Cli::try_parse_from([
            "claimwright",
            "draft",
            "--description",
            "text",
            "--input",
            "file.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn memo_requires_a_description_source() {
        assert!(Cli::try_parse_from(["claimwright", "memo"]).is_err());
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = Cli::try_parse_from([
            "claimwright",
            "memo",
            "-d",
            "A drone that avoids obstacles.",
            "--mode",
            "turbo",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn export_subcommand_writes_docx() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("draft.md");
        std::fs::write(&input, "## CLAIMS\n1. A drone comprising a camera.").unwrap();
        let out = tmp.path().join("out/draft.docx");

        let cli = Cli::try_parse_from([
            "claimwright",
            "export",
            input.to_str().unwrap(),
            "--kind",
            "draft",
            "--output",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let code = run(cli).await.unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.exists());
    }

    #[tokio::test]
    async fn cite_rejects_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("empty.md");
        std::fs::write(&input, "  \n").unwrap();

        let cli = Cli::try_parse_from(["claimwright", "cite", input.to_str().unwrap()]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[tokio::test]
    async fn health_fails_when_server_is_down() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let cli = Cli::try_parse_from(["claimwright", "--ollama-url", &url, "health"]).unwrap();
        let code = run(cli).await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }
}
