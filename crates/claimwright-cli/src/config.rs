//! Command-line and environment configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use claimwright_ai::{DocumentKind, GenerationSettings, OllamaConfig, RetryPolicy};
use claimwright_core::request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use claimwright_core::{Citation, InventionRequest, Mode, PriorArtPassage};

/// Where the inference server is and how patiently to talk to it.
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Ollama API base URL.
    #[arg(long, global = true, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Model name as listed by `ollama list`.
    #[arg(long, global = true, env = "LLM_MODEL", default_value = "mistral:latest")]
    pub model: String,

    /// Attempts per generation, including the first.
    #[arg(long, global = true, default_value_t = 3)]
    pub max_retries: u32,

    /// Seconds to wait for a fast-mode generation.
    #[arg(long, global = true, default_value_t = 120)]
    pub fast_timeout: u64,

    /// Seconds to wait for a detailed-mode generation.
    #[arg(long, global = true, default_value_t = 240)]
    pub detailed_timeout: u64,

    /// Seconds to wait for the health probe.
    #[arg(long, global = true, default_value_t = 5)]
    pub health_timeout: u64,
}

impl BackendArgs {
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            model: self.model.clone(),
            health_timeout: Duration::from_secs(self.health_timeout),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }

    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            fast_timeout: Duration::from_secs(self.fast_timeout),
            detailed_timeout: Duration::from_secs(self.detailed_timeout),
        }
    }
}

/// Options shared by `memo` and `draft`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Invention description text.
    #[arg(long, short, conflicts_with = "input", required_unless_present = "input")]
    pub description: Option<String>,

    /// Read the invention description from a file.
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// JSON array of prior-art passages `{doc_id, text, score, metadata?}`.
    #[arg(long)]
    pub prior_art: Option<PathBuf>,

    /// Sampling temperature, 0.0 to 2.0.
    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Maximum tokens to generate, 100 to 4096.
    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// `fast` for a concise document, `detailed` for a comprehensive one.
    #[arg(long, default_value = "fast")]
    pub mode: Mode,

    /// Print the API-shaped JSON response instead of the document.
    #[arg(long)]
    pub json: bool,

    /// Also write a DOCX to this path.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Title for the exported document.
    #[arg(long)]
    pub title: Option<String>,

    /// Inventor name for the exported draft (repeatable).
    #[arg(long = "inventor")]
    pub inventors: Vec<String>,
}

impl GenerateArgs {
    pub fn request(&self) -> anyhow::Result<InventionRequest> {
        let description = match (&self.description, &self.input) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => read_to_string(path)?,
            (None, None) => bail!("either --description or --input is required"),
        };
        let prior_art = match &self.prior_art {
            Some(path) => read_json::<Vec<PriorArtPassage>>(path)?,
            None => Vec::new(),
        };
        Ok(InventionRequest::new(description)
            .with_prior_art(prior_art)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_mode(self.mode))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Memo,
    Draft,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Memo => DocumentKind::Memo,
            KindArg::Draft => DocumentKind::Draft,
        }
    }
}

/// Options for exporting saved model output.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Markdown-ish text produced by `memo` or `draft`.
    pub file: PathBuf,

    #[arg(long, value_enum, default_value = "memo")]
    pub kind: KindArg,

    #[arg(long)]
    pub title: Option<String>,

    /// JSON array of citations `{patent_id, relevance, text_snippet}`.
    #[arg(long)]
    pub citations: Option<PathBuf>,

    /// Inventor name for drafts (repeatable).
    #[arg(long = "inventor")]
    pub inventors: Vec<String>,

    /// Output path; defaults to `{export_dir}/{kind}_{unix_seconds}.docx`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Directory for generated file names.
    #[arg(long, env = "EXPORT_PATH", default_value = "./exports")]
    pub export_dir: PathBuf,
}

impl ExportArgs {
    pub fn citations(&self) -> anyhow::Result<Vec<Citation>> {
        match &self.citations {
            Some(path) => read_json(path),
            None => Ok(Vec::new()),
        }
    }
}

pub fn read_to_string(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = read_to_string(path)?;
    serde_json::from_str(&raw).with_context(|| format!("parsing JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_description_and_prior_art_file() {
        let tmp = tempfile::tempdir().unwrap();
        let prior = tmp.path().join("prior.json");
        std::fs::write(
            &prior,
            r#"[{"doc_id": "US10000001", "text": "Sonar drone.", "score": 0.7,
                 "metadata": {"title": "Sonar", "inventors": ["Ada"]}}]"#,
        )
        .unwrap();

        let args = GenerateArgs {
            description: Some("A drone that avoids obstacles using cameras and LIDAR.".into()),
            input: None,
            prior_art: Some(prior),
            temperature: 0.4,
            max_tokens: 1024,
            mode: Mode::Detailed,
            json: false,
            export: None,
            title: None,
            inventors: Vec::new(),
        };
        let request = args.request().unwrap();
        assert_eq!(request.prior_art.len(), 1);
        assert_eq!(request.prior_art[0].doc_id, "US10000001");
        assert_eq!(request.mode, Mode::Detailed);
        assert_eq!(request.max_tokens, 1024);
        request.validate().unwrap();
    }

    #[test]
    fn description_from_input_file() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("invention.txt");
        std::fs::write(&input, "A self-heating mug with a phase-change core.").unwrap();

        let args = GenerateArgs {
            description: None,
            input: Some(input),
            prior_art: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            mode: Mode::Fast,
            json: false,
            export: None,
            title: None,
            inventors: Vec::new(),
        };
        let request = args.request().unwrap();
        assert!(request.description.starts_with("A self-heating mug"));
        assert!(request.prior_art.is_empty());
    }

    #[test]
    fn malformed_prior_art_names_file() {
        let tmp = tempfile::tempdir().unwrap();
        let prior = tmp.path().join("bad.json");
        std::fs::write(&prior, "{not json").unwrap();

        let err = read_json::<Vec<PriorArtPassage>>(&prior).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn backend_settings() {
        let args = BackendArgs {
            ollama_url: "http://gpu-box:11434/".into(),
            model: "llama3.2".into(),
            max_retries: 5,
            fast_timeout: 60,
            detailed_timeout: 300,
            health_timeout: 2,
        };
        assert_eq!(args.ollama_config().model, "llama3.2");
        assert_eq!(args.retry_policy().max_retries, 5);
        assert_eq!(args.retry_policy().base_delay, Duration::from_secs(1));
        assert_eq!(args.settings().timeout_for(Mode::Detailed), Duration::from_secs(300));
    }
}
