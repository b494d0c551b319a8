//! Memo and draft orchestration: validate, probe, prompt, generate, parse.

use std::time::Duration;

use claimwright_core::request::DEFAULT_MAX_TOKENS;
use claimwright_core::{
    Citation, InventionRequest, Mode, ParsedDocument, Section, citations_from, parse_sections,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{GenerationBackend, GenerationRequest, GenerationResult};
use crate::error::{DocumentKind, PipelineError};
use crate::prompts::{build_prompt, citation_extraction_prompt, system_prompt};
use crate::retry::{RetryPolicy, generate_with_retry};

/// Sampling temperature for citation extraction, kept low for a literal list.
const CITATION_TEMPERATURE: f32 = 0.1;

/// Per-mode generation budgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub fast_timeout: Duration,
    pub detailed_timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            fast_timeout: Mode::Fast.default_timeout(),
            detailed_timeout: Mode::Detailed.default_timeout(),
        }
    }
}

impl GenerationSettings {
    pub fn timeout_for(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Fast => self.fast_timeout,
            Mode::Detailed => self.detailed_timeout,
        }
    }
}

/// A generated invention disclosure memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoOutput {
    pub text: String,
    pub citations: Vec<Citation>,
    pub elapsed_ms: f64,
    pub model: String,
    pub mode: Mode,
    pub token_count: u64,
}

impl MemoOutput {
    /// The memo split on its `##` headers.
    pub fn sections(&self) -> Vec<Section> {
        parse_sections(&self.text)
    }
}

/// A generated patent application draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOutput {
    pub text: String,
    /// Section names in document order.
    pub sections: Vec<String>,
    pub parsed: ParsedDocument,
    pub citations: Vec<Citation>,
    pub elapsed_ms: f64,
    pub model: String,
    pub mode: Mode,
    pub token_count: u64,
}

/// Response body shape shared by the memo and draft endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub draft: String,
    pub citations: Vec<Citation>,
    pub sections: Vec<String>,
    pub generation_time_ms: f64,
    pub model_used: String,
}

impl From<MemoOutput> for GenerateResponse {
    fn from(memo: MemoOutput) -> Self {
        Self {
            draft: memo.text,
            citations: memo.citations,
            sections: vec![DocumentKind::Memo.as_str().to_string()],
            generation_time_ms: memo.elapsed_ms,
            model_used: memo.model,
        }
    }
}

impl From<DraftOutput> for GenerateResponse {
    fn from(draft: DraftOutput) -> Self {
        Self {
            draft: draft.text,
            citations: draft.citations,
            sections: draft.sections,
            generation_time_ms: draft.elapsed_ms,
            model_used: draft.model,
        }
    }
}

/// Runs memo and draft requests against a generation backend.
pub struct Generator<B> {
    backend: B,
    retry: RetryPolicy,
    settings: GenerationSettings,
}

impl<B: GenerationBackend> Generator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn generate_memo(
        &self,
        request: &InventionRequest,
    ) -> Result<MemoOutput, PipelineError> {
        let result = self.run(DocumentKind::Memo, request).await?;
        let citations = citations_from(&request.prior_art);

        info!(
            chars = result.text.len(),
            citations = citations.len(),
            "generated invention memo"
        );

        Ok(MemoOutput {
            text: result.text,
            citations,
            elapsed_ms: result.elapsed_ms,
            model: result.model,
            mode: request.mode,
            token_count: result.token_count,
        })
    }

    pub async fn generate_draft(
        &self,
        request: &InventionRequest,
    ) -> Result<DraftOutput, PipelineError> {
        let result = self.run(DocumentKind::Draft, request).await?;
        let parsed = ParsedDocument::parse(&result.text);
        let sections = parsed.section_names();
        let citations = citations_from(&request.prior_art);

        info!(
            chars = result.text.len(),
            sections = sections.len(),
            claims = parsed.claims.len(),
            citations = citations.len(),
            "generated patent draft"
        );

        Ok(DraftOutput {
            text: result.text,
            sections,
            parsed,
            citations,
            elapsed_ms: result.elapsed_ms,
            model: result.model,
            mode: request.mode,
            token_count: result.token_count,
        })
    }

    /// Ask the model to list the patent citations mentioned in `text`.
    ///
    /// Runs on the fast-mode budget with a low temperature and returns the
    /// model's structured list verbatim.
    pub async fn extract_citations(&self, text: &str) -> Result<GenerationResult, PipelineError> {
        self.ensure_available().await?;

        let generation = GenerationRequest::new(citation_extraction_prompt(text))
            .with_sampling(CITATION_TEMPERATURE, DEFAULT_MAX_TOKENS)
            .with_timeout(self.settings.timeout_for(Mode::Fast));

        let result = generate_with_retry(&self.backend, &generation, &self.retry)
            .await
            .map_err(PipelineError::CitationExtraction)?;
        info!(chars = result.text.len(), "extracted citations");
        Ok(result)
    }

    async fn ensure_available(&self) -> Result<(), PipelineError> {
        if self.backend.check_health().await {
            return Ok(());
        }
        Err(PipelineError::Unavailable {
            url: self.backend.base_url().to_string(),
            model: self.backend.model().to_string(),
        })
    }

    /// Shared pipeline up to the raw model output.
    async fn run(
        &self,
        kind: DocumentKind,
        request: &InventionRequest,
    ) -> Result<GenerationResult, PipelineError> {
        request.validate()?;

        info!(
            kind = %kind,
            mode = %request.mode,
            description_chars = request.description.chars().count(),
            prior_art = request.prior_art.len(),
            "generating document"
        );

        self.ensure_available().await?;

        let prompt = build_prompt(kind, &request.description, &request.prior_art, request.mode);
        debug!(prompt_chars = prompt.len(), "built prompt");

        let generation = GenerationRequest::new(prompt)
            .with_system(system_prompt(kind))
            .with_sampling(request.temperature, request.max_tokens)
            .with_timeout(self.settings.timeout_for(request.mode));

        generate_with_retry(&self.backend, &generation, &self.retry)
            .await
            .map_err(|source| PipelineError::Generation { kind, source })
    }
}
