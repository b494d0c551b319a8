//! Generation layer: prompt templates, the Ollama client, retries, and the
//! memo/draft orchestrators built on top of them.

pub mod backend;
pub mod client;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod retry;

pub use backend::{GenerationBackend, GenerationRequest, GenerationResult};
pub use client::{OllamaClient, OllamaConfig};
pub use error::{DocumentKind, GenerationError, PipelineError};
pub use generator::{DraftOutput, GenerateResponse, GenerationSettings, Generator, MemoOutput};
pub use prompts::{build_prompt, citation_extraction_prompt, system_prompt};
pub use retry::{RetryPolicy, generate_with_retry};
