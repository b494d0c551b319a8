use std::fmt;

use claimwright_core::ValidationError;
use thiserror::Error;

/// Failure of a single generation call against the inference server.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {timeout_secs:.0}s")]
    Timeout { timeout_secs: f64 },

    #[error("could not connect to Ollama at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Ollama returned status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("unexpected response from Ollama: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether the same request may succeed if sent again.
    ///
    /// Timeouts, connection failures, rate limiting, and 5xx responses are
    /// transient. Other 4xx responses (unknown model, malformed request) and
    /// unparsable bodies will fail the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Unreachable { .. } => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// The document an orchestrator was asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Memo,
    Draft,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memo => "memo",
            Self::Draft => "draft",
        }
    }

    /// Human-readable name used in messages and default titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Memo => "invention memo",
            Self::Draft => "patent draft",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// End-to-end failure of a memo or draft request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(
        "Ollama is not available at {url}. Ensure the server is running (`ollama serve`) \
         and the model is pulled (`ollama pull {model}`)"
    )]
    Unavailable { url: String, model: String },

    #[error("failed to generate {}: {source}", .kind.label())]
    Generation {
        kind: DocumentKind,
        #[source]
        source: GenerationError,
    },

    #[error("failed to extract citations: {0}")]
    CitationExtraction(#[source] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(GenerationError::Timeout { timeout_secs: 120.0 }.is_transient());
        assert!(
            GenerationError::Unreachable {
                url: "http://localhost:11434".into(),
                message: "connection refused".into(),
            }
            .is_transient()
        );
        assert!(GenerationError::Server { status: 503, body: String::new() }.is_transient());
        assert!(GenerationError::Server { status: 429, body: String::new() }.is_transient());
        assert!(!GenerationError::Server { status: 404, body: String::new() }.is_transient());
        assert!(!GenerationError::InvalidResponse("eof".into()).is_transient());
    }

    #[test]
    fn server_error_message_has_status_and_body() {
        let err = GenerationError::Server {
            status: 404,
            body: "model 'mistral' not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("model 'mistral' not found"));
    }

    #[test]
    fn unavailable_names_operational_cause() {
        let err = PipelineError::Unavailable {
            url: "http://localhost:11434".into(),
            model: "mistral:latest".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ollama serve"));
        assert!(msg.contains("ollama pull mistral:latest"));
    }

    #[test]
    fn generation_failure_names_document() {
        let err = PipelineError::Generation {
            kind: DocumentKind::Draft,
            source: GenerationError::Timeout { timeout_secs: 240.0 },
        };
        assert_eq!(
            err.to_string(),
            "failed to generate patent draft: generation timed out after 240s"
        );
    }
}
