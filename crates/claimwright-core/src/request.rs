//! Invention requests and the prior-art passages that accompany them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest description accepted for generation, in characters.
pub const MIN_DESCRIPTION_CHARS: usize = 10;
/// Accepted `max_tokens` range (inclusive).
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 4096);
/// Accepted `temperature` range (inclusive).
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Template verbosity and the matching timeout budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Concise output, roughly 800-1800 words.
    #[default]
    Fast,
    /// Comprehensive, attorney-ready output.
    Detailed,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Detailed => "detailed",
        }
    }

    /// Default generation timeout for this mode.
    ///
    /// Detailed templates ask for roughly twice as much text, so they get
    /// twice the budget.
    pub fn default_timeout(&self) -> Duration {
        match self {
            Self::Fast => Duration::from_secs(120),
            Self::Detailed => Duration::from_secs(240),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "detailed" => Ok(Self::Detailed),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

/// Optional bibliographic data attached to a prior-art passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassageMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filing_date: Option<String>,
    #[serde(default)]
    pub inventors: Vec<String>,
}

/// A retrieved snippet of an existing patent, supplied as comparison context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorArtPassage {
    pub doc_id: String,
    pub text: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PassageMetadata>,
}

impl PriorArtPassage {
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>, score: f32) -> Self {
        Self {
            doc_id: doc_id.into(),
            text: text.into(),
            score,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: PassageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A single memo or draft generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventionRequest {
    pub description: String,
    #[serde(default)]
    pub prior_art: Vec<PriorArtPassage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub mode: Mode,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl InventionRequest {
    /// Request with default sampling settings, fast mode, and no prior art.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            prior_art: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            mode: Mode::Fast,
        }
    }

    pub fn with_prior_art(mut self, prior_art: Vec<PriorArtPassage>) -> Self {
        self.prior_art = prior_art;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Check the request against the accepted input ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let chars = self.description.trim().chars().count();
        if chars == 0 {
            return Err(ValidationError::EmptyDescription);
        }
        if chars < MIN_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooShort {
                chars,
                min: MIN_DESCRIPTION_CHARS,
            });
        }

        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&self.temperature) {
            return Err(ValidationError::TemperatureOutOfRange(self.temperature));
        }

        let (m_min, m_max) = MAX_TOKENS_RANGE;
        if !(m_min..=m_max).contains(&self.max_tokens) {
            return Err(ValidationError::MaxTokensOutOfRange(self.max_tokens));
        }

        Ok(())
    }
}
