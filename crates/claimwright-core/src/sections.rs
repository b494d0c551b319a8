//! Section and claim parsing of generated documents.
//!
//! Model output is loosely structured markdown: level-2 headers (`##`, and
//! in practice `###` as well) delimit named sections, and drafts carry a
//! claims region whose entries are numbered lines or `Claim N` sub-headers.
//!
//! Both parsers are line-driven state machines:
//!
//! - sections: `Preamble` → `InSection(name)` → `InSection(next)` …
//! - claims: `Scanning` → `InClaimsRegion` → `Done`
//!
//! Neither ever fails. Text without headers parses to a lone preamble, and
//! text without a claims region yields no claims.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key under which text before the first header is collected.
pub const PREAMBLE: &str = "preamble";

const HEADER_MARKER: &str = "##";

/// A named block of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Sections and claims recovered from one generated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Sections in document order. Keys are unique.
    pub sections: Vec<Section>,
    pub claims: Vec<String>,
}

impl ParsedDocument {
    /// Run both the section parser and the claims extractor over `text`.
    pub fn parse(text: &str) -> Self {
        let parsed = Self {
            sections: parse_sections(text),
            claims: extract_claims(text),
        };
        debug!(
            sections = parsed.sections.len(),
            claims = parsed.claims.len(),
            "parsed document"
        );
        parsed
    }

    /// Body of the section with the given (normalised) name.
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.body.as_str())
    }

    /// Section names in document order.
    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }
}

/// Normalise header text into a section key.
///
/// Strips surrounding whitespace and `#` markers, lowercases, and replaces
/// spaces with underscores. Applying it to an already-normalised key
/// returns the key unchanged.
pub fn normalize_section_name(header: &str) -> String {
    header
        .trim()
        .trim_matches('#')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Every `\n`-separated line, including an empty final one, with a single
/// trailing `\r` removed.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

fn is_section_header(trimmed: &str) -> bool {
    trimmed.starts_with(HEADER_MARKER)
}

// ── Sections ──

enum SectionState {
    Preamble,
    InSection(String),
}

impl SectionState {
    fn key(&self) -> &str {
        match self {
            Self::Preamble => PREAMBLE,
            Self::InSection(name) => name.as_str(),
        }
    }
}

/// Split `text` into sections keyed by normalised header text.
///
/// A section is recorded only if at least one line followed its header, so
/// two adjacent headers drop the first. The preamble is recorded only when
/// it holds non-blank text. A repeated key overwrites the earlier body but
/// keeps the earlier position.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut state = SectionState::Preamble;
    let mut pending: Vec<&str> = Vec::new();

    for line in split_lines(text) {
        let trimmed = line.trim();
        if is_section_header(trimmed) {
            flush_section(&mut sections, &state, &mut pending);
            state = SectionState::InSection(normalize_section_name(trimmed));
        } else {
            pending.push(line);
        }
    }
    flush_section(&mut sections, &state, &mut pending);

    sections
}

fn flush_section(sections: &mut Vec<Section>, state: &SectionState, pending: &mut Vec<&str>) {
    if pending.is_empty() {
        return;
    }
    let body = pending.join("\n").trim().to_string();
    pending.clear();

    if matches!(state, SectionState::Preamble) && body.is_empty() {
        return;
    }

    let key = state.key();
    match sections.iter_mut().find(|s| s.name == key) {
        Some(existing) => existing.body = body,
        None => sections.push(Section {
            name: key.to_string(),
            body,
        }),
    }
}

// ── Claims ──

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClaimState {
    Scanning,
    InClaimsRegion,
    Done,
}

/// Collects claim lines and emits one space-joined string per claim.
#[derive(Default)]
struct ClaimBuffer<'a> {
    claims: Vec<String>,
    current: Vec<&'a str>,
    /// Set after a `Claim N` sub-header: the next content line opens a claim
    /// even though it is not numbered.
    awaiting_body: bool,
}

impl<'a> ClaimBuffer<'a> {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.claims.push(self.current.join(" "));
            self.current.clear();
        }
    }

    fn start(&mut self, line: &'a str) {
        self.flush();
        self.current.push(line);
        self.awaiting_body = false;
    }

    fn continue_with(&mut self, line: &'a str) {
        if !self.current.is_empty() {
            self.current.push(line);
        } else if self.awaiting_body {
            self.start(line);
        }
    }
}

fn is_claims_region_header(upper: &str) -> bool {
    upper.contains("CLAIMS") || upper.contains("INDEPENDENT CLAIM")
}

fn starts_claim(trimmed: &str) -> bool {
    trimmed.starts_with(|c: char| c.is_ascii_digit()) || trimmed.starts_with("Claim")
}

/// Extract enumerated claims from the claims region of `text`.
///
/// The region opens at a `##` header mentioning `CLAIMS` or
/// `INDEPENDENT CLAIM` (case-insensitive) and closes at the next `##`
/// header that does not mention `CLAIM`. Inside it, a line starting with a
/// digit or `Claim` begins a new claim and later non-empty lines are
/// appended with single spaces. Sub-headers such as `### Claim 2` end the
/// current claim; the first line under them begins the next one.
pub fn extract_claims(text: &str) -> Vec<String> {
    let mut state = ClaimState::Scanning;
    let mut buf = ClaimBuffer::default();

    for line in split_lines(text) {
        let trimmed = line.trim();
        match state {
            ClaimState::Scanning => {
                if is_section_header(trimmed) {
                    let upper = trimmed.to_uppercase();
                    if is_claims_region_header(&upper) {
                        state = ClaimState::InClaimsRegion;
                        // `## INDEPENDENT CLAIM` labels a single claim whose
                        // text follows unnumbered.
                        buf.awaiting_body = !upper.contains("CLAIMS");
                    }
                }
            }
            ClaimState::InClaimsRegion => {
                if is_section_header(trimmed) {
                    buf.flush();
                    if trimmed.to_uppercase().contains("CLAIM") {
                        buf.awaiting_body = true;
                    } else {
                        state = ClaimState::Done;
                    }
                } else if starts_claim(trimmed) {
                    buf.start(trimmed);
                } else if !trimmed.is_empty() {
                    buf.continue_with(trimmed);
                }
            }
            ClaimState::Done => break,
        }
    }

    buf.flush();
    buf.claims
}
