//! In-memory element model of an exported document.
//!
//! Generated text is translated line by line into [`Block`]s before any
//! file format is involved, so the structure can be inspected directly.

use chrono::NaiveDateTime;
use claimwright_core::Citation;

pub const REFERENCES_HEADING: &str = "References";

/// One paragraph-level element.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading level 1-3.
    Heading { level: u8, text: String },
    Bullet(String),
    Numbered(String),
    /// Empty paragraph standing in for a blank source line.
    Blank,
    /// Body text, rendered with 1.15 line spacing.
    Paragraph(String),
    /// `[index] patent_id (Relevance: x.xx)`
    Citation {
        index: usize,
        patent_id: String,
        relevance: f32,
    },
    /// Indented quote under a citation.
    Snippet(String),
    PageBreak,
}

/// Optional lines printed under the title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportMetadata {
    pub inventors: Vec<String>,
    pub date: Option<String>,
}

impl ExportMetadata {
    pub fn is_empty(&self) -> bool {
        self.inventors.is_empty() && self.date.is_none()
    }

    /// Centred lines shown below the title, in order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.inventors.is_empty() {
            lines.push(format!("Inventors: {}", self.inventors.join(", ")));
        }
        if let Some(date) = &self.date {
            lines.push(format!("Date: {date}"));
        }
        lines
    }
}

/// A document ready to be written in some container format.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub metadata: Option<ExportMetadata>,
    pub generated_at: NaiveDateTime,
    pub body: Vec<Block>,
    /// Empty when there are no citations.
    pub references: Vec<Block>,
}

impl Document {
    pub fn build(
        content: &str,
        title: &str,
        citations: &[Citation],
        metadata: Option<&ExportMetadata>,
        generated_at: NaiveDateTime,
    ) -> Self {
        Self {
            title: title.to_string(),
            metadata: metadata.filter(|m| !m.is_empty()).cloned(),
            generated_at,
            body: parse_markdown(content),
            references: references(citations),
        }
    }

    /// Stamp shown under the title block.
    pub fn timestamp_line(&self) -> String {
        format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M"))
    }

    /// Body followed by the references appendix.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().chain(self.references.iter())
    }
}

/// Translate the markdown subset emitted by the model into blocks.
pub fn parse_markdown(content: &str) -> Vec<Block> {
    content.lines().map(parse_line).collect()
}

/// One trimmed line to one block. A leading `-` or `*` makes a bullet,
/// except a leading `**`, which opens bold text in a paragraph.
fn parse_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        return Block::Blank;
    }

    if line.starts_with('#') {
        let level = if line.starts_with("###") {
            3
        } else if line.starts_with("##") {
            2
        } else {
            1
        };
        let text = line.trim_matches('#').trim().to_string();
        return Block::Heading { level, text };
    }

    if (line.starts_with('-') || line.starts_with('*')) && !line.starts_with("**") {
        return Block::Bullet(line[1..].trim().to_string());
    }

    if let Some(rest) = numbered_item(line) {
        return Block::Numbered(rest.trim().to_string());
    }

    Block::Paragraph(line.to_string())
}

/// Text after a `1. ` or `1) ` marker.
fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

fn references(citations: &[Citation]) -> Vec<Block> {
    if citations.is_empty() {
        return Vec::new();
    }
    let mut blocks = vec![
        Block::PageBreak,
        Block::Heading {
            level: 1,
            text: REFERENCES_HEADING.to_string(),
        },
    ];
    for (i, c) in citations.iter().enumerate() {
        blocks.push(Block::Citation {
            index: i + 1,
            patent_id: c.patent_id.clone(),
            relevance: c.relevance_score,
        });
        if !c.snippet.is_empty() {
            blocks.push(Block::Snippet(c.snippet.clone()));
            blocks.push(Block::Blank);
        }
    }
    blocks
}
