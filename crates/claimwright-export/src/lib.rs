//! Export layer: generated text to DOCX files and plain-text drafts.

pub mod document;
pub mod docx;
mod error;
pub mod text;

pub use document::{Block, Document, ExportMetadata};
pub use error::ExportError;
pub use text::{DraftHeader, format_draft_for_export};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use claimwright_core::Citation;
use tracing::info;

pub const DEFAULT_MEMO_TITLE: &str = "Invention Disclosure Memo";
pub const DEFAULT_DRAFT_TITLE: &str = "Patent Application Draft";

/// Write `content` as a styled DOCX at `output_path`.
///
/// Missing parent directories are created. Returns the absolute path.
pub fn export_docx(
    content: &str,
    title: &str,
    citations: &[Citation],
    metadata: Option<&ExportMetadata>,
    output_path: impl AsRef<Path>,
) -> Result<PathBuf, ExportError> {
    let output_path = output_path.as_ref();
    let doc = Document::build(
        content,
        title,
        citations,
        metadata,
        Local::now().naive_local(),
    );
    write_document(&doc, output_path)
}

/// Write an already built [`Document`].
pub fn write_document(doc: &Document, output_path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let bytes = docx::render(doc)?;
    let write_err = |source: std::io::Error| ExportError::Write {
        path: output_path.to_path_buf(),
        source,
    };
    fs::write(output_path, &bytes).map_err(write_err)?;
    let absolute = std::path::absolute(output_path).map_err(write_err)?;

    info!(
        path = %absolute.display(),
        kb = %format!("{:.1}", bytes.len() as f64 / 1024.0),
        blocks = doc.body.len() + doc.references.len(),
        "exported DOCX"
    );
    Ok(absolute)
}

/// Export a memo with the default title and placeholder inventors.
pub fn export_memo_docx(
    memo: &str,
    citations: &[Citation],
    output_path: impl AsRef<Path>,
    title: Option<&str>,
) -> Result<PathBuf, ExportError> {
    let metadata = ExportMetadata {
        inventors: vec!["To be determined".to_string()],
        date: Some(today()),
    };
    export_docx(
        memo,
        title.unwrap_or(DEFAULT_MEMO_TITLE),
        citations,
        Some(&metadata),
        output_path,
    )
}

/// Export a draft with the default title; inventors are listed when known.
pub fn export_draft_docx(
    draft: &str,
    citations: &[Citation],
    output_path: impl AsRef<Path>,
    title: Option<&str>,
    inventors: &[String],
) -> Result<PathBuf, ExportError> {
    let metadata = ExportMetadata {
        inventors: inventors.to_vec(),
        date: Some(today()),
    };
    export_docx(
        draft,
        title.unwrap_or(DEFAULT_DRAFT_TITLE),
        citations,
        Some(&metadata),
        output_path,
    )
}

/// `{dir}/{kind}_{unix_seconds}.docx`
pub fn default_export_path<Tz: TimeZone>(dir: &Path, kind: &str, now: DateTime<Tz>) -> PathBuf {
    dir.join(format!("{kind}_{}.docx", now.timestamp()))
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
