//! Plain-text rendering of drafts.

/// Fields for the banner printed above a plain-text draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftHeader {
    pub title: Option<String>,
    pub inventors: Vec<String>,
    pub filing_date: Option<String>,
}

impl DraftHeader {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.inventors.is_empty() && self.filing_date.is_none()
    }
}

const BANNER_WIDTH: usize = 80;

/// Prefix `draft` with a `=` banner when header fields are present.
pub fn format_draft_for_export(draft: &str, header: Option<&DraftHeader>) -> String {
    let Some(header) = header.filter(|h| !h.is_empty()) else {
        return draft.to_string();
    };

    let rule = "=".repeat(BANNER_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "PATENT APPLICATION DRAFT".to_string(),
        rule.clone(),
        String::new(),
    ];
    if let Some(title) = &header.title {
        lines.push(format!("Title: {title}"));
    }
    if !header.inventors.is_empty() {
        lines.push(format!("Inventors: {}", header.inventors.join(", ")));
    }
    if let Some(date) = &header.filing_date {
        lines.push(format!("Filing Date: {date}"));
    }
    lines.extend([String::new(), rule, String::new(), draft.to_string()]);
    lines.join("\n")
}
