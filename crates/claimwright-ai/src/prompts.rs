//! Prompt construction for memos and drafts.
//!
//! Template text lives in `prompts/` next to this crate and is compiled in.
//! Placeholders are `{invention_description}` and `{prior_art_context}`.

use claimwright_core::{Mode, PriorArtPassage};

use crate::error::DocumentKind;

pub const SYSTEM_PROMPT_MEMO: &str = include_str!("../prompts/system_memo.txt");
pub const SYSTEM_PROMPT_DRAFT: &str = include_str!("../prompts/system_draft.txt");

const MEMO_FAST: &str = include_str!("../prompts/memo_fast.txt");
const MEMO_DETAILED: &str = include_str!("../prompts/memo_detailed.txt");
const DRAFT_FAST: &str = include_str!("../prompts/draft_fast.txt");
const DRAFT_DETAILED: &str = include_str!("../prompts/draft_detailed.txt");

/// Substituted for the reference block in fast mode when no prior art was given.
pub const NO_PRIOR_ART_FAST: &str = "No prior art provided. Recommend search before filing.";

/// Substituted for the reference block in detailed mode when no prior art was given.
pub const NO_PRIOR_ART_DETAILED: &str = "\
No prior art references were provided for this analysis.

RECOMMENDATION: Before proceeding with patent filing, conduct a comprehensive prior art search covering:
- USPTO patent database (20 years back minimum)
- Published applications
- Foreign patents (EPO, WIPO, JPO)
- Technical literature and publications
- Commercial products and services

Search suggested keywords: [Extract from invention description]";

const RULE: &str = "───────────────────────────────────────────────────────────────";

/// The full user prompt for one document.
pub fn build_prompt(
    kind: DocumentKind,
    description: &str,
    prior_art: &[PriorArtPassage],
    mode: Mode,
) -> String {
    let template = match (kind, mode) {
        (DocumentKind::Memo, Mode::Fast) => MEMO_FAST,
        (DocumentKind::Memo, Mode::Detailed) => MEMO_DETAILED,
        (DocumentKind::Draft, Mode::Fast) => DRAFT_FAST,
        (DocumentKind::Draft, Mode::Detailed) => DRAFT_DETAILED,
    };
    let context = format_prior_art_context(prior_art, mode);
    fill(
        template,
        &[
            ("invention_description", description),
            ("prior_art_context", &context),
        ],
    )
}

pub fn system_prompt(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Memo => SYSTEM_PROMPT_MEMO,
        DocumentKind::Draft => SYSTEM_PROMPT_DRAFT,
    }
}

/// Numbered reference block for the prompt, or the mode's no-prior-art notice.
pub fn format_prior_art_context(prior_art: &[PriorArtPassage], mode: Mode) -> String {
    if prior_art.is_empty() {
        return match mode {
            Mode::Fast => NO_PRIOR_ART_FAST,
            Mode::Detailed => NO_PRIOR_ART_DETAILED,
        }
        .to_string();
    }

    let mut out = format!("Total References Found: {}\n", prior_art.len());
    for (i, passage) in prior_art.iter().enumerate() {
        let meta = passage.metadata.clone().unwrap_or_default();
        let inventors = if meta.inventors.is_empty() {
            "Not available".to_string()
        } else {
            meta.inventors.join(", ")
        };
        out.push_str(&format!(
            "\n{RULE}\nREFERENCE {n}: {id}\n{RULE}\n\
             Title: {title}\n\
             Filing Date: {date}\n\
             Inventors: {inventors}\n\
             Relevance Score: {score:.3}\n\n\
             Content:\n{text}\n\n{RULE}\n",
            n = i + 1,
            id = passage.doc_id,
            title = meta.title.as_deref().unwrap_or("Title not available"),
            date = meta.filing_date.as_deref().unwrap_or("Date not available"),
            score = passage.score,
            text = passage.text,
        ));
    }
    out
}

/// Prompt asking the model to list the patent citations found in `text`.
pub fn citation_extraction_prompt(text: &str) -> String {
    format!(
        "Extract all patent citations from the following text.

For each citation found, provide:
- Patent number (e.g., US10123456, US2023/0123456)
- Full context sentence where it appears
- Relevance to the main invention (High/Medium/Low)
- Type of reference (Prior art / Supporting / Mentioned)

Text to analyze:
{text}

Format your response as a structured list:

1. Patent: [Number]
   Context: [Full sentence with citation]
   Relevance: [High/Medium/Low]
   Type: [Prior art/Supporting/Mentioned]

2. [Next citation...]

If no citations found, respond: \"No patent citations detected in the provided text.\"
"
    )
}

/// Replace `{name}` placeholders in a single pass over `template`.
///
/// Substituted values are never rescanned, so braces inside an invention
/// description come through untouched. Unknown placeholders are left as is.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use claimwright_core::PassageMetadata;

    use super::*;

    const DRONE: &str = "A drone that avoids obstacles using cameras and LIDAR.";

    #[test]
    fn fast_memo_without_prior_art_has_notice() {
        let prompt = build_prompt(DocumentKind::Memo, DRONE, &[], Mode::Fast);
        assert!(prompt.contains(DRONE));
        assert!(prompt.contains(NO_PRIOR_ART_FAST));
        assert!(prompt.contains("## 1. EXECUTIVE SUMMARY"));
        assert!(!prompt.contains("{invention_description}"));
        assert!(!prompt.contains("{prior_art_context}"));
    }

    #[test]
    fn detailed_uses_long_notice() {
        let prompt = build_prompt(DocumentKind::Draft, DRONE, &[], Mode::Detailed);
        assert!(prompt.contains("No prior art references were provided for this analysis."));
        assert!(prompt.contains("CRITICAL DRAFTING REQUIREMENTS"));
    }

    #[test]
    fn each_kind_and_mode_has_its_own_template() {
        let prompts: Vec<String> = [
            (DocumentKind::Memo, Mode::Fast),
            (DocumentKind::Memo, Mode::Detailed),
            (DocumentKind::Draft, Mode::Fast),
            (DocumentKind::Draft, Mode::Detailed),
        ]
        .into_iter()
        .map(|(k, m)| build_prompt(k, DRONE, &[], m))
        .collect();
        for (i, a) in prompts.iter().enumerate() {
            for b in &prompts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn draft_templates_ask_for_claims() {
        for mode in [Mode::Fast, Mode::Detailed] {
            let prompt = build_prompt(DocumentKind::Draft, DRONE, &[], mode);
            assert!(prompt.contains("## CLAIMS"));
            assert!(prompt.contains("## ABSTRACT"));
        }
    }

    #[test]
    fn references_numbered_with_metadata() {
        let passages = vec![
            PriorArtPassage::new("US10000001", "A quadcopter with sonar.", 0.8768).with_metadata(
                PassageMetadata {
                    title: Some("Sonar drone".into()),
                    filing_date: Some("2019-04-02".into()),
                    inventors: vec!["A. Smith".into(), "B. Jones".into()],
                },
            ),
            PriorArtPassage::new("EP3000000", "Lidar mapping.", 0.5),
        ];
        let ctx = format_prior_art_context(&passages, Mode::Fast);
        assert!(ctx.starts_with("Total References Found: 2"));
        assert!(ctx.contains("REFERENCE 1: US10000001"));
        assert!(ctx.contains("Title: Sonar drone"));
        assert!(ctx.contains("Filing Date: 2019-04-02"));
        assert!(ctx.contains("Inventors: A. Smith, B. Jones"));
        assert!(ctx.contains("Relevance Score: 0.877"));
        assert!(ctx.contains("REFERENCE 2: EP3000000"));
        assert!(ctx.contains("Title: Title not available"));
        assert!(ctx.contains("Inventors: Not available"));
        assert!(ctx.find("REFERENCE 1").unwrap() < ctx.find("REFERENCE 2").unwrap());
    }

    #[test]
    fn braces_in_description_survive() {
        let description = "A parser for {prior_art_context} tokens in config files.";
        let prompt = build_prompt(DocumentKind::Memo, description, &[], Mode::Fast);
        assert!(prompt.contains(description));
    }

    #[test]
    fn system_prompts_differ_by_kind() {
        assert!(system_prompt(DocumentKind::Memo).contains("prior art analysis"));
        assert!(system_prompt(DocumentKind::Draft).contains("patent drafting"));
    }

    #[test]
    fn citation_prompt_embeds_text() {
        let prompt = citation_extraction_prompt("See US10123456 for details.");
        assert!(prompt.contains("See US10123456 for details."));
        assert!(prompt.contains("No patent citations detected"));
    }

    #[test]
    fn fill_leaves_unknown_placeholders() {
        assert_eq!(fill("{a} and {b}", &[("a", "x")]), "x and {b}");
        assert_eq!(fill("open { only", &[("a", "x")]), "open { only");
    }
}
