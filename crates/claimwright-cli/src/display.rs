//! Terminal rendering for generation results and parser output.

use claimwright_ai::{DraftOutput, MemoOutput};
use claimwright_core::{Citation, Section};

const PREVIEW_CHARS: usize = 72;

pub fn print_health(base_url: &str, model: &str, healthy: bool, models: &[String]) {
    println!("=== Ollama ===");
    println!("  {:<26} {}", "base_url", base_url);
    println!("  {:<26} {}", "model", model);
    println!("  {:<26} {}", "status", if healthy { "ready" } else { "unavailable" });
    if models.is_empty() {
        println!("  {:<26} (none reported)", "available");
    } else {
        println!("  {:<26} {}", "available", models.join(", "));
    }
    if !healthy {
        println!();
        println!("Start the server with `ollama serve` and pull the model with `ollama pull {model}`.");
    }
}

pub fn print_memo(memo: &MemoOutput) {
    println!("{}", memo.text);
    println!();
    print_summary(memo.model.as_str(), memo.mode.as_str(), memo.elapsed_ms, memo.token_count);
    print_citations(&memo.citations);
}

pub fn print_draft(draft: &DraftOutput) {
    println!("{}", draft.text);
    println!();
    print_summary(draft.model.as_str(), draft.mode.as_str(), draft.elapsed_ms, draft.token_count);
    println!("  {:<26} {}", "sections", draft.sections.join(", "));
    println!("  {:<26} {}", "claims", draft.parsed.claims.len());
    print_citations(&draft.citations);
}

fn print_summary(model: &str, mode: &str, elapsed_ms: f64, tokens: u64) {
    println!("=== Generation ===");
    println!("  {:<26} {}", "model", model);
    println!("  {:<26} {}", "mode", mode);
    println!("  {:<26} {:.1}s", "elapsed", elapsed_ms / 1000.0);
    println!("  {:<26} {}", "tokens", tokens);
}

fn print_citations(citations: &[Citation]) {
    if citations.is_empty() {
        return;
    }
    println!();
    println!("References ({}):", citations.len());
    for (i, c) in citations.iter().enumerate() {
        println!("  [{}] {} (relevance {:.2})", i + 1, c.patent_id, c.relevance_score);
    }
}

pub fn print_sections(sections: &[Section]) {
    if sections.is_empty() {
        println!("(no sections)");
        return;
    }
    for s in sections {
        println!("  {:<26} {}", s.name, preview(&s.body));
    }
}

pub fn print_claims(claims: &[String]) {
    if claims.is_empty() {
        println!("(no claims found)");
        return;
    }
    for (i, claim) in claims.iter().enumerate() {
        println!("[{}] {}", i + 1, claim);
    }
}

/// First line of `body`, cut to [`PREVIEW_CHARS`].
fn preview(body: &str) -> String {
    let first = body.lines().next().unwrap_or("");
    if first.chars().count() > PREVIEW_CHARS {
        let cut: String = first.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        first.to_string()
    }
}
