use super::types::CurationResult;

/// Terms that reject a resource outright. Checked in declared order; the first hit wins.
pub const BLOCKLIST: [&str; 11] = [
    "porn", "nsfw", "rape", "kill", "suicide", "bomb", "terror", "hate", "racist", "sex", "xxx",
];

/// Trimmed content shorter than this (in characters) is never auto-approved by heuristics.
pub const MIN_CONTENT_CHARS: usize = 30;

/// evaluate
///
/// Cheap local guardrail run before any provider call. Pure and deterministic:
/// - any blocklisted term in `title + "\n" + content` (case-insensitive) → Rejected
/// - trimmed content under `MIN_CONTENT_CHARS` → Pending
/// - otherwise → Approved
pub fn evaluate(title: &str, content: &str) -> CurationResult {
    let text = format!("{}\n{}", title, content).to_lowercase();

    if let Some(term) = BLOCKLIST.iter().find(|term| text.contains(*term)) {
        return CurationResult::rejected(format!("Contains prohibited term: {}", term));
    }

    if content.trim().chars().count() < MIN_CONTENT_CHARS {
        return CurationResult::pending("Content too short for auto-approval");
    }

    CurationResult::approved("Heuristics passed")
}
