/// Words that carry no signal in error messages.
pub const STOP_WORDS: &[&str] = &[
    "error", "failed", "the", "a", "an", "in", "at", "on", "is", "was",
];

/// Only this many leading tokens of a pattern are considered.
const LEADING_TOKENS: usize = 5;

/// Tokens must be longer than this many characters to become keywords.
const MIN_KEYWORD_LEN: usize = 2;

/// Extract search keywords from an error pattern.
///
/// Takes the first five whitespace-delimited tokens, drops those of two
/// characters or fewer and the stop words, and lowercases the rest.
/// Punctuation attached to a token is kept.
pub fn extract_keywords(pattern: &str) -> Vec<String> {
    pattern
        .split_whitespace()
        .take(LEADING_TOKENS)
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Reference stored in the search index for a session: `session_<id>`.
///
/// Ids that already carry the `session_` prefix (such as the generated
/// `session_YYYYMMDD_HHMM` ids) are stored as is. Writers that always add
/// the prefix produce `session_session_...` for those ids, so an index
/// shared with such a writer holds both forms for the same session.
pub fn session_reference(session_id: &str) -> String {
    if session_id.starts_with("session_") {
        session_id.to_string()
    } else {
        format!("session_{}", session_id)
    }
}
