use crate::directory::LanguageDirectory;
use crate::models::TargetLanguage;

/// Turn arbitrary user input into a canonical code or a recognizable
/// sentinel. Deterministic, total, side-effect-free: logically equivalent
/// inputs (`ES`, `es`, `Spanish`, `🇪🇸`) produce the same output, and the
/// function never guesses on a miss.
pub fn normalize(directory: &LanguageDirectory, input: &str) -> TargetLanguage {
    let trimmed = input
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”' | '`'))
        .trim();

    if trimmed.is_empty() {
        return TargetLanguage::Unspecified;
    }

    if is_flag_sequence(trimmed) {
        return match directory.lookup_by_flag(trimmed) {
            Some(entry) => TargetLanguage::Resolved(entry.code.clone()),
            None => TargetLanguage::Unrecognized,
        };
    }

    // Covers canonical codes, display names, alternate names, and
    // regional-variant codes (`zh-cn`, `pt-br`): all are directory aliases.
    match directory.lookup_by_alias(trimmed) {
        Some(entry) => TargetLanguage::Resolved(entry.code.clone()),
        None => TargetLanguage::Unrecognized,
    }
}

/// A flag emoji is a sequence of regional-indicator codepoints
/// (U+1F1E6..=U+1F1FF).
fn is_flag_sequence(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    if chars.peek().is_none() {
        return false;
    }
    chars.all(|c| ('\u{1F1E6}'..='\u{1F1FF}').contains(&c))
}
