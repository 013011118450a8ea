use std::collections::HashMap;

use polyglot_core::models::LanguageCode;

/// Best-effort source-language guess from the dominant writing script.
///
/// Exists to emulate source detection for backends that demand an explicit
/// source code. The mapping is script-to-most-likely-language, so it is
/// deliberately coarse; Latin text is assumed English, the weakest guess in
/// the table. Returns `None` when the text carries no classifiable letters.
pub fn guess_source(text: &str) -> Option<LanguageCode> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for c in text.chars() {
        let code = match c {
            '\u{0400}'..='\u{04FF}' => "ru",
            '\u{0370}'..='\u{03FF}' => "el",
            '\u{0530}'..='\u{058F}' => "hy",
            '\u{0590}'..='\u{05FF}' => "he",
            '\u{0600}'..='\u{06FF}' => "ar",
            '\u{0900}'..='\u{097F}' => "hi",
            '\u{0E00}'..='\u{0E7F}' => "th",
            '\u{10A0}'..='\u{10FF}' => "ka",
            '\u{1100}'..='\u{11FF}' | '\u{AC00}'..='\u{D7AF}' => "ko",
            '\u{3040}'..='\u{30FF}' => "ja",
            '\u{4E00}'..='\u{9FFF}' => "zh",
            c if c.is_alphabetic() && (c.is_ascii() || ('\u{00C0}'..='\u{024F}').contains(&c)) => {
                "en"
            }
            _ => continue,
        };
        *counts.entry(code).or_insert(0) += 1;
    }

    let (&best, _) = counts.iter().max_by_key(|(_, &count)| count)?;

    // Kana anywhere means Japanese even when Han characters dominate.
    if best == "zh" && counts.contains_key("ja") {
        return Some(LanguageCode::new("ja"));
    }
    Some(LanguageCode::new(best))
}
