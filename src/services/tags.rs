use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Connecting words that carry no meaning in a title
const STOP_WORDS: [&str; 10] = ["in", "the", "and", "wa", "no", "of", "to", "ova", "kun", "a"];

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z@]+").expect("separator pattern is valid"));

/// Reduces free text to its lowercase keywords.
///
/// Every run of characters other than ASCII letters, digits and `@` splits
/// tokens; stop words and empty tokens are dropped. Item titles and search
/// queries both pass through here so they tokenize identically.
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    SEPARATORS
        .replace_all(text, " ")
        .split(' ')
        .map(str::to_lowercase)
        .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
