/// Function words carrying no signal for element matching.
pub const STOP_WORDS: &[&str] = &[
    "for", "the", "do", "did", "does", "this", "to", "of", "with", "and", "or", "have", "has",
    "as", "is",
];

/// Markup and boilerplate terms that show up in attributes of almost every element.
pub const NOISE_WORDS: &[&str] = &[
    "btn", "link", "form", "svg", "www", "https", "http", "com", "js", "css", "true", "false",
    "checked",
];

const MIN_WORD_CHARS: usize = 2;

/// Split free text into raw word fragments.
///
/// Breaks on every non-alphanumeric character, then splits each fragment at
/// camel-case boundaries. Case is preserved; see [`filter_words`].
pub fn split_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|fragment| !fragment.is_empty())
        .flat_map(split_camel_case)
        .collect()
}

/// Lowercase, then drop short fragments, stop words and noise words.
pub fn filter_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.as_ref().to_lowercase())
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()) && !NOISE_WORDS.contains(&w.as_str()))
        .collect()
}

/// `split_words` followed by `filter_words`.
pub fn normalize(text: &str) -> Vec<String> {
    filter_words(&split_words(text))
}

/// Split an identifier where a lowercase letter meets an uppercase one
/// (`myButton` -> `my`, `Button`) and before the last capital of an acronym
/// run (`HTMLParser` -> `HTML`, `Parser`).
fn split_camel_case(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let lower_to_upper = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let acronym_end = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && next.is_some_and(|n| n.is_ascii_lowercase());
            if lower_to_upper || acronym_end {
                parts.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
