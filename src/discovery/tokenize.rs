//! Tokenizer shared by index construction and query parsing

/// Characters that separate tokens
const SEPARATORS: [char; 5] = [' ', '_', '-', '.', ','];

/// Lowercase, split on separators and drop tokens shorter than `min_len`
///
/// Duplicates are removed; first-occurrence order is kept.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    for token in lower.split(|c: char| SEPARATORS.contains(&c)) {
        if token.chars().count() < min_len {
            continue;
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Fuzzy token match: substring containment either way, or a shared prefix when
/// both tokens are long enough
pub fn fuzzy_match(a: &str, b: &str, prefix_len: usize, min_len: usize) -> bool {
    if a.contains(b) || b.contains(a) {
        return true;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len < min_len || b_len < min_len {
        return false;
    }
    a.chars().take(prefix_len).eq(b.chars().take(prefix_len))
}
