//! Cleanup of raw recognition output into element-symbol casing.

/// Collapses whatever the recognition engine produced into the casing element
/// symbols use: letters only, first letter uppercased, a second letter
/// lowercased, anything further treated as noise and dropped.
pub fn normalize_symbol(raw: &str) -> String {
    let mut letters = raw.chars().filter(|c| c.is_ascii_alphabetic());
    match (letters.next(), letters.next()) {
        (None, _) => String::new(),
        (Some(first), None) => first.to_ascii_uppercase().to_string(),
        (Some(first), Some(second)) => {
            let mut symbol = String::with_capacity(2);
            symbol.push(first.to_ascii_uppercase());
            symbol.push(second.to_ascii_lowercase());
            symbol
        }
    }
}
