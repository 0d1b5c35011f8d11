//! Text-overlap quality metrics

use serde::Deserialize;
use serde::Serialize;

/// Lower-case and trim for comparison
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whitespace tokens of the normalized text
pub fn tokenize(s: &str) -> Vec<String> {
    normalize_text(s)
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

/// Case-insensitive, whitespace-normalized string equality as 0/1
pub fn exact_match(prediction: &str, reference: &str) -> f64 {
    if normalize_text(prediction) == normalize_text(reference) {
        1.0
    } else {
        0.0
    }
}

/// Token-level precision/recall/F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenF1 {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Set-based token overlap between prediction and reference.
///
/// Duplicate tokens are not double-counted. Two empty strings score 1.0 on
/// all three measures; exactly one empty scores 0.0.
pub fn token_f1(prediction: &str, reference: &str) -> TokenF1 {
    use std::collections::HashSet;

    let p_tokens = tokenize(prediction);
    let r_tokens = tokenize(reference);

    if p_tokens.is_empty() && r_tokens.is_empty() {
        return TokenF1 {
            precision: 1.0,
            recall: 1.0,
            f1: 1.0,
        };
    }
    if p_tokens.is_empty() || r_tokens.is_empty() {
        return TokenF1 {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }

    let p_set: HashSet<&str> = p_tokens.iter().map(String::as_str).collect();
    let r_set: HashSet<&str> = r_tokens.iter().map(String::as_str).collect();
    let intersection = p_set.intersection(&r_set).count() as f64;

    let precision = intersection / p_set.len() as f64;
    let recall = intersection / r_set.len() as f64;
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    TokenF1 {
        precision,
        recall,
        f1,
    }
}
