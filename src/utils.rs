use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::DateTime;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const STATE_LENGTH: usize = 32;
pub const CODE_VERIFIER_LENGTH: usize = 128;

pub const STATE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
pub const CODE_VERIFIER_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_.-~";

/// Builds a string of exactly `length` characters drawn from `alphabet`.
///
/// Each byte from the OS-seeded thread RNG is mapped into the alphabet by
/// modulo. The resulting bias towards the first characters is accepted.
/// `alphabet` must be ASCII. An empty alphabet yields an empty string.
pub fn generate_random_string(length: usize, alphabet: &str) -> String {
    let alphabet = alphabet.as_bytes();
    if alphabet.is_empty() {
        return String::new();
    }

    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);

    bytes
        .iter()
        .map(|b| alphabet[*b as usize % alphabet.len()] as char)
        .collect()
}

pub fn generate_state() -> String {
    generate_random_string(STATE_LENGTH, STATE_ALPHABET)
}

pub fn generate_code_verifier() -> String {
    generate_random_string(CODE_VERIFIER_LENGTH, CODE_VERIFIER_ALPHABET)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Formats an RFC 3339 timestamp as `YYYY-MM-DD`, passing anything else through.
pub fn format_date(timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| ts.to_string()),
        None => String::new(),
    }
}

/// Shortens `text` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
