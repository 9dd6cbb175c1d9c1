use super::SecurityError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use sha2::{Digest, Sha256};

const NONCE_SIZE: usize = 16;
const TOKEN_SIZE: usize = 32;

fn random_b64<const N: usize>() -> Result<String, SecurityError> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes)?;
    Ok(URL_SAFE.encode(bytes))
}

/// Generates a fresh nonce for `Content-Security-Policy` sources.
///
/// # Errors
/// Returns [`SecurityError::Random`] if the OS random source is unavailable.
pub fn generate_nonce() -> Result<String, SecurityError> {
    random_b64::<NONCE_SIZE>()
}

/// Generates a fresh CSRF token.
///
/// # Errors
/// Returns [`SecurityError::Random`] if the OS random source is unavailable.
pub fn generate_token() -> Result<String, SecurityError> {
    random_b64::<TOKEN_SIZE>()
}

/// Compares two tokens through their SHA-256 digests, so timing reveals neither the position
/// of the first difference nor the token length.
pub fn tokens_match(a: &str, b: &str) -> bool {
    let (a, b) = (Sha256::digest(a.as_bytes()), Sha256::digest(b.as_bytes()));
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}

#[cfg_attr(not(feature = "server"), allow(dead_code))]
/// Whether `token` has the shape of a token issued by [`generate_token`].
pub(crate) fn is_well_formed(token: &str) -> bool {
    URL_SAFE.decode(token).is_ok_and(|raw| raw.len() == TOKEN_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_unique_and_url_safe() {
        let a = generate_nonce().unwrap();
        let b = generate_nonce().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || "-_=".contains(c)));
    }

    #[test]
    fn tokens_round_trip_shape_check() {
        let token = generate_token().unwrap();
        assert!(is_well_formed(&token));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&generate_nonce().unwrap()));
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "abcd"));
        assert!(!tokens_match("", "a"));

        let token = generate_token().unwrap();
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, &generate_token().unwrap()));
    }
}
