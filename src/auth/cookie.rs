//! Signed cookie codec
//!
//! Cookie values carry the access token tamper-protected by an HMAC-SHA256
//! signature under the server's cookie secret. The format is
//! `s:<token>.<base64 signature>`, matching the signed cookies produced by
//! the companion login service.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use ring::hmac;

const SIGNED_PREFIX: &str = "s:";

fn signing_key(secret: &str) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes())
}

/// Sign a token into a cookie value
pub fn sign_cookie(token: &str, secret: &str) -> String {
    let tag = hmac::sign(&signing_key(secret), token.as_bytes());
    format!("{}{}.{}", SIGNED_PREFIX, token, STANDARD_NO_PAD.encode(tag.as_ref()))
}

/// Verify a signed cookie value and recover the embedded token.
/// Returns `None` for missing prefix, malformed structure, or a bad
/// signature; signature comparison is constant-time via `ring`.
pub fn verify_cookie(raw: &str, secret: &str) -> Option<String> {
    let unprefixed = raw.strip_prefix(SIGNED_PREFIX)?;
    let (token, sig_b64) = unprefixed.rsplit_once('.')?;
    let sig = STANDARD_NO_PAD.decode(sig_b64).ok()?;

    hmac::verify(&signing_key(secret), token.as_bytes(), &sig)
        .ok()
        .map(|_| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-0123456789abcdef";

    #[test]
    fn test_sign_verify_round_trip() {
        let cookie = sign_cookie("token-123", SECRET);
        assert!(cookie.starts_with("s:token-123."));
        assert_eq!(verify_cookie(&cookie, SECRET), Some("token-123".to_string()));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let cookie = sign_cookie("token-123", SECRET);
        let tampered = cookie.replace("token-123", "token-456");
        assert_eq!(verify_cookie(&tampered, SECRET), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let cookie = sign_cookie("token-123", SECRET);
        assert_eq!(verify_cookie(&cookie, "another-secret-0123456789abcdef"), None);
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert_eq!(verify_cookie("token-123", SECRET), None);
        assert_eq!(verify_cookie("s:no-signature", SECRET), None);
        assert_eq!(verify_cookie("s:token.!!!not-base64!!!", SECRET), None);
        assert_eq!(verify_cookie("", SECRET), None);
    }
}
