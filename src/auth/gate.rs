//! Admission gate for upgrade attempts
//!
//! The gate only yields a decision; it performs no socket I/O. On a
//! rejection the upgrade handler answers 401 and never completes the
//! protocol upgrade. There is no retry: a rejected credential ends the
//! attempt and the peer must reconnect with a fresh one.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::auth::cookie::verify_cookie;
use crate::constants::AT_KEY;

/// External token validation seam. Token issuance and revocation live
/// outside this crate; the hub only consumes the resulting predicate.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Pure predicate: is this token (if any) currently acceptable?
    async fn validate(&self, token: Option<&str>) -> bool;
}

/// Verifier backed by a fixed set of accepted tokens
pub struct StaticTokenVerifier {
    accepted: HashSet<String>,
}

impl StaticTokenVerifier {
    pub fn new(accepted: HashSet<String>) -> Self {
        Self { accepted }
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn validate(&self, token: Option<&str>) -> bool {
        match token {
            Some(t) => self.accepted.contains(t),
            None => false,
        }
    }
}

/// Raw credential material extracted from the upgrade request
#[derive(Debug, Default)]
pub struct CredentialSource {
    /// Value of the signed `at` cookie, if the request carried one
    pub cookie: Option<String>,
    /// Raw query string of the request, if any
    pub query: Option<String>,
}

impl CredentialSource {
    /// Recover the access token. A valid signed cookie takes precedence;
    /// otherwise the `at` query parameter is used as-is.
    pub fn token(&self, cookie_secret: &str) -> Option<String> {
        if let Some(raw) = &self.cookie {
            if let Some(token) = verify_cookie(raw, cookie_secret) {
                debug!("Token extracted from signed cookie");
                return Some(token);
            }
        }

        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == AT_KEY)
            .map(|(_, value)| value.into_owned())
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitResult {
    Admitted,
    Rejected,
}

/// Decides whether an upgrade attempt is admitted
pub struct AuthGate {
    verifier: Arc<dyn AuthVerifier>,
    cookie_secret: String,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn AuthVerifier>, cookie_secret: String) -> Self {
        Self {
            verifier,
            cookie_secret,
        }
    }

    /// Check the credential carried by an upgrade attempt
    pub async fn admit(&self, source: &CredentialSource) -> AdmitResult {
        let token = source.token(&self.cookie_secret);

        if self.verifier.validate(token.as_deref()).await {
            AdmitResult::Admitted
        } else {
            AdmitResult::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cookie::sign_cookie;

    const SECRET: &str = "unit-test-secret-0123456789abcdef";

    fn gate_accepting(tokens: &[&str]) -> AuthGate {
        let accepted = tokens.iter().map(|t| t.to_string()).collect();
        AuthGate::new(
            Arc::new(StaticTokenVerifier::new(accepted)),
            SECRET.to_string(),
        )
    }

    #[tokio::test]
    async fn test_query_token_admitted() {
        let gate = gate_accepting(&["tk-1"]);
        let source = CredentialSource {
            cookie: None,
            query: Some("at=tk-1".to_string()),
        };
        assert_eq!(gate.admit(&source).await, AdmitResult::Admitted);
    }

    #[tokio::test]
    async fn test_missing_credential_rejected() {
        let gate = gate_accepting(&["tk-1"]);
        assert_eq!(
            gate.admit(&CredentialSource::default()).await,
            AdmitResult::Rejected
        );
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let gate = gate_accepting(&["tk-1"]);
        let source = CredentialSource {
            cookie: None,
            query: Some("at=tk-2".to_string()),
        };
        assert_eq!(gate.admit(&source).await, AdmitResult::Rejected);
    }

    #[tokio::test]
    async fn test_signed_cookie_takes_precedence() {
        let gate = gate_accepting(&["cookie-token"]);
        let source = CredentialSource {
            cookie: Some(sign_cookie("cookie-token", SECRET)),
            query: Some("at=query-token".to_string()),
        };
        assert_eq!(gate.admit(&source).await, AdmitResult::Admitted);
    }

    #[tokio::test]
    async fn test_bad_cookie_falls_back_to_query() {
        let gate = gate_accepting(&["query-token"]);
        let source = CredentialSource {
            cookie: Some("s:forged.AAAA".to_string()),
            query: Some("at=query-token".to_string()),
        };
        assert_eq!(gate.admit(&source).await, AdmitResult::Admitted);
    }
}
