//! Authentication module: credential extraction and the admission gate

pub mod cookie;
pub mod gate;

// Re-export main components
pub use cookie::{sign_cookie, verify_cookie};
pub use gate::{AdmitResult, AuthGate, AuthVerifier, CredentialSource, StaticTokenVerifier};
