//! Broadcast scope derivation
//!
//! A connection's scope is derived once from the upgrade request path and
//! never changes afterwards.

/// The broadcast group a connection belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The implicit global scope; always present, never deleted
    Global,
    /// A named thread room; exists only while it has members
    Thread(String),
}

impl Scope {
    /// Derive a scope from a request path.
    ///
    /// `/thread/<id>` with a non-empty id maps to that thread room.
    /// Everything else, including unrecognized prefixes, falls back to the
    /// global scope rather than failing the upgrade.
    pub fn from_path(path: &str) -> Self {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match segments.next() {
            Some("thread") => match segments.next() {
                Some(id) if !id.is_empty() => Scope::Thread(id.to_string()),
                _ => Scope::Global,
            },
            _ => Scope::Global,
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Thread(id) => Some(id),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Thread(id) => write!(f, "thread/{}", id),
        }
    }
}
