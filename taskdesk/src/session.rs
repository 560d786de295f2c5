//! Session capability carrying the caller's authorization credential.
//!
//! A [`Session`] is handed to each form controller explicitly; nothing reads
//! the credential from global state.

use std::fmt;

/// Opaque bearer credential sent in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw credential string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The current user's session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credential: Option<Credential>,
}

impl Session {
    /// A session holding `credential`.
    #[must_use]
    pub const fn authenticated(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    /// A session with no credential.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { credential: None }
    }

    /// Builds a session from an optional token; empty tokens count as absent.
    #[must_use]
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Self::authenticated(Credential::new(t)),
            _ => Self::anonymous(),
        }
    }

    /// Whether a credential is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Value for the `Authorization` header, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::expose)
    }
}
