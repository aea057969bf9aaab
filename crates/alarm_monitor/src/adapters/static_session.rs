// Rust guideline compliant 2026-10-19

//! Fixed-token adapter for the `SessionProvider` port.
//!
//! Login is out of scope for the monitor; the token comes from the
//! environment and never changes for the life of the process.

use domain::{SessionProvider, SessionToken};

/// `SessionProvider` adapter that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: Option<SessionToken>,
}

impl StaticSession {
    /// Session holding `token`.
    #[must_use]
    pub fn new(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    /// Logged-out session; activation against it fails.
    #[cfg(test)]
    #[must_use]
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl SessionProvider for StaticSession {
    fn session_token(&self) -> Option<SessionToken> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::StaticSession;
    use domain::{SessionProvider as _, SessionToken};

    #[test]
    fn returns_configured_token() {
        let session = StaticSession::new(SessionToken::new("lab-7"));
        assert_eq!(session.session_token(), Some(SessionToken::new("lab-7")));
    }

    #[test]
    fn anonymous_has_no_token() {
        assert_eq!(StaticSession::anonymous().session_token(), None);
    }
}
