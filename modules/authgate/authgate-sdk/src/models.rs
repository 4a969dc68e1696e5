//! Domain models for authgate decisions.

use secrecy::{ExposeSecret, SecretSlice};

use crate::capability::HookCapability;
use crate::error::AuthorityError;

/// A connecting client asking to be let in.
///
/// `username` may be empty (anonymous) and so may the password. The
/// password is kept in a [`SecretSlice`] so `Debug` output never shows it.
#[derive(Debug)]
pub struct AuthenticateRequest {
    client_id: String,
    username: String,
    password: SecretSlice<u8>,
}

impl AuthenticateRequest {
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            username: username.into(),
            password: SecretSlice::from(password.into()),
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &[u8] {
        self.password.expose_secret()
    }
}

/// A client asking to read or write a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    client_id: String,
    username: String,
    topic: String,
    write: bool,
}

impl AuthorizeRequest {
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        username: impl Into<String>,
        topic: impl Into<String>,
        write: bool,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            username: username.into(),
            topic: topic.into(),
            write,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub const fn is_write(&self) -> bool {
        self.write
    }
}

/// Either kind of decision request.
#[derive(Debug)]
pub enum DecisionRequest {
    Authenticate(AuthenticateRequest),
    Authorize(AuthorizeRequest),
}

impl DecisionRequest {
    /// The hook capability that handles this request.
    #[must_use]
    pub const fn capability(&self) -> HookCapability {
        match self {
            Self::Authenticate(_) => HookCapability::OnConnectAuthenticate,
            Self::Authorize(_) => HookCapability::OnAclCheck,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        match self {
            Self::Authenticate(req) => req.client_id(),
            Self::Authorize(req) => req.client_id(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::Authenticate(req) => req.username(),
            Self::Authorize(req) => req.username(),
        }
    }
}

impl From<AuthenticateRequest> for DecisionRequest {
    fn from(req: AuthenticateRequest) -> Self {
        Self::Authenticate(req)
    }
}

impl From<AuthorizeRequest> for DecisionRequest {
    fn from(req: AuthorizeRequest) -> Self {
        Self::Authorize(req)
    }
}

/// Outcome of asking an authority.
///
/// `Allow` and `Deny` are answers from a reachable authority and may be
/// cached. `Indeterminate` means no answer was obtained; it denies the
/// request but must never be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    Indeterminate,
}

impl Decision {
    /// Classify the result of a [`crate::DecisionAuthority`] call.
    #[must_use]
    pub const fn from_remote(result: &Result<bool, AuthorityError>) -> Self {
        match result {
            Ok(true) => Self::Allow,
            Ok(false) => Self::Deny,
            Err(_) => Self::Indeterminate,
        }
    }

    /// Boolean handed back to the host.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Value to memoize, if this outcome may be cached at all.
    #[must_use]
    pub const fn cacheable(self) -> Option<bool> {
        match self {
            Self::Allow => Some(true),
            Self::Deny => Some(false),
            Self::Indeterminate => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let req = AuthenticateRequest::new("c1", "alice", b"hunter2".to_vec());
        let rendered = format!("{req:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(req.password(), b"hunter2");
    }

    #[test]
    fn remote_results_map_to_three_way_decision() {
        assert_eq!(Decision::from_remote(&Ok(true)), Decision::Allow);
        assert_eq!(Decision::from_remote(&Ok(false)), Decision::Deny);
        assert_eq!(
            Decision::from_remote(&Err(AuthorityError::Timeout)),
            Decision::Indeterminate
        );
    }

    #[test]
    fn only_answers_are_cacheable() {
        assert_eq!(Decision::Allow.cacheable(), Some(true));
        assert_eq!(Decision::Deny.cacheable(), Some(false));
        assert_eq!(Decision::Indeterminate.cacheable(), None);
        assert!(!Decision::Indeterminate.is_allowed());
    }

    #[test]
    fn decision_request_routes_to_capability() {
        let auth: DecisionRequest = AuthenticateRequest::new("c1", "", Vec::new()).into();
        let acl: DecisionRequest = AuthorizeRequest::new("c2", "bob", "a/b", false).into();

        assert_eq!(auth.capability(), HookCapability::OnConnectAuthenticate);
        assert_eq!(auth.username(), "");
        assert_eq!(acl.capability(), HookCapability::OnAclCheck);
        assert_eq!(acl.client_id(), "c2");
    }
}
