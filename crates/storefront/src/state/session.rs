//! Session state: the authenticated identity, or its absence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kade_core::UserId;

/// The authenticated user's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
}

/// Session-scoped authentication state.
///
/// Exactly one instance exists per running client; its lifecycle is tied
/// to the session. Both transitions here are pure state changes - the
/// coupled cart resets live on `Store`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    identity: Option<Identity>,
    last_login: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Replace the current identity and record the login timestamp.
    pub fn login(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.last_login = Some(Utc::now());
    }

    /// Clear all identity fields.
    pub fn logout(&mut self) {
        self.identity = None;
        self.last_login = None;
    }

    /// The current identity, if authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether an identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The current user's id, if authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.as_ref().map(|i| &i.id)
    }

    /// Timestamp of the most recent login.
    #[must_use]
    pub const fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }
}
