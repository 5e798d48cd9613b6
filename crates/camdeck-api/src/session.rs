// Session lifecycle and capability checks
//
// The session is an explicitly constructed object wrapping an `ApiClient`,
// not ambient global state. Its lifecycle is typed: it starts `Loading`,
// and a single `resume()` call resolves it to `Authenticated` or
// `Anonymous`. It is the sole source of truth for screen guarding and
// role-gated rendering in both consoles.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Role, User};

/// Typed session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Identity not yet resolved — render a loading placeholder.
    #[default]
    Loading,
    Authenticated(User),
    Anonymous,
}

/// What a session is allowed to do. Every gate in the consoles goes
/// through `Session::allows` — there are no scattered role conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Watch live streams (dashboard grid, single-camera view).
    ViewLive,
    /// Browse and play back recorded segments.
    ViewRecordings,
    ManageCameras,
    ManageNvrs,
    ManageUsers,
    ToggleRecording,
}

/// A backend session: current identity plus login/logout transitions.
///
/// State is re-derived fresh on every process start via `resume()`; the
/// only persistence is the server-side session cookie in the client's jar.
pub struct Session {
    client: Arc<ApiClient>,
    state: SessionState,
}

impl Session {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            state: SessionState::Loading,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Resolve the session from the server-side cookie.
    ///
    /// `GET /api/auth/me`. A 401 is the normal logged-out path and
    /// resolves to `Anonymous` silently. Any other failure also resolves
    /// to `Anonymous` but is returned so callers can distinguish a dead
    /// backend from a logged-out one.
    pub async fn resume(&mut self) -> Result<&SessionState, Error> {
        let url = self.client.api_url("auth/me");
        debug!("resuming session");
        match self.client.get::<User>(url).await {
            Ok(user) => {
                debug!(username = %user.username, "session resumed");
                self.state = SessionState::Authenticated(user);
                Ok(&self.state)
            }
            Err(e) if e.is_auth_expired() => {
                self.state = SessionState::Anonymous;
                Ok(&self.state)
            }
            Err(e) => {
                self.state = SessionState::Anonymous;
                Err(e)
            }
        }
    }

    /// Authenticate with username/password.
    ///
    /// `POST /api/auth/login`. On success the backend sets the session
    /// cookie and returns the user; the state transitions to
    /// `Authenticated`. On failure the error propagates and the state is
    /// left unchanged.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<User, Error> {
        let url = self.client.api_url("auth/login");
        debug!(username, "logging in");
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });
        let reply = self.client.post::<User>(url, &body).await?;
        let user = reply.value;
        self.state = SessionState::Authenticated(user.clone());
        debug!(username = %user.username, role = %user.role, "login successful");
        Ok(user)
    }

    /// End the session.
    ///
    /// `POST /api/auth/logout`, best-effort: its own failure is swallowed
    /// and the state becomes `Anonymous` unconditionally, so a broken
    /// backend can never strand a user in a half-logged-out UI.
    pub async fn logout(&mut self) {
        let url = self.client.api_url("auth/logout");
        debug!("logging out");
        if let Err(e) = self.client.post_empty::<serde_json::Value>(url).await {
            debug!(error = %e, "logout request failed (ignored)");
        }
        self.state = SessionState::Anonymous;
    }

    /// The single capability decision point: (session, capability) →
    /// allow/deny. Admins hold every capability; viewers hold live view
    /// only; loading/anonymous sessions hold none.
    pub fn allows(&self, capability: Capability) -> bool {
        match &self.state {
            SessionState::Authenticated(user) if user.role == Role::Admin => true,
            SessionState::Authenticated(_) => matches!(capability, Capability::ViewLive),
            SessionState::Loading | SessionState::Anonymous => false,
        }
    }
}

/// Stateless capability check for callers that hold only a `SessionState`
/// snapshot (the TUI mirrors the bridge-owned session this way).
pub fn state_allows(state: &SessionState, capability: Capability) -> bool {
    match state {
        SessionState::Authenticated(user) if user.role == Role::Admin => true,
        SessionState::Authenticated(_) => matches!(capability, Capability::ViewLive),
        SessionState::Loading | SessionState::Anonymous => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 1,
            username: "op".into(),
            role,
        }
    }

    #[test]
    fn admin_holds_every_capability() {
        let state = SessionState::Authenticated(user(Role::Admin));
        for cap in [
            Capability::ViewLive,
            Capability::ViewRecordings,
            Capability::ManageCameras,
            Capability::ManageNvrs,
            Capability::ManageUsers,
            Capability::ToggleRecording,
        ] {
            assert!(state_allows(&state, cap), "{cap:?}");
        }
    }

    #[test]
    fn viewer_holds_live_view_only() {
        let state = SessionState::Authenticated(user(Role::Viewer));
        assert!(state_allows(&state, Capability::ViewLive));
        assert!(!state_allows(&state, Capability::ViewRecordings));
        assert!(!state_allows(&state, Capability::ManageCameras));
        assert!(!state_allows(&state, Capability::ToggleRecording));
    }

    #[test]
    fn unresolved_sessions_hold_nothing() {
        assert!(!state_allows(&SessionState::Loading, Capability::ViewLive));
        assert!(!state_allows(&SessionState::Anonymous, Capability::ViewLive));
    }
}
