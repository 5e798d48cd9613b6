//! Screen identifiers and the navigation guard.

use std::fmt;

use camdeck_api::{Capability, SessionState, session::state_allows};

/// Identifies each TUI screen. The first five are navigable by number
/// keys; Camera (single-feed detail) and Login are reached by flow, not
/// from the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Live, // 1
    Cameras,    // 2
    Nvrs,       // 3
    Users,      // 4
    Recordings, // 5
    /// Single-camera detail — opened from a list, not in the tab bar.
    Camera,
    /// Login form — replaces everything while the session is anonymous.
    Login,
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 5] = [
        Self::Live,
        Self::Cameras,
        Self::Nvrs,
        Self::Users,
        Self::Recordings,
    ];

    /// Numeric key (1-5) for this screen. Camera/Login have no number key.
    pub fn number(self) -> u8 {
        match self {
            Self::Live => 1,
            Self::Cameras => 2,
            Self::Nvrs => 3,
            Self::Users => 4,
            Self::Recordings => 5,
            Self::Camera | Self::Login => 0,
        }
    }

    /// Screen from a numeric key (1-5). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Live),
            2 => Some(Self::Cameras),
            3 => Some(Self::Nvrs),
            4 => Some(Self::Users),
            5 => Some(Self::Recordings),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Cameras => "Cameras",
            Self::Nvrs => "NVRs",
            Self::Users => "Users",
            Self::Recordings => "Recordings",
            Self::Camera => "Camera",
            Self::Login => "Login",
        }
    }

    /// Compact label for narrow terminals (< 90 cols).
    pub fn label_short(self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::Cameras => "Cam",
            Self::Nvrs => "NVR",
            Self::Users => "Usr",
            Self::Recordings => "Rec",
            Self::Camera => "Cam",
            Self::Login => "Login",
        }
    }

    /// The capability a session needs to enter this screen.
    pub fn required_capability(self) -> Capability {
        match self {
            Self::Live | Self::Camera | Self::Login => Capability::ViewLive,
            Self::Cameras => Capability::ManageCameras,
            Self::Nvrs => Capability::ManageNvrs,
            Self::Users => Capability::ManageUsers,
            Self::Recordings => Capability::ViewRecordings,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Navigation guard ─────────────────────────────────────────────────

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested screen.
    Allow,
    /// Session not yet resolved — render a loading placeholder.
    Loading,
    /// Not logged in — show the login screen.
    RedirectLogin,
    /// Logged in but under-privileged — land on the default screen.
    RedirectDefault,
}

/// Pure navigation decision: (session, screen) → what to render.
/// Side-effect-free; the app loop acts on the result.
pub fn guard(state: &SessionState, screen: ScreenId) -> GuardDecision {
    match state {
        SessionState::Loading => GuardDecision::Loading,
        SessionState::Anonymous => GuardDecision::RedirectLogin,
        SessionState::Authenticated(_) => {
            if state_allows(state, screen.required_capability()) {
                GuardDecision::Allow
            } else {
                GuardDecision::RedirectDefault
            }
        }
    }
}

/// Tab-bar entries visible to a session: admins see everything, viewers
/// only the live view.
pub fn visible_tabs(state: &SessionState) -> Vec<ScreenId> {
    ScreenId::ALL
        .iter()
        .copied()
        .filter(|s| guard(state, *s) == GuardDecision::Allow)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_api::{Role, User};

    fn authed(role: Role) -> SessionState {
        SessionState::Authenticated(User {
            id: 1,
            username: "op".into(),
            role,
        })
    }

    #[test]
    fn loading_session_renders_placeholder_everywhere() {
        for screen in ScreenId::ALL {
            assert_eq!(guard(&SessionState::Loading, screen), GuardDecision::Loading);
        }
    }

    #[test]
    fn anonymous_session_redirects_to_login() {
        for screen in ScreenId::ALL {
            assert_eq!(
                guard(&SessionState::Anonymous, screen),
                GuardDecision::RedirectLogin
            );
        }
    }

    #[test]
    fn viewer_reaches_live_only() {
        let state = authed(Role::Viewer);
        assert_eq!(guard(&state, ScreenId::Live), GuardDecision::Allow);
        assert_eq!(guard(&state, ScreenId::Camera), GuardDecision::Allow);
        for screen in [
            ScreenId::Cameras,
            ScreenId::Nvrs,
            ScreenId::Users,
            ScreenId::Recordings,
        ] {
            assert_eq!(guard(&state, screen), GuardDecision::RedirectDefault);
        }
    }

    #[test]
    fn admin_reaches_all_screens() {
        let state = authed(Role::Admin);
        for screen in ScreenId::ALL {
            assert_eq!(guard(&state, screen), GuardDecision::Allow);
        }
    }

    #[test]
    fn tab_bar_is_role_filtered() {
        assert_eq!(visible_tabs(&authed(Role::Viewer)), vec![ScreenId::Live]);
        assert_eq!(visible_tabs(&authed(Role::Admin)).len(), 5);
        assert!(visible_tabs(&SessionState::Anonymous).is_empty());
    }

    #[test]
    fn number_keys_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(9), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Recordings.next(), ScreenId::Live);
        assert_eq!(ScreenId::Live.prev(), ScreenId::Recordings);
    }
}
