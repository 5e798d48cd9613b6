use thiserror::Error;

/// Top-level error type for the `camdeck-api` crate.
///
/// The backend communicates failure class through HTTP status and carries a
/// human-readable `error` field in the body; both are preserved here so the
/// consoles can surface the server's own wording.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Not logged in, or the session cookie has expired (HTTP 401).
    #[error("authentication required: {message}")]
    Authentication { message: String },

    /// Logged in but lacking the admin role (HTTP 403).
    #[error("permission denied: {message}")]
    Forbidden { message: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Resource lookup failed (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-success response. `message` is the server's `error`
    /// field verbatim when present, else a status-coded generic.
    #[error("{message}")]
    Api { message: String, status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or handshake error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the session is gone and
    /// re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient transport failure worth a
    /// manual retry (the client itself never retries).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
