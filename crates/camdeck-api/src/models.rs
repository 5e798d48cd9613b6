// Backend record types mirrored by the console.
//
// All of these are owned by the backend; the client reads them, renders
// them, and sends create/patch payloads back. Patch types use
// `Option` + `skip_serializing_if` so only touched fields travel — the
// backend applies partial updates field by field.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Users ────────────────────────────────────────────────────────────

/// Account role. Admins manage inventory and accounts; viewers get the
/// live view only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Viewer => f.write_str("viewer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload for `POST /api/users/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Payload for `PATCH /api/users/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

// ── NVRs ─────────────────────────────────────────────────────────────

/// A recorder appliance the backend aggregates. `camera_count` is derived
/// server-side; the password is write-only and never returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nvr {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_max_channels")]
    pub max_channels: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub camera_count: u32,
}

fn default_max_channels() -> u32 {
    50
}

/// Create response: the new NVR plus the channel-import report the backend
/// runs as part of creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NvrCreated {
    #[serde(flatten)]
    pub nvr: Nvr,
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub skipped: u32,
}

/// Payload for `POST /api/nvrs/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewNvr {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub max_channels: u32,
}

/// Payload for `PATCH /api/nvrs/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NvrPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Result of `POST /api/nvrs/{id}/sync` — how many channel streams the
/// backend imported vs. found already present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: u32,
    pub skipped: u32,
}

// ── Cameras ──────────────────────────────────────────────────────────

/// A single stream registration. Physical channels arrive as two rows
/// (a `-main` and a `-sub` variant of one feed); standalone cameras have
/// `nvr_id == None` and may carry no variant suffix at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    /// Slug used as the streaming-gateway stream key.
    pub name: String,
    pub display_name: String,
    pub rtsp_url: String,
    #[serde(default)]
    pub nvr_id: Option<i64>,
    #[serde(default)]
    pub nvr_name: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub recording_enabled: bool,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub is_sub: bool,
}

/// Both stream keys of one physical feed, made explicit in one place so
/// nothing else in the consoles does suffix substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPair {
    pub main: String,
    pub sub: String,
}

impl Camera {
    /// Resolve the main/sub stream-key pair this camera belongs to.
    ///
    /// A standalone camera without a variant suffix is its own pair: the
    /// same key serves both roles.
    pub fn stream_pair(&self) -> StreamPair {
        if let Some(base) = self.name.strip_suffix("-main") {
            StreamPair {
                main: self.name.clone(),
                sub: format!("{base}-sub"),
            }
        } else if let Some(base) = self.name.strip_suffix("-sub") {
            StreamPair {
                main: format!("{base}-main"),
                sub: self.name.clone(),
            }
        } else {
            StreamPair {
                main: self.name.clone(),
                sub: self.name.clone(),
            }
        }
    }

    /// Human label without the variant decoration the backend bakes into
    /// imported display names ("Recorder — Ch 3 Main" → "Recorder Ch 3").
    pub fn label(&self) -> String {
        self.display_name
            .replace(" — ", " ")
            .trim_end_matches(" Main")
            .trim_end_matches(" Sub")
            .to_owned()
    }
}

/// Payload for `POST /api/cameras/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCamera {
    pub name: String,
    pub display_name: String,
    pub rtsp_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvr_id: Option<i64>,
    pub active: bool,
}

/// Payload for `PATCH /api/cameras/{id}`. `nvr_id` is doubly optional:
/// `None` leaves the assignment untouched, `Some(None)` detaches the
/// camera from its NVR.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CameraPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtsp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvr_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ── Recordings ───────────────────────────────────────────────────────

/// One recorded segment. Segments are read-only; the backend derives
/// `started_at` from the gateway's segment filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub camera_name: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub size_mb: f64,
    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,
    pub download_url: String,
}

// ── Health ───────────────────────────────────────────────────────────

/// Stream name → online flag, as reported by the backend's gateway probe.
/// Rebuilt from scratch on every poll; never persisted.
pub type HealthMap = HashMap<String, bool>;

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(name: &str) -> Camera {
        Camera {
            id: 1,
            name: name.into(),
            display_name: "Lobby — Ch 1 Main".into(),
            rtsp_url: "rtsp://10.0.0.2:554/Streaming/Channels/101".into(),
            nvr_id: Some(3),
            nvr_name: Some("Lobby".into()),
            active: true,
            recording_enabled: false,
            is_main: true,
            is_sub: false,
        }
    }

    #[test]
    fn stream_pair_from_main_variant() {
        let pair = cam("lobby-ch1-main").stream_pair();
        assert_eq!(pair.main, "lobby-ch1-main");
        assert_eq!(pair.sub, "lobby-ch1-sub");
    }

    #[test]
    fn stream_pair_from_sub_variant() {
        let pair = cam("lobby-ch1-sub").stream_pair();
        assert_eq!(pair.main, "lobby-ch1-main");
        assert_eq!(pair.sub, "lobby-ch1-sub");
    }

    #[test]
    fn stream_pair_standalone_is_its_own_pair() {
        let pair = cam("doorbell").stream_pair();
        assert_eq!(pair.main, "doorbell");
        assert_eq!(pair.sub, "doorbell");
    }

    #[test]
    fn label_strips_variant_decoration() {
        assert_eq!(cam("lobby-ch1-main").label(), "Lobby Ch 1");
    }

    #[test]
    fn camera_patch_serializes_only_touched_fields() {
        let patch = CameraPatch {
            display_name: Some("Front door".into()),
            nvr_id: Some(None),
            ..CameraPatch::default()
        };
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "display_name": "Front door", "nvr_id": null })
        );
    }

    #[test]
    fn role_round_trips_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).expect("ser"), "\"admin\"");
        let role: Role = serde_json::from_str("\"viewer\"").expect("de");
        assert_eq!(role, Role::Viewer);
    }
}
