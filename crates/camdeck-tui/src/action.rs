//! All possible UI actions. Actions are the sole mechanism for state
//! mutation, including backend I/O: screens wrap a [`Request`] in
//! [`Action::Backend`] and the app loop hands it to the data bridge.

use std::collections::BTreeMap;
use std::fmt;

use camdeck_api::{
    Camera, CameraPatch, HealthMap, NewCamera, NewNvr, NewUser, Nvr, NvrPatch, Recording,
    SessionState, SyncReport, User, UserPatch, ViewMode,
};

use crate::screen::ScreenId;

// ── Notifications ────────────────────────────────────────────────────

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

// ── Confirmation dialog ──────────────────────────────────────────────

/// Pending confirmation. A declined confirmation performs nothing — no
/// request is issued and no state changes.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteCamera { id: i64, name: String },
    DeleteNvr { id: i64, name: String, camera_count: u32 },
    DeleteUser { id: i64, username: String },
    Logout,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteCamera { name, .. } => write!(f, "Delete camera {name}?"),
            Self::DeleteNvr {
                name, camera_count, ..
            } => write!(f, "Delete {name} and its {camera_count} cameras?"),
            Self::DeleteUser { username, .. } => write!(f, "Delete user {username}?"),
            Self::Logout => write!(f, "Log out?"),
        }
    }
}

// ── Mutation scopes ──────────────────────────────────────────────────

/// Where a failed mutation renders its error: inline next to the control
/// that triggered it, never globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationScope {
    CameraForm,
    NvrForm,
    NvrSync,
    UserForm,
    UserNvrForm,
    RecordingToggle,
    Delete,
}

// ── Backend requests ─────────────────────────────────────────────────

/// What the screens ask the data bridge to do. One request per user
/// action; rapid resubmission is prevented by per-control busy flags, not
/// by a queue.
#[derive(Debug)]
pub enum Request {
    Login {
        username: String,
        password: secrecy::SecretString,
    },
    Logout,
    FetchCameras {
        requester: ScreenId,
        generation: u64,
    },
    FetchNvrs {
        requester: ScreenId,
        generation: u64,
    },
    FetchUsers {
        requester: ScreenId,
        generation: u64,
    },
    FetchRecordings {
        requester: ScreenId,
        camera: Option<String>,
        generation: u64,
    },
    FetchHealth,
    CreateCamera(Box<NewCamera>),
    UpdateCamera {
        id: i64,
        patch: Box<CameraPatch>,
    },
    DeleteCamera {
        id: i64,
    },
    SetRecording {
        id: i64,
        enabled: bool,
    },
    CreateNvr(Box<NewNvr>),
    UpdateNvr {
        id: i64,
        patch: Box<NvrPatch>,
    },
    DeleteNvr {
        id: i64,
    },
    SyncNvr {
        id: i64,
    },
    CreateUser(Box<NewUser>),
    UpdateUser {
        id: i64,
        patch: Box<UserPatch>,
    },
    DeleteUser {
        id: i64,
    },
    FetchUserNvrs {
        user_id: i64,
    },
    SetUserNvrs {
        user_id: i64,
        nvr_ids: Vec<i64>,
    },
}

// ── Stream viewer targets ────────────────────────────────────────────

/// What the single external viewer should play. The app resolves these to
/// absolute URLs; screens never build URLs themselves.
#[derive(Debug, Clone)]
pub enum ViewTarget {
    /// A live stream by gateway key.
    Stream { key: String, mode: ViewMode },
    /// A recorded segment by its backend-supplied path.
    Recording { path: String },
}

// ── Actions ──────────────────────────────────────────────────────────

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    /// Open the single-camera detail screen for a stream name.
    OpenCamera(String),
    GoBack,

    // ── Backend I/O ───────────────────────────────────────────────
    Backend(Request),

    // ── Session ───────────────────────────────────────────────────
    SessionChanged(SessionState),
    LoginFailed(String),
    BackendUnreachable(String),

    // ── Fetched data ──────────────────────────────────────────────
    //
    // Results are tagged with the requesting screen and the generation
    // of the request that produced them; a screen drops anything that
    // isn't an answer to its own latest fetch.
    CamerasLoaded {
        requester: ScreenId,
        generation: u64,
        cameras: Vec<Camera>,
    },
    NvrsLoaded {
        requester: ScreenId,
        generation: u64,
        nvrs: Vec<Nvr>,
    },
    UsersLoaded {
        requester: ScreenId,
        generation: u64,
        users: Vec<User>,
    },
    RecordingsLoaded {
        requester: ScreenId,
        generation: u64,
        groups: BTreeMap<String, Vec<Recording>>,
    },
    HealthUpdated(HealthMap),
    /// The backend couldn't reach the gateway — render unknown dots,
    /// keep polling.
    HealthUnavailable,
    FetchFailed {
        requester: ScreenId,
        message: String,
    },

    // ── Mutation results ──────────────────────────────────────────
    CameraSaved {
        camera: Box<Camera>,
        message: Option<String>,
    },
    CameraDeleted {
        id: i64,
        message: Option<String>,
    },
    RecordingToggled {
        id: i64,
        enabled: bool,
        message: Option<String>,
    },
    NvrSaved {
        nvr: Box<Nvr>,
        message: Option<String>,
    },
    NvrDeleted {
        id: i64,
        message: Option<String>,
    },
    NvrSynced {
        id: i64,
        report: SyncReport,
        message: Option<String>,
    },
    UserSaved {
        user: Box<User>,
        message: Option<String>,
    },
    UserDeleted {
        id: i64,
        message: Option<String>,
    },
    UserNvrsLoaded {
        user_id: i64,
        nvr_ids: Vec<i64>,
    },
    UserNvrsSaved {
        user_id: i64,
        nvr_ids: Vec<i64>,
        message: Option<String>,
    },
    MutationFailed {
        scope: MutationScope,
        message: String,
    },

    // ── Stream viewer ─────────────────────────────────────────────
    OpenViewer {
        title: String,
        target: ViewTarget,
    },
    CloseViewer,

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Help & notifications ──────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
    DismissNotification,
}
