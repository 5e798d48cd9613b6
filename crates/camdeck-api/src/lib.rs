// camdeck-api: async Rust client for the camdeck NVR aggregation backend.
//
// One endpoint module per backend resource (cameras, nvrs, users,
// recordings, health), all implemented as inherent methods on `ApiClient`.
// Session lifecycle and capability checks live in `session`.

pub mod cameras;
pub mod client;
pub mod error;
pub mod gateway;
pub mod health;
pub mod models;
pub mod nvrs;
pub mod recordings;
pub mod session;
pub mod transport;
pub mod users;

pub use client::{ApiClient, Reply};
pub use error::Error;
pub use gateway::ViewMode;
pub use models::{
    Camera, CameraPatch, HealthMap, NewCamera, NewNvr, NewUser, Nvr, NvrCreated, NvrPatch,
    Recording, Role, StreamPair, SyncReport, User, UserPatch,
};
pub use session::{Capability, Session, SessionState};
pub use transport::{TlsMode, TransportConfig};
