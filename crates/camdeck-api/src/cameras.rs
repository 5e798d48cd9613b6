// Camera endpoints

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, Reply};
use crate::error::Error;
use crate::models::{Camera, CameraPatch, NewCamera};

/// Toggle response payload — the backend echoes the flag it actually
/// stored, which the consoles adopt over the locally requested one.
#[derive(Debug, Deserialize)]
struct RecordingFlag {
    recording_enabled: bool,
}

impl ApiClient {
    /// List all cameras, ordered by name.
    ///
    /// `GET /api/cameras/`
    pub async fn list_cameras(&self) -> Result<Vec<Camera>, Error> {
        let url = self.api_url("cameras/");
        debug!("listing cameras");
        self.get(url).await
    }

    /// Register a camera. The backend also registers the stream with the
    /// gateway as a side effect.
    ///
    /// `POST /api/cameras/`
    pub async fn create_camera(&self, new: &NewCamera) -> Result<Reply<Camera>, Error> {
        let url = self.api_url("cameras/");
        debug!(name = %new.name, "creating camera");
        self.post(url, new).await
    }

    /// Partially update a camera.
    ///
    /// `PATCH /api/cameras/{id}`
    pub async fn update_camera(&self, id: i64, patch: &CameraPatch) -> Result<Reply<Camera>, Error> {
        let url = self.api_url(&format!("cameras/{id}"));
        debug!(id, "updating camera");
        self.patch(url, patch).await
    }

    /// Delete a camera and its gateway stream registration.
    ///
    /// `DELETE /api/cameras/{id}`
    pub async fn delete_camera(&self, id: i64) -> Result<Reply<serde_json::Value>, Error> {
        let url = self.api_url(&format!("cameras/{id}"));
        debug!(id, "deleting camera");
        self.delete(url).await
    }

    /// Enable or disable recording for a camera. Returns the flag as the
    /// backend stored it, which may diverge from the request.
    ///
    /// `POST /api/cameras/{id}/recording`
    pub async fn set_recording(&self, id: i64, enabled: bool) -> Result<Reply<bool>, Error> {
        let url = self.api_url(&format!("cameras/{id}/recording"));
        debug!(id, enabled, "toggling recording");
        let reply: Reply<RecordingFlag> = self.post(url, &json!({ "enabled": enabled })).await?;
        Ok(reply.map(|flag| flag.recording_enabled))
    }
}
