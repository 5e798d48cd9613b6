// NVR endpoints
//
// NVR creation and sync both run the backend's channel importer, which
// generates a main+sub camera row per physical channel. The client treats
// the returned created/skipped report as authoritative and refetches the
// camera list to reconcile.

use tracing::debug;

use crate::client::{ApiClient, Reply};
use crate::error::Error;
use crate::models::{NewNvr, Nvr, NvrCreated, NvrPatch, SyncReport};

impl ApiClient {
    /// List all NVRs with their derived camera counts.
    ///
    /// `GET /api/nvrs/`
    pub async fn list_nvrs(&self) -> Result<Vec<Nvr>, Error> {
        let url = self.api_url("nvrs/");
        debug!("listing nvrs");
        self.get(url).await
    }

    /// Register an NVR. The backend immediately imports its channels, so
    /// the response carries both the record and the import report.
    ///
    /// `POST /api/nvrs/`
    pub async fn create_nvr(&self, new: &NewNvr) -> Result<Reply<NvrCreated>, Error> {
        let url = self.api_url("nvrs/");
        debug!(name = %new.name, "creating nvr");
        self.post(url, new).await
    }

    /// Partially update an NVR.
    ///
    /// `PATCH /api/nvrs/{id}`
    pub async fn update_nvr(&self, id: i64, patch: &NvrPatch) -> Result<Reply<Nvr>, Error> {
        let url = self.api_url(&format!("nvrs/{id}"));
        debug!(id, "updating nvr");
        self.patch(url, patch).await
    }

    /// Delete an NVR. The backend cascades to its cameras.
    ///
    /// `DELETE /api/nvrs/{id}`
    pub async fn delete_nvr(&self, id: i64) -> Result<Reply<serde_json::Value>, Error> {
        let url = self.api_url(&format!("nvrs/{id}"));
        debug!(id, "deleting nvr");
        self.delete(url).await
    }

    /// Re-run the channel importer for an NVR. Long-running on the
    /// backend side; the client just awaits the report.
    ///
    /// `POST /api/nvrs/{id}/sync`
    pub async fn sync_nvr(&self, id: i64) -> Result<Reply<SyncReport>, Error> {
        let url = self.api_url(&format!("nvrs/{id}/sync"));
        debug!(id, "syncing nvr channels");
        self.post_empty(url).await
    }
}
