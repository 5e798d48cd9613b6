// User account endpoints (admin-only on the backend)

use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, Reply};
use crate::error::Error;
use crate::models::{NewUser, User, UserPatch};

impl ApiClient {
    /// List all accounts, ordered by username.
    ///
    /// `GET /api/users/`
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        let url = self.api_url("users/");
        debug!("listing users");
        self.get(url).await
    }

    /// Create an account.
    ///
    /// `POST /api/users/`
    pub async fn create_user(&self, new: &NewUser) -> Result<Reply<User>, Error> {
        let url = self.api_url("users/");
        debug!(username = %new.username, "creating user");
        self.post(url, new).await
    }

    /// Partially update an account. An empty password in the patch leaves
    /// the stored one untouched.
    ///
    /// `PATCH /api/users/{id}`
    pub async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<Reply<User>, Error> {
        let url = self.api_url(&format!("users/{id}"));
        debug!(id, "updating user");
        self.patch(url, patch).await
    }

    /// Delete an account. The backend refuses to delete the caller's own.
    ///
    /// `DELETE /api/users/{id}`
    pub async fn delete_user(&self, id: i64) -> Result<Reply<serde_json::Value>, Error> {
        let url = self.api_url(&format!("users/{id}"));
        debug!(id, "deleting user");
        self.delete(url).await
    }

    /// NVR ids a viewer account has been granted access to.
    ///
    /// `GET /api/users/{id}/nvrs`
    pub async fn user_nvrs(&self, id: i64) -> Result<Vec<i64>, Error> {
        let url = self.api_url(&format!("users/{id}/nvrs"));
        debug!(id, "fetching user nvr assignments");
        self.get(url).await
    }

    /// Replace the full set of NVR assignments for a viewer account.
    /// An empty list revokes all access. Admins are rejected by the
    /// backend (they always have full access).
    ///
    /// `POST /api/users/{id}/nvrs`
    pub async fn set_user_nvrs(&self, id: i64, nvr_ids: &[i64]) -> Result<Reply<Vec<i64>>, Error> {
        let url = self.api_url(&format!("users/{id}/nvrs"));
        debug!(id, count = nvr_ids.len(), "replacing user nvr assignments");
        self.post(url, &json!({ "nvr_ids": nvr_ids })).await
    }
}
