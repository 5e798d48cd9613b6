// Recording endpoints
//
// Segments are read-only: list, download, play. The mapping is keyed by
// camera name with segments newest-first, exactly as the backend groups
// them.

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Recording;

impl ApiClient {
    /// Recorded segments grouped by camera, optionally filtered to one
    /// camera name.
    ///
    /// `GET /api/recordings/?camera=<name>`
    pub async fn list_recordings(
        &self,
        camera: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<Recording>>, Error> {
        let mut url = self.api_url("recordings/");
        if let Some(name) = camera {
            url.query_pairs_mut().append_pair("camera", name);
        }
        debug!(camera = camera.unwrap_or("*"), "listing recordings");
        self.get(url).await
    }

    /// Absolute URL for downloading or playing back a segment. The
    /// backend supplies the path; this anchors it to the backend host.
    pub fn recording_url(&self, recording: &Recording) -> Url {
        self.base_url()
            .join(&recording.download_url)
            .expect("invalid recording URL")
    }
}
