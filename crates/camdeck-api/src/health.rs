// Stream health endpoint
//
// The backend probes the streaming gateway and reports a stream-name →
// online mapping. The map is rebuilt on every poll; a missing key means
// the gateway has no such stream registered (rendered as "unknown").

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::HealthMap;

impl ApiClient {
    /// Online state of every registered stream.
    ///
    /// `GET /api/health/` — returns 503 when the backend cannot reach the
    /// gateway, which callers surface as all-unknown rather than an error
    /// screen.
    pub async fn stream_health(&self) -> Result<HealthMap, Error> {
        let url = self.api_url("health/");
        debug!("fetching stream health");
        self.get(url).await
    }
}
