// Streaming-gateway URL construction
//
// The embedded gateway is reached at a fixed path under the backend host,
// addressed by stream key plus a display-mode query parameter. Built in
// one place so no view assembles gateway URLs by hand.

use url::Url;

use crate::client::ApiClient;

/// Gateway display mode, passed through as the `mode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Segmented playback — works everywhere, a few seconds of latency.
    #[default]
    Mse,
    /// Low-latency peer connection.
    Webrtc,
}

impl ViewMode {
    fn query_value(self) -> &'static str {
        match self {
            Self::Mse => "mse",
            Self::Webrtc => "webrtc",
        }
    }
}

impl ApiClient {
    /// Playback page URL for a stream key:
    /// `{base}/go2rtc/stream.html?src={key}&mode={mode}`
    pub fn stream_page_url(&self, stream: &str, mode: ViewMode) -> Url {
        let base = self.base_url().as_str().trim_end_matches('/');
        let mut url =
            Url::parse(&format!("{base}/go2rtc/stream.html")).expect("invalid gateway URL");
        url.query_pairs_mut()
            .append_pair("src", stream)
            .append_pair("mode", mode.query_value());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportConfig;

    #[test]
    fn stream_page_url_carries_key_and_mode() {
        let client = ApiClient::new(
            Url::parse("http://nvr.local:5000").expect("url"),
            &TransportConfig::default(),
        )
        .expect("client");
        let url = client.stream_page_url("lobby-ch1-sub", ViewMode::Mse);
        assert_eq!(
            url.as_str(),
            "http://nvr.local:5000/go2rtc/stream.html?src=lobby-ch1-sub&mode=mse"
        );
    }
}
