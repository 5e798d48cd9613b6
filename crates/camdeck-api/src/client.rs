// Backend HTTP client
//
// Wraps `reqwest::Client` with camdeck URL construction and envelope
// handling. All endpoint modules (cameras, nvrs, users, recordings,
// health) are implemented as inherent methods via separate files to keep
// this module focused on transport mechanics.
//
// Envelope convention:
//   success: `{ "data": ..., "message": "optional" }` — `data` may be
//            absent, in which case the whole body is the payload
//   failure: `{ "error": "message" }` with a non-2xx status
// Empty and non-JSON bodies are tolerated and treated as `{}`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// A successful backend response: the unwrapped payload plus the optional
/// human-readable `message` the consoles show as a toast.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub value: T,
    pub message: Option<String>,
}

impl<T> Reply<T> {
    /// Map the payload, keeping the message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            value: f(self.value),
            message: self.message,
        }
    }
}

/// HTTP client for the camdeck backend REST surface.
///
/// Holds the session cookie in its jar after `Session::login`; every
/// request rides on it automatically. No retries, no de-duplication —
/// failures propagate immediately to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies). `base_url` is the
    /// backend root, e.g. `http://nvr-host:5000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client with a session cookie in
    /// its jar (or in tests, where no cookie is needed).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{path}");
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope, discarding the message.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Ok(parse_reply(resp).await?.value)
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Reply<T>, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_reply(resp).await
    }

    /// Send a bodyless POST request and unwrap the envelope.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<Reply<T>, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        parse_reply(resp).await
    }

    /// Send a PATCH request with a JSON body and unwrap the envelope.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Reply<T>, Error> {
        debug!("PATCH {}", url);
        let resp = self
            .http
            .patch(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_reply(resp).await
    }

    /// Send a DELETE request. Delete responses carry no `data`, only the
    /// confirmation message.
    pub(crate) async fn delete(&self, url: Url) -> Result<Reply<serde_json::Value>, Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_reply(resp).await
    }
}

/// Parse the `{data, message}` / `{error}` envelope.
///
/// On non-success status the server's `error` field is preserved verbatim
/// when present; 401/403/404 map to their dedicated variants so callers
/// can branch on failure class without string matching.
pub(crate) async fn parse_reply<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<Reply<T>, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    let json: serde_json::Value = if body.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()))
    };

    if !status.is_success() {
        let message = json
            .get("error")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| format!("request failed (HTTP {status})"), str::to_owned);
        return Err(match status.as_u16() {
            401 => Error::Authentication { message },
            403 => Error::Forbidden { message },
            404 => Error::NotFound { message },
            code => Error::Api {
                message,
                status: code,
            },
        });
    }

    let message = json
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);

    // `data` if present, else the whole parsed body.
    let payload = json.get("data").cloned().unwrap_or(json);

    let value = serde_json::from_value(payload).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })?;

    Ok(Reply { value, message })
}
