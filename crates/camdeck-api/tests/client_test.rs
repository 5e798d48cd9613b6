#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` and `Session` using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camdeck_api::{
    ApiClient, CameraPatch, Error, NewCamera, NewUser, Role, Session, SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn user_body() -> serde_json::Value {
    json!({ "id": 1, "username": "op", "role": "admin" })
}

// ── Envelope semantics ──────────────────────────────────────────────

#[tokio::test]
async fn test_error_field_surfaces_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/cameras/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "name is required." })),
        )
        .mount(&server)
        .await;

    let err = client.list_cameras().await.unwrap_err();
    match err {
        Error::Api { message, status } => {
            assert_eq!(message, "name is required.");
            assert_eq!(status, 400);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_error_field_gets_status_coded_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/cameras/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_cameras().await.unwrap_err();
    match err {
        Error::Api { message, status } => {
            assert!(message.contains("500"), "message was: {message}");
            assert_eq!(status, 500);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/cameras/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Authentication required." })),
        )
        .mount(&server)
        .await;

    let err = client.list_cameras().await.unwrap_err();
    assert!(err.is_auth_expired(), "got: {err:?}");
}

#[tokio::test]
async fn test_data_envelope_is_unwrapped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/cameras/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 7,
                "name": "lobby-ch1-main",
                "display_name": "Lobby — Ch 1 Main",
                "rtsp_url": "rtsp://10.0.0.2:554/Streaming/Channels/101",
                "nvr_id": 3,
                "nvr_name": "Lobby",
                "active": true,
                "recording_enabled": false,
                "is_main": true,
                "is_sub": false
            }]
        })))
        .mount(&server)
        .await;

    let cameras = client.list_cameras().await.unwrap();
    assert_eq!(cameras.len(), 1);
    assert_eq!(cameras[0].id, 7);
    assert_eq!(cameras[0].name, "lobby-ch1-main");
    assert!(cameras[0].is_main);
    assert_eq!(cameras[0].stream_pair().sub, "lobby-ch1-sub");
}

#[tokio::test]
async fn test_body_without_data_field_is_returned_whole() {
    let (server, client) = setup().await;

    // Health responses are a bare map under `data`; simulate a backend
    // that skips the envelope entirely.
    Mock::given(method("GET"))
        .and(path("/api/health/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lobby-ch1-main": true,
            "lobby-ch1-sub": false
        })))
        .mount(&server)
        .await;

    let health = client.stream_health().await.unwrap();
    assert_eq!(health.get("lobby-ch1-main"), Some(&true));
    assert_eq!(health.get("lobby-ch1-sub"), Some(&false));
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_resume_resolves_authenticated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": user_body() })))
        .mount(&server)
        .await;

    let mut session = Session::new(Arc::new(client));
    assert_eq!(*session.state(), SessionState::Loading);

    session.resume().await.unwrap();
    match session.state() {
        SessionState::Authenticated(user) => {
            assert_eq!(user.username, "op");
            assert_eq!(user.role, Role::Admin);
        }
        other => panic!("expected Authenticated, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_resume_resolves_anonymous_on_401() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Not authenticated." })),
        )
        .mount(&server)
        .await;

    let mut session = Session::new(Arc::new(client));
    session.resume().await.unwrap();
    assert_eq!(*session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_login_success_transitions_state() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "op", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": user_body(),
            "message": "Logged in successfully."
        })))
        .mount(&server)
        .await;

    let mut session = Session::new(Arc::new(client));
    let secret: secrecy::SecretString = "hunter2".to_string().into();
    let user = session.login("op", &secret).await.unwrap();

    assert_eq!(user.username, "op");
    assert!(matches!(session.state(), SessionState::Authenticated(_)));
}

#[tokio::test]
async fn test_login_failure_leaves_state_unchanged() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "Invalid username or password." })),
        )
        .mount(&server)
        .await;

    let mut session = Session::new(Arc::new(client));
    let secret: secrecy::SecretString = "wrong".to_string().into();
    let err = session.login("op", &secret).await.unwrap_err();

    assert!(err.is_auth_expired());
    assert!(
        err.to_string().contains("Invalid username or password."),
        "server wording lost: {err}"
    );
    assert_eq!(*session.state(), SessionState::Loading);
}

#[tokio::test]
async fn test_logout_failure_is_swallowed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": user_body() })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut session = Session::new(Arc::new(client));
    session.resume().await.unwrap();
    session.logout().await;
    assert_eq!(*session.state(), SessionState::Anonymous);
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_camera_returns_record_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/cameras/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": 12,
                "name": "doorbell",
                "display_name": "Doorbell",
                "rtsp_url": "rtsp://10.0.0.9:554/live",
                "nvr_id": null,
                "nvr_name": null,
                "active": true,
                "recording_enabled": false,
                "is_main": false,
                "is_sub": false
            },
            "message": "Camera created."
        })))
        .mount(&server)
        .await;

    let new = NewCamera {
        name: "doorbell".into(),
        display_name: "Doorbell".into(),
        rtsp_url: "rtsp://10.0.0.9:554/live".into(),
        nvr_id: None,
        active: true,
    };
    let reply = client.create_camera(&new).await.unwrap();
    assert_eq!(reply.value.id, 12);
    assert_eq!(reply.message.as_deref(), Some("Camera created."));
}

#[tokio::test]
async fn test_recording_toggle_echoes_server_flag() {
    let (server, client) = setup().await;

    // Request asks for `true`; the backend reports `false` (e.g. gateway
    // rejected the record output). The caller must adopt the server flag.
    Mock::given(method("POST"))
        .and(path("/api/cameras/12/recording"))
        .and(body_json(json!({ "enabled": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "recording_enabled": false } })),
        )
        .mount(&server)
        .await;

    let reply = client.set_recording(12, true).await.unwrap();
    assert!(!reply.value);
}

#[tokio::test]
async fn test_update_camera_sends_only_touched_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/cameras/12"))
        .and(body_json(json!({ "display_name": "Front door" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": 12,
                "name": "doorbell",
                "display_name": "Front door",
                "rtsp_url": "rtsp://10.0.0.9:554/live",
                "active": true
            },
            "message": "Camera updated."
        })))
        .mount(&server)
        .await;

    let patch = CameraPatch {
        display_name: Some("Front door".into()),
        ..CameraPatch::default()
    };
    let reply = client.update_camera(12, &patch).await.unwrap();
    assert_eq!(reply.value.display_name, "Front door");
}

#[tokio::test]
async fn test_nvr_sync_reports_counts() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/nvrs/3/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "created": 4, "skipped": 96 },
            "message": "Sync complete: 4 new streams, 96 already existed."
        })))
        .mount(&server)
        .await;

    let reply = client.sync_nvr(3).await.unwrap();
    assert_eq!(reply.value.created, 4);
    assert_eq!(reply.value.skipped, 96);
    assert!(reply.message.unwrap().starts_with("Sync complete"));
}

#[tokio::test]
async fn test_delete_returns_confirmation_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/nvrs/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "\"Lobby\" and 100 cameras deleted." })),
        )
        .mount(&server)
        .await;

    let reply = client.delete_nvr(3).await.unwrap();
    assert_eq!(
        reply.message.as_deref(),
        Some("\"Lobby\" and 100 cameras deleted.")
    );
}

// ── Users & assignments ─────────────────────────────────────────────

#[tokio::test]
async fn test_create_user_and_assignments_round_trip() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": 5, "username": "gatehouse", "role": "viewer" },
            "message": "User \"gatehouse\" created."
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/5/nvrs"))
        .and(body_json(json!({ "nvr_ids": [3] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [3] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/5/nvrs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [3] })))
        .mount(&server)
        .await;

    let new = NewUser {
        username: "gatehouse".into(),
        password: "pw".into(),
        role: Role::Viewer,
    };
    let created = client.create_user(&new).await.unwrap();
    assert_eq!(created.value.role, Role::Viewer);

    let set = client.set_user_nvrs(5, &[3]).await.unwrap();
    assert_eq!(set.value, vec![3]);
    assert_eq!(client.user_nvrs(5).await.unwrap(), vec![3]);
}

// ── Recordings ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_recordings_grouped_and_filtered() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/recordings/"))
        .and(query_param("camera", "lobby-ch1-main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "lobby-ch1-main": [{
                    "camera_name": "lobby-ch1-main",
                    "filename": "2024-01-15_14-00-00.mp4",
                    "size": 734003200,
                    "size_mb": 700.0,
                    "started_at": "2024-01-15T14:00:00",
                    "download_url": "/api/recordings/lobby-ch1-main/2024-01-15_14-00-00.mp4"
                }]
            }
        })))
        .mount(&server)
        .await;

    let groups = client.list_recordings(Some("lobby-ch1-main")).await.unwrap();
    assert_eq!(groups.len(), 1);
    let segments = &groups["lobby-ch1-main"];
    assert_eq!(segments[0].filename, "2024-01-15_14-00-00.mp4");
    assert!(segments[0].started_at.is_some());

    let url = client.recording_url(&segments[0]);
    assert!(url.path().ends_with("/2024-01-15_14-00-00.mp4"));
    assert_eq!(url.host_str(), Url::parse(&server.uri()).unwrap().host_str());
}
