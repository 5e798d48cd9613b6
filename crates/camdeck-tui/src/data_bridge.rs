//! Data bridge — the single owner of the backend session and all I/O.
//!
//! Runs as a background task: screens send [`Request`]s through the app
//! loop, the bridge performs them against the `ApiClient`, and posts the
//! results back as [`Action`]s. Stream health is polled on a fixed
//! interval for the lifetime of the bridge; the timer dies with the task
//! on cancellation, never leaking a request loop.
//!
//! Fetch results carry the generation number of the request that caused
//! them, so a screen can drop responses that were superseded while in
//! flight (nothing ever overwrites fresh state with stale data).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use camdeck_api::{ApiClient, Error, Session, SessionState};

use crate::action::{Action, MutationScope, Notification, Request};

/// Health poll cadence, matching the backend's expectations for UI
/// consumers.
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Run the bridge until cancelled. Requests are handled one at a time —
/// mutations are single-in-flight per user action by construction, and
/// the UI disables the triggering control while it waits.
pub async fn run_bridge(
    client: Arc<ApiClient>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut session = Session::new(Arc::clone(&client));

    // Resolve identity from the server-side cookie before anything else.
    match session.resume().await {
        Ok(state) => {
            let _ = action_tx.send(Action::SessionChanged(state.clone()));
        }
        Err(e) => {
            warn!(error = %e, "session resume failed");
            let _ = action_tx.send(Action::BackendUnreachable(e.to_string()));
            let _ = action_tx.send(Action::SessionChanged(SessionState::Anonymous));
        }
    }

    let mut health_timer = tokio::time::interval(HEALTH_POLL_INTERVAL);
    health_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            _ = health_timer.tick() => {
                // Health is only meaningful (and authorized) with a session.
                if matches!(session.state(), SessionState::Authenticated(_)) {
                    poll_health(&client, &action_tx).await;
                }
            }

            maybe_req = requests.recv() => {
                let Some(req) = maybe_req else { break };
                handle_request(req, &client, &mut session, &action_tx).await;
            }
        }
    }

    debug!("data bridge shut down");
}

async fn poll_health(client: &ApiClient, action_tx: &mpsc::UnboundedSender<Action>) {
    match client.stream_health().await {
        Ok(health) => {
            let _ = action_tx.send(Action::HealthUpdated(health));
        }
        Err(e) => {
            // A failed poll renders as unknown dots; polling continues.
            debug!(error = %e, "health poll failed");
            let _ = action_tx.send(Action::HealthUnavailable);
        }
    }
}

/// Shorthand: report a failed mutation to the scope that triggered it.
fn mutation_failed(
    action_tx: &mpsc::UnboundedSender<Action>,
    scope: MutationScope,
    err: &Error,
) {
    let _ = action_tx.send(Action::MutationFailed {
        scope,
        message: err.to_string(),
    });
}

#[allow(clippy::too_many_lines)]
async fn handle_request(
    req: Request,
    client: &ApiClient,
    session: &mut Session,
    action_tx: &mpsc::UnboundedSender<Action>,
) {
    match req {
        // ── Session ───────────────────────────────────────────────
        Request::Login { username, password } => {
            match session.login(&username, &password).await {
                Ok(user) => {
                    let _ = action_tx.send(Action::SessionChanged(SessionState::Authenticated(
                        user.clone(),
                    )));
                    let _ = action_tx.send(Action::Notify(Notification::success(format!(
                        "Logged in as {}",
                        user.username
                    ))));
                    // Seed health immediately rather than waiting a poll.
                    poll_health(client, action_tx).await;
                }
                Err(e) => {
                    let _ = action_tx.send(Action::LoginFailed(e.to_string()));
                }
            }
        }

        Request::Logout => {
            session.logout().await;
            let _ = action_tx.send(Action::SessionChanged(SessionState::Anonymous));
        }

        // ── Fetches ───────────────────────────────────────────────
        Request::FetchCameras {
            requester,
            generation,
        } => match client.list_cameras().await {
            Ok(cameras) => {
                let _ = action_tx.send(Action::CamerasLoaded {
                    requester,
                    generation,
                    cameras,
                });
            }
            Err(e) => {
                let _ = action_tx.send(Action::FetchFailed {
                    requester,
                    message: e.to_string(),
                });
            }
        },

        Request::FetchNvrs {
            requester,
            generation,
        } => match client.list_nvrs().await {
            Ok(nvrs) => {
                let _ = action_tx.send(Action::NvrsLoaded {
                    requester,
                    generation,
                    nvrs,
                });
            }
            Err(e) => {
                let _ = action_tx.send(Action::FetchFailed {
                    requester,
                    message: e.to_string(),
                });
            }
        },

        Request::FetchUsers {
            requester,
            generation,
        } => match client.list_users().await {
            Ok(users) => {
                let _ = action_tx.send(Action::UsersLoaded {
                    requester,
                    generation,
                    users,
                });
            }
            Err(e) => {
                let _ = action_tx.send(Action::FetchFailed {
                    requester,
                    message: e.to_string(),
                });
            }
        },

        Request::FetchRecordings {
            requester,
            camera,
            generation,
        } => match client.list_recordings(camera.as_deref()).await {
            Ok(groups) => {
                let _ = action_tx.send(Action::RecordingsLoaded {
                    requester,
                    generation,
                    groups,
                });
            }
            Err(e) => {
                let _ = action_tx.send(Action::FetchFailed {
                    requester,
                    message: e.to_string(),
                });
            }
        },

        Request::FetchHealth => poll_health(client, action_tx).await,

        // ── Camera mutations ──────────────────────────────────────
        Request::CreateCamera(new) => match client.create_camera(&new).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::CameraSaved {
                    camera: Box::new(reply.value),
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::CameraForm, &e),
        },

        Request::UpdateCamera { id, patch } => match client.update_camera(id, &patch).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::CameraSaved {
                    camera: Box::new(reply.value),
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::CameraForm, &e),
        },

        Request::DeleteCamera { id } => match client.delete_camera(id).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::CameraDeleted {
                    id,
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::Delete, &e),
        },

        Request::SetRecording { id, enabled } => match client.set_recording(id, enabled).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::RecordingToggled {
                    id,
                    enabled: reply.value,
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::RecordingToggle, &e),
        },

        // ── NVR mutations ─────────────────────────────────────────
        Request::CreateNvr(new) => match client.create_nvr(&new).await {
            Ok(reply) => {
                let created = reply.value;
                let message = reply.message.or_else(|| {
                    Some(format!(
                        "NVR created. {} streams imported, {} skipped.",
                        created.imported, created.skipped
                    ))
                });
                let _ = action_tx.send(Action::NvrSaved {
                    nvr: Box::new(created.nvr),
                    message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::NvrForm, &e),
        },

        Request::UpdateNvr { id, patch } => match client.update_nvr(id, &patch).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::NvrSaved {
                    nvr: Box::new(reply.value),
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::NvrForm, &e),
        },

        Request::DeleteNvr { id } => match client.delete_nvr(id).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::NvrDeleted {
                    id,
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::Delete, &e),
        },

        Request::SyncNvr { id } => match client.sync_nvr(id).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::NvrSynced {
                    id,
                    report: reply.value,
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::NvrSync, &e),
        },

        // ── User mutations ────────────────────────────────────────
        Request::CreateUser(new) => match client.create_user(&new).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::UserSaved {
                    user: Box::new(reply.value),
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::UserForm, &e),
        },

        Request::UpdateUser { id, patch } => match client.update_user(id, &patch).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::UserSaved {
                    user: Box::new(reply.value),
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::UserForm, &e),
        },

        Request::DeleteUser { id } => match client.delete_user(id).await {
            Ok(reply) => {
                let _ = action_tx.send(Action::UserDeleted {
                    id,
                    message: reply.message,
                });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::Delete, &e),
        },

        Request::FetchUserNvrs { user_id } => match client.user_nvrs(user_id).await {
            Ok(nvr_ids) => {
                let _ = action_tx.send(Action::UserNvrsLoaded { user_id, nvr_ids });
            }
            Err(e) => mutation_failed(action_tx, MutationScope::UserNvrForm, &e),
        },

        Request::SetUserNvrs { user_id, nvr_ids } => {
            match client.set_user_nvrs(user_id, &nvr_ids).await {
                Ok(reply) => {
                    let _ = action_tx.send(Action::UserNvrsSaved {
                        user_id,
                        nvr_ids: reply.value,
                        message: reply.message,
                    });
                }
                Err(e) => mutation_failed(action_tx, MutationScope::UserNvrForm, &e),
            }
        }
    }
}
