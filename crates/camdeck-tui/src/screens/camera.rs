//! Single-camera view — resolved by stream name from the camera list.
//!
//! Not-found is a terminal rendered state, not an error to retry. For
//! admin sessions the recording toggle calls the backend and adopts the
//! boolean the server returns; the control is disabled while the request
//! is in flight.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::{Camera, Capability, HealthMap, SessionState, ViewMode, session::state_allows};

use crate::action::{Action, MutationScope, Request, ViewTarget};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::status_dot;

pub struct CameraScreen {
    action_tx: Option<UnboundedSender<Action>>,
    /// Stream name this view was opened for.
    target: Option<String>,
    camera: Option<Camera>,
    not_found: bool,
    loading: bool,
    health: Option<HealthMap>,
    session: SessionState,
    /// Recording toggle in flight — control disabled.
    toggle_busy: bool,
    toggle_error: Option<String>,
    generation: u64,
}

impl CameraScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            target: None,
            camera: None,
            not_found: false,
            loading: false,
            health: None,
            session: SessionState::Loading,
            toggle_busy: false,
            toggle_error: None,
            generation: 0,
        }
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.not_found = false;
        self.camera = None;
        self.toggle_error = None;
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchCameras {
                requester: ScreenId::Camera,
                generation: self.generation,
            }));
            let _ = tx.send(Action::Backend(Request::FetchHealth));
        }
    }

    fn can_toggle(&self) -> bool {
        state_allows(&self.session, Capability::ToggleRecording)
    }

    /// Sub-stream health first, falling back to main — matching how the
    /// backend registers imported pairs.
    fn online(&self) -> Option<bool> {
        let camera = self.camera.as_ref()?;
        let pair = camera.stream_pair();
        let health = self.health.as_ref()?;
        health
            .get(&pair.sub)
            .or_else(|| health.get(&pair.main))
            .copied()
    }
}

impl Component for CameraScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn on_enter(&mut self) {
        if self.target.is_some() {
            self.fetch();
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => return Ok(Some(Action::GoBack)),
            KeyCode::Char('R') => self.fetch(),
            KeyCode::Enter | KeyCode::Char('v') => {
                if let Some(cam) = &self.camera {
                    // Detail view always plays the full main stream.
                    return Ok(Some(Action::OpenViewer {
                        title: cam.label(),
                        target: ViewTarget::Stream {
                            key: cam.stream_pair().main,
                            mode: ViewMode::Mse,
                        },
                    }));
                }
            }
            KeyCode::Char('r') => {
                if self.toggle_busy || !self.can_toggle() {
                    return Ok(None);
                }
                if let Some(cam) = &self.camera {
                    self.toggle_busy = true;
                    self.toggle_error = None;
                    return Ok(Some(Action::Backend(Request::SetRecording {
                        id: cam.id,
                        enabled: !cam.recording_enabled,
                    })));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OpenCamera(name) => {
                self.target = Some(name.clone());
                self.camera = None;
                self.not_found = false;
                self.toggle_busy = false;
                self.toggle_error = None;
            }
            Action::SessionChanged(state) => {
                self.session = state.clone();
            }
            Action::CamerasLoaded {
                requester: ScreenId::Camera,
                generation,
                cameras,
            } => {
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                match self
                    .target
                    .as_ref()
                    .and_then(|name| cameras.iter().find(|c| &c.name == name))
                {
                    Some(cam) => self.camera = Some(cam.clone()),
                    None => self.not_found = true,
                }
            }
            Action::FetchFailed {
                requester: ScreenId::Camera,
                message,
            } => {
                self.loading = false;
                self.toggle_error = Some(message.clone());
            }
            Action::HealthUpdated(health) => self.health = Some(health.clone()),
            Action::HealthUnavailable => self.health = None,
            Action::RecordingToggled { id, enabled, .. } => {
                if let Some(cam) = &mut self.camera {
                    if cam.id == *id {
                        self.toggle_busy = false;
                        // The server's flag wins over the requested one.
                        cam.recording_enabled = *enabled;
                    }
                }
            }
            Action::MutationFailed {
                scope: MutationScope::RecordingToggle,
                message,
            } => {
                self.toggle_busy = false;
                self.toggle_error = Some(message.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.loading {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading…", theme::field_label())),
                area,
            );
            return;
        }

        if self.not_found {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::raw(""),
                    Line::styled("Camera not found.", theme::error_text()),
                    Line::styled("esc back to Live View", theme::key_hint()),
                ]),
                area,
            );
            return;
        }

        let Some(cam) = &self.camera else {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "No camera selected — open one from a list.",
                    theme::field_label(),
                )),
                area,
            );
            return;
        };

        let rows = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).split(area);

        // Header: label, NVR, status badge, recording state
        let online = self.online();
        let mut header = vec![
            Span::styled(cam.label(), theme::title_style()),
            Span::raw("  "),
            status_dot::status_span(online),
            Span::styled(
                format!(" {}", status_dot::status_label(online)),
                theme::table_row(),
            ),
        ];
        if let Some(ref nvr) = cam.nvr_name {
            header.push(Span::styled(format!("  ·  {nvr}"), theme::key_hint()));
        }
        header.push(Span::styled(
            format!(
                "  ·  recording {}",
                if cam.recording_enabled { "on" } else { "off" }
            ),
            if cam.recording_enabled {
                theme::error_text()
            } else {
                theme::key_hint()
            },
        ));
        frame.render_widget(Paragraph::new(Line::from(header)), rows[0]);

        // Body panel
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default())
            .title(Span::styled(" Main stream ", theme::title_style()));
        let inner = block.inner(rows[1]);
        frame.render_widget(block, rows[1]);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("stream   ", theme::field_label()),
                Span::raw(cam.stream_pair().main),
            ]),
            Line::from(vec![
                Span::styled("source   ", theme::field_label()),
                Span::raw(cam.rtsp_url.clone()),
            ]),
            Line::raw(""),
        ];

        if online == Some(false) {
            lines.push(Line::styled("Camera offline", theme::error_text()));
            lines.push(Line::raw(""));
        }

        let mut hints = vec![
            Span::styled("enter", theme::key_hint_key()),
            Span::styled(" play · ", theme::key_hint()),
        ];
        if self.can_toggle() {
            if self.toggle_busy {
                hints.push(Span::styled("toggling recording… · ", theme::field_label()));
            } else {
                hints.push(Span::styled("r", theme::key_hint_key()));
                hints.push(Span::styled(
                    if cam.recording_enabled {
                        " stop recording · "
                    } else {
                        " start recording · "
                    },
                    theme::key_hint(),
                ));
            }
        }
        hints.push(Span::styled("esc", theme::key_hint_key()));
        hints.push(Span::styled(" back", theme::key_hint()));
        lines.push(Line::from(hints));

        if let Some(ref error) = self.toggle_error {
            lines.push(Line::styled(error.clone(), theme::error_text()));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn id(&self) -> &str {
        "camera"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_api::{Role, User};

    fn cam(name: &str, recording: bool) -> Camera {
        Camera {
            id: 7,
            name: name.into(),
            display_name: "Lobby — Ch 1 Main".into(),
            rtsp_url: "rtsp://example/101".into(),
            nvr_id: Some(1),
            nvr_name: Some("Lobby".into()),
            active: true,
            recording_enabled: recording,
            is_main: true,
            is_sub: false,
        }
    }

    fn authed(role: Role) -> SessionState {
        SessionState::Authenticated(User {
            id: 1,
            username: "op".into(),
            role,
        })
    }

    fn loaded(screen: &mut CameraScreen, cameras: Vec<Camera>) {
        screen.generation += 1;
        let generation = screen.generation;
        screen
            .update(&Action::CamerasLoaded {
                requester: ScreenId::Camera,
                generation,
                cameras,
            })
            .expect("update");
    }

    #[test]
    fn unknown_name_is_terminal_not_found() {
        let mut screen = CameraScreen::new();
        screen.target = Some("ghost-main".into());
        loaded(&mut screen, vec![cam("lobby-ch1-main", false)]);
        assert!(screen.not_found);
        assert!(screen.camera.is_none());
    }

    #[test]
    fn toggle_adopts_server_flag_not_requested_one() {
        let mut screen = CameraScreen::new();
        screen.target = Some("lobby-ch1-main".into());
        screen.session = authed(Role::Admin);
        loaded(&mut screen, vec![cam("lobby-ch1-main", false)]);
        screen.toggle_busy = true;

        // The UI asked for `true`, but the server stored `false`.
        screen
            .update(&Action::RecordingToggled {
                id: 7,
                enabled: false,
                message: None,
            })
            .expect("update");

        assert!(!screen.toggle_busy);
        assert_eq!(
            screen.camera.as_ref().map(|c| c.recording_enabled),
            Some(false)
        );
    }

    #[test]
    fn viewer_role_cannot_toggle() {
        let mut screen = CameraScreen::new();
        screen.session = authed(Role::Viewer);
        assert!(!screen.can_toggle());
        screen.session = authed(Role::Admin);
        assert!(screen.can_toggle());
    }

    #[test]
    fn stale_camera_list_is_dropped() {
        let mut screen = CameraScreen::new();
        screen.target = Some("lobby-ch1-main".into());
        screen.generation = 5;
        screen
            .update(&Action::CamerasLoaded {
                requester: ScreenId::Camera,
                generation: 4, // superseded
                cameras: vec![cam("lobby-ch1-main", false)],
            })
            .expect("update");
        assert!(screen.camera.is_none());
        assert!(!screen.not_found);
    }
}
