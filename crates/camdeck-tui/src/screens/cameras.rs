//! Cameras inventory — table, modal form, delete confirmation.
//!
//! The uniform CRUD shape: fetch on entry, `a` blank form, `e` the same
//! form pre-populated, submit merges the returned record into the local
//! list (append or replace-by-id), delete asks first and removes by id.
//! Server-side validation errors render inline in the form.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::{Camera, CameraPatch, NewCamera, Nvr};

use crate::action::{Action, ConfirmAction, MutationScope, Request};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::screens::merge_by_id;
use crate::theme;

// ── Form ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    DisplayName,
    RtspUrl,
    Nvr,
    Active,
}

impl FormField {
    const ALL: [FormField; 5] = [
        Self::Name,
        Self::DisplayName,
        Self::RtspUrl,
        Self::Nvr,
        Self::Active,
    ];

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct CameraForm {
    /// `None` = create, `Some(id)` = edit.
    id: Option<i64>,
    name: String,
    display_name: String,
    rtsp_url: String,
    /// 0 = standalone, 1.. = index+1 into the NVR list.
    nvr_index: usize,
    active: bool,
    field: FormField,
    error: Option<String>,
}

impl CameraForm {
    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            display_name: String::new(),
            rtsp_url: String::new(),
            nvr_index: 0,
            active: true,
            field: FormField::Name,
            error: None,
        }
    }

    fn for_edit(camera: &Camera, nvrs: &[Nvr]) -> Self {
        Self {
            id: Some(camera.id),
            name: camera.name.clone(),
            display_name: camera.display_name.clone(),
            rtsp_url: camera.rtsp_url.clone(),
            nvr_index: camera
                .nvr_id
                .and_then(|id| nvrs.iter().position(|n| n.id == id))
                .map_or(0, |pos| pos + 1),
            active: camera.active,
            field: FormField::Name,
            error: None,
        }
    }

    fn nvr_id(&self, nvrs: &[Nvr]) -> Option<i64> {
        if self.nvr_index == 0 {
            None
        } else {
            nvrs.get(self.nvr_index - 1).map(|n| n.id)
        }
    }

    fn nvr_label<'a>(&self, nvrs: &'a [Nvr]) -> &'a str {
        if self.nvr_index == 0 {
            "standalone"
        } else {
            nvrs.get(self.nvr_index - 1)
                .map_or("standalone", |n| n.display_name.as_str())
        }
    }

    /// Required-field check, mirroring the backend's own rule.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty()
            || self.display_name.trim().is_empty()
            || self.rtsp_url.trim().is_empty()
        {
            return Err("name, display name, and RTSP URL are required.".into());
        }
        Ok(())
    }
}

// ── Screen ───────────────────────────────────────────────────────────

pub struct CamerasScreen {
    action_tx: Option<UnboundedSender<Action>>,
    cameras: Vec<Camera>,
    nvrs: Vec<Nvr>,
    selected: usize,
    generation: u64,
    loading: bool,
    error: Option<String>,
    form: Option<CameraForm>,
    /// Submit in flight — form locked.
    busy: bool,
}

impl CamerasScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            cameras: Vec::new(),
            nvrs: Vec::new(),
            selected: 0,
            generation: 0,
            loading: false,
            error: None,
            form: None,
            busy: false,
        }
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchCameras {
                requester: ScreenId::Cameras,
                generation: self.generation,
            }));
            let _ = tx.send(Action::Backend(Request::FetchNvrs {
                requester: ScreenId::Cameras,
                generation: self.generation,
            }));
        }
    }

    fn selected_camera(&self) -> Option<&Camera> {
        self.cameras.get(self.selected)
    }

    fn submit(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let form = self.form.as_mut()?;
        if let Err(message) = form.validate() {
            form.error = Some(message);
            return None;
        }
        let nvr_id = form.nvr_id(&self.nvrs);
        let action = match form.id {
            None => Action::Backend(Request::CreateCamera(Box::new(NewCamera {
                name: form.name.trim().to_owned(),
                display_name: form.display_name.trim().to_owned(),
                rtsp_url: form.rtsp_url.trim().to_owned(),
                nvr_id,
                active: form.active,
            }))),
            Some(id) => Action::Backend(Request::UpdateCamera {
                id,
                patch: Box::new(CameraPatch {
                    name: Some(form.name.trim().to_owned()),
                    display_name: Some(form.display_name.trim().to_owned()),
                    rtsp_url: Some(form.rtsp_url.trim().to_owned()),
                    nvr_id: Some(nvr_id),
                    active: Some(form.active),
                }),
            }),
        };
        self.busy = true;
        Some(action)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.busy {
            return None;
        }
        let nvr_count = self.nvrs.len();
        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
            KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if matches!(form.field, FormField::Nvr | FormField::Active) =>
            {
                match form.field {
                    FormField::Nvr => {
                        let options = nvr_count + 1;
                        form.nvr_index = if key.code == KeyCode::Left {
                            (form.nvr_index + options - 1) % options
                        } else {
                            (form.nvr_index + 1) % options
                        };
                    }
                    FormField::Active => form.active = !form.active,
                    _ => {}
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = form_input_mut(form) {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = form_input_mut(form) {
                    input.push(c);
                }
            }
            _ => {}
        }
        None
    }
}

fn form_input_mut(form: &mut CameraForm) -> Option<&mut String> {
    match form.field {
        FormField::Name => Some(&mut form.name),
        FormField::DisplayName => Some(&mut form.display_name),
        FormField::RtspUrl => Some(&mut form.rtsp_url),
        FormField::Nvr | FormField::Active => None,
    }
}

impl Component for CamerasScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn on_enter(&mut self) {
        self.fetch();
    }

    fn wants_exclusive_input(&self) -> bool {
        self.form.is_some()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            return Ok(self.handle_form_key(key));
        }

        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(self.cameras.len().saturating_sub(1));
            }
            KeyCode::Char('a') => {
                self.form = Some(CameraForm::blank());
            }
            KeyCode::Char('e') => {
                if let Some(cam) = self.selected_camera() {
                    self.form = Some(CameraForm::for_edit(cam, &self.nvrs));
                }
            }
            KeyCode::Char('d') => {
                if let Some(cam) = self.selected_camera() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteCamera {
                        id: cam.id,
                        name: cam.display_name.clone(),
                    })));
                }
            }
            KeyCode::Char('R') => self.fetch(),
            KeyCode::Enter => {
                if let Some(cam) = self.selected_camera() {
                    return Ok(Some(Action::OpenCamera(cam.name.clone())));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::CamerasLoaded {
                requester: ScreenId::Cameras,
                generation,
                cameras,
            } => {
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                self.cameras = cameras.clone();
                self.selected = self.selected.min(self.cameras.len().saturating_sub(1));
            }
            Action::NvrsLoaded {
                requester: ScreenId::Cameras,
                nvrs,
                ..
            } => {
                self.nvrs = nvrs.clone();
            }
            Action::FetchFailed {
                requester: ScreenId::Cameras,
                message,
            } => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            Action::CameraSaved { camera, .. } => {
                self.busy = false;
                self.form = None;
                merge_by_id(&mut self.cameras, (**camera).clone(), |c| c.id);
            }
            Action::CameraDeleted { id, .. } => {
                self.cameras.retain(|c| c.id != *id);
                self.selected = self.selected.min(self.cameras.len().saturating_sub(1));
            }
            Action::MutationFailed {
                scope: MutationScope::CameraForm,
                message,
            } => {
                self.busy = false;
                if let Some(form) = &mut self.form {
                    form.error = Some(message.clone());
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        // Header
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} cameras", self.cameras.len()), theme::title_style()),
                Span::styled("  a", theme::key_hint_key()),
                Span::styled(" add · ", theme::key_hint()),
                Span::styled("e", theme::key_hint_key()),
                Span::styled(" edit · ", theme::key_hint()),
                Span::styled("d", theme::key_hint_key()),
                Span::styled(" delete · ", theme::key_hint()),
                Span::styled("enter", theme::key_hint_key()),
                Span::styled(" open · ", theme::key_hint()),
                Span::styled("R", theme::key_hint_key()),
                Span::styled(" refresh", theme::key_hint()),
            ])),
            rows[0],
        );

        // Column header
        frame.render_widget(
            Paragraph::new(Line::styled(
                format!(
                    "{:<5} {:<24} {:<26} {:<16} {:<4} {:<3}",
                    "ID", "NAME", "DISPLAY NAME", "NVR", "ACT", "REC"
                ),
                theme::table_header(),
            )),
            rows[1],
        );

        let body = rows[2];
        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(error.clone(), theme::error_text())),
                body,
            );
        } else if self.loading && self.cameras.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading cameras…", theme::field_label())),
                body,
            );
        } else {
            let visible = usize::from(body.height);
            let offset = self.selected.saturating_sub(visible.saturating_sub(1));
            let lines: Vec<Line> = self
                .cameras
                .iter()
                .enumerate()
                .skip(offset)
                .take(visible)
                .map(|(i, cam)| {
                    let style = if i == self.selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    Line::styled(
                        format!(
                            "{:<5} {:<24} {:<26} {:<16} {:<4} {:<3}",
                            cam.id,
                            truncate(&cam.name, 24),
                            truncate(&cam.display_name, 26),
                            truncate(cam.nvr_name.as_deref().unwrap_or("-"), 16),
                            if cam.active { "yes" } else { "no" },
                            if cam.recording_enabled { "on" } else { "-" },
                        ),
                        style,
                    )
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), body);
        }

        if self.form.is_some() {
            self.render_form(frame, area);
        }
    }

    fn id(&self) -> &str {
        "cameras"
    }
}

impl CamerasScreen {
    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = &self.form else { return };

        let width = area.width.clamp(40, 64);
        let height = 12u16.min(area.height);
        let modal = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, modal);

        let title = if form.id.is_some() {
            " Edit camera "
        } else {
            " Add camera "
        };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let field = |label: &'static str, value: String, active: bool| {
            let marker = if active { "▸ " } else { "  " };
            Line::from(vec![
                Span::styled(
                    format!("{marker}{label:<14}"),
                    if active {
                        theme::field_active()
                    } else {
                        theme::field_label()
                    },
                ),
                Span::raw(value),
            ])
        };

        let mut lines = vec![
            field("Name", form.name.clone(), form.field == FormField::Name),
            field(
                "Display name",
                form.display_name.clone(),
                form.field == FormField::DisplayName,
            ),
            field(
                "RTSP URL",
                form.rtsp_url.clone(),
                form.field == FormField::RtspUrl,
            ),
            field(
                "NVR",
                format!("‹ {} ›", form.nvr_label(&self.nvrs)),
                form.field == FormField::Nvr,
            ),
            field(
                "Active",
                if form.active { "yes" } else { "no" }.into(),
                form.field == FormField::Active,
            ),
            Line::raw(""),
        ];

        if self.busy {
            lines.push(Line::styled("Saving…", theme::field_label()));
        } else if let Some(ref error) = form.error {
            lines.push(Line::styled(error.clone(), theme::error_text()));
        } else {
            lines.push(Line::from(vec![
                Span::styled("enter", theme::key_hint_key()),
                Span::styled(" save · ", theme::key_hint()),
                Span::styled("tab", theme::key_hint_key()),
                Span::styled(" next field · ", theme::key_hint()),
                Span::styled("esc", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_owned()
    } else {
        let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(id: i64) -> Camera {
        Camera {
            id,
            name: format!("cam{id}-main"),
            display_name: format!("Cam {id}"),
            rtsp_url: "rtsp://example/1".into(),
            nvr_id: None,
            nvr_name: None,
            active: true,
            recording_enabled: false,
            is_main: true,
            is_sub: false,
        }
    }

    #[test]
    fn saved_record_appears_exactly_once() {
        let mut screen = CamerasScreen::new();
        screen.cameras = vec![cam(1), cam(2)];
        screen.form = Some(CameraForm::blank());
        screen.busy = true;

        screen
            .update(&Action::CameraSaved {
                camera: Box::new(cam(3)),
                message: Some("Camera created.".into()),
            })
            .expect("update");

        assert_eq!(screen.cameras.len(), 3);
        assert_eq!(
            screen.cameras.iter().filter(|c| c.id == 3).count(),
            1,
            "created record must appear exactly once"
        );
        assert!(screen.form.is_none(), "form closes on success");
        assert!(!screen.busy);
    }

    #[test]
    fn updated_record_replaces_in_place() {
        let mut screen = CamerasScreen::new();
        screen.cameras = vec![cam(1), cam(2)];
        let mut updated = cam(2);
        updated.display_name = "Renamed".into();

        screen
            .update(&Action::CameraSaved {
                camera: Box::new(updated),
                message: None,
            })
            .expect("update");

        assert_eq!(screen.cameras.len(), 2);
        assert_eq!(screen.cameras[1].display_name, "Renamed");
    }

    #[test]
    fn delete_removes_by_id_and_clamps_selection() {
        let mut screen = CamerasScreen::new();
        screen.cameras = vec![cam(1), cam(2)];
        screen.selected = 1;

        screen
            .update(&Action::CameraDeleted {
                id: 2,
                message: None,
            })
            .expect("update");

        assert_eq!(screen.cameras.len(), 1);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn form_validation_blocks_submit() {
        let mut screen = CamerasScreen::new();
        screen.form = Some(CameraForm::blank());
        assert!(screen.submit().is_none());
        assert!(
            screen
                .form
                .as_ref()
                .and_then(|f| f.error.as_ref())
                .is_some()
        );
        assert!(!screen.busy);
    }

    #[test]
    fn mutation_error_renders_inline_and_unlocks() {
        let mut screen = CamerasScreen::new();
        screen.form = Some(CameraForm::blank());
        screen.busy = true;

        screen
            .update(&Action::MutationFailed {
                scope: MutationScope::CameraForm,
                message: "Stream name \"x\" is already taken.".into(),
            })
            .expect("update");

        assert!(!screen.busy);
        assert_eq!(
            screen.form.as_ref().and_then(|f| f.error.as_deref()),
            Some("Stream name \"x\" is already taken.")
        );
        assert!(screen.form.is_some(), "form stays open on failure");
    }

    #[test]
    fn edit_form_prepopulates_nvr_choice() {
        let nvrs = vec![Nvr {
            id: 9,
            name: "lobby".into(),
            display_name: "Lobby".into(),
            ip_address: None,
            username: None,
            max_channels: 50,
            active: true,
            camera_count: 0,
        }];
        let mut camera = cam(1);
        camera.nvr_id = Some(9);
        let form = CameraForm::for_edit(&camera, &nvrs);
        assert_eq!(form.nvr_index, 1);
        assert_eq!(form.nvr_id(&nvrs), Some(9));
        assert_eq!(form.id, Some(1));
    }
}
