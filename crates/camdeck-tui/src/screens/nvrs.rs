//! NVR inventory — table, modal form, channel sync.
//!
//! Sync is a long-running remote import; it is represented client-side
//! only as a disabled control with a spinner. The resulting
//! created/skipped report surfaces as a toast and triggers a full list
//! refetch to reconcile the cameras it produced.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::{NewNvr, Nvr, NvrPatch};

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
    IpAddress,
    Username,
    Password,
    MaxChannels,
    Active,
}

impl FormField {
    const ALL: [FormField; 7] = [
        Self::Name,
        Self::DisplayName,
        Self::IpAddress,
        Self::Username,
        Self::Password,
        Self::MaxChannels,
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

struct NvrForm {
    id: Option<i64>,
    name: String,
    display_name: String,
    ip_address: String,
    username: String,
    /// Always blank on edit; a blank password leaves the stored one alone.
    password: String,
    max_channels: String,
    active: bool,
    field: FormField,
    error: Option<String>,
}

impl NvrForm {
    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            display_name: String::new(),
            ip_address: String::new(),
            username: String::new(),
            password: String::new(),
            max_channels: "50".into(),
            active: true,
            field: FormField::Name,
            error: None,
        }
    }

    fn for_edit(nvr: &Nvr) -> Self {
        Self {
            id: Some(nvr.id),
            name: nvr.name.clone(),
            display_name: nvr.display_name.clone(),
            ip_address: nvr.ip_address.clone().unwrap_or_default(),
            username: nvr.username.clone().unwrap_or_default(),
            password: String::new(),
            max_channels: nvr.max_channels.to_string(),
            active: nvr.active,
            field: FormField::Name,
            error: None,
        }
    }

    fn validate(&self) -> std::result::Result<u32, String> {
        if self.name.trim().is_empty() || self.display_name.trim().is_empty() {
            return Err("name and display name are required.".into());
        }
        self.max_channels
            .trim()
            .parse::<u32>()
            .map_err(|_| "max channels must be a number.".into())
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Name => Some(&mut self.name),
            FormField::DisplayName => Some(&mut self.display_name),
            FormField::IpAddress => Some(&mut self.ip_address),
            FormField::Username => Some(&mut self.username),
            FormField::Password => Some(&mut self.password),
            FormField::MaxChannels => Some(&mut self.max_channels),
            FormField::Active => None,
        }
    }
}

fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

// ── Screen ───────────────────────────────────────────────────────────

pub struct NvrsScreen {
    action_tx: Option<UnboundedSender<Action>>,
    nvrs: Vec<Nvr>,
    selected: usize,
    generation: u64,
    loading: bool,
    error: Option<String>,
    form: Option<NvrForm>,
    busy: bool,
    /// NVR id with a sync in flight — its control is disabled.
    syncing: Option<i64>,
}

impl NvrsScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            nvrs: Vec::new(),
            selected: 0,
            generation: 0,
            loading: false,
            error: None,
            form: None,
            busy: false,
            syncing: None,
        }
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchNvrs {
                requester: ScreenId::Nvrs,
                generation: self.generation,
            }));
        }
    }

    fn selected_nvr(&self) -> Option<&Nvr> {
        self.nvrs.get(self.selected)
    }

    fn submit(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let form = self.form.as_mut()?;
        let max_channels = match form.validate() {
            Ok(v) => v,
            Err(message) => {
                form.error = Some(message);
                return None;
            }
        };
        let action = match form.id {
            None => Action::Backend(Request::CreateNvr(Box::new(NewNvr {
                name: form.name.trim().to_owned(),
                display_name: form.display_name.trim().to_owned(),
                ip_address: opt(&form.ip_address),
                username: opt(&form.username),
                password: opt(&form.password),
                max_channels,
            }))),
            Some(id) => Action::Backend(Request::UpdateNvr {
                id,
                patch: Box::new(NvrPatch {
                    name: Some(form.name.trim().to_owned()),
                    display_name: Some(form.display_name.trim().to_owned()),
                    ip_address: opt(&form.ip_address),
                    username: opt(&form.username),
                    // Blank password means "keep the stored one".
                    password: opt(&form.password),
                    max_channels: Some(max_channels),
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
        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
            KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if form.field == FormField::Active =>
            {
                form.active = !form.active;
            }
            KeyCode::Backspace => {
                if let Some(input) = form.input_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = form.input_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        None
    }
}

impl Component for NvrsScreen {
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
                self.selected = (self.selected + 1).min(self.nvrs.len().saturating_sub(1));
            }
            KeyCode::Char('a') => self.form = Some(NvrForm::blank()),
            KeyCode::Char('e') => {
                if let Some(nvr) = self.selected_nvr() {
                    self.form = Some(NvrForm::for_edit(nvr));
                }
            }
            KeyCode::Char('d') => {
                if let Some(nvr) = self.selected_nvr() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteNvr {
                        id: nvr.id,
                        name: nvr.display_name.clone(),
                        camera_count: nvr.camera_count,
                    })));
                }
            }
            KeyCode::Char('s') => {
                // One sync at a time; the control stays disabled until the
                // report comes back.
                if self.syncing.is_none() {
                    if let Some(id) = self.selected_nvr().map(|nvr| nvr.id) {
                        self.syncing = Some(id);
                        return Ok(Some(Action::Backend(Request::SyncNvr { id })));
                    }
                }
            }
            KeyCode::Char('R') => self.fetch(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::NvrsLoaded {
                requester: ScreenId::Nvrs,
                generation,
                nvrs,
            } => {
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                self.nvrs = nvrs.clone();
                self.selected = self.selected.min(self.nvrs.len().saturating_sub(1));
            }
            Action::FetchFailed {
                requester: ScreenId::Nvrs,
                message,
            } => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            Action::NvrSaved { nvr, .. } => {
                self.busy = false;
                self.form = None;
                merge_by_id(&mut self.nvrs, (**nvr).clone(), |n| n.id);
            }
            Action::NvrDeleted { id, .. } => {
                self.nvrs.retain(|n| n.id != *id);
                self.selected = self.selected.min(self.nvrs.len().saturating_sub(1));
            }
            Action::NvrSynced { .. } => {
                // Counts surface as a toast at the app level; the refetch
                // reconciles camera_count for the synced recorder.
                self.syncing = None;
                self.fetch();
            }
            Action::MutationFailed { scope, message } => match scope {
                MutationScope::NvrForm => {
                    self.busy = false;
                    if let Some(form) = &mut self.form {
                        form.error = Some(message.clone());
                    }
                }
                MutationScope::NvrSync => {
                    self.syncing = None;
                    self.error = Some(message.clone());
                }
                _ => {}
            },
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

        let mut header = vec![
            Span::styled(format!("{} NVRs", self.nvrs.len()), theme::title_style()),
            Span::styled("  a", theme::key_hint_key()),
            Span::styled(" add · ", theme::key_hint()),
            Span::styled("e", theme::key_hint_key()),
            Span::styled(" edit · ", theme::key_hint()),
            Span::styled("d", theme::key_hint_key()),
            Span::styled(" delete · ", theme::key_hint()),
            Span::styled("s", theme::key_hint_key()),
            Span::styled(" sync · ", theme::key_hint()),
            Span::styled("R", theme::key_hint_key()),
            Span::styled(" refresh", theme::key_hint()),
        ];
        if self.syncing.is_some() {
            header.push(Span::styled("   syncing channels…", theme::field_label()));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), rows[0]);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!(
                    "{:<5} {:<16} {:<22} {:<16} {:>8} {:>8} {:<4}",
                    "ID", "NAME", "DISPLAY NAME", "IP", "CHANNELS", "CAMERAS", "ACT"
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
        } else if self.loading && self.nvrs.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading NVRs…", theme::field_label())),
                body,
            );
        } else {
            let lines: Vec<Line> = self
                .nvrs
                .iter()
                .enumerate()
                .map(|(i, nvr)| {
                    let style = if i == self.selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    let sync_marker = if self.syncing == Some(nvr.id) { " ⟳" } else { "" };
                    Line::styled(
                        format!(
                            "{:<5} {:<16} {:<22} {:<16} {:>8} {:>8} {:<4}{sync_marker}",
                            nvr.id,
                            nvr.name,
                            nvr.display_name,
                            nvr.ip_address.as_deref().unwrap_or("-"),
                            nvr.max_channels,
                            nvr.camera_count,
                            if nvr.active { "yes" } else { "no" },
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
        "nvrs"
    }
}

impl NvrsScreen {
    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = &self.form else { return };

        let width = area.width.clamp(40, 64);
        let height = 14u16.min(area.height);
        let modal = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, modal);

        let title = if form.id.is_some() {
            " Edit NVR "
        } else {
            " Add NVR "
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

        let password_display = if form.password.is_empty() && form.id.is_some() {
            "(unchanged)".to_owned()
        } else {
            "•".repeat(form.password.chars().count())
        };

        let mut lines = vec![
            field("Name", form.name.clone(), form.field == FormField::Name),
            field(
                "Display name",
                form.display_name.clone(),
                form.field == FormField::DisplayName,
            ),
            field(
                "IP address",
                form.ip_address.clone(),
                form.field == FormField::IpAddress,
            ),
            field(
                "Username",
                form.username.clone(),
                form.field == FormField::Username,
            ),
            field(
                "Password",
                password_display,
                form.field == FormField::Password,
            ),
            field(
                "Max channels",
                form.max_channels.clone(),
                form.field == FormField::MaxChannels,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn nvr(id: i64) -> Nvr {
        Nvr {
            id,
            name: format!("nvr{id}"),
            display_name: format!("Recorder {id}"),
            ip_address: Some("10.0.0.2".into()),
            username: Some("admin".into()),
            max_channels: 50,
            active: true,
            camera_count: 100,
        }
    }

    #[test]
    fn sync_control_is_single_in_flight() {
        let mut screen = NvrsScreen::new();
        screen.nvrs = vec![nvr(1)];
        screen.syncing = Some(1);

        // A second `s` press while syncing must not issue another request.
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('s')))
            .expect("key");
        assert!(action.is_none());
    }

    #[test]
    fn sync_report_clears_busy_and_refetches() {
        let mut screen = NvrsScreen::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        screen.action_tx = Some(tx);
        screen.nvrs = vec![nvr(1)];
        screen.syncing = Some(1);
        let gen_before = screen.generation;

        screen
            .update(&Action::NvrSynced {
                id: 1,
                report: camdeck_api::SyncReport {
                    created: 4,
                    skipped: 96,
                },
                message: None,
            })
            .expect("update");

        assert!(screen.syncing.is_none());
        assert!(screen.generation > gen_before, "refetch was issued");
        assert!(matches!(
            rx.try_recv(),
            Ok(Action::Backend(Request::FetchNvrs { .. }))
        ));
    }

    #[test]
    fn blank_password_on_edit_keeps_stored_one() {
        let form = NvrForm::for_edit(&nvr(1));
        assert!(form.password.is_empty());
        assert_eq!(opt(&form.password), None);
    }

    #[test]
    fn max_channels_must_be_numeric() {
        let mut form = NvrForm::blank();
        form.name = "lobby".into();
        form.display_name = "Lobby".into();
        form.max_channels = "lots".into();
        assert!(form.validate().is_err());
        form.max_channels = "32".into();
        assert_eq!(form.validate().expect("valid"), 32);
    }
}
