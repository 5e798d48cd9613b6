//! Login screen — captures all input while the session is anonymous.
//!
//! A failed login renders the backend's error inline and leaves the
//! session untouched; the submit control is disabled while a login is in
//! flight.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::SessionState;

use crate::action::{Action, Request};
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

pub struct LoginScreen {
    action_tx: Option<UnboundedSender<Action>>,
    username: String,
    password: String,
    active_field: Field,
    busy: bool,
    error: Option<String>,
    /// Connectivity notice from a failed session resume — the backend may
    /// simply be down, which is different from being logged out.
    notice: Option<String>,
    throbber: throbber_widgets_tui::ThrobberState,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            username: String::new(),
            password: String::new(),
            active_field: Field::Username,
            busy: false,
            error: None,
            notice: None,
            throbber: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Username and password are required.".into());
            return None;
        }
        self.busy = true;
        self.error = None;
        Some(Action::Backend(Request::Login {
            username: self.username.trim().to_owned(),
            password: secrecy::SecretString::from(self.password.clone()),
        }))
    }

    fn active_input_mut(&mut self) -> &mut String {
        match self.active_field {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                self.active_field = match self.active_field {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
                Ok(None)
            }
            KeyCode::Enter => Ok(self.submit()),
            KeyCode::Backspace => {
                if !self.busy {
                    self.active_input_mut().pop();
                }
                Ok(None)
            }
            KeyCode::Char(c) => {
                if !self.busy {
                    self.active_input_mut().push(c);
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoginFailed(message) => {
                self.busy = false;
                self.error = Some(message.clone());
            }
            Action::SessionChanged(SessionState::Authenticated(_)) => {
                self.busy = false;
                self.error = None;
                self.notice = None;
                self.username.clear();
                self.password.clear();
                self.active_field = Field::Username;
            }
            Action::BackendUnreachable(message) => {
                self.notice = Some(format!("Backend unreachable: {message}"));
            }
            Action::Tick => {
                if self.busy {
                    self.throbber.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        // Centered card
        let card_width = area.width.clamp(30, 56);
        let card_height = 13u16.min(area.height);
        let h_pad = area.width.saturating_sub(card_width) / 2;
        let v_pad = area.height.saturating_sub(card_height) / 2;
        let card = Rect::new(area.x + h_pad, area.y + v_pad, card_width, card_height);

        frame.render_widget(Clear, card);
        let block = Block::default()
            .title(Span::styled(" camdeck ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let rows = Layout::vertical([
            Constraint::Length(1), // subtitle
            Constraint::Length(1),
            Constraint::Length(1), // username
            Constraint::Length(1), // password
            Constraint::Length(1),
            Constraint::Length(1), // status line
            Constraint::Length(1), // notice
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::styled("NVR console sign-in", theme::field_label()))
                .alignment(Alignment::Center),
            rows[0],
        );

        let field_line = |label: &'static str, value: String, active: bool| {
            let label_style = if active {
                theme::field_active()
            } else {
                theme::field_label()
            };
            let marker = if active { "▸ " } else { "  " };
            Line::from(vec![
                Span::styled(format!("{marker}{label:<10}"), label_style),
                Span::raw(value),
            ])
        };

        frame.render_widget(
            Paragraph::new(field_line(
                "Username",
                self.username.clone(),
                self.active_field == Field::Username,
            )),
            rows[2],
        );
        frame.render_widget(
            Paragraph::new(field_line(
                "Password",
                "•".repeat(self.password.chars().count()),
                self.active_field == Field::Password,
            )),
            rows[3],
        );

        if self.busy {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("Signing in…")
                .style(theme::field_label());
            frame.render_stateful_widget(throbber, rows[5], &mut self.throbber.clone());
        } else if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(error.clone(), theme::error_text())),
                rows[5],
            );
        }

        if let Some(ref notice) = self.notice {
            frame.render_widget(
                Paragraph::new(Line::styled(notice.clone(), theme::field_label())),
                rows[6],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("tab", theme::key_hint_key()),
                Span::styled(" switch · ", theme::key_hint()),
                Span::styled("enter", theme::key_hint_key()),
                Span::styled(" sign in · ", theme::key_hint()),
                Span::styled("ctrl+c", theme::key_hint_key()),
                Span::styled(" quit", theme::key_hint()),
            ]))
            .alignment(Alignment::Center),
            rows[8],
        );
    }

    fn id(&self) -> &str {
        "login"
    }
}
