//! Application core — event loop, screen management, action dispatch.
//!
//! Every state transition flows through the action channel: key events
//! map to actions, the data bridge posts results as actions, and screens
//! request backend work by emitting `Action::Backend`. The app owns the
//! single stream viewer and releases it on every screen switch and on
//! shutdown — no orphaned gateway connections.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use camdeck_api::{ApiClient, SessionState};

use crate::action::{
    Action, ConfirmAction, Notification, NotificationLevel, Request, ViewTarget,
};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::{GuardDecision, ScreenId, guard, visible_tabs};
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::viewer::StreamViewer;

/// How long a toast stays up before auto-dismissing.
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Top-level application state and event loop.
pub struct App {
    client: Arc<ApiClient>,
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    /// Mirror of the bridge-owned session state.
    session: SessionState,
    help_visible: bool,
    terminal_size: (u16, u16),
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    request_tx: mpsc::UnboundedSender<Request>,
    request_rx: Option<mpsc::UnboundedReceiver<Request>>,
    bridge_cancel: CancellationToken,
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    viewer: StreamViewer,
    /// (online, total) from the last health snapshot, for the status bar.
    health_counts: Option<(usize, usize)>,
}

impl App {
    pub fn new(client: Arc<ApiClient>, player: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (request_tx, request_rx) = mpsc::unbounded_channel();

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        Self {
            client,
            active_screen: ScreenId::Live,
            previous_screen: None,
            screens,
            running: true,
            session: SessionState::Loading,
            help_visible: false,
            terminal_size: (0, 0),
            action_tx,
            action_rx,
            request_tx,
            request_rx: Some(request_rx),
            bridge_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            viewer: StreamViewer::new(player),
            health_counts: None,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.init_screens()?;

        // The bridge owns the session and all backend I/O.
        let request_rx = self
            .request_rx
            .take()
            .expect("bridge receiver already taken");
        let bridge_client = Arc::clone(&self.client);
        let bridge_tx = self.action_tx.clone();
        let bridge_cancel = self.bridge_cancel.clone();
        tokio::spawn(async move {
            crate::data_bridge::run_bridge(bridge_client, request_rx, bridge_tx, bridge_cancel)
                .await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let is_render = matches!(action, Action::Render);
                self.process_action(action)?;
                if is_render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        // Teardown: viewer first (release the gateway connection), then
        // the polling bridge, then the event reader.
        self.viewer.release();
        self.bridge_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Key handling ─────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C always quits, no matter what has focus.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Nothing else is meaningful until the session resolves.
        if matches!(self.session, SessionState::Loading) {
            return Ok(None);
        }

        // Login captures all keys while anonymous.
        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get_mut(&ScreenId::Login) {
                return screen.handle_key_event(key);
            }
            return Ok(None);
        }

        // Confirmation dialog captures all input.
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // A screen with an open form/modal gets every key — global
        // shortcuts must never swallow text input.
        if self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.wants_exclusive_input())
        {
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                return screen.handle_key_event(key);
            }
        }

        // Global keys.
        match key.code {
            KeyCode::Char('q') => return Ok(Some(Action::Quit)),
            KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
            KeyCode::Char('L') => {
                return Ok(Some(Action::ShowConfirm(ConfirmAction::Logout)));
            }
            KeyCode::Char('x') => return Ok(Some(Action::CloseViewer)),
            KeyCode::Tab => {
                return Ok(Some(Action::SwitchScreen(self.tab_screen().next())));
            }
            KeyCode::BackTab => {
                return Ok(Some(Action::SwitchScreen(self.tab_screen().prev())));
            }
            KeyCode::Char(c @ '1'..='5') => {
                if let Some(target) = ScreenId::from_number(c as u8 - b'0') {
                    return Ok(Some(Action::SwitchScreen(target)));
                }
            }
            _ => {}
        }

        // Delegate to the active screen.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    /// The tab-bar position Tab/BackTab cycles from (the camera detail
    /// screen cycles from Live).
    fn tab_screen(&self) -> ScreenId {
        if ScreenId::ALL.contains(&self.active_screen) {
            self.active_screen
        } else {
            ScreenId::Live
        }
    }

    // ── Action processing ────────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) -> Result<()> {
        // Screens see every action first (they filter by requester /
        // generation); follow-ups are queued behind the current drain.
        let mut follow_ups = Vec::new();
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(&action)? {
                follow_ups.push(follow_up);
            }
        }
        for follow_up in follow_ups {
            let _ = self.action_tx.send(follow_up);
        }

        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                if let Some((_, shown_at)) = &self.notification {
                    if shown_at.elapsed() > TOAST_TTL {
                        self.notification = None;
                    }
                }
                self.viewer.reap();
            }

            Action::Render => {}

            Action::Resize(w, h) => self.terminal_size = (w, h),

            // ── Navigation ───────────────────────────────────────
            Action::SwitchScreen(target) => self.try_switch(target),
            Action::OpenCamera(_) => {
                // The camera screen picked up its target from the
                // broadcast above; now bring it to front.
                self.try_switch(ScreenId::Camera);
            }
            Action::GoBack => {
                let target = self.previous_screen.unwrap_or(ScreenId::Live);
                self.try_switch(target);
            }

            // ── Backend plumbing ─────────────────────────────────
            Action::Backend(request) => {
                let _ = self.request_tx.send(request);
            }

            // ── Session ──────────────────────────────────────────
            Action::SessionChanged(state) => {
                let was_login = self.active_screen == ScreenId::Login;
                let was_loading = matches!(self.session, SessionState::Loading);
                self.session = state;
                match &self.session {
                    SessionState::Anonymous => {
                        self.viewer.release();
                        self.pending_confirm = None;
                        self.active_screen = ScreenId::Login;
                    }
                    SessionState::Authenticated(_) if was_login => {
                        self.try_switch(ScreenId::Live);
                    }
                    SessionState::Authenticated(_) if was_loading => {
                        // First resolution on startup: the initial screen
                        // was waiting for the session — mount it now.
                        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                            screen.set_focused(true);
                            screen.on_enter();
                        }
                    }
                    _ => {}
                }
            }
            Action::LoginFailed(_) | Action::BackendUnreachable(_) => {}

            // ── Data results the app itself cares about ──────────
            Action::HealthUpdated(health) => {
                let online = health.values().filter(|v| **v).count();
                self.health_counts = Some((online, health.len()));
            }
            Action::HealthUnavailable => self.health_counts = None,

            // Mutation confirmations become toasts, preferring the
            // backend's own wording.
            Action::CameraSaved { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "Camera saved.".into()),
                ));
            }
            Action::CameraDeleted { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "Camera deleted.".into()),
                ));
            }
            Action::RecordingToggled {
                enabled, message, ..
            } => {
                self.notify(Notification::success(message.unwrap_or_else(|| {
                    format!("Recording {}.", if enabled { "enabled" } else { "disabled" })
                })));
            }
            Action::NvrSaved { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "NVR saved.".into()),
                ));
            }
            Action::NvrDeleted { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "NVR deleted.".into()),
                ));
            }
            Action::NvrSynced {
                report, message, ..
            } => {
                self.notify(Notification::success(message.unwrap_or_else(|| {
                    format!(
                        "Sync complete: {} new streams, {} already existed.",
                        report.created, report.skipped
                    )
                })));
            }
            Action::UserSaved { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "User saved.".into()),
                ));
            }
            Action::UserDeleted { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "User deleted.".into()),
                ));
            }
            Action::UserNvrsSaved { message, .. } => {
                self.notify(Notification::success(
                    message.unwrap_or_else(|| "NVR access updated.".into()),
                ));
            }
            Action::MutationFailed {
                scope: crate::action::MutationScope::Delete,
                message,
            } => {
                // Deletes have no form to render into; surface as a toast.
                self.notify(Notification::error(message));
            }

            // ── Stream viewer ────────────────────────────────────
            Action::OpenViewer { title, target } => self.open_viewer(&title, &target),
            Action::CloseViewer => self.viewer.release(),

            // ── Confirm dialog ───────────────────────────────────
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    let request = match confirm {
                        ConfirmAction::DeleteCamera { id, .. } => Request::DeleteCamera { id },
                        ConfirmAction::DeleteNvr { id, .. } => Request::DeleteNvr { id },
                        ConfirmAction::DeleteUser { id, .. } => Request::DeleteUser { id },
                        ConfirmAction::Logout => Request::Logout,
                    };
                    let _ = self.request_tx.send(request);
                }
            }
            // Declined: the list stays untouched and no request is issued.
            Action::ConfirmNo => self.pending_confirm = None,

            // ── Help & notifications ─────────────────────────────
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Notify(notification) => self.notify(notification),
            Action::DismissNotification => self.notification = None,

            _ => {}
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Guarded screen switch: the single place navigation decisions land.
    fn try_switch(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        match guard(&self.session, target) {
            GuardDecision::Allow => {
                if ScreenId::ALL.contains(&self.active_screen)
                    || self.active_screen == ScreenId::Camera
                {
                    self.previous_screen = Some(self.active_screen);
                }
                // A screen switch always tears the viewer down.
                self.viewer.release();
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    screen.set_focused(false);
                }
                self.active_screen = target;
                if let Some(screen) = self.screens.get_mut(&target) {
                    screen.set_focused(true);
                    screen.on_enter();
                }
            }
            GuardDecision::Loading => {}
            GuardDecision::RedirectLogin => {
                self.active_screen = ScreenId::Login;
            }
            GuardDecision::RedirectDefault => {
                self.notify(Notification::warning("Admin access required"));
                self.try_switch(ScreenId::Live);
            }
        }
    }

    fn open_viewer(&mut self, title: &str, target: &ViewTarget) {
        let url = match target {
            ViewTarget::Stream { key, mode } => self.client.stream_page_url(key, *mode),
            ViewTarget::Recording { path } => match self.client.base_url().join(path) {
                Ok(url) => url,
                Err(e) => {
                    self.notify(Notification::error(format!("Bad recording URL: {e}")));
                    return;
                }
            },
        };
        match self.viewer.open(title, &url) {
            Ok(()) => self.notify(Notification::info(format!("Playing {title}"))),
            Err(e) => self.notify(Notification::error(format!("Failed to launch player: {e}"))),
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if matches!(self.session, SessionState::Loading) {
            let block = Block::default()
                .title(Span::styled(" camdeck ", theme::title_style()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default());
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Line::styled("Resolving session…", theme::field_label()))
                    .alignment(ratatui::layout::Alignment::Center),
                inner,
            );
            return;
        }

        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
            self.render_toast(frame, area);
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_tab_bar(frame, rows[0]);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, rows[1]);
        }

        self.render_status_bar(frame, rows[2]);

        if self.help_visible {
            self.render_help(frame, area);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm(frame, area, confirm);
        }
        self.render_toast(frame, area);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let compact = self.terminal_size.0 < 90;
        let mut spans = vec![Span::styled(" camdeck ", theme::title_style())];
        for tab in visible_tabs(&self.session) {
            let label = if compact { tab.label_short() } else { tab.label() };
            let style = if tab == self.active_screen
                || (tab == ScreenId::Live && self.active_screen == ScreenId::Camera)
            {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            spans.push(Span::styled(format!(" {} {label} ", tab.number()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit · ", theme::key_hint()),
            Span::styled("?", theme::key_hint_key()),
            Span::styled(" help · ", theme::key_hint()),
            Span::styled("L", theme::key_hint_key()),
            Span::styled(" logout", theme::key_hint()),
        ];

        if let Some(title) = self.viewer.active_title() {
            spans.push(Span::styled("   ▶ ", theme::tab_active()));
            spans.push(Span::styled(title.to_owned(), theme::tab_active()));
        }

        match self.health_counts {
            Some((online, total)) => {
                spans.push(Span::styled(
                    format!("   {online}/{total} streams online"),
                    theme::key_hint(),
                ));
            }
            None => {
                spans.push(Span::styled("   health unknown", theme::key_hint()));
            }
        }

        if let SessionState::Authenticated(user) = &self.session {
            spans.push(Span::styled(
                format!("   {} ({})", user.username, user.role),
                theme::key_hint(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.clamp(30, 52);
        let height = 14u16.min(area.height);
        let modal = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, modal);
        let block = Block::default()
            .title(Span::styled(" Keys ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let entry = |key: &'static str, desc: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<8}"), theme::key_hint_key()),
                Span::styled(desc, theme::key_hint()),
            ])
        };
        frame.render_widget(
            Paragraph::new(vec![
                entry("1-5", "switch screen"),
                entry("tab", "next screen"),
                entry("↑↓←→", "move selection"),
                entry("enter", "open / play / submit"),
                entry("g", "cycle grid size (live)"),
                entry("n / p", "next / previous page (live)"),
                entry("a e d", "add / edit / delete (inventories)"),
                entry("s", "sync NVR channels"),
                entry("r", "toggle recording (camera view)"),
                entry("x", "close the stream player"),
                entry("R", "refresh"),
                entry("L", "logout"),
                entry("esc", "back / close"),
            ]),
            inner,
        );
    }

    fn render_toast(&self, frame: &mut Frame, area: Rect) {
        let Some((notification, _)) = &self.notification else {
            return;
        };
        let text_width = notification.message.chars().count() as u16 + 4;
        let width = text_width.min(area.width.saturating_sub(2)).max(10);
        let toast = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y + area.height.saturating_sub(4),
            width,
            3,
        );
        frame.render_widget(Clear, toast);
        let color = match notification.level {
            NotificationLevel::Success => theme::OK_GREEN,
            NotificationLevel::Error => theme::ALERT_RED,
            NotificationLevel::Warning => theme::AMBER,
            NotificationLevel::Info => theme::ACCENT_BLUE,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(ratatui::style::Style::default().fg(color));
        let inner = block.inner(toast);
        frame.render_widget(block, toast);
        frame.render_widget(
            Paragraph::new(Line::styled(
                notification.message.clone(),
                ratatui::style::Style::default().fg(color),
            )),
            inner,
        );
    }
}

fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let message = confirm.to_string();
    let width = (message.chars().count() as u16 + 6).clamp(24, area.width.saturating_sub(2));
    let modal = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(5) / 2,
        width,
        5,
    );
    frame.render_widget(Clear, modal);
    let block = Block::default()
        .title(Span::styled(" Confirm ", theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());
    let inner = block.inner(modal);
    frame.render_widget(block, modal);
    frame.render_widget(
        Paragraph::new(vec![
            Line::raw(message),
            Line::from(vec![
                Span::styled("y", theme::key_hint_key()),
                Span::styled(" confirm · ", theme::key_hint()),
                Span::styled("n", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]),
        ]),
        inner,
    );
}
