//! User accounts — table, modal form, per-user NVR access.
//!
//! Same CRUD shape as the other inventories, plus a checklist sub-modal
//! replacing a viewer account's full NVR assignment set (admins always
//! have full access, so the backend rejects assignments for them).

use std::collections::HashSet;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::{NewUser, Nvr, Role, User, UserPatch};

use crate::action::{Action, ConfirmAction, MutationScope, Request};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::screens::merge_by_id;
use crate::theme;

// ── Account form ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Username,
    Password,
    Role,
}

impl FormField {
    const ALL: [FormField; 3] = [Self::Username, Self::Password, Self::Role];

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct UserForm {
    id: Option<i64>,
    username: String,
    /// Blank on edit = keep the stored password.
    password: String,
    role: Role,
    field: FormField,
    error: Option<String>,
}

impl UserForm {
    fn blank() -> Self {
        Self {
            id: None,
            username: String::new(),
            password: String::new(),
            role: Role::Viewer,
            field: FormField::Username,
            error: None,
        }
    }

    fn for_edit(user: &User) -> Self {
        Self {
            id: Some(user.id),
            username: user.username.clone(),
            password: String::new(),
            role: user.role,
            field: FormField::Username,
            error: None,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username is required.".into());
        }
        if self.id.is_none() && self.password.is_empty() {
            return Err("password is required for a new account.".into());
        }
        Ok(())
    }
}

// ── Assignment modal ─────────────────────────────────────────────────

struct AssignmentModal {
    user_id: i64,
    username: String,
    /// Loaded from the backend before the modal is interactive.
    loading: bool,
    checked: HashSet<i64>,
    cursor: usize,
    error: Option<String>,
}

// ── Screen ───────────────────────────────────────────────────────────

pub struct UsersScreen {
    action_tx: Option<UnboundedSender<Action>>,
    users: Vec<User>,
    nvrs: Vec<Nvr>,
    selected: usize,
    generation: u64,
    loading: bool,
    error: Option<String>,
    form: Option<UserForm>,
    assignments: Option<AssignmentModal>,
    busy: bool,
}

impl UsersScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            users: Vec::new(),
            nvrs: Vec::new(),
            selected: 0,
            generation: 0,
            loading: false,
            error: None,
            form: None,
            assignments: None,
            busy: false,
        }
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchUsers {
                requester: ScreenId::Users,
                generation: self.generation,
            }));
            let _ = tx.send(Action::Backend(Request::FetchNvrs {
                requester: ScreenId::Users,
                generation: self.generation,
            }));
        }
    }

    fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    fn submit_form(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        let form = self.form.as_mut()?;
        if let Err(message) = form.validate() {
            form.error = Some(message);
            return None;
        }
        let action = match form.id {
            None => Action::Backend(Request::CreateUser(Box::new(NewUser {
                username: form.username.trim().to_owned(),
                password: form.password.clone(),
                role: form.role,
            }))),
            Some(id) => Action::Backend(Request::UpdateUser {
                id,
                patch: Box::new(UserPatch {
                    username: Some(form.username.trim().to_owned()),
                    password: if form.password.is_empty() {
                        None
                    } else {
                        Some(form.password.clone())
                    },
                    role: Some(form.role),
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
            KeyCode::Enter => return self.submit_form(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if form.field == FormField::Role =>
            {
                form.role = match form.role {
                    Role::Admin => Role::Viewer,
                    Role::Viewer => Role::Admin,
                };
            }
            KeyCode::Backspace => match form.field {
                FormField::Username => {
                    form.username.pop();
                }
                FormField::Password => {
                    form.password.pop();
                }
                FormField::Role => {}
            },
            KeyCode::Char(c) => match form.field {
                FormField::Username => form.username.push(c),
                FormField::Password => form.password.push(c),
                FormField::Role => {}
            },
            _ => {}
        }
        None
    }

    fn handle_assignment_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.busy {
            return None;
        }
        let nvr_count = self.nvrs.len();
        let modal = self.assignments.as_mut()?;
        match key.code {
            KeyCode::Esc => self.assignments = None,
            KeyCode::Up => modal.cursor = modal.cursor.saturating_sub(1),
            KeyCode::Down => {
                modal.cursor = (modal.cursor + 1).min(nvr_count.saturating_sub(1));
            }
            KeyCode::Char(' ') => {
                if !modal.loading {
                    if let Some(nvr) = self.nvrs.get(modal.cursor) {
                        if !modal.checked.insert(nvr.id) {
                            modal.checked.remove(&nvr.id);
                        }
                    }
                }
            }
            KeyCode::Enter => {
                if !modal.loading {
                    self.busy = true;
                    let mut nvr_ids: Vec<i64> = modal.checked.iter().copied().collect();
                    nvr_ids.sort_unstable();
                    return Some(Action::Backend(Request::SetUserNvrs {
                        user_id: modal.user_id,
                        nvr_ids,
                    }));
                }
            }
            _ => {}
        }
        None
    }
}

impl Component for UsersScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn on_enter(&mut self) {
        self.fetch();
    }

    fn wants_exclusive_input(&self) -> bool {
        self.form.is_some() || self.assignments.is_some()
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.assignments.is_some() {
            return Ok(self.handle_assignment_key(key));
        }
        if self.form.is_some() {
            return Ok(self.handle_form_key(key));
        }

        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(self.users.len().saturating_sub(1));
            }
            KeyCode::Char('a') => self.form = Some(UserForm::blank()),
            KeyCode::Char('e') => {
                if let Some(user) = self.selected_user() {
                    self.form = Some(UserForm::for_edit(user));
                }
            }
            KeyCode::Char('d') => {
                if let Some(user) = self.selected_user() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteUser {
                        id: user.id,
                        username: user.username.clone(),
                    })));
                }
            }
            KeyCode::Char('n') => {
                // NVR assignments apply to viewer accounts only.
                if let Some((user_id, username)) = self
                    .selected_user()
                    .filter(|user| user.role == Role::Viewer)
                    .map(|user| (user.id, user.username.clone()))
                {
                    self.assignments = Some(AssignmentModal {
                        user_id,
                        username,
                        loading: true,
                        checked: HashSet::new(),
                        cursor: 0,
                        error: None,
                    });
                    return Ok(Some(Action::Backend(Request::FetchUserNvrs {
                        user_id,
                    })));
                }
            }
            KeyCode::Char('R') => self.fetch(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::UsersLoaded {
                requester: ScreenId::Users,
                generation,
                users,
            } => {
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                self.users = users.clone();
                self.selected = self.selected.min(self.users.len().saturating_sub(1));
            }
            Action::NvrsLoaded {
                requester: ScreenId::Users,
                nvrs,
                ..
            } => {
                self.nvrs = nvrs.clone();
            }
            Action::FetchFailed {
                requester: ScreenId::Users,
                message,
            } => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            Action::UserSaved { user, .. } => {
                self.busy = false;
                self.form = None;
                merge_by_id(&mut self.users, (**user).clone(), |u| u.id);
            }
            Action::UserDeleted { id, .. } => {
                self.users.retain(|u| u.id != *id);
                self.selected = self.selected.min(self.users.len().saturating_sub(1));
            }
            Action::UserNvrsLoaded { user_id, nvr_ids } => {
                if let Some(modal) = &mut self.assignments {
                    if modal.user_id == *user_id {
                        modal.loading = false;
                        modal.checked = nvr_ids.iter().copied().collect();
                    }
                }
            }
            Action::UserNvrsSaved { user_id, .. } => {
                self.busy = false;
                if self
                    .assignments
                    .as_ref()
                    .is_some_and(|m| m.user_id == *user_id)
                {
                    self.assignments = None;
                }
            }
            Action::MutationFailed { scope, message } => match scope {
                MutationScope::UserForm => {
                    self.busy = false;
                    if let Some(form) = &mut self.form {
                        form.error = Some(message.clone());
                    }
                }
                MutationScope::UserNvrForm => {
                    self.busy = false;
                    if let Some(modal) = &mut self.assignments {
                        modal.loading = false;
                        modal.error = Some(message.clone());
                    }
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

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} users", self.users.len()), theme::title_style()),
                Span::styled("  a", theme::key_hint_key()),
                Span::styled(" add · ", theme::key_hint()),
                Span::styled("e", theme::key_hint_key()),
                Span::styled(" edit · ", theme::key_hint()),
                Span::styled("d", theme::key_hint_key()),
                Span::styled(" delete · ", theme::key_hint()),
                Span::styled("n", theme::key_hint_key()),
                Span::styled(" nvr access · ", theme::key_hint()),
                Span::styled("R", theme::key_hint_key()),
                Span::styled(" refresh", theme::key_hint()),
            ])),
            rows[0],
        );

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("{:<5} {:<24} {:<8}", "ID", "USERNAME", "ROLE"),
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
        } else if self.loading && self.users.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading users…", theme::field_label())),
                body,
            );
        } else {
            let lines: Vec<Line> = self
                .users
                .iter()
                .enumerate()
                .map(|(i, user)| {
                    let style = if i == self.selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    };
                    Line::styled(
                        format!("{:<5} {:<24} {:<8}", user.id, user.username, user.role),
                        style,
                    )
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), body);
        }

        if self.assignments.is_some() {
            self.render_assignments(frame, area);
        } else if self.form.is_some() {
            self.render_form(frame, area);
        }
    }

    fn id(&self) -> &str {
        "users"
    }
}

impl UsersScreen {
    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = &self.form else { return };

        let width = area.width.clamp(36, 56);
        let height = 9u16.min(area.height);
        let modal = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, modal);

        let title = if form.id.is_some() {
            " Edit user "
        } else {
            " Add user "
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
                    format!("{marker}{label:<10}"),
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
                "Role",
                format!("‹ {} ›", form.role),
                form.field == FormField::Role,
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
                Span::styled("esc", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_assignments(&self, frame: &mut Frame, area: Rect) {
        let Some(modal_state) = &self.assignments else {
            return;
        };

        let width = area.width.clamp(36, 56);
        let height = (self.nvrs.len() as u16 + 6).clamp(8, area.height);
        let modal = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(Span::styled(
                format!(" NVR access — {} ", modal_state.username),
                theme::title_style(),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let mut lines = Vec::new();
        if modal_state.loading {
            lines.push(Line::styled("Loading assignments…", theme::field_label()));
        } else if self.nvrs.is_empty() {
            lines.push(Line::styled("No NVRs registered.", theme::field_label()));
        } else {
            for (i, nvr) in self.nvrs.iter().enumerate() {
                let mark = if modal_state.checked.contains(&nvr.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if i == modal_state.cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                lines.push(Line::styled(
                    format!("{mark} {}", nvr.display_name),
                    style,
                ));
            }
        }
        lines.push(Line::raw(""));

        if self.busy {
            lines.push(Line::styled("Saving…", theme::field_label()));
        } else if let Some(ref error) = modal_state.error {
            lines.push(Line::styled(error.clone(), theme::error_text()));
        } else {
            lines.push(Line::from(vec![
                Span::styled("space", theme::key_hint_key()),
                Span::styled(" toggle · ", theme::key_hint()),
                Span::styled("enter", theme::key_hint_key()),
                Span::styled(" apply · ", theme::key_hint()),
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

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            role,
        }
    }

    #[test]
    fn new_account_requires_password_but_edit_does_not() {
        let mut form = UserForm::blank();
        form.username = "gatehouse".into();
        assert!(form.validate().is_err());

        let form = UserForm::for_edit(&user(1, Role::Viewer));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn assignment_modal_only_opens_for_viewers() {
        let mut screen = UsersScreen::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        screen.action_tx = Some(tx);
        screen.users = vec![user(1, Role::Admin), user(2, Role::Viewer)];

        screen.selected = 0;
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('n')))
            .expect("key");
        assert!(action.is_none());
        assert!(screen.assignments.is_none());
        assert!(rx.try_recv().is_err());

        screen.selected = 1;
        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Char('n')))
            .expect("key");
        assert!(matches!(
            action,
            Some(Action::Backend(Request::FetchUserNvrs { user_id: 2 }))
        ));
        assert!(screen.assignments.as_ref().is_some_and(|m| m.loading));
    }

    #[test]
    fn loaded_assignments_populate_checklist() {
        let mut screen = UsersScreen::new();
        screen.assignments = Some(AssignmentModal {
            user_id: 2,
            username: "user2".into(),
            loading: true,
            checked: HashSet::new(),
            cursor: 0,
            error: None,
        });

        screen
            .update(&Action::UserNvrsLoaded {
                user_id: 2,
                nvr_ids: vec![3, 5],
            })
            .expect("update");

        let modal = screen.assignments.as_ref().expect("modal");
        assert!(!modal.loading);
        assert!(modal.checked.contains(&3) && modal.checked.contains(&5));
    }

    #[test]
    fn saved_assignments_close_the_modal() {
        let mut screen = UsersScreen::new();
        screen.busy = true;
        screen.assignments = Some(AssignmentModal {
            user_id: 2,
            username: "user2".into(),
            loading: false,
            checked: HashSet::new(),
            cursor: 0,
            error: None,
        });

        screen
            .update(&Action::UserNvrsSaved {
                user_id: 2,
                nvr_ids: vec![],
                message: None,
            })
            .expect("update");

        assert!(screen.assignments.is_none());
        assert!(!screen.busy);
    }

    #[test]
    fn save_merges_user_exactly_once() {
        let mut screen = UsersScreen::new();
        screen.users = vec![user(1, Role::Admin)];
        screen.form = Some(UserForm::blank());

        screen
            .update(&Action::UserSaved {
                user: Box::new(user(2, Role::Viewer)),
                message: None,
            })
            .expect("update");

        assert_eq!(screen.users.len(), 2);
        assert!(screen.form.is_none());
    }
}
