//! Recordings browser — segments grouped by camera, expand/collapse per
//! group, playback through the single external viewer.
//!
//! Segments are never mutated from here: list, play, and show the
//! download URL. The optional camera filter is applied server-side via
//! the list endpoint's query parameter.

use std::collections::{BTreeMap, HashSet};

use bytesize::ByteSize;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::Recording;

use crate::action::{Action, Request, ViewTarget};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

/// One visual row in the flattened group/segment tree.
#[derive(Debug, Clone, PartialEq)]
enum Row {
    Group { camera: String, count: usize },
    Segment { camera: String, index: usize },
}

pub struct RecordingsScreen {
    action_tx: Option<UnboundedSender<Action>>,
    groups: BTreeMap<String, Vec<Recording>>,
    expanded: HashSet<String>,
    selected: usize,
    /// Server-side camera filter; `/` edits it.
    filter: String,
    editing_filter: bool,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl RecordingsScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            groups: BTreeMap::new(),
            expanded: HashSet::new(),
            selected: 0,
            filter: String::new(),
            editing_filter: false,
            generation: 0,
            loading: false,
            error: None,
        }
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        let camera = {
            let trimmed = self.filter.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        };
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchRecordings {
                requester: ScreenId::Recordings,
                camera,
                generation: self.generation,
            }));
        }
    }

    /// Flatten groups + expansion state into selectable rows.
    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for (camera, segments) in &self.groups {
            rows.push(Row::Group {
                camera: camera.clone(),
                count: segments.len(),
            });
            if self.expanded.contains(camera) {
                for index in 0..segments.len() {
                    rows.push(Row::Segment {
                        camera: camera.clone(),
                        index,
                    });
                }
            }
        }
        rows
    }

    fn toggle_group(&mut self, camera: &str) {
        if !self.expanded.remove(camera) {
            self.expanded.insert(camera.to_owned());
        }
    }

    fn segment(&self, camera: &str, index: usize) -> Option<&Recording> {
        self.groups.get(camera).and_then(|segs| segs.get(index))
    }
}

impl Component for RecordingsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn on_enter(&mut self) {
        self.fetch();
    }

    fn wants_exclusive_input(&self) -> bool {
        self.editing_filter
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing_filter {
            match key.code {
                KeyCode::Esc => {
                    self.editing_filter = false;
                    self.filter.clear();
                    self.fetch();
                }
                KeyCode::Enter => {
                    self.editing_filter = false;
                    self.fetch();
                }
                KeyCode::Backspace => {
                    self.filter.pop();
                }
                KeyCode::Char(c) => self.filter.push(c),
                _ => {}
            }
            return Ok(None);
        }

        let rows = self.rows();
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(rows.len().saturating_sub(1));
            }
            KeyCode::Char('/') => {
                self.editing_filter = true;
            }
            KeyCode::Char('R') => self.fetch(),
            KeyCode::Enter => match rows.get(self.selected) {
                Some(Row::Group { camera, .. }) => {
                    let camera = camera.clone();
                    self.toggle_group(&camera);
                }
                Some(Row::Segment { camera, index }) => {
                    if let Some(segment) = self.segment(camera, *index) {
                        let title = format!("{} · {}", segment.camera_name, segment.filename);
                        let path = segment.download_url.clone();
                        return Ok(Some(Action::OpenViewer {
                            title,
                            target: ViewTarget::Recording { path },
                        }));
                    }
                }
                None => {}
            },
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RecordingsLoaded {
                requester: ScreenId::Recordings,
                generation,
                groups,
            } => {
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                self.groups = groups.clone();
                // Expansion state survives a refetch for groups that still
                // exist; vanished cameras drop out.
                self.expanded
                    .retain(|camera| self.groups.contains_key(camera));
                self.selected = self.selected.min(self.rows().len().saturating_sub(1));
            }
            Action::FetchFailed {
                requester: ScreenId::Recordings,
                message,
            } => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);

        // Header / filter line
        let total: usize = self.groups.values().map(Vec::len).sum();
        let mut header = vec![Span::styled(
            format!("{} segments · {} cameras", total, self.groups.len()),
            theme::title_style(),
        )];
        if self.editing_filter {
            header.push(Span::styled("   filter: ", theme::field_active()));
            header.push(Span::raw(self.filter.clone()));
            header.push(Span::styled("▏", theme::field_active()));
        } else if self.filter.trim().is_empty() {
            header.push(Span::styled("   /", theme::key_hint_key()));
            header.push(Span::styled(" filter · ", theme::key_hint()));
            header.push(Span::styled("enter", theme::key_hint_key()));
            header.push(Span::styled(" expand/play · ", theme::key_hint()));
            header.push(Span::styled("R", theme::key_hint_key()));
            header.push(Span::styled(" refresh", theme::key_hint()));
        } else {
            header.push(Span::styled(
                format!("   filter: {}", self.filter.trim()),
                theme::field_label(),
            ));
            header.push(Span::styled("  (/ to change)", theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(header)), layout[0]);

        let body = layout[1];
        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(error.clone(), theme::error_text())),
                body,
            );
            return;
        }
        if self.loading && self.groups.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading recordings…", theme::field_label())),
                body,
            );
            return;
        }
        if self.groups.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("No recordings found.", theme::field_label())),
                body,
            );
            return;
        }

        let rows = self.rows();
        let visible = usize::from(body.height);
        let offset = self.selected.saturating_sub(visible.saturating_sub(1));
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, row)| self.render_row(row, i == self.selected))
            .collect();
        frame.render_widget(Paragraph::new(lines), body);
    }

    fn id(&self) -> &str {
        "recordings"
    }
}

impl RecordingsScreen {
    fn render_row(&self, row: &Row, selected: bool) -> Line<'static> {
        let style = if selected {
            theme::table_selected()
        } else {
            theme::table_row()
        };
        match row {
            Row::Group { camera, count } => {
                let arrow = if self.expanded.contains(camera) {
                    "▾"
                } else {
                    "▸"
                };
                Line::styled(format!("{arrow} {camera} ({count})"), style)
            }
            Row::Segment { camera, index } => match self.segment(camera, *index) {
                Some(segment) => {
                    let started = segment
                        .started_at
                        .map_or_else(|| "-".to_owned(), |dt| dt.format("%Y-%m-%d %H:%M").to_string());
                    Line::styled(
                        format!(
                            "    {} · {:>10} · {}",
                            started,
                            ByteSize::b(segment.size).to_string(),
                            segment.filename
                        ),
                        style,
                    )
                }
                None => Line::styled("    (missing)", style),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(camera: &str, filename: &str) -> Recording {
        Recording {
            camera_name: camera.into(),
            filename: filename.into(),
            size: 700 * 1024 * 1024,
            size_mb: 700.0,
            started_at: None,
            download_url: format!("/api/recordings/{camera}/{filename}"),
        }
    }

    fn loaded(screen: &mut RecordingsScreen) {
        let mut groups = BTreeMap::new();
        groups.insert(
            "lobby-ch1-main".to_owned(),
            vec![
                segment("lobby-ch1-main", "2024-01-15_14-00-00.mp4"),
                segment("lobby-ch1-main", "2024-01-15_13-00-00.mp4"),
            ],
        );
        groups.insert(
            "yard-ch2-main".to_owned(),
            vec![segment("yard-ch2-main", "2024-01-15_12-00-00.mp4")],
        );
        screen.generation += 1;
        let generation = screen.generation;
        screen
            .update(&Action::RecordingsLoaded {
                requester: ScreenId::Recordings,
                generation,
                groups,
            })
            .expect("update");
    }

    #[test]
    fn collapsed_groups_flatten_to_headers_only() {
        let mut screen = RecordingsScreen::new();
        loaded(&mut screen);
        assert_eq!(screen.rows().len(), 2);
    }

    #[test]
    fn expansion_is_independent_per_group() {
        let mut screen = RecordingsScreen::new();
        loaded(&mut screen);
        screen.toggle_group("lobby-ch1-main");
        assert_eq!(screen.rows().len(), 4, "two headers + two segments");
        screen.toggle_group("yard-ch2-main");
        assert_eq!(screen.rows().len(), 5);
        screen.toggle_group("lobby-ch1-main");
        assert_eq!(screen.rows().len(), 3, "collapse leaves the other open");
    }

    #[test]
    fn refetch_drops_expansion_for_vanished_groups() {
        let mut screen = RecordingsScreen::new();
        loaded(&mut screen);
        screen.toggle_group("lobby-ch1-main");
        screen.toggle_group("yard-ch2-main");

        let mut groups = BTreeMap::new();
        groups.insert(
            "yard-ch2-main".to_owned(),
            vec![segment("yard-ch2-main", "2024-01-15_12-00-00.mp4")],
        );
        screen.generation += 1;
        let generation = screen.generation;
        screen
            .update(&Action::RecordingsLoaded {
                requester: ScreenId::Recordings,
                generation,
                groups,
            })
            .expect("update");

        assert!(!screen.expanded.contains("lobby-ch1-main"));
        assert!(screen.expanded.contains("yard-ch2-main"));
    }

    #[test]
    fn enter_on_segment_opens_viewer_with_backend_path() {
        let mut screen = RecordingsScreen::new();
        loaded(&mut screen);
        screen.toggle_group("lobby-ch1-main");
        screen.selected = 1; // first segment under the first header

        let action = screen
            .handle_key_event(KeyEvent::from(KeyCode::Enter))
            .expect("key");
        match action {
            Some(Action::OpenViewer {
                target: ViewTarget::Recording { path },
                ..
            }) => {
                assert_eq!(
                    path,
                    "/api/recordings/lobby-ch1-main/2024-01-15_14-00-00.mp4"
                );
            }
            other => panic!("expected OpenViewer, got {other:?}"),
        }
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut screen = RecordingsScreen::new();
        loaded(&mut screen);
        screen
            .update(&Action::RecordingsLoaded {
                requester: ScreenId::Recordings,
                generation: 0,
                groups: BTreeMap::new(),
            })
            .expect("update");
        assert!(!screen.groups.is_empty(), "stale empty response ignored");
    }
}
