//! Live view — N×N status grid over the active main cameras.
//!
//! Grid policy: tiles always target the sub-stream variant (bandwidth);
//! `f` opens the full main stream. Pagination is client-side with page
//! size N²; changing the grid size resets to page 0. Health arrives from
//! the bridge's 30 s poll and is merged into per-tile dots.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use camdeck_api::{Camera, HealthMap, ViewMode};

use crate::action::{Action, Request, ViewTarget};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::status_dot;

/// Grid sizes the operator can cycle through with `g`.
const GRID_SIZES: [usize; 3] = [2, 3, 4];

/// Pages of size `cols²` needed for `total` tiles (at least one).
fn page_count(total: usize, cols: usize) -> usize {
    let per_page = cols * cols;
    total.div_ceil(per_page).max(1)
}

pub struct LiveScreen {
    action_tx: Option<UnboundedSender<Action>>,
    cameras: Vec<Camera>,
    health: Option<HealthMap>,
    cols: usize,
    page: usize,
    selected: usize,
    generation: u64,
    loading: bool,
    error: Option<String>,
}

impl LiveScreen {
    pub fn new() -> Self {
        Self {
            action_tx: None,
            cameras: Vec::new(),
            health: None,
            cols: 3,
            page: 0,
            selected: 0,
            generation: 0,
            loading: false,
            error: None,
        }
    }

    fn per_page(&self) -> usize {
        self.cols * self.cols
    }

    fn pages(&self) -> usize {
        page_count(self.cameras.len(), self.cols)
    }

    /// Tiles on the current page.
    fn visible(&self) -> &[Camera] {
        let start = (self.page * self.per_page()).min(self.cameras.len());
        let end = (start + self.per_page()).min(self.cameras.len());
        &self.cameras[start..end]
    }

    fn selected_camera(&self) -> Option<&Camera> {
        self.visible().get(self.selected)
    }

    fn fetch(&mut self) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(Action::Backend(Request::FetchCameras {
                requester: ScreenId::Live,
                generation: self.generation,
            }));
            let _ = tx.send(Action::Backend(Request::FetchHealth));
        }
    }

    fn set_cols(&mut self, cols: usize) {
        if self.cols != cols {
            self.cols = cols;
            // Grid change always lands back on the first page.
            self.page = 0;
            self.selected = 0;
        }
    }

    fn change_page(&mut self, delta: i64) {
        let pages = self.pages();
        let target = self
            .page
            .saturating_add_signed(delta as isize)
            .min(pages - 1);
        if target != self.page {
            self.page = target;
            self.selected = 0;
        }
    }

    fn move_selection(&mut self, dx: i64, dy: i64) {
        let count = self.visible().len();
        if count == 0 {
            return;
        }
        let cols = self.cols as i64;
        let mut row = (self.selected as i64) / cols;
        let mut col = (self.selected as i64) % cols;
        col = (col + dx).clamp(0, cols - 1);
        row = (row + dy).clamp(0, cols - 1);
        let target = (row * cols + col).unsigned_abs() as usize;
        self.selected = target.min(count - 1);
    }

    fn tile_status(&self, camera: &Camera) -> Option<bool> {
        let pair = camera.stream_pair();
        let health = self.health.as_ref()?;
        health
            .get(&pair.sub)
            .or_else(|| health.get(&pair.main))
            .copied()
    }
}

impl Component for LiveScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn on_enter(&mut self) {
        self.fetch();
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Left => self.move_selection(-1, 0),
            KeyCode::Right => self.move_selection(1, 0),
            KeyCode::Up => self.move_selection(0, -1),
            KeyCode::Down => self.move_selection(0, 1),
            KeyCode::Char('g') => {
                let idx = GRID_SIZES.iter().position(|&s| s == self.cols).unwrap_or(1);
                self.set_cols(GRID_SIZES[(idx + 1) % GRID_SIZES.len()]);
            }
            KeyCode::Char('n') => self.change_page(1),
            KeyCode::Char('p') => self.change_page(-1),
            KeyCode::Char('R') => self.fetch(),
            KeyCode::Enter => {
                // Grid tiles always open the bandwidth-saving sub stream.
                if let Some(cam) = self.selected_camera() {
                    return Ok(Some(Action::OpenViewer {
                        title: cam.label(),
                        target: ViewTarget::Stream {
                            key: cam.stream_pair().sub,
                            mode: ViewMode::Mse,
                        },
                    }));
                }
            }
            KeyCode::Char('f') => {
                if let Some(cam) = self.selected_camera() {
                    return Ok(Some(Action::OpenViewer {
                        title: cam.label(),
                        target: ViewTarget::Stream {
                            key: cam.stream_pair().main,
                            mode: ViewMode::Mse,
                        },
                    }));
                }
            }
            KeyCode::Char('o') => {
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
                requester: ScreenId::Live,
                generation,
                cameras,
            } => {
                // Stale response from a superseded fetch — drop it.
                if *generation != self.generation {
                    return Ok(None);
                }
                self.loading = false;
                // The grid shows active main streams only.
                self.cameras = cameras
                    .iter()
                    .filter(|c| c.active && c.is_main)
                    .cloned()
                    .collect();
                self.page = self.page.min(self.pages() - 1);
                self.selected = self
                    .selected
                    .min(self.visible().len().saturating_sub(1));
            }
            Action::FetchFailed {
                requester: ScreenId::Live,
                message,
            } => {
                self.loading = false;
                self.error = Some(message.clone());
            }
            Action::HealthUpdated(health) => {
                self.health = Some(health.clone());
            }
            Action::HealthUnavailable => {
                self.health = None;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(area);

        // Toolbar
        let online = self
            .health
            .as_ref()
            .map(|h| h.values().filter(|v| **v).count());
        let toolbar = Line::from(vec![
            Span::styled("Sub stream", theme::tab_active()),
            Span::styled(
                format!(
                    " · {}×{} · page {}/{} · {} cameras",
                    self.cols,
                    self.cols,
                    self.page + 1,
                    self.pages(),
                    self.cameras.len()
                ),
                theme::key_hint(),
            ),
            Span::styled(
                online.map_or_else(
                    || " · health unknown".to_owned(),
                    |n| format!(" · {n} streams online"),
                ),
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(toolbar), rows[0]);

        let body = rows[1];
        if self.loading && self.cameras.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading cameras…", theme::field_label())),
                body,
            );
            return;
        }
        if let Some(ref error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(error.clone(), theme::error_text())),
                body,
            );
            return;
        }
        if self.cameras.is_empty() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::raw(""),
                    Line::styled("No active cameras", theme::field_label()),
                    Line::styled("Add one on the Cameras screen (2)", theme::key_hint()),
                ]),
                body,
            );
            return;
        }

        // N×N grid
        let row_constraints = vec![Constraint::Ratio(1, self.cols as u32); self.cols];
        let grid_rows = Layout::vertical(row_constraints).split(body);
        let tiles = self.visible();

        for (r, row_area) in grid_rows.iter().enumerate() {
            let col_constraints = vec![Constraint::Ratio(1, self.cols as u32); self.cols];
            let cells = Layout::horizontal(col_constraints).split(*row_area);
            for (c, cell) in cells.iter().enumerate() {
                let idx = r * self.cols + c;
                let Some(cam) = tiles.get(idx) else { continue };
                self.render_tile(frame, *cell, cam, idx == self.selected);
            }
        }
    }

    fn id(&self) -> &str {
        "live"
    }
}

impl LiveScreen {
    fn render_tile(&self, frame: &mut Frame, area: Rect, camera: &Camera, selected: bool) {
        let border = if selected {
            theme::border_focused()
        } else {
            theme::border_default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(Span::styled(
                format!(" {} ", camera.label()),
                if selected {
                    theme::tab_active()
                } else {
                    theme::table_row()
                },
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = self.tile_status(camera);
        let mut lines = vec![Line::from(vec![
            status_dot::status_span(status),
            Span::styled(
                format!(" {}", status_dot::status_label(status)),
                theme::table_row(),
            ),
        ])];
        if inner.height > 1 {
            lines.push(Line::styled(
                camera.stream_pair().sub,
                theme::key_hint(),
            ));
        }
        if inner.height > 2 {
            if let Some(ref nvr) = camera.nvr_name {
                lines.push(Line::styled(nvr.clone(), theme::key_hint()));
            }
        }
        if inner.height > 3 && camera.recording_enabled {
            lines.push(Line::styled("REC", theme::error_text()));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam(id: i64, name: &str) -> Camera {
        Camera {
            id,
            name: name.into(),
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

    fn loaded_screen(count: usize) -> LiveScreen {
        let mut screen = LiveScreen::new();
        screen.cameras = (0..count)
            .map(|i| cam(i as i64, &format!("cam{i}-main")))
            .collect();
        screen
    }

    #[test]
    fn page_count_is_ceil_over_grid_area() {
        assert_eq!(page_count(0, 3), 1);
        assert_eq!(page_count(9, 3), 1);
        assert_eq!(page_count(10, 3), 2);
        assert_eq!(page_count(16, 4), 1);
        assert_eq!(page_count(17, 4), 2);
        assert_eq!(page_count(5, 2), 2);
    }

    #[test]
    fn grid_size_change_resets_page() {
        let mut screen = loaded_screen(20);
        screen.page = 2;
        screen.selected = 3;
        screen.set_cols(4);
        assert_eq!(screen.page, 0);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn same_grid_size_keeps_page() {
        let mut screen = loaded_screen(20);
        screen.page = 1;
        screen.set_cols(3);
        assert_eq!(screen.page, 1);
    }

    #[test]
    fn page_clamps_to_last() {
        let mut screen = loaded_screen(10); // 2 pages at 3×3
        screen.change_page(5);
        assert_eq!(screen.page, 1);
        screen.change_page(-5);
        assert_eq!(screen.page, 0);
    }

    #[test]
    fn visible_slice_is_page_sized() {
        let mut screen = loaded_screen(10);
        assert_eq!(screen.visible().len(), 9);
        screen.change_page(1);
        assert_eq!(screen.visible().len(), 1);
    }

    #[test]
    fn selection_moves_within_grid_bounds() {
        let mut screen = loaded_screen(9);
        screen.move_selection(1, 0);
        screen.move_selection(1, 0);
        assert_eq!(screen.selected, 2);
        screen.move_selection(1, 0); // clamped at right edge
        assert_eq!(screen.selected, 2);
        screen.move_selection(0, 1);
        assert_eq!(screen.selected, 5);
    }

    #[test]
    fn tile_status_prefers_sub_stream_health() {
        let mut screen = loaded_screen(1);
        let mut health = HealthMap::new();
        health.insert("cam0-main".into(), true);
        health.insert("cam0-sub".into(), false);
        screen.health = Some(health);
        assert_eq!(screen.tile_status(&screen.cameras[0]), Some(false));
    }

    #[test]
    fn missing_health_entry_is_unknown() {
        let mut screen = loaded_screen(1);
        screen.health = Some(HealthMap::new());
        assert_eq!(screen.tile_status(&screen.cameras[0]), None);
        screen.health = None;
        assert_eq!(screen.tile_status(&screen.cameras[0]), None);
    }
}
