use super::canvas::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use super::events::AppEvent;
use crate::session::Session;
use crate::timeline::ZoomDirection;
use crate::trace::SanityReport;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;

/// Columns moved by one arrow key press
const PAN_STEP_CELLS: f64 = 10.0;

pub enum Popup {
    Help,
    Inspector(u64),
    Sanity(SanityReport),
}

/// Tag input for a new filter
pub struct FilterInput {
    pub active: bool,
    pub text: String,
}

impl FilterInput {
    fn new() -> Self {
        Self {
            active: false,
            text: String::new(),
        }
    }
}

pub struct App {
    // Data
    pub session: Session,

    // UI State
    pub hovered: Option<u64>,
    pub popup: Option<Popup>,
    pub popup_scroll: u16,
    pub filter_input: FilterInput,
    pub status: Option<String>,
    /// Where the lanes were drawn last, for mapping mouse positions
    pub timeline_area: Rect,
    drag_column: Option<u16>,

    // Flags
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            hovered: None,
            popup: None,
            popup_scroll: 0,
            filter_input: FilterInput::new(),
            status: None,
            timeline_area: Rect::default(),
            drag_column: None,
            should_quit: false,
        }
    }

    /// Adopt the size of the lane area, called on every draw
    pub fn update_timeline_area(&mut self, area: Rect) {
        self.timeline_area = area;
        self.session.resize(
            area.width as f64 * CELL_WIDTH_PX,
            area.height as f64 * CELL_HEIGHT_PX,
        );
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Paste(text) => self.handle_paste(&text),
            AppEvent::Resize => {}
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) {
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Priority 1: Filter input
        if self.filter_input.active {
            self.handle_filter_input_key(event);
            return;
        }

        // Priority 2: Popups
        if self.popup.is_some() {
            self.handle_popup_key(event);
            return;
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.open_popup(Popup::Help);
            }

            // Navigation
            KeyCode::Left | KeyCode::Char('h') => {
                self.session.pan_by_pixels(PAN_STEP_CELLS * CELL_WIDTH_PX);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.session.pan_by_pixels(-PAN_STEP_CELLS * CELL_WIDTH_PX);
            }
            KeyCode::Home => {
                let begin = self.session.recording().begin;
                self.session.set_visible_time_start(begin);
            }
            KeyCode::End => {
                let end = self.session.recording().end;
                self.session.set_visible_time_start(end);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.zoom_at_center(ZoomDirection::In);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.zoom_at_center(ZoomDirection::Out);
            }
            KeyCode::Char('0') => {
                self.session.reset_view();
            }

            // Hover
            KeyCode::Tab => {
                self.cycle_hover(true);
            }
            KeyCode::BackTab => {
                self.cycle_hover(false);
            }
            KeyCode::Esc => {
                self.set_hovered(None);
            }

            // Filters
            KeyCode::Char('/') => {
                self.filter_input.active = true;
                self.filter_input.text.clear();
            }
            KeyCode::Backspace => {
                if let Some(tag) = self.session.pop_filter() {
                    self.status = Some(format!("Removed filter {:?}", tag));
                }
            }
            KeyCode::Char('X') => {
                self.session.set_filters(Vec::new());
            }

            // Diagnostics
            KeyCode::Enter => {
                match self.hovered {
                    Some(id) => self.open_popup(Popup::Inspector(id)),
                    None => self.status = Some("Hover a track first (Tab)".to_string()),
                }
            }
            KeyCode::Char('c') => {
                let report = self.session.sanity_check();
                self.status = Some(format!(
                    "Sanity check: {} inconsistencies",
                    report.inconsistencies.len()
                ));
                self.open_popup(Popup::Sanity(report));
            }
            KeyCode::Char('r') => {
                self.reload();
            }

            _ => {}
        }
    }

    fn handle_filter_input_key(&mut self, event: KeyEvent) {
        match event.code {
            KeyCode::Char(c) => {
                self.filter_input.text.push(c);
            }
            KeyCode::Backspace => {
                self.filter_input.text.pop();
            }
            KeyCode::Enter => {
                let tag = std::mem::take(&mut self.filter_input.text);
                self.session.add_filter(tag);
                self.filter_input.active = false;
            }
            KeyCode::Esc => {
                self.filter_input.text.clear();
                self.filter_input.active = false;
            }
            _ => {}
        }
    }

    fn handle_popup_key(&mut self, event: KeyEvent) {
        match event.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.popup = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.popup_scroll = self.popup_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.popup_scroll = self.popup_scroll.saturating_add(1);
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if self.popup.is_some() {
            return;
        }

        match event.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                if let Some((x, _)) = self.to_timeline_px(event.column, event.row) {
                    let direction = if event.kind == MouseEventKind::ScrollUp {
                        ZoomDirection::In
                    } else {
                        ZoomDirection::Out
                    };
                    self.session.zoom(direction, x);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_column = Some(event.column);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(last) = self.drag_column {
                    let dx = (event.column as f64 - last as f64) * CELL_WIDTH_PX;
                    self.session.pan_by_pixels(dx);
                }
                self.drag_column = Some(event.column);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_column = None;
            }
            MouseEventKind::Moved => {
                let hit = self
                    .to_timeline_px(event.column, event.row)
                    .and_then(|(x, y)| self.session.track_at(x, y))
                    .map(|l| l.id);
                self.set_hovered(hit);
            }
            _ => {}
        }
    }

    /// A pasted path is treated as a dropped file
    pub fn handle_paste(&mut self, text: &str) {
        let path = dropped_path(text);
        self.status = Some(match self.session.drop_file(&path) {
            Ok(true) => {
                self.hovered = None;
                format!("Loaded {}", path.display())
            }
            Ok(false) => format!("Ignored {} (not JSON)", path.display()),
            Err(e) => format!("Load failed: {}", e),
        });
    }

    fn reload(&mut self) {
        self.status = Some(match self.session.reload() {
            Ok(true) => {
                self.hovered = None;
                "Reloaded".to_string()
            }
            Ok(false) => "Nothing to reload".to_string(),
            Err(e) => format!("Reload failed: {}", e),
        });
    }

    fn open_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
        self.popup_scroll = 0;
    }

    fn zoom_at_center(&mut self, direction: ZoomDirection) {
        let center = self.session.viewport().width / 2.0;
        self.session.zoom(direction, center);
    }

    /// Move the pointer-like hover, updating the highlight
    pub fn set_hovered(&mut self, id: Option<u64>) {
        if id == self.hovered {
            return;
        }
        self.session.leave_track();
        if let Some(id) = id {
            self.session.enter_track(id);
        }
        self.hovered = id;
    }

    fn cycle_hover(&mut self, forward: bool) {
        let ids: Vec<u64> = self.session.visible_tracks().iter().map(|l| l.id).collect();
        if ids.is_empty() {
            self.set_hovered(None);
            return;
        }

        let current = self.hovered.and_then(|id| ids.iter().position(|&i| i == id));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => ids.len() - 1,
            (Some(idx), true) => (idx + 1) % ids.len(),
            (Some(idx), false) => (idx + ids.len() - 1) % ids.len(),
        };
        self.set_hovered(Some(ids[next]));
    }

    /// Map a terminal cell to the center of that cell in timeline pixels
    fn to_timeline_px(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.timeline_area;
        if column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let x = (column - area.x) as f64 * CELL_WIDTH_PX + CELL_WIDTH_PX / 2.0;
        let y = (row - area.y) as f64 * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2.0;
        Some((x, y))
    }
}

/// Clean up a pasted path: surrounding quotes and a `file://` prefix
fn dropped_path(text: &str) -> PathBuf {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix(['\'', '"'])
        .and_then(|s| s.strip_suffix(['\'', '"']))
        .unwrap_or(trimmed);
    PathBuf::from(unquoted.strip_prefix("file://").unwrap_or(unquoted))
}
