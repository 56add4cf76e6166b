use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use super::colors::to_color;
use crate::timeline::{Frame, Theme, TrackShape};

/// Pixel size of one terminal cell. The row height matches the cell height
/// so one lane maps to one text row.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    bold: bool,
}

/// Character grid the timeline frame is rasterized into
pub struct LaneCanvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl LaneCanvas {
    pub fn new(width: u16, height: u16, theme: &Theme) -> Self {
        let (width, height) = (width as usize, height as usize);
        let blank = Cell {
            ch: ' ',
            fg: to_color(theme.label),
            bg: to_color(theme.background),
            bold: false,
        };
        Self {
            width,
            height,
            cells: vec![blank; width * height],
        }
    }

    /// Rasterize a frame: grid first, then bars, markers and labels on top
    pub fn draw(&mut self, frame: &Frame, theme: &Theme, hovered: Option<u64>) {
        for line in &frame.grid {
            let Some(col) = self.column(line.x) else {
                continue;
            };
            let color = if line.major {
                theme.main_lines
            } else {
                theme.light_lines
            };
            for row in 0..self.height {
                self.put(col, row, |cell| {
                    cell.ch = '│';
                    cell.fg = to_color(color);
                });
            }
        }

        for track in &frame.tracks {
            self.draw_track(track, theme, hovered == Some(track.id));
        }
    }

    fn draw_track(&mut self, track: &TrackShape, theme: &Theme, hovered: bool) {
        let row = (track.y / CELL_HEIGHT_PX).floor() as usize;
        if row >= self.height {
            return;
        }

        let start = (track.x / CELL_WIDTH_PX).floor().max(0.0) as usize;
        let end = ((track.x + track.width) / CELL_WIDTH_PX).ceil();
        if end <= 0.0 {
            return;
        }
        let end = (end as usize).min(self.width);
        let fill = to_color(track.fill);

        for col in start..end {
            self.put(col, row, |cell| {
                cell.ch = ' ';
                cell.bg = fill;
            });
        }
        if track.errored {
            self.put(start, row, |cell| {
                cell.ch = '×';
                cell.fg = to_color(theme.error);
            });
        }

        for marker in &track.markers {
            let Some(col) = self.column(marker.x) else {
                continue;
            };
            let glyph = if marker.matched { '▀' } else { '▄' };
            self.put(col, row, |cell| {
                cell.ch = glyph;
                cell.fg = to_color(marker.color);
            });
        }

        if track.detailed || hovered {
            let Some(mut col) = self.column(track.label_x) else {
                return;
            };
            for ch in track.label.chars() {
                if col >= self.width {
                    break;
                }
                self.put(col, row, |cell| {
                    cell.ch = ch;
                    cell.fg = to_color(theme.label);
                    cell.bold = hovered;
                });
                col += 1;
            }
        }
    }

    fn column(&self, x: f64) -> Option<usize> {
        let col = (x / CELL_WIDTH_PX).floor();
        if col < 0.0 || col as usize >= self.width {
            return None;
        }
        Some(col as usize)
    }

    fn put(&mut self, col: usize, row: usize, paint: impl FnOnce(&mut Cell)) {
        if col < self.width && row < self.height {
            paint(&mut self.cells[row * self.width + col]);
        }
    }

    /// Convert the grid to text lines, merging runs of equal style
    pub fn into_lines(self) -> Vec<Line<'static>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.width)
            .map(|row| {
                let mut spans = Vec::new();
                let mut run = String::new();
                let mut run_cell = row[0];

                for cell in row {
                    if (cell.fg, cell.bg, cell.bold) != (run_cell.fg, run_cell.bg, run_cell.bold) {
                        spans.push(Span::styled(std::mem::take(&mut run), style_of(&run_cell)));
                        run_cell = *cell;
                    }
                    run.push(cell.ch);
                }
                spans.push(Span::styled(run, style_of(&run_cell)));

                Line::from(spans)
            })
            .collect()
    }
}

fn style_of(cell: &Cell) -> Style {
    let style = Style::default().fg(cell.fg).bg(cell.bg);
    if cell.bold {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}
