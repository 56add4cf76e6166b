use super::app::{App, Popup};
use super::canvas::LaneCanvas;
use super::colors::{entry_glyph, to_color};
use crate::trace::SanityReport;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header line
            Constraint::Length(1), // Divider
            Constraint::Min(0),    // Lanes
            Constraint::Length(1), // Filter bar
            Constraint::Length(1), // Footer line
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_divider(f, chunks[1]);
    draw_timeline(f, app, chunks[2]);
    draw_filter_bar(f, app, chunks[3]);
    draw_footer(f, app, chunks[4]);

    match &app.popup {
        Some(Popup::Help) => draw_help(f),
        Some(Popup::Inspector(id)) => draw_inspector(f, app, *id),
        Some(Popup::Sanity(report)) => draw_sanity(f, report, app.popup_scroll),
        None => {}
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let file_name = session
        .source()
        .map(|s| s.display_name())
        .unwrap_or_else(|| "no trace".to_string());
    let summary = session.summary();
    let viewport = session.viewport();

    let header_text = format!(
        "lock-timeline: {} | Tracks: {} | Entries: {} | Duration: {}s | Window: {:.0}..{:.0}ms",
        file_name,
        summary.tracks,
        summary.entries,
        summary.duration_secs,
        viewport.visible_time_start,
        viewport.visible_time_end(),
    );

    let header = Paragraph::new(header_text).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    f.render_widget(header, area);
}

fn draw_divider(f: &mut Frame, area: Rect) {
    let divider = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    f.render_widget(divider, area);
}

fn draw_timeline(f: &mut Frame, app: &mut App, area: Rect) {
    app.update_timeline_area(area);

    let frame = app.session.frame();
    let theme = app.session.theme();

    if frame.placeholder {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from("No trace loaded"),
            Line::from(""),
            Line::from(Span::styled(
                "Drop or paste the path of a .json trace file here",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().bg(to_color(theme.background)));
        f.render_widget(hint, area);
        return;
    }

    let mut canvas = LaneCanvas::new(area.width, area.height, theme);
    canvas.draw(&frame, theme, app.hovered);
    f.render_widget(Paragraph::new(canvas.into_lines()), area);
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled("Filters: ", Style::default().fg(Color::Gray))];

    for tag in app.session.filters().tags() {
        spans.push(Span::styled(
            format!("[{}]", tag),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::raw(" "));
    }

    if app.filter_input.active {
        spans.push(Span::styled(
            format!("{}█", app.filter_input.text),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::styled(
            "  Enter:add Esc:cancel",
            Style::default().fg(Color::DarkGray),
        ));
    } else if !app.session.filters().is_active() {
        spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    f.render_widget(bar, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut footer_text = String::from(
        "←→: Pan | +/-/Wheel: Zoom | Tab: Hover | Enter: Inspect | /: Filter | c: Check | r: Reload | q: Quit | ?: Help",
    );

    if let Some(id) = app.hovered {
        footer_text.push_str(&format!(" | Locker{}", id));
    }
    if let Some(status) = &app.status {
        footer_text.push_str(&format!(" | {}", status));
    }

    let footer = Paragraph::new(footer_text).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn draw_help(f: &mut Frame) {
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "lock-timeline Help",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("View:"),
        Line::from("  ←/h →/l     Pan"),
        Line::from("  Home/End    Jump to start/end"),
        Line::from("  +/-         Zoom around the center"),
        Line::from("  Wheel       Zoom around the pointer"),
        Line::from("  Drag        Pan"),
        Line::from("  0           Reset the view"),
        Line::from(""),
        section("Tracks:"),
        Line::from("  Tab/S-Tab   Hover next/previous track"),
        Line::from("  Mouse       Hover a track"),
        Line::from("  Enter       Inspect the hovered track"),
        Line::from("  Esc         Clear hover"),
        Line::from(""),
        section("Filters:"),
        Line::from("  /           Add a filter tag"),
        Line::from("  Backspace   Remove the last tag"),
        Line::from("  X           Remove all tags"),
        Line::from(""),
        section("Other:"),
        Line::from("  c           Run the sanity check"),
        Line::from("  r           Reload the trace"),
        Line::from("  Paste path  Load a .json trace"),
        Line::from("  q/Q         Quit"),
        Line::from("  ?           Toggle this help"),
        Line::from("  Ctrl+C      Force quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close help",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });

    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn draw_inspector(f: &mut Frame, app: &App, id: u64) {
    let session = &app.session;
    let (Some(locker), Some(text)) = (session.recording().locker(id), session.inspect(id)) else {
        return;
    };

    // First line is the track header, then one line per entry in order
    let mut lines = text.lines();
    let mut content = vec![Line::from(Span::styled(
        lines.next().unwrap_or_default().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (entry, line) in locker.protocol.iter().zip(lines) {
        let color = to_color(session.theme().entry_color(entry.entry_type));
        content.push(Line::from(vec![
            Span::styled(
                format!("{} ", entry_glyph(entry.entry_type)),
                Style::default().fg(color),
            ),
            Span::raw(line.to_string()),
        ]));
    }

    let title = format!("Locker{} (Esc: close, j/k: scroll)", id);
    draw_popup(f, content, title, app.popup_scroll);
}

fn draw_sanity(f: &mut Frame, report: &SanityReport, scroll: u16) {
    let mut content = vec![Line::from(format!(
        "Checked {} cleanly released lockers",
        report.checked_lockers
    ))];

    if report.is_clean() {
        content.push(Line::from(Span::styled(
            "No inconsistencies",
            Style::default().fg(Color::Green),
        )));
    }
    for issue in &report.inconsistencies {
        content.push(Line::from(vec![
            Span::styled(issue.path.clone(), Style::default().fg(Color::Red)),
            Span::raw(format!(
                ": expected {}, read {} (Locker{} at {:.0}ms)",
                issue.expected_hash, issue.actual_hash, issue.entry.locker_id, issue.entry.time
            )),
        ]));
    }

    if !report.skipped.is_empty() {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            format!("Skipped {} grants:", report.skipped.len()),
            Style::default().fg(Color::Yellow),
        )));
        for skipped in &report.skipped {
            content.push(Line::from(format!(
                "  Locker{} at {:.0}ms: {}",
                skipped.entry.locker_id, skipped.entry.time, skipped.reason
            )));
        }
    }

    draw_popup(f, content, "Sanity check".to_string(), scroll);
}

fn draw_popup(f: &mut Frame, content: Vec<Line<'static>>, title: String, scroll: u16) {
    let popup = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll, 0));

    let area = centered_rect(80, 70, f.area());
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::session::Session;
    use crate::tui::canvas::CELL_HEIGHT_PX;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_placeholder_when_empty() {
        let mut app = App::new(Session::new(
            TimelineConfig::default().with_row_height(CELL_HEIGHT_PX),
        ));
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("No trace loaded"));
        assert!(text.contains("Filters: none"));
    }

    #[test]
    fn test_draw_sizes_session_to_area() {
        let mut session = Session::new(TimelineConfig::default().with_row_height(CELL_HEIGHT_PX));
        session
            .load_json(
                r#"[
                {"time": 0, "lockerId": 3, "type": 1, "extraInfo": "gamma"},
                {"time": 10, "lockerId": 3, "type": 3},
                {"time": 30, "lockerId": 3, "type": 9}
            ]"#,
            )
            .unwrap();
        let mut app = App::new(session);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        // Header, divider, filter bar and footer take four rows
        assert_eq!(app.timeline_area, Rect::new(0, 2, 80, 16));
        assert_eq!(app.session.config().lane_count(), 16);
        assert!(screen_text(&terminal).contains("Tracks: 1"));
    }
}
