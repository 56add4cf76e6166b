use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use std::io;
use std::time::Duration;

/// Input the timeline view reacts to
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Bracketed paste; terminals paste the path of a dropped file
    Paste(String),
    Resize,
}

pub struct EventHandler {
    poll_timeout: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
        }
    }

    pub fn next(&mut self) -> io::Result<Option<AppEvent>> {
        if !event::poll(self.poll_timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            Event::Paste(text) => Some(AppEvent::Paste(text)),
            Event::Resize(_, _) => Some(AppEvent::Resize),
            _ => None,
        };
        Ok(event)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
