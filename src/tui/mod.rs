mod app;
mod canvas;
mod colors;
mod events;
mod ui;

pub use app::App;
pub use canvas::{CELL_HEIGHT_PX, CELL_WIDTH_PX};

use crate::session::Session;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use events::EventHandler;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

pub fn run_tui(session: Session) -> io::Result<()> {
    // Initialize logging to file only if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        match init_file_logging() {
            Ok(log_path) => {
                log::info!("Starting lock-timeline - log file: {}", log_path.display())
            }
            Err(e) => eprintln!("Warning: logging disabled: {}", e),
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);

    // Run the main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

/// Send log output to `<cache dir>/lock-timeline/lock-timeline.log`
fn init_file_logging() -> io::Result<PathBuf> {
    // Get the cache directory (or state directory on Linux)
    let log_dir = dirs::cache_dir()
        .or_else(dirs::state_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("lock-timeline");

    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("lock-timeline.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .parse_default_env()
        .try_init()
        .map_err(io::Error::other)?;

    Ok(log_path)
}

fn run_app<B: ratatui::backend::Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), B::Error>
where
    B::Error: From<std::io::Error>,
{
    let mut events = EventHandler::new();

    loop {
        let app_ref = &mut *app;
        terminal.draw(move |f| ui::draw(f, app_ref))?;

        if let Some(event) = events.next()? {
            app.handle_event(event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
