use clap::{Args, Parser as ClapParser, Subcommand};
use lock_timeline::{Session, TimelineConfig, TraceSource, tui};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "lock-timeline")]
#[command(about = "Visualize lock-service protocol traces as a timeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a trace in the terminal
    View {
        /// Trace file (`-` for stdin). Without one, paste a path to load.
        #[arg(value_name = "FILE")]
        input: Option<String>,

        /// Timeline settings as JSON; the viewport size and lane height
        /// follow the terminal
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Report reads that observed stale content
    Check {
        /// Trace file (`-` for stdin)
        #[arg(value_name = "FILE")]
        input: String,

        /// Print the report as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print all entries of one locker
    Inspect {
        /// Trace file (`-` for stdin)
        #[arg(value_name = "FILE")]
        input: String,

        /// Locker id
        #[arg(value_name = "LOCKER_ID")]
        locker: u64,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Compute the render-ready frame and print it as JSON
    Frame {
        /// Trace file (`-` for stdin)
        #[arg(value_name = "FILE")]
        input: String,

        /// Left edge of the visible window (ms)
        #[arg(short, long)]
        start: Option<f64>,

        /// Filter tag; may be repeated
        #[arg(short, long = "filter", value_name = "TAG")]
        filters: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Pretty print JSON output
        #[arg(short, long)]
        pretty: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Timeline settings as JSON; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Lane height in pixels
    #[arg(long)]
    row_height: Option<f64>,
}

impl LayoutArgs {
    fn load(&self) -> TimelineConfig {
        let mut config = match &self.config {
            Some(path) => read_config(path),
            None => TimelineConfig::default(),
        };
        if let Some(width) = self.width {
            config.viewport_width = width;
        }
        if let Some(height) = self.height {
            config.viewport_height = height;
        }
        if let Some(row_height) = self.row_height {
            config.row_height = row_height;
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::View { input, config } => {
            let config = match config {
                Some(path) => read_config(&path),
                None => TimelineConfig::default(),
            };
            // The terminal view maps one lane to one text row
            let config = config.with_row_height(tui::CELL_HEIGHT_PX);
            let mut session = Session::new(config);
            if let Some(input) = input {
                load_or_exit(&mut session, &input);
            }
            if let Err(e) = tui::run_tui(session) {
                eprintln!("Error running TUI: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Check { input, json } => {
            init_stderr_logging();
            check_trace(&input, json);
        }
        Commands::Inspect {
            input,
            locker,
            layout,
        } => {
            init_stderr_logging();
            let mut session = Session::new(layout.load());
            load_or_exit(&mut session, &input);
            match session.inspect(locker) {
                Some(text) => print!("{}", text),
                None => {
                    eprintln!("Error: no track for locker {}", locker);
                    std::process::exit(1);
                }
            }
        }
        Commands::Frame {
            input,
            start,
            filters,
            output,
            pretty,
            layout,
        } => {
            init_stderr_logging();
            let mut session = Session::new(layout.load());
            load_or_exit(&mut session, &input);
            session.set_filters(filters);
            if let Some(start) = start {
                session.set_visible_time_start(start);
            }
            write_json(&session.frame(), output, pretty);
        }
    }
}

fn init_stderr_logging() {
    env_logger::Builder::new()
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn read_config(path: &Path) -> TimelineConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("Error reading {}: {}", path.display(), err);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error parsing {}: {}", path.display(), err);
            std::process::exit(1);
        }
    }
}

fn load_or_exit(session: &mut Session, input: &str) {
    if let Err(err) = session.load_source(TraceSource::from_arg(input)) {
        eprintln!("Error loading trace: {}", err);
        std::process::exit(1);
    }
}

fn check_trace(input: &str, json: bool) {
    let mut session = Session::default();
    load_or_exit(&mut session, input);
    let report = session.sanity_check();

    if json {
        write_json(&report, None, true);
        return;
    }

    for issue in &report.inconsistencies {
        println!(
            "Inconsistency on {}: expected {}, read {} (Locker{} at {}ms)",
            issue.path, issue.expected_hash, issue.actual_hash, issue.entry.locker_id, issue.entry.time
        );
    }
    for skipped in &report.skipped {
        eprintln!(
            "Skipped Locker{} at {}ms: {}",
            skipped.entry.locker_id, skipped.entry.time, skipped.reason
        );
    }
    eprintln!(
        "Checked {} lockers, {} inconsistencies",
        report.checked_lockers,
        report.inconsistencies.len()
    );
}

fn write_json<T: Serialize>(value: &T, output_file: Option<String>, pretty: bool) {
    // Serialize to JSON
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };

    let json = match json {
        Ok(j) => j,
        Err(err) => {
            eprintln!("Error serializing to JSON: {}", err);
            std::process::exit(1);
        }
    };

    // Write output
    if let Some(output_path) = output_file {
        if let Err(err) = std::fs::write(&output_path, json) {
            eprintln!("Error writing to {}: {}", output_path, err);
            std::process::exit(1);
        }
        eprintln!("Output written to {}", output_path);
    } else {
        println!("{}", json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_takes_size_from_terminal() {
        assert!(Cli::try_parse_from(["lock-timeline", "view", "--width", "800"]).is_err());
        assert!(Cli::try_parse_from(["lock-timeline", "view", "--row-height", "20"]).is_err());

        let cli = Cli::try_parse_from(["lock-timeline", "view", "t.json", "--config", "c.json"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::View { input: Some(_), config: Some(_) })
        ));
    }

    #[test]
    fn test_frame_accepts_layout_flags() {
        let cli = Cli::try_parse_from([
            "lock-timeline", "frame", "t.json", "--width", "800", "-f", "a", "-f", "b",
        ]);
        match cli.map(|c| c.command) {
            Ok(Commands::Frame { layout, filters, .. }) => {
                assert_eq!(layout.load().viewport_width, 800.0);
                assert_eq!(filters, vec!["a".to_string(), "b".to_string()]);
            }
            _ => panic!("expected the frame command"),
        }
    }
}
