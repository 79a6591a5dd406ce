// jsstepper: time-travel JavaScript-subset interpreter with step visualization

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use jsstepper::config::RunOptions;
use jsstepper::interpreter::constants::{
    DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS, DEFAULT_PLAY_INTERVAL_MS,
};
use jsstepper::session::Session;
use jsstepper::ui::App;

/// Step through a JavaScript program one operation at a time
#[derive(Debug, Parser)]
#[command(name = "jsstepper", version, about)]
struct Args {
    /// JavaScript source file to run
    file: PathBuf,

    /// Maximum number of recorded steps before the run is stopped
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Maximum nesting of user function calls
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Delay between steps during playback, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PLAY_INTERVAL_MS)]
    interval_ms: u64,

    /// Set a breakpoint on a source line (repeatable)
    #[arg(short = 'b', long = "breakpoint", value_name = "LINE")]
    breakpoints: Vec<usize>,

    /// Print the trace as JSON instead of starting the UI
    #[arg(long, conflicts_with = "print")]
    json: bool,

    /// Print one line per step instead of starting the UI
    #[arg(long)]
    print: bool,
}

/// Logging goes to stderr, and only when RUST_LOG is set so the UI stays clean.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", args.file.display(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let options = RunOptions::default()
        .with_max_steps(args.max_steps)
        .with_max_call_depth(args.max_depth);
    let mut session = Session::new(options);
    for line in &args.breakpoints {
        session.add_breakpoint(*line);
    }

    if let Err(e) = session.run(&source) {
        eprintln!("{}: {}", args.file.display(), e);
        return Ok(ExitCode::FAILURE);
    }

    let Some(trace) = session.trace() else {
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(trace)?);
        return Ok(ExitCode::SUCCESS);
    }

    if args.print {
        for step in trace.steps() {
            println!(
                "#{:<5} line {:<4} {:<14} {}",
                step.index,
                step.source_line,
                step.step_type.label(),
                step.description
            );
            for line in &step.console_delta {
                println!("        > {}", line);
            }
        }
        if let Some(error) = trace.error() {
            eprintln!(
                "{} at {}:{}: {}",
                error.kind, error.line, error.column, error.message
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(session, source, Duration::from_millis(args.interval_ms));
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(ExitCode::SUCCESS)
}
