//! Main TUI application state and logic

use crate::session::Session;
use crate::navigation::TickOutcome;
use crate::snapshot::RunStatus;
use crate::ui::panes::{self, SourceRenderData, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Variables,
    Stack,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> console -> stack -> variables)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Variables,
            FocusedPane::Console => FocusedPane::Source,
            FocusedPane::Stack => FocusedPane::Console,
            FocusedPane::Variables => FocusedPane::Stack,
        }
    }
}

/// The main application state
pub struct App {
    /// Trace, cursor and breakpoints
    pub session: Session,

    /// The source code being stepped through
    pub source_code: String,

    /// Delay between steps while playing
    pub play_interval: Duration,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: SourceScrollState,
    pub variables_scroll: usize,
    pub stack_scroll: usize,
    pub console_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app over a session that has already run `source_code`
    pub fn new(session: Session, source_code: String, play_interval: Duration) -> Self {
        let status_message = match session.trace().and_then(|t| t.error()) {
            Some(error) => format!("Run ended with {}", error.kind),
            None if session.trace().is_some() => String::from("Ready!"),
            None => String::from("No trace"),
        };

        App {
            session,
            source_code,
            play_interval,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: 0,
            stack_scroll: 0,
            console_scroll: usize::MAX,
            should_quit: false,
            status_message,
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            match self.session.tick(Instant::now()) {
                TickOutcome::Advanced => self.after_move("Playing..."),
                TickOutcome::HitBreakpoint => self.after_move("Paused at breakpoint"),
                TickOutcome::Finished => self.after_move("Playback complete"),
                TickOutcome::Waiting | TickOutcome::NotPlaying => {}
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Console (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables (top) | Call Stack (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let index = self.session.current_index();
        let step = self.session.current_step();
        let breakpoints = self.session.breakpoints();

        panes::render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source_code: &self.source_code,
                current_line: step.map_or(0, |s| s.source_line),
                is_error: step.is_some_and(|s| s.error.is_some()),
                breakpoints: &breakpoints,
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let console = self
            .session
            .trace()
            .map(|t| t.console_output(index))
            .unwrap_or_default();
        panes::render_console_pane(
            frame,
            left_rows[1],
            &console,
            step.map_or(0, |s| s.console_delta.len()),
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_variables_pane(
            frame,
            right_rows[0],
            step,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        panes::render_stack_pane(
            frame,
            right_rows[1],
            step,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        let message = match step {
            Some(step) if self.status_message.is_empty() => step.description.as_str(),
            _ => self.status_message.as_str(),
        };
        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message,
                current_step: index,
                total_steps: self.session.store().len(),
                status: self.session.status(),
                is_playing: self.session.is_playing(),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.session.pause();
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let target = self.session.current_index() + n;
                self.session.go_to_step(target);
                self.after_move("");
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.session.pause();
                self.session.step_backward();
                self.after_move("");
            }
            KeyCode::Right => {
                self.session.pause();
                self.session.step_forward();
                self.after_move("");
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_sub(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_sub(1);
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_add(1);
                }
                FocusedPane::Stack => {
                    self.stack_scroll = self.stack_scroll.saturating_add(1);
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    if self.session.is_playing() {
                        self.session.pause();
                        self.status_message = "Paused".to_string();
                    } else {
                        // Start immediately rather than after one interval
                        let now = Instant::now();
                        let start = now.checked_sub(self.play_interval).unwrap_or(now);
                        self.session.play(self.play_interval, start);
                        self.status_message = "Playing...".to_string();
                    }
                }
            }
            KeyCode::Char('b') => {
                if let Some(line) = self.session.current_step().map(|s| s.source_line) {
                    let set = self.session.toggle_breakpoint(line);
                    self.status_message = if set {
                        format!("Breakpoint set on line {}", line)
                    } else {
                        format!("Breakpoint cleared on line {}", line)
                    };
                }
            }
            KeyCode::Char('n') => {
                self.session.pause();
                self.session.run_to_next_breakpoint();
                let line = self.session.current_step().map_or(0, |s| s.source_line);
                if self.session.has_breakpoint(line) {
                    self.after_move(&format!("Stopped at breakpoint on line {}", line));
                } else {
                    self.after_move("No further breakpoint");
                }
            }
            KeyCode::Char('r') => {
                self.session.pause();
                let source = self.source_code.clone();
                match self.session.run(&source) {
                    Ok(()) => self.after_move(&format!("Re-ran (run #{})", self.session.run_count())),
                    Err(err) => self.status_message = err.to_string(),
                }
            }
            KeyCode::Enter => {
                self.session.pause();
                self.session.go_to_end();
                let message = match self.session.status() {
                    RunStatus::Error => "Jumped to error",
                    _ => "Jumped to end",
                };
                self.after_move(message);
            }
            KeyCode::Backspace => {
                self.session.reset();
                self.after_move("Jumped to start");
            }
            _ => {}
        }
    }

    /// After the cursor moves: show `message` (or the step description when
    /// empty) and keep the console scrolled to the bottom
    fn after_move(&mut self, message: &str) {
        self.status_message = message.to_string();
        self.console_scroll = usize::MAX;
    }
}
