//! A debugging session: one trace store, one navigator
//!
//! [`Session::run`] is the only place that invokes the interpreter. Everything
//! else reads the stored trace or moves the cursor over it.

use crate::config::RunOptions;
use crate::interpreter::Interpreter;
use crate::navigation::{Navigator, TickOutcome};
use crate::parser::{parse, ParseError};
use crate::snapshot::trace::{Trace, TraceStore};
use crate::snapshot::{ExecutionStep, RunStatus};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Session {
    options: RunOptions,
    store: TraceStore,
    navigator: Navigator,
    runs: usize,
}

impl Session {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Parse and execute `source`, replacing the previous trace.
    ///
    /// A parse error leaves the session idle with no trace. Breakpoints survive.
    #[tracing::instrument(skip_all, fields(run = self.runs + 1))]
    pub fn run(&mut self, source: &str) -> Result<(), ParseError> {
        self.runs += 1;
        self.store.begin_run();
        self.navigator.reset();

        let program = match parse(source) {
            Ok(program) => program,
            Err(err) => {
                debug!(error = %err, "parse failed");
                self.store.abort();
                return Err(err);
            }
        };

        let trace = Interpreter::new(self.options).run(&program);
        info!(steps = trace.len(), status = trace.status().label(), "trace recorded");
        self.store.finish(trace);
        Ok(())
    }

    /// Number of times the interpreter has been invoked
    pub fn run_count(&self) -> usize {
        self.runs
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.store.trace()
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current()
    }

    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.store.step_at(self.navigator.current())
    }

    /// Store status, except that a completed trace viewed before its end is `paused`
    pub fn status(&self) -> RunStatus {
        match self.store.status() {
            RunStatus::Completed if self.navigator.current() < self.store.len().saturating_sub(1) => {
                RunStatus::Paused
            }
            status => status,
        }
    }

    pub fn go_to_step(&mut self, index: usize) -> usize {
        match self.store.trace() {
            Some(trace) => self.navigator.go_to_step(trace, index),
            None => 0,
        }
    }

    pub fn step_forward(&mut self) -> usize {
        match self.store.trace() {
            Some(trace) => self.navigator.step_forward(trace),
            None => 0,
        }
    }

    pub fn step_backward(&mut self) -> usize {
        match self.store.trace() {
            Some(trace) => self.navigator.step_backward(trace),
            None => 0,
        }
    }

    pub fn run_to_next_breakpoint(&mut self) -> usize {
        match self.store.trace() {
            Some(trace) => self.navigator.run_to_next_breakpoint(trace),
            None => 0,
        }
    }

    pub fn go_to_end(&mut self) -> usize {
        self.go_to_step(usize::MAX)
    }

    pub fn reset(&mut self) {
        self.navigator.reset();
    }

    pub fn play(&mut self, interval: Duration, now: Instant) {
        if self.store.trace().is_some() {
            self.navigator.play(interval, now);
        }
    }

    pub fn pause(&mut self) {
        self.navigator.pause();
    }

    pub fn is_playing(&self) -> bool {
        self.navigator.is_playing()
    }

    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        match self.store.trace() {
            Some(trace) => self.navigator.tick(trace, now),
            None => TickOutcome::NotPlaying,
        }
    }

    pub fn add_breakpoint(&mut self, line: usize) {
        self.navigator.add_breakpoint(line);
    }

    pub fn remove_breakpoint(&mut self, line: usize) {
        self.navigator.remove_breakpoint(line);
    }

    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        self.navigator.toggle_breakpoint(line)
    }

    pub fn has_breakpoint(&self, line: usize) -> bool {
        self.navigator.has_breakpoint(line)
    }

    pub fn breakpoints(&self) -> Vec<usize> {
        self.navigator.breakpoints().collect()
    }
}
