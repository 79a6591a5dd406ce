//! Navigation and breakpoints over a recorded trace
//!
//! [`Navigator`] owns the cursor, the breakpoint set and the playback timer.
//! Every operation only moves the cursor inside an existing [`Trace`]; nothing
//! here can re-run the interpreter.
//!
//! # Playback
//!
//! Playback is driven by the caller: [`Navigator::play`] arms a timer and
//! [`Navigator::tick`] is called from the event loop with the current time.
//! Each tick whose interval has elapsed advances one step, stopping at the
//! last step or on a line with a breakpoint.

use crate::snapshot::trace::Trace;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// What a playback tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    NotPlaying,
    /// Interval has not elapsed yet
    Waiting,
    Advanced,
    /// Advanced onto a breakpoint line; playback stopped
    HitBreakpoint,
    /// Reached the last step; playback stopped
    Finished,
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    interval: Duration,
    last_advance: Instant,
}

/// Cursor, breakpoints and playback state
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: usize,
    breakpoints: BTreeSet<usize>,
    playback: Option<Playback>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to `index`, clamped to the trace
    pub fn go_to_step(&mut self, trace: &Trace, index: usize) -> usize {
        self.current = index.min(trace.last_index());
        self.current
    }

    pub fn step_forward(&mut self, trace: &Trace) -> usize {
        self.go_to_step(trace, self.current.saturating_add(1))
    }

    pub fn step_backward(&mut self, trace: &Trace) -> usize {
        self.go_to_step(trace, self.current.saturating_sub(1))
    }

    /// Jump to the first later step on a breakpoint line, or to the last step
    pub fn run_to_next_breakpoint(&mut self, trace: &Trace) -> usize {
        let target = trace
            .steps()
            .iter()
            .skip(self.current + 1)
            .find(|step| self.breakpoints.contains(&step.source_line))
            .map_or(trace.last_index(), |step| step.index);
        self.go_to_step(trace, target)
    }

    /// Back to the first step, stopping playback
    pub fn reset(&mut self) {
        self.current = 0;
        self.playback = None;
    }

    /// Start auto-advancing every `interval`, counting from `now`
    pub fn play(&mut self, interval: Duration, now: Instant) {
        self.playback = Some(Playback {
            interval,
            last_advance: now,
        });
    }

    pub fn pause(&mut self) {
        self.playback = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Advance one step if the playback interval has elapsed at `now`
    pub fn tick(&mut self, trace: &Trace, now: Instant) -> TickOutcome {
        let Some(playback) = self.playback else {
            return TickOutcome::NotPlaying;
        };

        if self.current >= trace.last_index() {
            self.playback = None;
            return TickOutcome::Finished;
        }
        if now.saturating_duration_since(playback.last_advance) < playback.interval {
            return TickOutcome::Waiting;
        }

        let index = self.step_forward(trace);
        self.playback = Some(Playback {
            last_advance: now,
            ..playback
        });

        let on_breakpoint = trace
            .step_at(index)
            .is_some_and(|step| self.breakpoints.contains(&step.source_line));
        if on_breakpoint {
            self.playback = None;
            TickOutcome::HitBreakpoint
        } else if index >= trace.last_index() {
            self.playback = None;
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced
        }
    }

    pub fn add_breakpoint(&mut self, line: usize) {
        self.breakpoints.insert(line);
    }

    pub fn remove_breakpoint(&mut self, line: usize) {
        self.breakpoints.remove(&line);
    }

    /// Returns whether the line now has a breakpoint
    pub fn toggle_breakpoint(&mut self, line: usize) -> bool {
        if self.breakpoints.remove(&line) {
            false
        } else {
            self.breakpoints.insert(line);
            true
        }
    }

    pub fn has_breakpoint(&self, line: usize) -> bool {
        self.breakpoints.contains(&line)
    }

    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
    }

    /// Breakpoint lines in ascending order
    pub fn breakpoints(&self) -> impl Iterator<Item = usize> + '_ {
        self.breakpoints.iter().copied()
    }
}
