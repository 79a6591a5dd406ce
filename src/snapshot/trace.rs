//! Trace and trace store
//!
//! A [`Trace`] is the ordered list of steps produced by one run. It is built
//! append-only by the interpreter and never modified afterwards.
//!
//! The [`TraceStore`] holds at most one trace plus the run status. Starting a
//! new run drops the previous trace entirely.

use super::{ExecutionStep, RunStatus, StepError};
use serde::Serialize;

/// Ordered, immutable record of one run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Trace {
    steps: Vec<ExecutionStep>,
}

impl Trace {
    pub(crate) fn new(steps: Vec<ExecutionStep>) -> Self {
        Self { steps }
    }

    /// O(1) lookup by index
    pub fn step_at(&self, index: usize) -> Option<&ExecutionStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn last(&self) -> Option<&ExecutionStep> {
        self.steps.last()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Final status: the status of the terminal step
    pub fn status(&self) -> RunStatus {
        self.last().map(|s| s.status).unwrap_or_default()
    }

    /// The error that sealed the trace, if any
    pub fn error(&self) -> Option<&StepError> {
        self.last().and_then(|s| s.error.as_ref())
    }

    /// Console output accumulated up to and including step `index`
    pub fn console_output(&self, index: usize) -> Vec<String> {
        let end = index.saturating_add(1).min(self.steps.len());
        self.steps[..end]
            .iter()
            .flat_map(|s| s.console_delta.iter().cloned())
            .collect()
    }

    /// Indices of steps located on `line`
    pub fn steps_on_line(&self, line: usize) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .filter(move |s| s.source_line == line)
            .map(|s| s.index)
    }
}

/// Holds the current trace and its run status
#[derive(Debug, Default)]
pub struct TraceStore {
    trace: Option<Trace>,
    status: RunStatus,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous trace and mark a run in progress
    pub fn begin_run(&mut self) {
        self.trace = None;
        self.status = RunStatus::Running;
    }

    /// Install a finished trace; status follows its terminal step
    pub fn finish(&mut self, trace: Trace) {
        self.status = trace.status();
        self.trace = Some(trace);
    }

    /// The run never produced a trace (setup failure)
    pub fn abort(&mut self) {
        self.trace = None;
        self.status = RunStatus::Idle;
    }

    pub fn step_at(&self, index: usize) -> Option<&ExecutionStep> {
        self.trace.as_ref().and_then(|t| t.step_at(index))
    }

    pub fn len(&self) -> usize {
        self.trace.as_ref().map_or(0, Trace::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;

    fn sample_trace() -> Trace {
        crate::run("console.log(1);\nconsole.log(2);", &RunOptions::default()).unwrap()
    }

    #[test]
    fn test_store_lifecycle() {
        let mut store = TraceStore::new();
        assert_eq!(store.status(), RunStatus::Idle);
        assert!(store.is_empty());

        store.begin_run();
        assert_eq!(store.status(), RunStatus::Running);

        store.finish(sample_trace());
        assert_eq!(store.status(), RunStatus::Completed);
        assert_eq!(store.len(), 4);
        assert!(store.step_at(3).is_some());
        assert!(store.step_at(4).is_none());

        // A new run drops the old trace
        store.begin_run();
        assert!(store.trace().is_none());
        store.abort();
        assert_eq!(store.status(), RunStatus::Idle);
    }

    #[test]
    fn test_console_output_is_cumulative() {
        let trace = sample_trace();
        assert!(trace.console_output(0).is_empty());
        assert_eq!(trace.console_output(1), vec!["1"]);
        assert_eq!(trace.console_output(usize::MAX), vec!["1", "2"]);
    }

    #[test]
    fn test_steps_on_line() {
        let trace = sample_trace();
        let on_second: Vec<usize> = trace.steps_on_line(2).collect();
        assert!(on_second.contains(&2));
        assert!(!on_second.contains(&1));
    }
}
