//! Run configuration

use crate::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS};

/// Budgets for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Ceiling on non-terminal steps; the limit error lands at this index
    pub max_steps: usize,
    /// Ceiling on nested user function calls
    pub max_call_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl RunOptions {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_builders() {
        let options = RunOptions::default();
        assert_eq!(options.max_steps, 10_000);
        assert_eq!(options.max_call_depth, 1_000);

        let options = options.with_max_steps(50).with_max_call_depth(8);
        assert_eq!(options.max_steps, 50);
        assert_eq!(options.max_call_depth, 8);
    }
}
