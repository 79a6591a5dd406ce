// Constants for the interpreter

/// Default ceiling on non-terminal steps per run
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Default ceiling on nested user function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1_000;

/// Default delay between automatic steps while playing
pub const DEFAULT_PLAY_INTERVAL_MS: u64 = 500;

/// Minimum stack space to keep available before recursing (100KB red zone)
pub const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB)
pub const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Largest index an array write may grow an array to
pub const MAX_ARRAY_LENGTH: usize = 1 << 20;
