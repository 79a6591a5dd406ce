// Session and navigation tests: cursor movement never re-runs the program

use jsstepper::config::RunOptions;
use jsstepper::navigation::TickOutcome;
use jsstepper::session::Session;
use jsstepper::snapshot::RunStatus;
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const PROGRAM: &str = r#"let total = 0;
for (let i = 0; i < 3; i++) {
    total += i;
}
console.log(total);"#;

fn session_with(source: &str) -> Session {
    let mut session = Session::new(RunOptions::default());
    session.run(source).expect("Parsing failed");
    session
}

#[test]
fn test_new_session_is_idle() {
    let mut session = Session::default();
    assert_eq!(session.status(), RunStatus::Idle);
    assert!(session.trace().is_none());
    assert_eq!(session.current_step(), None);
    assert_eq!(session.step_forward(), 0);
    assert_eq!(session.tick(Instant::now()), TickOutcome::NotPlaying);
}

#[test]
fn test_navigation_does_not_rerun() {
    let mut session = session_with(PROGRAM);
    assert_eq!(session.run_count(), 1);
    let len = session.store().len();

    session.step_forward();
    session.step_forward();
    session.step_backward();
    session.go_to_step(len / 2);
    session.run_to_next_breakpoint();
    session.reset();

    assert_eq!(session.run_count(), 1);
    assert_eq!(session.store().len(), len);
}

#[test]
fn test_cursor_is_clamped() {
    let mut session = session_with(PROGRAM);
    let last = session.store().len() - 1;

    assert_eq!(session.step_backward(), 0);
    assert_eq!(session.go_to_step(usize::MAX), last);
    assert_eq!(session.step_forward(), last);
    assert_eq!(session.current_index(), last);
}

#[test]
fn test_go_to_step_is_idempotent() {
    let mut session = session_with(PROGRAM);
    let first = session.go_to_step(4);
    let step = session.current_step().cloned();
    assert_eq!(session.go_to_step(4), first);
    assert_eq!(session.current_step().cloned(), step);
}

#[test]
fn test_status_reports_paused_before_the_end() {
    let mut session = session_with(PROGRAM);
    assert_eq!(session.status(), RunStatus::Paused);
    session.go_to_end();
    assert_eq!(session.status(), RunStatus::Completed);
    session.step_backward();
    assert_eq!(session.status(), RunStatus::Paused);
}

#[test]
fn test_error_trace_status() {
    let mut session = session_with("let a = 1;\nundefinedFn();");
    assert_eq!(session.status(), RunStatus::Error);
    session.go_to_end();
    let step = session.current_step().unwrap();
    assert!(step.error.is_some());
}

#[test]
fn test_parse_error_leaves_session_idle() {
    let mut session = session_with(PROGRAM);
    session.add_breakpoint(3);

    assert!(session.run("let = ;").is_err());
    assert_eq!(session.run_count(), 2);
    assert_eq!(session.status(), RunStatus::Idle);
    assert!(session.trace().is_none());
    assert_eq!(session.breakpoints(), vec![3]);
}

#[test]
fn test_rerun_resets_cursor_and_keeps_breakpoints() {
    let mut session = session_with(PROGRAM);
    session.add_breakpoint(3);
    session.go_to_end();

    session.run(PROGRAM).unwrap();
    assert_eq!(session.run_count(), 2);
    assert_eq!(session.current_index(), 0);
    assert!(session.has_breakpoint(3));
}

#[test]
fn test_run_to_next_breakpoint() {
    let mut session = session_with(PROGRAM);
    session.add_breakpoint(3);

    let first = session.run_to_next_breakpoint();
    assert_eq!(session.current_step().unwrap().source_line, 3);

    let second = session.run_to_next_breakpoint();
    assert!(second > first);
    assert_eq!(session.current_step().unwrap().source_line, 3);

    // No breakpoint left ahead: lands on the final step
    session.remove_breakpoint(3);
    let end = session.run_to_next_breakpoint();
    assert_eq!(end, session.store().len() - 1);
}

#[test]
fn test_toggle_breakpoint() {
    let mut session = Session::default();
    assert!(session.toggle_breakpoint(2));
    assert!(session.has_breakpoint(2));
    assert!(!session.toggle_breakpoint(2));
    assert!(session.breakpoints().is_empty());
}

#[test]
fn test_playback_advances_on_interval() {
    let mut session = session_with(PROGRAM);
    let start = Instant::now();
    let interval = Duration::from_millis(100);
    session.play(interval, start);
    assert!(session.is_playing());

    assert_eq!(session.tick(start + Duration::from_millis(50)), TickOutcome::Waiting);
    assert_eq!(session.current_index(), 0);

    assert_eq!(session.tick(start + interval), TickOutcome::Advanced);
    assert_eq!(session.current_index(), 1);

    session.pause();
    assert_eq!(session.tick(start + interval * 5), TickOutcome::NotPlaying);
    assert_eq!(session.current_index(), 1);
}

#[test]
fn test_playback_stops_at_breakpoint_and_end() {
    let mut session = session_with(PROGRAM);
    session.add_breakpoint(3);
    let interval = Duration::from_millis(10);
    let mut now = Instant::now();
    session.play(interval, now);

    let mut outcome = TickOutcome::Advanced;
    while outcome == TickOutcome::Advanced {
        now += interval;
        outcome = session.tick(now);
    }
    assert_eq!(outcome, TickOutcome::HitBreakpoint);
    assert!(!session.is_playing());
    assert_eq!(session.current_step().unwrap().source_line, 3);

    session.remove_breakpoint(3);
    session.play(interval, now);
    let mut outcome = TickOutcome::Advanced;
    while outcome == TickOutcome::Advanced {
        now += interval;
        outcome = session.tick(now);
    }
    assert_eq!(outcome, TickOutcome::Finished);
    assert_eq!(session.status(), RunStatus::Completed);
}

#[test]
fn test_console_output_follows_cursor() {
    let mut session = session_with("console.log(1);\nconsole.log(2);");
    let trace_len = session.store().len();
    session.go_to_step(1);
    assert_eq!(session.trace().unwrap().console_output(1), vec!["1"]);
    session.go_to_step(trace_len - 1);
    let index = session.current_index();
    assert_eq!(session.trace().unwrap().console_output(index), vec!["1", "2"]);
}
