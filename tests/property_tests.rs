//! Property-based tests for the step interpreter and the navigator.
//!
//! Programs are generated from small templates with random operands, then
//! checked for:
//! 1. Determinism: the same source always yields the same trace
//! 2. Trace shape: dense indices, exactly one terminal step, at the end
//! 3. Budget: a runaway loop stops with its error at index `max_steps`
//! 4. Navigation: the cursor stays in range under any operation sequence

use jsstepper::config::RunOptions;
use jsstepper::session::Session;
use jsstepper::snapshot::{ErrorKind, RunStatus};
use proptest::prelude::*;

fn program_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(-50i32..50, 0..6),
        0u32..6,
        -20i32..20,
        -20i32..20,
    )
        .prop_map(|(items, bound, a, b)| {
            let items: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!(
                "let xs = [{}];\nlet acc = {};\nfor (let i = 0; i < {}; i++) {{\n  acc = acc + i * {};\n  xs.push(acc);\n}}\nif (acc > 0) {{ console.log(\"pos\", acc); }} else {{ console.log(xs); }}",
                items.join(", "),
                a,
                bound,
                b
            )
        })
}

#[derive(Debug, Clone)]
enum NavOp {
    Forward,
    Backward,
    GoTo(usize),
    NextBreakpoint,
    Toggle(usize),
    Reset,
    End,
}

fn nav_op_strategy() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        Just(NavOp::Forward),
        Just(NavOp::Backward),
        (0usize..200).prop_map(NavOp::GoTo),
        Just(NavOp::NextBreakpoint),
        (1usize..9).prop_map(NavOp::Toggle),
        Just(NavOp::Reset),
        Just(NavOp::End),
    ]
}

proptest! {
    #[test]
    fn prop_runs_are_deterministic(source in program_strategy()) {
        let options = RunOptions::default();
        let first = jsstepper::run(&source, &options).unwrap();
        let second = jsstepper::run(&source, &options).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_trace_shape(source in program_strategy()) {
        let trace = jsstepper::run(&source, &RunOptions::default()).unwrap();
        prop_assert!(!trace.is_empty());
        for (i, step) in trace.steps().iter().enumerate() {
            prop_assert_eq!(step.index, i);
            prop_assert_eq!(step.is_terminal(), i == trace.last_index());
        }
        prop_assert_eq!(trace.status(), RunStatus::Completed);
        prop_assert_eq!(trace.console_output(trace.last_index()).len(), 1);
    }

    #[test]
    fn prop_integer_arithmetic(a in -1000i64..1000, b in -1000i64..1000) {
        let source = format!("console.log({} + {}, {} * {}, {} - {});", a, b, a, b, a, b);
        let trace = jsstepper::run(&source, &RunOptions::default()).unwrap();
        let expected = format!("{} {} {}", a + b, a * b, a - b);
        prop_assert_eq!(trace.console_output(trace.last_index()), vec![expected]);
    }

    #[test]
    fn prop_step_limit(max_steps in 1usize..300) {
        let options = RunOptions::default().with_max_steps(max_steps);
        let trace = jsstepper::run("let n = 0;\nwhile (true) {\n  n++;\n}", &options).unwrap();
        prop_assert_eq!(trace.len(), max_steps + 1);
        let error = trace.error().unwrap();
        prop_assert_eq!(error.kind, ErrorKind::ExecutionLimitExceeded);
    }

    #[test]
    fn prop_cursor_stays_in_range(
        source in program_strategy(),
        ops in prop::collection::vec(nav_op_strategy(), 0..40),
    ) {
        let mut session = Session::new(RunOptions::default());
        session.run(&source).unwrap();
        let len = session.store().len();

        for op in ops {
            let index = match op {
                NavOp::Forward => session.step_forward(),
                NavOp::Backward => session.step_backward(),
                NavOp::GoTo(i) => session.go_to_step(i),
                NavOp::NextBreakpoint => session.run_to_next_breakpoint(),
                NavOp::Toggle(line) => {
                    session.toggle_breakpoint(line);
                    session.current_index()
                }
                NavOp::Reset => {
                    session.reset();
                    session.current_index()
                }
                NavOp::End => session.go_to_end(),
            };
            prop_assert!(index < len);
            prop_assert_eq!(index, session.current_index());
            prop_assert!(session.current_step().is_some());
        }

        prop_assert_eq!(session.run_count(), 1);
        prop_assert_eq!(session.store().len(), len);
    }
}
