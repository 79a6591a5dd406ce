// Integration tests for the step interpreter

use jsstepper::config::RunOptions;
use jsstepper::memory::runtime_value::{format_value, RuntimeValue};
use jsstepper::memory::scope::{Binding, ScopeKind, SlotStatus};
use jsstepper::snapshot::trace::Trace;
use jsstepper::snapshot::{ErrorKind, RunStatus, StepType};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Trace {
    jsstepper::run(source, &RunOptions::default()).expect("Parsing failed")
}

fn run_with(source: &str, options: RunOptions) -> Trace {
    jsstepper::run(source, &options).expect("Parsing failed")
}

fn final_output(trace: &Trace) -> Vec<String> {
    trace.console_output(trace.last_index())
}

fn count(trace: &Trace, step_type: StepType) -> usize {
    trace
        .steps()
        .iter()
        .filter(|s| s.step_type == step_type)
        .count()
}

#[test]
fn test_simple_arithmetic() {
    let trace = run("let x = 5;\nlet y = 10;\nlet z = x + y * 2;");
    assert_eq!(trace.status(), RunStatus::Completed);
    let last = trace.last().unwrap();
    assert_eq!(last.value_of("z"), Some(&RuntimeValue::number(25.0)));
}

#[test]
fn test_steps_are_indexed_and_only_the_last_is_terminal() {
    let trace = run("let a = 1;\na = a + 1;\nconsole.log(a);");
    for (i, step) in trace.steps().iter().enumerate() {
        assert_eq!(step.index, i);
        assert_eq!(step.is_terminal(), i == trace.last_index());
    }
    assert_eq!(trace.steps()[0].description, "Program start");
    assert_eq!(trace.last().unwrap().description, "Program finished");
}

#[test]
fn test_var_and_function_hoisting() {
    let source = "console.log(x);\nvar x = 5;\nconsole.log(f());\nfunction f() { return 1; }";
    let trace = run(source);
    assert_eq!(trace.status(), RunStatus::Completed);
    assert_eq!(final_output(&trace), vec!["undefined", "1"]);

    // Both names exist before the first statement runs
    let start = &trace.steps()[0];
    assert_eq!(start.variable("x").unwrap().status, SlotStatus::Uninitialized);
    assert_eq!(start.variable("f").unwrap().binding, Binding::Function);
}

#[test]
fn test_let_read_in_temporal_dead_zone() {
    let trace = run("console.log(y);\nlet y = 1;");
    assert_eq!(trace.status(), RunStatus::Error);

    let start = &trace.steps()[0];
    assert_eq!(start.variable("y").unwrap().status, SlotStatus::Tdz);

    let error = trace.error().unwrap();
    assert_eq!(error.kind, ErrorKind::ReferenceError);
    assert_eq!(
        error.message,
        "ReferenceError: Cannot access 'y' before initialization"
    );
    assert_eq!(error.line, 1);
    assert_eq!(trace.last().unwrap().step_type, StepType::Error);
}

#[test]
fn test_error_inside_block_shows_the_block_scope() {
    let trace = run("let a = 1;\n{\n  console.log(y);\n  let y = 5;\n}");
    let last = trace.last().unwrap();
    assert_eq!(last.step_type, StepType::Error);
    assert_eq!(last.error.as_ref().unwrap().line, 3);

    let kinds: Vec<ScopeKind> = last.scopes.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![ScopeKind::Block, ScopeKind::Global]);
    let y = last.scopes[0].variables.iter().find(|v| v.name == "y").unwrap();
    assert_eq!(y.status, SlotStatus::Tdz);
    assert_eq!(last.value_of("a"), Some(&RuntimeValue::number(1.0)));
}

#[test]
fn test_error_inside_call_shows_the_callee_scope() {
    let source = "function f(p) {\n  let q = p * 2;\n  return missing + q;\n}\nfor (let i = 0; i < 2; i++) {\n  f(i + 3);\n}";
    let trace = run(source);
    let last = trace.last().unwrap();
    let error = last.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::ReferenceError);
    assert_eq!(error.line, 3);

    let kinds: Vec<ScopeKind> = last.scopes.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![ScopeKind::Function, ScopeKind::Global]);
    assert_eq!(last.value_of("p"), Some(&RuntimeValue::number(3.0)));
    assert_eq!(last.value_of("q"), Some(&RuntimeValue::number(6.0)));
    // The loop variable belongs to the caller, not the failing frame
    assert!(last.variable("i").is_none());

    assert_eq!(last.call_stack.len(), 1);
    let frame = &last.call_stack[0];
    assert_eq!(frame.function_name, "f");
    assert_eq!(frame.params, vec![("p".to_string(), RuntimeValue::number(3.0))]);
    assert_eq!(frame.locals, vec![("q".to_string(), RuntimeValue::number(6.0))]);
    assert_eq!(frame.caller_line, 6);
}

#[test]
fn test_undefined_name() {
    let trace = run("let a = 1;\nlet b = missing + a;");
    let error = trace.error().unwrap();
    assert_eq!(error.kind, ErrorKind::ReferenceError);
    assert_eq!(error.message, "ReferenceError: missing is not defined");
    assert_eq!(error.line, 2);
}

#[test]
fn test_closure_keeps_its_scope_alive() {
    let source = r#"function makeCounter() {
    let c = 0;
    return function() {
        c = c + 1;
        return c;
    };
}
const counter = makeCounter();
counter();
const v = counter();"#;
    let trace = run(source);
    assert_eq!(trace.status(), RunStatus::Completed);
    let last = trace.last().unwrap();
    assert_eq!(last.value_of("v"), Some(&RuntimeValue::number(2.0)));

    let closure_scope = match last.value_of("counter") {
        Some(RuntimeValue::Function { closure_scope, .. }) => *closure_scope,
        other => panic!("Expected function, got {:?}", other),
    };

    // Both writes to `c` land in the same captured scope
    let owners: Vec<_> = trace
        .steps()
        .iter()
        .filter(|s| s.description == "c = 1" || s.description == "c = 2")
        .map(|s| {
            s.scopes
                .iter()
                .find(|scope| scope.variables.iter().any(|v| v.name == "c"))
                .map(|scope| scope.id)
                .unwrap()
        })
        .collect();
    assert_eq!(owners, vec![closure_scope, closure_scope]);
}

#[test]
fn test_call_and_return_steps() {
    let trace = run("function add(a, b) {\n  return a + b;\n}\nconst r = add(2, 3);");
    assert_eq!(trace.status(), RunStatus::Completed);

    let call = trace
        .steps()
        .iter()
        .find(|s| s.step_type == StepType::Call)
        .unwrap();
    assert_eq!(call.description, "Call add(2, 3)");
    assert_eq!(call.call_stack.len(), 1);
    let frame = &call.call_stack[0];
    assert_eq!(frame.function_name, "add");
    assert_eq!(frame.caller_line, 4);
    assert_eq!(
        frame.params,
        vec![
            ("a".to_string(), RuntimeValue::number(2.0)),
            ("b".to_string(), RuntimeValue::number(3.0)),
        ]
    );

    let ret = trace
        .steps()
        .iter()
        .find(|s| s.step_type == StepType::Return)
        .unwrap();
    assert_eq!(ret.description, "Return 5 from add");
    assert_eq!(ret.source_line, 2);

    let last = trace.last().unwrap();
    assert!(last.call_stack.is_empty());
    assert_eq!(last.value_of("r"), Some(&RuntimeValue::number(5.0)));
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let trace = run_with("while (true) {}", RunOptions::default().with_max_steps(50));
    assert_eq!(trace.len(), 51);

    let last = trace.last().unwrap();
    assert_eq!(last.index, 50);
    assert_eq!(last.status, RunStatus::Error);
    assert_eq!(
        last.error.as_ref().unwrap().kind,
        ErrorKind::ExecutionLimitExceeded
    );
}

#[test]
fn test_runaway_recursion_overflows() {
    let source = "function f(n) {\n  return f(n + 1);\n}\nf(0);";
    let trace = run_with(source, RunOptions::default().with_max_call_depth(50));
    let last = trace.last().unwrap();
    assert_eq!(last.error.as_ref().unwrap().kind, ErrorKind::StackOverflow);
    assert_eq!(last.call_stack.len(), 50);
    assert_eq!(count(&trace, StepType::Call), 50);
}

#[test]
fn test_array_push_leaves_earlier_snapshots_alone() {
    let trace = run("let a = [1, 2];\na.push(3);");
    assert_eq!(trace.status(), RunStatus::Completed);

    let declared = trace
        .steps()
        .iter()
        .find(|s| s.description == "let a = [1, 2]")
        .unwrap();
    let pushed = trace
        .steps()
        .iter()
        .find(|s| s.step_type == StepType::ArrayModify)
        .unwrap();
    assert_eq!(pushed.description, "a.push(3) → 3");

    let before = declared.value_of("a").unwrap();
    let after = pushed.value_of("a").unwrap();
    assert_eq!(before.elements().unwrap().len(), 2);
    assert_eq!(after.elements().unwrap().len(), 3);
    assert_eq!(before.id(), after.id());
}

#[test]
fn test_array_aliases_share_identity() {
    let trace = run("let a = [1];\nlet b = a;\nb[0] = 9;\nconsole.log(a[0]);");
    assert_eq!(final_output(&trace), vec!["9"]);

    let last = trace.last().unwrap();
    assert_eq!(last.value_of("a").unwrap().id(), last.value_of("b").unwrap().id());
    assert!(trace
        .steps()
        .iter()
        .any(|s| s.step_type == StepType::ArrayModify && s.description == "b[0] = 9"));
}

#[test]
fn test_equal_arrays_keep_separate_identities() {
    let trace = run("let a = [1, 2];\nlet b = [1, 2];\na.push(3);");
    assert_eq!(trace.status(), RunStatus::Completed);

    let declared = trace
        .steps()
        .iter()
        .find(|s| s.description == "let b = [1, 2]")
        .unwrap();
    let a = declared.value_of("a").unwrap();
    let b = declared.value_of("b").unwrap();
    assert_eq!(format_value(a, true), format_value(b, true));
    assert_ne!(a.id(), b.id());

    let last = trace.last().unwrap();
    assert_eq!(format_value(last.value_of("a").unwrap(), true), "[1, 2, 3]");
    assert_eq!(format_value(last.value_of("b").unwrap(), true), "[1, 2]");
}

#[test]
fn test_shared_nested_arrays_do_not_blow_up() {
    let source = "let x = [0];\nfor (let i = 0; i < 30; i++) {\n  x = [x, x];\n}\nconsole.log(x.length);";
    let trace = run(source);
    assert_eq!(trace.status(), RunStatus::Completed);
    assert_eq!(final_output(&trace), vec!["2"]);

    let last = trace.last().unwrap();
    let x = last.value_of("x").unwrap();
    assert_eq!(x.elements().unwrap().len(), 2);
    assert!(format_value(x, true).starts_with("[[[[["));
}

#[test]
fn test_array_read_step() {
    let trace = run("let a = [10, 20];\nlet x = a[1];");
    let read = trace
        .steps()
        .iter()
        .find(|s| s.step_type == StepType::ArrayAccess)
        .unwrap();
    assert_eq!(read.description, "Read a[1] → 20");
    assert_eq!(read.source_line, 2);
}

#[test]
fn test_runs_are_deterministic() {
    let source = r#"let total = 0;
for (let i = 0; i < 5; i++) {
    total += i;
}
const obj = { sum: total, items: [1, "two"] };
console.log(obj);"#;
    let first = serde_json::to_string(&run(source)).unwrap();
    let second = serde_json::to_string(&run(source)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_calling_a_number_is_a_type_error() {
    let trace = run("let n = 5;\nn();");
    let error = trace.error().unwrap();
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert_eq!(error.message, "TypeError: n is not a function");
}

#[test]
fn test_reading_property_of_undefined() {
    let trace = run("let u;\nlet z = u.x;");
    let error = trace.error().unwrap();
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert!(error
        .message
        .contains("Cannot read properties of undefined (reading 'x')"));
}

#[test]
fn test_const_reassignment() {
    let trace = run("const k = 1;\nk = 2;");
    let error = trace.error().unwrap();
    assert_eq!(error.kind, ErrorKind::TypeError);
    assert_eq!(error.message, "TypeError: Assignment to constant variable 'k'");
    assert_eq!(error.line, 2);
}

#[test]
fn test_assignment_to_undeclared_creates_global() {
    let trace = run("function f() {\n  g = 5;\n}\nf();\nconsole.log(g);");
    assert_eq!(trace.status(), RunStatus::Completed);
    assert_eq!(final_output(&trace), vec!["5"]);

    let last = trace.last().unwrap();
    let global = last.scopes.last().unwrap();
    let g = global.variables.iter().find(|v| v.name == "g").unwrap();
    assert_eq!(g.binding, Binding::Implicit);
}

#[test]
fn test_let_loop_variable_is_fresh_per_iteration() {
    let source = r#"const fns = [];
for (let i = 0; i < 3; i++) {
    fns.push(function() { return i; });
}
console.log(fns[0](), fns[2]());"#;
    assert_eq!(final_output(&run(source)), vec!["0 2"]);
}

#[test]
fn test_var_loop_variable_is_shared() {
    let source = r#"const fns = [];
for (var i = 0; i < 3; i++) {
    fns.push(function() { return i; });
}
console.log(fns[0](), fns[2]());"#;
    assert_eq!(final_output(&run(source)), vec!["3 3"]);
}

#[test]
fn test_for_loop_step_counts() {
    let trace = run("for (let i = 0; i < 3; i++) {}");
    assert_eq!(count(&trace, StepType::LoopIteration), 3);
    assert_eq!(count(&trace, StepType::Comparison), 4);

    let descriptions: Vec<&str> = trace
        .steps()
        .iter()
        .filter(|s| s.step_type == StepType::LoopIteration)
        .map(|s| s.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "for loop iteration 1",
            "for loop iteration 2",
            "for loop iteration 3"
        ]
    );
}

#[test]
fn test_break_and_continue() {
    let source = r#"let out = [];
let i = 0;
while (i < 10) {
    i++;
    if (i % 2 === 0) { continue; }
    if (i > 7) { break; }
    out.push(i);
}
console.log(out);"#;
    assert_eq!(final_output(&run(source)), vec!["[1, 3, 5, 7]"]);
}

#[test]
fn test_do_while_runs_once() {
    let trace = run("let n = 0;\ndo {\n  n++;\n} while (false);");
    assert_eq!(count(&trace, StepType::LoopIteration), 1);
    assert_eq!(
        trace.last().unwrap().value_of("n"),
        Some(&RuntimeValue::number(1.0))
    );
}

#[test]
fn test_console_output_accumulates() {
    let trace = run("console.log(\"a\");\nconsole.log(\"b\");");
    assert_eq!(trace.steps()[1].console_delta, vec!["a"]);
    assert_eq!(trace.console_output(1), vec!["a"]);
    assert_eq!(trace.console_output(2), vec!["a", "b"]);
    assert_eq!(final_output(&trace), vec!["a", "b"]);
}

#[test]
fn test_console_formatting() {
    let trace = run("console.log([1, \"x\"], { a: 1 }, null, 0.5);");
    assert_eq!(final_output(&trace), vec!["[1, \"x\"] { a: 1 } null 0.5"]);
}

#[test]
fn test_string_and_number_coercion() {
    let source = r#"console.log("n=" + 4 + 2);
console.log(1 + 2 + "3");
console.log("5" * 2, 7 / 2, 5 % 3);
console.log(1 == "1", 1 === "1", null == undefined);
console.log(typeof nope, typeof 1, typeof "s", typeof []);"#;
    assert_eq!(
        final_output(&run(source)),
        vec![
            "n=42",
            "33",
            "10 3.5 2",
            "true false true",
            "undefined number string object",
        ]
    );
}

#[test]
fn test_math_and_array_methods() {
    let source = r#"const a = [3, 1, 2];
console.log(Math.max(a[0], a[1]), Math.floor(2.7), Math.abs(-4));
console.log(a.indexOf(2), a.includes(5), a.join("-"));
console.log(a.slice(1), a.pop(), a.length);"#;
    assert_eq!(
        final_output(&run(source)),
        vec!["3 2 4", "2 false 3-1-2", "[1, 2] 2 2"]
    );
}

#[test]
fn test_block_scope_shadowing() {
    let source = "let x = 1;\n{\n  let x = 2;\n  console.log(x);\n}\nconsole.log(x);";
    let trace = run(source);
    assert_eq!(final_output(&trace), vec!["2", "1"]);

    // Inside the block both bindings are visible, innermost first
    let inner = trace
        .steps()
        .iter()
        .find(|s| s.description == "let x = 2")
        .unwrap();
    assert_eq!(inner.scopes.len(), 2);
    assert_eq!(inner.value_of("x"), Some(&RuntimeValue::number(2.0)));
}

#[test]
fn test_recursive_function() {
    let source = r#"function fact(n) {
    if (n <= 1) { return 1; }
    return n * fact(n - 1);
}
console.log(fact(5));"#;
    let trace = run(source);
    assert_eq!(final_output(&trace), vec!["120"]);
    let deepest = trace.steps().iter().map(|s| s.call_stack.len()).max();
    assert_eq!(deepest, Some(5));
}

#[test]
fn test_arrow_functions_and_objects() {
    let source = r#"const point = { x: 1, y: 2 };
const sum = (p) => p.x + p.y;
point.x = 10;
console.log(sum(point), point);"#;
    assert_eq!(final_output(&run(source)), vec!["12 { x: 10, y: 2 }"]);
}

#[test]
fn test_parse_error_produces_no_trace() {
    let err = jsstepper::run("let = ;", &RunOptions::default()).unwrap_err();
    assert_eq!(err.location.line, 1);
}

#[test]
fn test_deeply_nested_source_runs() {
    let depth = 20_000;
    let source = format!(
        "let x = {}41{} + 1;\nconsole.log(x);",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let trace = run(&source);
    assert_eq!(trace.status(), RunStatus::Completed);
    assert_eq!(final_output(&trace), vec!["42"]);
}
