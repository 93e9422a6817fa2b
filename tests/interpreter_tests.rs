// ABOUTME: Source-level integration tests covering every interpreter construct

use blox::error::EvalError;
use blox::eval::Runtime;
use blox::value::Value;
use blox::{run_program, RunError};

/// Run a program that is expected to evaluate cleanly
fn run(source: &str) -> Runtime {
    match run_program(source) {
        Ok(rt) => rt,
        Err(e) => panic!("program failed: {}\nsource: {}", e, source),
    }
}

fn lookup(rt: &Runtime, name: &str) -> Value {
    match rt.env.lookup(name) {
        Ok(value) => value.clone(),
        Err(_) => panic!("expected {} to be bound", name),
    }
}

fn int_of(rt: &Runtime, name: &str) -> i64 {
    match lookup(rt, name) {
        Value::Int { value, .. } => value,
        other => panic!("expected {} to be an int, got {}", name, other.type_name()),
    }
}

fn str_of(rt: &Runtime, name: &str) -> String {
    match lookup(rt, name) {
        Value::Str { value, .. } => value,
        other => panic!("expected {} to be a string, got {}", name, other.type_name()),
    }
}

fn bool_of(rt: &Runtime, name: &str) -> bool {
    match lookup(rt, name) {
        Value::Bool { value, .. } => value,
        other => panic!("expected {} to be a bool, got {}", name, other.type_name()),
    }
}

/// Expect an evaluation failure and hand back the error for inspection
fn run_err(source: &str) -> EvalError {
    match run_program(source) {
        Err(RunError::Eval(e)) => e,
        Err(RunError::Parse(e)) => panic!("expected evaluation error, got parse error: {}", e),
        Ok(_) => panic!("expected failure for: {}", source),
    }
}

// ============================================================================
// Assignment and name references
// ============================================================================

#[test]
fn test_assignment() {
    let rt = run("x = 5;");
    assert_eq!(int_of(&rt, "x"), 5);

    let rt = run("str = \"hello\";");
    assert_eq!(str_of(&rt, "str"), "hello");

    let rt = run("boolean = true;");
    assert!(bool_of(&rt, "boolean"));
}

#[test]
fn test_assignment_keeps_literal_token() {
    let rt = run("str = \"hello\";");
    match lookup(&rt, "str") {
        Value::Str { value, literal } => {
            assert_eq!(value, "hello");
            assert_eq!(literal, "\"hello\"");
        }
        other => panic!("expected Str, got {}", other.type_name()),
    }
}

#[test]
fn test_dereference() {
    let table = [
        ("x = 5; y = x;", "y", Value::int(5)),
        (
            "one = \"two\"; str = one;",
            "str",
            Value::Str {
                value: "two".to_string(),
                literal: "\"two\"".to_string(),
            },
        ),
        ("boolean = true; other=boolean", "other", Value::bool(true)),
    ];

    for (program, name, expected) in table {
        let rt = run(program);
        assert_eq!(lookup(&rt, name), expected, "program: {}", program);
    }
}

#[test]
fn test_dereference_unbound() {
    assert!(matches!(run_err("y = x;"), EvalError::UnboundName(name) if name == "x"));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    let table = [
        ("x = 5 + 3;", 8),
        ("x = 5 - 3;", 2),
        ("x = 6 * 2;", 12),
        ("x = 6 / 2;", 3),
        ("x = 6 - 10;", -4),
        ("x = 10 * -1;", -10),
        ("x = -10 / -2;", 5),
        ("x = -1 * (1 + 1);", -2),
        ("a = 2; x = a - 2;", 0),
    ];

    for (program, expected) in table {
        let rt = run(program);
        assert_eq!(int_of(&rt, "x"), expected, "program: {}", program);
    }
}

#[test]
fn test_arithmetic_result_literal_is_display_form() {
    let rt = run("x = 5 + 3;");
    match lookup(&rt, "x") {
        Value::Int { value, literal } => {
            assert_eq!(value, 8);
            assert_eq!(literal, "5 + 3");
        }
        other => panic!("expected Int, got {}", other.type_name()),
    }
}

#[test]
fn test_arithmetic_type_error() {
    assert!(matches!(
        run_err("x = 5 + \"three\";"),
        EvalError::TypeError { .. }
    ));
}

#[test]
fn test_division_by_zero() {
    assert!(matches!(run_err("x = 1 / 0;"), EvalError::ValueError(_)));
}

// ============================================================================
// Comparison and logic
// ============================================================================

#[test]
fn test_compare() {
    let table = [
        ("x = (5 < 2);", false),
        ("x = (5 > 2);", true),
        ("x = (true == true);", true),
        ("x = (5 == 0);", false),
        ("x = (\"hi\" == \"hi\");", true),
        ("x = (\"bye\" == \"hi\");", false),
        ("x = ((5 + 8) > 3);", true),
        ("x = (false or true)", true),
        ("x = (false or false)", false),
        ("x = (false and true)", false),
        ("x = (true and true)", true),
    ];

    for (program, expected) in table {
        let rt = run(program);
        assert_eq!(bool_of(&rt, "x"), expected, "program: {}", program);
    }
}

#[test]
fn test_compare_strings_lexicographically() {
    let rt = run("x = (\"abc\" < \"abd\");");
    assert!(bool_of(&rt, "x"));
}

#[test]
fn test_compare_mixed_types_rejected() {
    assert!(matches!(
        run_err("x = (5 == \"5\");"),
        EvalError::TypeError { .. }
    ));
}

// ============================================================================
// Concatenation
// ============================================================================

#[test]
fn test_concat() {
    let table = [
        ("x = \"hello\" ++ \"world\";", "helloworld"),
        ("x = \"hello\" ++ \" \" ++ \"world\";", "hello world"),
        (
            "x = \"idk\" ++ \" \" ++ \"how else \" ++ \"to test this\";",
            "idk how else to test this",
        ),
    ];

    for (program, expected) in table {
        let rt = run(program);
        assert_eq!(str_of(&rt, "x"), expected, "program: {}", program);
    }
}

#[test]
fn test_concat_requires_strings() {
    assert!(matches!(
        run_err("x = \"a\" ++ 1;"),
        EvalError::TypeError { .. }
    ));
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_loop_ascending() {
    let rt = run("acc = 0;\nfor i in (0, 5, 1) {\n    acc = acc + i\n}");
    assert_eq!(int_of(&rt, "acc"), 10);
}

#[test]
fn test_loop_descending() {
    let rt = run("acc = 0;\nfor i in (0, -10, -1) {\n    acc = acc + i\n}");
    assert_eq!(int_of(&rt, "acc"), -45);
}

#[test]
fn test_loop_iterator_is_removed() {
    let rt = run("for i in (0, 3, 1) { x = i; }");
    assert!(rt.env.lookup("i").is_err());
    assert_eq!(int_of(&rt, "x"), 2);
}

#[test]
fn test_loop_zero_step_rejected() {
    assert!(matches!(
        run_err("for i in (0, 5, 0) { x = 1; }"),
        EvalError::ValueError(_)
    ));
}

#[test]
fn test_loop_zero_step_with_empty_range_is_fine() {
    let rt = run("x = 1; for i in (3, 3, 0) { x = 2; }");
    assert_eq!(int_of(&rt, "x"), 1);
}

#[test]
fn test_loop_bounds_must_be_ints() {
    assert!(matches!(
        run_err("for i in (0, \"five\", 1) { x = 1; }"),
        EvalError::TypeError { .. }
    ));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_declaration_binds_function() {
    let rt = run("function x(one, two, three) {\n    y = 5;\n}");
    match lookup(&rt, "x") {
        Value::Function { name, params, .. } => {
            assert_eq!(name, "x");
            assert_eq!(params, vec!["one", "two", "three"]);
        }
        other => panic!("expected a function, got {}", other.type_name()),
    }
}

#[test]
fn test_call_returns_body_result() {
    let rt = run("function add(a, b) {\n    a + b;\n}\nx = add(5, 6);");
    assert_eq!(int_of(&rt, "x"), 11);
}

#[test]
fn test_call_with_loop_in_body() {
    let source = "function concat(a, b) {\n\
                      x = 0;\n\
                      for i in (0, 5, 1) {\n\
                          x = x + 1;\n\
                      }\n\
                      a ++ b;\n\
                  }\n\
                  x = concat(\"hello \", \"world\");";
    let rt = run(source);
    assert_eq!(str_of(&rt, "x"), "hello world");
}

#[test]
fn test_zero_argument_call() {
    let rt = run("function hi() { \"hello\" } x = hi();");
    assert_eq!(str_of(&rt, "x"), "hello");
}

#[test]
fn test_call_arguments_stay_in_the_callee() {
    let rt = run("a = 1; function f(b) { b + 1; } x = f(10);");
    assert_eq!(int_of(&rt, "x"), 11);
    assert!(rt.env.lookup("b").is_err());
}

#[test]
fn test_recursion() {
    let source = "function fact(n) {\n\
                      out = 1;\n\
                      if (n > 1) { out = n * fact(n - 1); }\n\
                      out;\n\
                  }\n\
                  x = fact(5);";
    let rt = run(source);
    assert_eq!(int_of(&rt, "x"), 120);
}

#[test]
fn test_call_arity_mismatch() {
    assert!(matches!(
        run_err("function f(a) { a; } x = f();"),
        EvalError::ArityError { .. }
    ));
}

#[test]
fn test_call_of_missing_function() {
    assert!(matches!(
        run_err("x = nope(1);"),
        EvalError::UnboundName(_)
    ));
}

#[test]
fn test_call_of_non_function() {
    assert!(matches!(
        run_err("f = 3; x = f(1);"),
        EvalError::TypeError { .. }
    ));
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_if_elif_else() {
    let table = [
        (
            "x = 0;\nx_str = \"empty\";\nif (x < 0) { x_str = \"x < 0\"; }\nelif (x > 0) { x_str = \"x > 0\"; }\nelif (x == 0) { x_str = \"x == 0\"; }\nelse { x_str = \"error ig\"; }",
            "x == 0",
        ),
        (
            "x = -10;\nx_str = \"empty\";\nif (x < 0) { x_str = \"x < 0\"; }\nelif (x > 0) { x_str = \"x > 0\"; }\nelif (x == 0) { x_str = \"x == 0\"; }\nelse { x_str = \"error ig\"; }",
            "x < 0",
        ),
        (
            "x = 0;\nx_str = \"empty\";\nif (x < 0) { x_str = \"x < 0\"; }\nelif (x > 0) { x_str = \"x > 0\"; }\nelse { x_str = \"x == 0\"; }",
            "x == 0",
        ),
        ("x_str = \"empty\";\nif (10 > 0) { x_str = \"two\"; }", "two"),
        (
            "x_str = \"empty\";\nif (10 > 100) { x_str = \"two\"; }\nelif (100 > 10) { x_str = \"three\"; }",
            "three",
        ),
        (
            "x_str = \"empty\";\nif (10 > 100) { x_str = \"two\"; }\nelse { x_str = \"three\"; }",
            "three",
        ),
    ];

    for (program, expected) in table {
        let rt = run(program);
        assert_eq!(str_of(&rt, "x_str"), expected, "program: {}", program);
    }
}

#[test]
fn test_if_without_match_leaves_bindings_alone() {
    let rt = run("x_str = \"empty\"; if (1 > 2) { x_str = \"nope\"; }");
    assert_eq!(str_of(&rt, "x_str"), "empty");
}

#[test]
fn test_if_guard_must_be_bool() {
    assert!(matches!(
        run_err("if (1 + 1) { x = 1; }"),
        EvalError::TypeError { .. }
    ));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_literal() {
    let rt = run("list = [1,2,3];");
    assert_eq!(
        lookup(&rt, "list"),
        Value::List(vec![Value::int(1), Value::int(2), Value::int(3)])
    );
}

#[test]
fn test_list_get() {
    let rt = run("value = [1,2,3]; value = value.get(2);");
    assert_eq!(int_of(&rt, "value"), 3);

    let rt = run("item = [1,2,3].get(2);");
    assert_eq!(int_of(&rt, "item"), 3);
}

#[test]
fn test_list_del() {
    let rt = run("value = [1,2,3]; value = value.del(2);");
    assert_eq!(
        lookup(&rt, "value"),
        Value::List(vec![Value::int(1), Value::int(2)])
    );

    let rt = run("item = [1,2,3].del(0);");
    assert_eq!(
        lookup(&rt, "item"),
        Value::List(vec![Value::int(2), Value::int(3)])
    );
}

#[test]
fn test_list_add() {
    let rt = run("value = [1,2,3]; value = value.add(4);");
    assert_eq!(
        lookup(&rt, "value"),
        Value::List(vec![
            Value::int(1),
            Value::int(2),
            Value::int(3),
            Value::int(4)
        ])
    );
}

#[test]
fn test_list_len() {
    let table = [
        ("value = [1,2,3]; length = value.len;", 3),
        ("value = []; length = value.len;", 0),
        ("length = [].len;", 0),
        ("length = [1,2,3].len;", 3),
    ];

    for (program, expected) in table {
        let rt = run(program);
        assert_eq!(int_of(&rt, "length"), expected, "program: {}", program);
    }
}

#[test]
fn test_list_add_through_reassignment() {
    let source = "value = [];\n\
                  value = value.add(1);\n\
                  value = value.add(2);\n\
                  value = value.add(3);\n\
                  length = value.len";
    let rt = run(source);
    assert_eq!(int_of(&rt, "length"), 3);
}

#[test]
fn test_list_add_in_statement_position_rebinds() {
    let source = "value = [];\n\
                  value.add(1);\n\
                  value.add(2);\n\
                  value.add(3);\n\
                  length = value.len";
    let rt = run(source);
    assert_eq!(int_of(&rt, "length"), 3);
}

#[test]
fn test_list_ops_on_literals_do_not_touch_environment() {
    let rt = run("value = [9]; other = [1,2].add(3); length = value.len;");
    assert_eq!(int_of(&rt, "length"), 1);
    assert_eq!(
        lookup(&rt, "other"),
        Value::List(vec![Value::int(1), Value::int(2), Value::int(3)])
    );
}

#[test]
fn test_heterogeneous_list() {
    let rt = run("mixed = [1, \"two\", true];");
    match lookup(&rt, "mixed") {
        Value::List(elements) => {
            assert_eq!(elements.len(), 3);
            assert_eq!(elements[0], Value::int(1));
            assert!(matches!(elements[1], Value::Str { .. }));
            assert_eq!(elements[2], Value::bool(true));
        }
        other => panic!("expected a list, got {}", other.type_name()),
    }
}

#[test]
fn test_spec_list_pipeline() {
    // del then add: [1,2,3] -> [1,2] -> [1,2,4]
    let rt = run("v = [1,2,3]; v = v.del(2); v = v.add(4);");
    assert_eq!(
        lookup(&rt, "v"),
        Value::List(vec![Value::int(1), Value::int(2), Value::int(4)])
    );
}

#[test]
fn test_add_then_del_restores_list() {
    let rt = run("v = [1,2]; v = v.add(9); v = v.del(2);");
    assert_eq!(
        lookup(&rt, "v"),
        Value::List(vec![Value::int(1), Value::int(2)])
    );
}

#[test]
fn test_list_index_errors() {
    assert!(matches!(
        run_err("x = [1,2].get(2);"),
        EvalError::IndexError { index: 2, len: 2 }
    ));
    assert!(matches!(
        run_err("x = [1,2].del(5);"),
        EvalError::IndexError { .. }
    ));
}

#[test]
fn test_list_ops_require_lists() {
    assert!(matches!(
        run_err("x = 5; y = x.len;"),
        EvalError::TypeError { .. }
    ));
    assert!(matches!(
        run_err("y = \"s\".get(0);"),
        EvalError::TypeError { .. }
    ));
}

#[test]
fn test_display_round_trip_for_literals() {
    for source in ["x = 42;", "x = true;", "x = \"quoted\";"] {
        let rt = run(source);
        let shown = lookup(&rt, "x").to_string();

        let rt2 = run(&format!("x = {};", shown));
        assert_eq!(lookup(&rt, "x"), lookup(&rt2, "x"), "display form: {}", shown);
    }
}

// ============================================================================
// Print
// ============================================================================

#[test]
fn test_print_evaluates_and_returns_unit() {
    // Output goes to stdout; here we only assert evaluation succeeds
    run("print(5); print(\"hi\"); print([1, true]); x = 1;");
}
