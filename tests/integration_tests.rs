use prepper_expression::{EvalError, Evaluator, Event, Statement, Value};
use serde_json::json;

fn eval(statement: &str, event: serde_json::Value) -> Result<Value, EvalError> {
    let statement = Statement::compile(statement).unwrap();
    Evaluator::new().evaluate(statement.expr(), &Event::from(event))
}

fn eval_bool(statement: &str, event: serde_json::Value) -> Result<bool, EvalError> {
    let statement = Statement::compile(statement).unwrap();
    Evaluator::new().evaluate_conditional(statement.expr(), &Event::from(event))
}

fn is_coercion_error<T>(result: Result<T, EvalError>) -> bool {
    matches!(result, Err(EvalError::TypeCoercion(_)))
}

// ============================================================================
// Literals and field access
// ============================================================================

#[test]
fn test_literals_evaluate_verbatim() {
    assert_eq!(eval("5", json!({})).unwrap(), Value::Integer(5));
    assert_eq!(eval("2.5", json!({})).unwrap(), Value::Float(2.5));
    assert_eq!(eval("\"abc\"", json!({})).unwrap(), Value::String("abc".into()));
    assert_eq!(eval("null", json!({})).unwrap(), Value::Null);
}

#[test]
fn test_field_access() {
    let event = json!({"user": {"name": "Alice", "roles": ["admin", "ops"]}});
    assert_eq!(eval("/user/name", event.clone()).unwrap(), Value::String("Alice".into()));
    assert_eq!(eval("/user/roles/1", event).unwrap(), Value::String("ops".into()));
}

#[test]
fn test_list_evaluates_each_element() {
    assert_eq!(
        eval("[1, /a, \"x\", /missing]", json!({"a": 2.5})).unwrap(),
        Value::Array(vec![
            Value::Integer(1),
            Value::Float(2.5),
            Value::String("x".into()),
            Value::Null,
        ])
    );
}

// ============================================================================
// Equality
// ============================================================================

#[test]
fn test_equality() {
    let event = json!({"status": 200, "name": "svc", "ok": true});
    assert!(eval_bool("/status == 200", event.clone()).unwrap());
    assert!(eval_bool("/status != 404", event.clone()).unwrap());
    assert!(eval_bool("/name == \"svc\"", event.clone()).unwrap());
    assert!(eval_bool("/ok == true", event).unwrap());
}

#[test]
fn test_numeric_equality_crosses_representation() {
    assert!(eval_bool("5 == 5.0", json!({})).unwrap());
    assert!(eval_bool("/ratio == 1", json!({"ratio": 1.0})).unwrap());
    assert!(!eval_bool("5 == 5.1", json!({})).unwrap());
}

#[test]
fn test_integer_float_equality_is_exact() {
    assert!(!eval_bool("0 == 1e-30", json!({})).unwrap());
    assert!(!eval_bool("1e-30 == 0", json!({})).unwrap());
    assert!(!eval_bool("1e-30 == 0.0", json!({})).unwrap());
    assert!(!eval_bool("1 == 1.0000000000000002", json!({})).unwrap());
    assert!(!eval_bool("/z == 1e-30", json!({"z": 0})).unwrap());
    assert!(eval_bool("-0.0 == 0", json!({})).unwrap());
}

#[test]
fn test_integer_float_ordering_is_exact() {
    assert!(eval_bool("0 < 1e-30", json!({})).unwrap());
    assert!(eval_bool("0 > -1e-30", json!({})).unwrap());
    assert!(eval_bool("1 < 1.0000000000000002", json!({})).unwrap());
    assert!(eval_bool("9223372036854775807 < 9.3e18", json!({})).unwrap());
    assert!(eval_bool("-9223372036854775808 > -1e19", json!({})).unwrap());
}

#[test]
fn test_no_string_number_coercion() {
    assert!(!eval_bool("\"5\" == 5", json!({})).unwrap());
    assert!(eval_bool("\"5\" != 5", json!({})).unwrap());
    assert!(!eval_bool("/code == 200", json!({"code": "200"})).unwrap());
}

#[test]
fn test_string_comparison_is_exact() {
    assert!(!eval_bool("\"abc\" == \"ABC\"", json!({})).unwrap());
}

#[test]
fn test_different_types_are_unequal() {
    assert!(!eval_bool("true == 1", json!({})).unwrap());
    assert!(!eval_bool("[1] == 1", json!({})).unwrap());
}

#[test]
fn test_list_equality() {
    assert!(eval_bool("[1, \"a\"] == [1.0, \"a\"]", json!({})).unwrap());
    assert!(eval_bool("/tags == [\"a\", \"b\"]", json!({"tags": ["a", "b"]})).unwrap());
    assert!(!eval_bool("[1, 2] == [2, 1]", json!({})).unwrap());
}

// ============================================================================
// Missing fields
// ============================================================================

#[test]
fn test_missing_field_is_unequal_to_literals() {
    assert!(!eval_bool("/missing == 5", json!({})).unwrap());
    assert!(!eval_bool("/missing == \"\"", json!({})).unwrap());
    assert!(!eval_bool("/missing == false", json!({})).unwrap());
    assert!(eval_bool("/missing != 5", json!({})).unwrap());
}

#[test]
fn test_missing_field_equals_null() {
    assert!(eval_bool("/missing == null", json!({})).unwrap());
    assert!(eval_bool("/present != null", json!({"present": 0})).unwrap());
    assert!(eval_bool("/explicit == null", json!({"explicit": null})).unwrap());
}

#[test]
fn test_missing_field_in_relational_is_an_error() {
    assert!(is_coercion_error(eval_bool("/missing > 5", json!({}))));
}

// ============================================================================
// Relational
// ============================================================================

#[test]
fn test_relational() {
    let event = json!({"latency": 2.5, "status": 404});
    assert!(eval_bool("/latency > 2", event.clone()).unwrap());
    assert!(eval_bool("/latency <= 2.5", event.clone()).unwrap());
    assert!(eval_bool("/status >= 400", event.clone()).unwrap());
    assert!(!eval_bool("/status < 400", event).unwrap());
}

#[test]
fn test_relational_requires_numbers() {
    assert!(is_coercion_error(eval_bool("\"a\" < \"b\"", json!({}))));
    assert!(is_coercion_error(eval_bool("[1] < 2", json!({}))));
    assert!(is_coercion_error(eval_bool("true >= false", json!({}))));
}

#[test]
fn test_chained_relational_is_a_type_error() {
    // (1 < 2) < 3 compares a boolean with a number
    assert!(is_coercion_error(eval_bool("1 < 2 < 3", json!({}))));
}

// ============================================================================
// Regex
// ============================================================================

#[test]
fn test_regex_match() {
    assert!(eval_bool("/name =~ \"^svc-\"", json!({"name": "svc-42"})).unwrap());
    assert!(!eval_bool("/name =~ \"^svc-\"", json!({"name": "db-1"})).unwrap());
    assert!(eval_bool("/name !~ \"^svc-\"", json!({"name": "db-1"})).unwrap());
}

#[test]
fn test_regex_character_classes() {
    assert!(eval_bool("/id =~ \"^\\d+$\"", json!({"id": "12345"})).unwrap());
    assert!(!eval_bool("/id =~ \"^\\d+$\"", json!({"id": "12a45"})).unwrap());
}

#[test]
fn test_regex_pattern_from_field() {
    let event = json!({"name": "svc-1", "pattern": "svc"});
    assert!(eval_bool("/name =~ /pattern", event).unwrap());
}

#[test]
fn test_invalid_regex_pattern() {
    let err = eval_bool("/name =~ \"[ \"", json!({"name": "svc"})).unwrap_err();
    assert!(matches!(err, EvalError::RegexCompilation { ref pattern, .. } if pattern == "[ "));
}

#[test]
fn test_regex_requires_strings() {
    assert!(is_coercion_error(eval_bool("/n =~ \"1\"", json!({"n": 1}))));
    assert!(is_coercion_error(eval_bool("/s =~ 1", json!({"s": "1"}))));
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_membership() {
    assert!(eval_bool("3 in [1,2,3]", json!({})).unwrap());
    assert!(!eval_bool("4 in [1,2,3]", json!({})).unwrap());
    assert!(eval_bool("4 not in [1,2,3]", json!({})).unwrap());
    assert!(!eval_bool("3 not in [1,2,3]", json!({})).unwrap());
}

#[test]
fn test_membership_uses_numeric_equality() {
    assert!(eval_bool("2.0 in [1, 2, 3]", json!({})).unwrap());
    assert!(!eval_bool("\"2\" in [1, 2, 3]", json!({})).unwrap());
}

#[test]
fn test_membership_in_empty_list() {
    assert!(!eval_bool("1 in []", json!({})).unwrap());
    assert!(eval_bool("1 not in []", json!({})).unwrap());
}

#[test]
fn test_membership_in_array_field() {
    let event = json!({"role": "ops", "allowed": ["admin", "ops"]});
    assert!(eval_bool("/role in /allowed", event).unwrap());
}

#[test]
fn test_membership_requires_list() {
    assert!(is_coercion_error(eval_bool("1 in 1", json!({}))));
    assert!(is_coercion_error(eval_bool("1 in /missing", json!({}))));
}

// ============================================================================
// Logic
// ============================================================================

#[test]
fn test_logical_operators() {
    assert!(eval_bool("true and true", json!({})).unwrap());
    assert!(!eval_bool("true and false", json!({})).unwrap());
    assert!(eval_bool("false or true", json!({})).unwrap());
    assert!(!eval_bool("false or false", json!({})).unwrap());
    assert!(eval_bool("not false", json!({})).unwrap());
}

#[test]
fn test_and_short_circuits() {
    // Right side would be a type error
    let event = json!({"a": 2, "b": "text"});
    assert!(!eval_bool("/a == 1 and /b < 2", event.clone()).unwrap());
    assert!(is_coercion_error(eval_bool("/a == 2 and /b < 2", event)));
}

#[test]
fn test_or_short_circuits() {
    let event = json!({"a": 1, "b": "text"});
    assert!(eval_bool("/a == 1 or /b < 2", event).unwrap());
}

#[test]
fn test_short_circuit_skips_invalid_regex() {
    assert!(!eval_bool("false and /x =~ \"[ \"", json!({"x": "y"})).unwrap());
}

#[test]
fn test_logical_operands_must_be_boolean() {
    assert!(is_coercion_error(eval_bool("1 and true", json!({}))));
    assert!(is_coercion_error(eval_bool("true and 1", json!({}))));
    assert!(is_coercion_error(eval_bool("/missing or true", json!({}))));
}

#[test]
fn test_not_requires_boolean() {
    assert!(is_coercion_error(eval_bool("not 1", json!({}))));
    assert!(is_coercion_error(eval_bool("not \"true\"", json!({}))));
}

// ============================================================================
// Conditional coercion
// ============================================================================

#[test]
fn test_conditional_requires_boolean_result() {
    assert!(is_coercion_error(eval_bool("/status", json!({"status": 200}))));
    assert!(is_coercion_error(eval_bool("[true]", json!({}))));
}

#[test]
fn test_boolean_field_as_conditional() {
    assert!(eval_bool("/enabled", json!({"enabled": true})).unwrap());
}

#[test]
fn test_evaluation_error_does_not_poison_statement() {
    let statement = Statement::compile("/a > 1").unwrap();
    let evaluator = Evaluator::new();

    let bad = Event::from(json!({"a": "x"}));
    let good = Event::from(json!({"a": 5}));

    assert!(evaluator.evaluate_conditional(statement.expr(), &bad).is_err());
    assert!(evaluator.evaluate_conditional(statement.expr(), &good).unwrap());
}

#[test]
fn test_evaluation_does_not_mutate_event() {
    let event = Event::from(json!({"a": 1, "b": [1, 2]}));
    let before = event.clone();
    let statement = Statement::compile("/a in /b and /c == null").unwrap();
    Evaluator::new().evaluate(statement.expr(), &event).unwrap();
    assert_eq!(event, before);
}

#[test]
fn test_shared_statement_across_threads() {
    use std::sync::Arc;
    use std::thread;

    let statement = Arc::new(Statement::compile("/n >= 50").unwrap());
    let evaluator = Arc::new(Evaluator::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let statement = Arc::clone(&statement);
            let evaluator = Arc::clone(&evaluator);
            thread::spawn(move || {
                (0..100)
                    .filter(|n| {
                        let event = Event::from(json!({"n": n}));
                        evaluator.evaluate_conditional(statement.expr(), &event).unwrap()
                    })
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 50);
    }
}
