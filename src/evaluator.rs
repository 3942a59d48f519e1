use std::{borrow::Cow, cmp::Ordering, sync::Arc};

use dashmap::DashMap;
use regex::Regex;
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{BinOp, CompileError, Expr, Statement},
    event::Event,
    value::Value,
};

/// Compiled patterns kept per evaluator. Patterns read from event fields can
/// be arbitrary, so the cache stops growing past this size.
const REGEX_CACHE_LIMIT: usize = 1024;

/// Compiled statements kept per `ConditionalEvaluator`.
const STATEMENT_CACHE_LIMIT: usize = 1024;

/// Errors that can occur while evaluating an expression against an event.
///
/// None of these invalidate the expression; evaluating it against a
/// different event may succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A value does not have the type its operator requires
    #[error("Type coercion error: {0}")]
    TypeCoercion(String),

    /// The right operand of `=~` / `!~` is not a valid pattern
    #[error("Invalid regex pattern {pattern:?}: {message}")]
    RegexCompilation { pattern: String, message: String },

    /// A construct the grammar accepts but the evaluator does not implement
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// The expression evaluator.
///
/// Walks an AST post-order, resolving pointers against an [`Event`]. An
/// evaluator holds nothing but a cache of compiled regex patterns, so one
/// instance can be shared by every thread in a pipeline.
#[derive(Debug, Default)]
pub struct Evaluator {
    regex_cache: DashMap<String, Regex>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates an expression against an event.
    ///
    /// # Examples
    ///
    /// ```
    /// use prepper_expression::{Evaluator, Event, Statement, Value};
    /// use serde_json::json;
    ///
    /// let statement = Statement::compile("/status in [200, 204]").unwrap();
    /// let event = Event::from(json!({"status": 204}));
    ///
    /// let result = Evaluator::new().evaluate(statement.expr(), &event).unwrap();
    /// assert_eq!(result, Value::Boolean(true));
    /// ```
    pub fn evaluate(&self, expr: &Expr, event: &Event) -> Result<Value, EvalError> {
        self.eval_expr(expr, event).map(Cow::into_owned)
    }

    /// Evaluates an expression that must produce a boolean.
    pub fn evaluate_conditional(&self, expr: &Expr, event: &Event) -> Result<bool, EvalError> {
        let value = self.eval_expr(expr, event)?;
        value.as_bool().ok_or_else(|| {
            EvalError::TypeCoercion(format!(
                "Statement must evaluate to a boolean, got {}",
                value.type_name()
            ))
        })
    }

    fn eval_expr<'a>(&self, expr: &'a Expr, event: &'a Event) -> Result<Cow<'a, Value>, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Cow::Owned(Value::Float(*n))),
            Expr::Integer(n) => Ok(Cow::Owned(Value::Integer(*n))),
            Expr::String(s) => Ok(Cow::Owned(Value::String(s.clone()))),
            Expr::Boolean(b) => Ok(Cow::Owned(Value::Boolean(*b))),
            Expr::Null => Ok(Cow::Owned(Value::Null)),
            // A missing field reads as null
            Expr::Pointer(pointer) => Ok(event
                .get(pointer)
                .map(Cow::Borrowed)
                .unwrap_or(Cow::Owned(Value::Null))),
            Expr::List(exprs) => {
                let mut arr = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    arr.push(self.eval_expr(expr, event)?.into_owned());
                }
                Ok(Cow::Owned(Value::Array(arr)))
            }
            Expr::Not(operand) => {
                let value = self.eval_expr(operand, event)?;
                let b = require_bool(&value, "not")?;
                Ok(Cow::Owned(Value::Boolean(!b)))
            }
            Expr::BinaryOp {
                op: op @ (BinOp::And | BinOp::Or),
                left,
                right,
            } => {
                let left_val = self.eval_expr(left, event)?;
                let left_val = require_bool(&left_val, op.symbol())?;
                // Short circuit: `false and _` / `true or _` never touch the right side
                let result = match (op, left_val) {
                    (BinOp::And, false) => false,
                    (BinOp::Or, true) => true,
                    _ => {
                        let right_val = self.eval_expr(right, event)?;
                        require_bool(&right_val, op.symbol())?
                    }
                };
                Ok(Cow::Owned(Value::Boolean(result)))
            }
            Expr::BinaryOp { op, left, right } => {
                let left_val = self.eval_expr(left, event)?;
                let right_val = self.eval_expr(right, event)?;
                self.apply_binop(*op, &left_val, &right_val)
                    .map(|b| Cow::Owned(Value::Boolean(b)))
            }
        }
    }

    fn apply_binop(&self, op: BinOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
        match op {
            BinOp::Equal => Ok(values_equal(left, right)),
            BinOp::NotEqual => Ok(!values_equal(left, right)),
            BinOp::LessThan => compare(op, left, right).map(Ordering::is_lt),
            BinOp::GreaterThan => compare(op, left, right).map(Ordering::is_gt),
            BinOp::LessEqual => compare(op, left, right).map(Ordering::is_le),
            BinOp::GreaterEqual => compare(op, left, right).map(Ordering::is_ge),
            BinOp::Matches => self.regex_match(op, left, right),
            BinOp::NotMatches => self.regex_match(op, left, right).map(|m| !m),
            BinOp::In => contains(op, left, right),
            BinOp::NotIn => contains(op, left, right).map(|c| !c),
            BinOp::And | BinOp::Or => Err(EvalError::UnsupportedOperation(format!(
                "'{}' must be evaluated with short-circuiting",
                op
            ))),
        }
    }

    fn regex_match(&self, op: BinOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
        let (Value::String(text), Value::String(pattern)) = (left, right) else {
            return Err(EvalError::TypeCoercion(format!(
                "Cannot apply {} to {} and {} (regex matching requires a string and a pattern string)",
                op,
                left.type_name(),
                right.type_name()
            )));
        };
        Ok(self.regex(pattern)?.is_match(text))
    }

    fn regex(&self, pattern: &str) -> Result<Regex, EvalError> {
        if let Some(re) = self.regex_cache.get(pattern) {
            return Ok(re.clone());
        }

        trace!(pattern, "compiling regex");
        let re = Regex::new(pattern).map_err(|e| EvalError::RegexCompilation {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        if self.regex_cache.len() < REGEX_CACHE_LIMIT {
            self.regex_cache.insert(pattern.to_string(), re.clone());
        }
        Ok(re)
    }
}

fn require_bool(value: &Value, operator: &str) -> Result<bool, EvalError> {
    value.as_bool().ok_or_else(|| {
        EvalError::TypeCoercion(format!(
            "Operand of '{}' must be a boolean, got {}",
            operator,
            value.type_name()
        ))
    })
}

fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    if !left.is_numeric() || !right.is_numeric() {
        return Err(EvalError::TypeCoercion(format!(
            "Cannot compare {} {} {} (comparison requires numeric types)",
            left.type_name(),
            op,
            right.type_name()
        )));
    }
    numeric_cmp(left, right).ok_or_else(|| {
        EvalError::TypeCoercion(format!("Cannot order {:?} and {:?}", left, right))
    })
}

fn contains(op: BinOp, needle: &Value, haystack: &Value) -> Result<bool, EvalError> {
    match haystack {
        Value::Array(items) => Ok(items.iter().any(|item| values_equal(needle, item))),
        other => Err(EvalError::TypeCoercion(format!(
            "Right operand of '{}' must be a list, got {}",
            op,
            other.type_name()
        ))),
    }
}

/// Equality used by `==`, `!=` and list membership.
///
/// Integers and floats compare by numeric value; strings never equal
/// numbers; values of different types are unequal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (x, y) if x.is_numeric() && y.is_numeric() => numeric_cmp(x, y) == Some(Ordering::Equal),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => false,
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Integer(i), Value::Float(f)) => mixed_cmp(*i, *f),
        (Value::Float(f), Value::Integer(i)) => mixed_cmp(*i, *f).map(Ordering::reverse),
        _ => None,
    }
}

/// Integer against float, exact for every pair of values.
///
/// Inside the `i64` range the float's integral part converts without loss,
/// so ties are broken by its fractional part.
fn mixed_cmp(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above i64::MAX
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return None;
    }
    if f >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if f < -I64_BOUND {
        return Some(Ordering::Greater);
    }

    match i.cmp(&(f.trunc() as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&f.fract()),
        ordering => Some(ordering),
    }
}

/// Parse-and-evaluate facade over statement strings.
///
/// `T` is the type the result is coerced to.
pub trait StatementEvaluator<T> {
    fn evaluate(&self, statement: &str, event: &Event) -> Result<T, StatementError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatementError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Evaluates statement strings as boolean predicates.
///
/// Each distinct statement is compiled once and cached, up to
/// `STATEMENT_CACHE_LIMIT` statements. Past that, new statements are compiled
/// on every call.
///
/// # Examples
///
/// ```
/// use prepper_expression::{ConditionalEvaluator, Event, StatementEvaluator};
/// use serde_json::json;
///
/// let evaluator = ConditionalEvaluator::new();
/// let event = Event::from(json!({"name": "svc-42"}));
/// assert!(evaluator.evaluate("/name =~ \"^svc-\"", &event).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct ConditionalEvaluator {
    evaluator: Evaluator,
    statements: DashMap<String, Arc<Statement>>,
}

impl ConditionalEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `statement`, or return the cached compilation.
    pub fn compile(&self, statement: &str) -> Result<Arc<Statement>, CompileError> {
        if let Some(compiled) = self.statements.get(statement) {
            return Ok(Arc::clone(&compiled));
        }
        let compiled = Arc::new(Statement::compile(statement)?);
        if self.statements.len() < STATEMENT_CACHE_LIMIT {
            self.statements
                .insert(statement.to_string(), Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    /// Evaluate `statement` without coercing the result.
    pub fn evaluate_value(&self, statement: &str, event: &Event) -> Result<Value, StatementError> {
        let compiled = self.compile(statement)?;
        Ok(self.evaluator.evaluate(compiled.expr(), event)?)
    }

    pub fn cached_statements(&self) -> usize {
        self.statements.len()
    }
}

impl StatementEvaluator<bool> for ConditionalEvaluator {
    fn evaluate(&self, statement: &str, event: &Event) -> Result<bool, StatementError> {
        let compiled = self.compile(statement)?;
        Ok(self.evaluator.evaluate_conditional(compiled.expr(), event)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numeric_comparison_is_exact() {
        assert_eq!(mixed_cmp(5, 5.0), Some(Ordering::Equal));
        assert_eq!(mixed_cmp(5, 5.5), Some(Ordering::Less));
        assert_eq!(mixed_cmp(i64::MAX, 1e30), Some(Ordering::Less));
        assert_eq!(mixed_cmp(1, f64::NAN), None);
    }

    #[test]
    fn strings_never_equal_numbers() {
        assert!(!values_equal(&Value::String("5".into()), &Value::Integer(5)));
    }

    #[test]
    fn lists_compare_element_wise() {
        let a = Value::Array(vec![Value::Integer(1), Value::Float(2.0)]);
        let b = Value::Array(vec![Value::Float(1.0), Value::Integer(2)]);
        assert!(values_equal(&a, &b));
    }

    #[test]
    fn regex_cache_reuses_compiled_pattern() {
        let evaluator = Evaluator::new();
        evaluator.regex("^a").unwrap();
        evaluator.regex("^a").unwrap();
        assert_eq!(evaluator.regex_cache.len(), 1);
    }

    #[test]
    fn conditional_evaluator_caches_statements() {
        let evaluator = ConditionalEvaluator::new();
        let event = Event::new();
        assert!(evaluator.evaluate("/missing == null", &event).unwrap());
        assert!(!evaluator.evaluate("/missing == null and false", &event).unwrap());
        assert!(evaluator.evaluate("/missing == null", &event).unwrap());
        assert_eq!(evaluator.cached_statements(), 2);
    }

    #[test]
    fn statement_cache_stops_growing_at_limit() {
        let evaluator = ConditionalEvaluator::new();
        let event = Event::from(serde_json::json!({"n": 3}));

        for n in 0..STATEMENT_CACHE_LIMIT + 10 {
            let statement = format!("/n == {}", n);
            assert_eq!(evaluator.evaluate(&statement, &event).unwrap(), n == 3);
        }
        assert_eq!(evaluator.cached_statements(), STATEMENT_CACHE_LIMIT);

        // Uncached statements still evaluate
        let statement = format!("/n < {}", STATEMENT_CACHE_LIMIT + 20);
        assert!(evaluator.evaluate(&statement, &event).unwrap());
        assert_eq!(evaluator.cached_statements(), STATEMENT_CACHE_LIMIT);
    }

    #[test]
    fn mixed_numeric_comparison_handles_tiny_and_huge_floats() {
        assert_eq!(mixed_cmp(0, 1e-30), Some(Ordering::Less));
        assert_eq!(mixed_cmp(0, -1e-30), Some(Ordering::Greater));
        assert_eq!(mixed_cmp(1, 1.0000000000000002), Some(Ordering::Less));
        assert_eq!(mixed_cmp(-3, -3.5), Some(Ordering::Greater));
        assert_eq!(mixed_cmp(0, -0.0), Some(Ordering::Equal));
        assert_eq!(mixed_cmp(i64::MAX, 9_223_372_036_854_775_808.0), Some(Ordering::Less));
        assert_eq!(mixed_cmp(i64::MIN, -9_223_372_036_854_775_808.0), Some(Ordering::Equal));
        assert_eq!(mixed_cmp(i64::MIN, f64::NEG_INFINITY), Some(Ordering::Greater));
        assert_eq!(mixed_cmp(i64::MAX, f64::INFINITY), Some(Ordering::Less));
    }
}
