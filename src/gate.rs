//! Equality gate that filters out captures which change nothing.
//!
//! Comparison runs over decoded JSON values, so key order and number
//! spelling (`1` vs `1.0`) never force a write.

use serde_json::{Number, Value};
use tracing::trace;

/// Returns true when `candidate` should be written.
pub fn should_persist(candidate: &Value, last_persisted: Option<&Value>) -> bool {
    last_persisted.is_none_or(|last| !semantically_equal(candidate, last))
}

/// Deep structural equality over JSON values.
pub fn semantically_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| semantically_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| semantically_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (integer_value(x), integer_value(y)) {
        (Some(a), Some(b)) => a == b,
        (Some(int), None) => float_is_integer(y.as_f64(), int),
        (None, Some(int)) => float_is_integer(x.as_f64(), int),
        (None, None) => x.as_f64() == y.as_f64(),
    }
}

fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

// Exact comparison: a whole float converts to i128 without rounding, and
// anything out of range saturates past every i64/u64 value.
#[allow(clippy::cast_possible_truncation)]
fn float_is_integer(float: Option<f64>, int: i128) -> bool {
    float.is_some_and(|f| f.fract() == 0.0 && f as i128 == int)
}

/// Remembers the last persisted state of a capture session.
#[derive(Debug, Default, Clone)]
pub struct EqualityGate {
    last: Option<Value>,
}

impl EqualityGate {
    /// A gate that lets the first capture through.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate seeded with the newest state already on disk.
    #[must_use]
    pub fn seeded(last: Option<Value>) -> Self {
        Self { last }
    }

    pub fn should_persist(&self, candidate: &Value) -> bool {
        let persist = should_persist(candidate, self.last.as_ref());
        trace!(persist, "Equality gate decision");
        persist
    }

    /// Record a successful write.
    pub fn record(&mut self, persisted: Value) {
        self.last = Some(persisted);
    }

    pub fn last(&self) -> Option<&Value> {
        self.last.as_ref()
    }
}
