//! Client-side predicates over already-fetched rows.
//!
//! These filters never reach the store; they narrow a [`crate::QueryResult`]
//! locally after one lookup or scan, so chaining them costs no further round
//! trips.

use crate::row;

use serde_json::Value;
use std::cmp;

/// How a filter compares a row's stored value against the target value.
///
/// Ordering comparisons apply to pairs of numbers and to pairs of strings
/// (lexicographic); any other combination never matches. Containment applies
/// to strings (substring) and arrays (membership).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Predicate {
    /// The stored string or array contains the target.
    Contains,
    /// The stored value equals the target.
    Equals,
    /// The stored and target strings are equal ignoring ASCII case.
    EqualsIgnoreCase,
    /// The stored value orders after the target.
    GreaterThan,
    /// The stored value equals or orders after the target.
    GreaterThanOrEqual,
    /// The target array contains the stored value.
    In,
    /// The stored value orders before the target.
    LessThan,
    /// The stored value equals or orders before the target.
    LessThanOrEqual,
    /// The stored string or array does not contain the target.
    NotContains,
    /// The stored value differs from the target.
    NotEquals,
    /// The target array does not contain the stored value.
    NotIn,
}

impl Predicate {
    pub(crate) fn matches(self, stored: &Value, target: &Value) -> bool {
        match self {
            Self::Contains => contains(stored, target),
            Self::Equals => stored == target,
            Self::EqualsIgnoreCase => match (stored.as_str(), target.as_str()) {
                (Some(stored), Some(target)) => stored.eq_ignore_ascii_case(target),
                _ => false,
            },
            Self::GreaterThan => {
                matches!(compare(stored, target), Some(cmp::Ordering::Greater))
            }
            Self::GreaterThanOrEqual => matches!(
                compare(stored, target),
                Some(cmp::Ordering::Greater | cmp::Ordering::Equal)
            ),
            Self::In => contains(target, stored),
            Self::LessThan => matches!(compare(stored, target), Some(cmp::Ordering::Less)),
            Self::LessThanOrEqual => matches!(
                compare(stored, target),
                Some(cmp::Ordering::Less | cmp::Ordering::Equal)
            ),
            Self::NotContains => !contains(stored, target),
            Self::NotEquals => stored != target,
            Self::NotIn => !contains(target, stored),
        }
    }
}

/// One column predicate applied locally to already-fetched rows.
///
/// ```rust
/// use dynamodb_tables::{Filter, Predicate, QueryResult, Row};
/// use serde_json::json;
///
/// let rows: Vec<Row> = serde_json::from_value(json!([
///     {"user-id": "u1", "logins": 3},
///     {"user-id": "u2"}
/// ]))
/// .unwrap();
/// let result = QueryResult::from(rows);
/// let lapsed = Filter::new("logins", 1, Predicate::LessThan).include_missing();
/// assert_eq!(result.filter_using(&lapsed).len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    column: String,
    include_missing: bool,
    predicate: Predicate,
    value: Value,
}

impl Filter {
    /// A filter keeping rows whose `column` satisfies `predicate` against
    /// `value`.
    ///
    /// Rows lacking `column` entirely are dropped; see
    /// [`Filter::include_missing`].
    pub fn new(column: impl Into<String>, value: impl Into<Value>, predicate: Predicate) -> Self {
        Self {
            column: column.into(),
            include_missing: false,
            predicate,
            value: value.into(),
        }
    }

    /// Keep rows that lack the filtered column instead of dropping them.
    pub fn include_missing(mut self) -> Self {
        self.include_missing = true;
        self
    }

    pub(crate) fn keeps(&self, row: &row::Row) -> bool {
        match row.get(&self.column) {
            Some(stored) => self.predicate.matches(stored, &self.value),
            None => self.include_missing,
        }
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(text) => needle.as_str().is_some_and(|needle| text.contains(needle)),
        Value::Array(items) => items.contains(needle),
        _ => false,
    }
}

fn compare(left: &Value, right: &Value) -> Option<cmp::Ordering> {
    if let (Some(left), Some(right)) = (left.as_f64(), right.as_f64()) {
        return left.partial_cmp(&right);
    }
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        _ => None,
    }
}
