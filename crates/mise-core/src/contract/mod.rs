//! The prep-task shape contract.
//!
//! [`validate_prep_tasks`] is the one deliberate fail-fast boundary in the
//! engine: any value handed to the presentation layer as a list of task
//! summaries must pass it first, on every read. A violation means schema or
//! query drift, not user error -- callers are expected to let it propagate.

mod rows;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use rows::fetch_prep_task_summaries;

// ---------------------------------------------------------------------------
// Loose values
// ---------------------------------------------------------------------------

/// A loosely typed value as decoded from a raw query result, before the
/// contract has been checked.
///
/// Cells that fail to decode at the driver boundary become [`RawValue::Null`]
/// so they fall through to the relevant contract check instead of aborting
/// the decode.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A successfully decoded timestamp. Invalid dates never reach this
    /// variant; they decode as `Null` and fail the `dueByDate` check.
    Timestamp(DateTime<Utc>),
    /// A fixed-point decimal carried as its string rendering.
    Decimal(String),
    Array(Vec<RawValue>),
    Object(BTreeMap<String, RawValue>),
}

impl RawValue {
    fn get<'a>(object: &'a BTreeMap<String, RawValue>, field: &str) -> &'a RawValue {
        object.get(field).unwrap_or(&RawValue::Null)
    }
}

/// The "number-like" domain accepted for `quantityTotal`.
///
/// Deliberately permissive: the persistence layer is allowed to hand back a
/// plain number, a numeric-as-string, or a decimal object. Each variant has
/// its own named predicate so the permissiveness is documented rather than
/// incidental.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberLike {
    Number(f64),
    NumericString(String),
    DecimalLike(String),
}

impl NumberLike {
    /// A finite float. NaN and infinities are not number-like.
    pub fn is_finite_number(value: &RawValue) -> bool {
        matches!(value, RawValue::Number(n) if n.is_finite())
    }

    /// Any non-empty string. No numeric parse is attempted; "abc" counts.
    pub fn is_nonempty_string(value: &RawValue) -> bool {
        matches!(value, RawValue::Text(s) if !s.is_empty())
    }

    /// A decimal object exposing a string conversion.
    pub fn is_decimal_like(value: &RawValue) -> bool {
        matches!(value, RawValue::Decimal(_))
    }

    /// Classify a raw value, or `None` when it is not number-like.
    pub fn from_raw(value: &RawValue) -> Option<Self> {
        if Self::is_finite_number(value) {
            if let RawValue::Number(n) = value {
                return Some(Self::Number(*n));
            }
        }
        if Self::is_nonempty_string(value) {
            if let RawValue::Text(s) = value {
                return Some(Self::NumericString(s.clone()));
            }
        }
        if Self::is_decimal_like(value) {
            if let RawValue::Decimal(s) = value {
                return Some(Self::DecimalLike(s.clone()));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// The minimal prep-task projection the presentation layer may trust.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepTaskSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    pub quantity_total: NumberLike,
    pub servings_total: Option<f64>,
    pub due_by_date: DateTime<Utc>,
    pub is_event_finish: bool,
}

/// A prep-task contract violation. Indicates schema or query drift, not a
/// user-facing condition; callers should not catch and continue.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("PrepTask contract violation: expected an array.")]
    ExpectedArray,

    #[error("PrepTask contract violation at index {index}: expected an object.")]
    ExpectedObject { index: usize },

    #[error("PrepTask contract violation at index {index}: '{field}' must be {constraint}.")]
    Field {
        index: usize,
        field: &'static str,
        constraint: &'static str,
    },
}

fn field_error(index: usize, field: &'static str, constraint: &'static str) -> ContractViolation {
    ContractViolation::Field {
        index,
        field,
        constraint,
    }
}

fn require_nonempty_string(
    object: &BTreeMap<String, RawValue>,
    index: usize,
    field: &'static str,
) -> Result<String, ContractViolation> {
    match RawValue::get(object, field) {
        RawValue::Text(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(field_error(index, field, "a non-empty string")),
    }
}

/// Assert that `value` is an array of records satisfying the
/// [`PrepTaskSummary`] shape, and project it into typed summaries.
///
/// Checks run per element, in contract order, stopping at the first
/// violation. Field checks, in order: `id`, `name`, `status` (non-empty
/// strings), `quantityTotal` (number-like -- permissive), `servingsTotal`
/// (null or number -- strict), `dueByDate` (valid timestamp),
/// `isEventFinish` (boolean).
pub fn validate_prep_tasks(value: &RawValue) -> Result<Vec<PrepTaskSummary>, ContractViolation> {
    let RawValue::Array(rows) = value else {
        return Err(ContractViolation::ExpectedArray);
    };

    let mut summaries = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let RawValue::Object(object) = row else {
            return Err(ContractViolation::ExpectedObject { index });
        };

        let id = require_nonempty_string(object, index, "id")?;
        let name = require_nonempty_string(object, index, "name")?;
        let status = require_nonempty_string(object, index, "status")?;

        let quantity_total = NumberLike::from_raw(RawValue::get(object, "quantityTotal"))
            .ok_or_else(|| field_error(index, "quantityTotal", "number-like"))?;

        let servings_total = match RawValue::get(object, "servingsTotal") {
            RawValue::Null => None,
            RawValue::Number(n) => Some(*n),
            _ => return Err(field_error(index, "servingsTotal", "null or a number")),
        };

        let due_by_date = match RawValue::get(object, "dueByDate") {
            RawValue::Timestamp(ts) => *ts,
            _ => return Err(field_error(index, "dueByDate", "a valid date")),
        };

        let is_event_finish = match RawValue::get(object, "isEventFinish") {
            RawValue::Bool(b) => *b,
            _ => return Err(field_error(index, "isEventFinish", "a boolean")),
        };

        summaries.push(PrepTaskSummary {
            id,
            name,
            status,
            quantity_total,
            servings_total,
            due_by_date,
            is_event_finish,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn valid_row() -> BTreeMap<String, RawValue> {
        BTreeMap::from([
            (
                "id".to_string(),
                RawValue::Text("4f5c1a2b".to_string()),
            ),
            (
                "name".to_string(),
                RawValue::Text("Chop onions".to_string()),
            ),
            ("status".to_string(), RawValue::Text("pending".to_string())),
            ("quantityTotal".to_string(), RawValue::Number(4.0)),
            ("servingsTotal".to_string(), RawValue::Null),
            ("dueByDate".to_string(), RawValue::Timestamp(ts())),
            ("isEventFinish".to_string(), RawValue::Bool(false)),
        ])
    }

    fn rows(rows: Vec<BTreeMap<String, RawValue>>) -> RawValue {
        RawValue::Array(rows.into_iter().map(RawValue::Object).collect())
    }

    #[test]
    fn accepts_valid_row() {
        let result = validate_prep_tasks(&rows(vec![valid_row()])).expect("should validate");
        assert_eq!(result.len(), 1);
        let summary = &result[0];
        assert_eq!(summary.id, "4f5c1a2b");
        assert_eq!(summary.name, "Chop onions");
        assert_eq!(summary.status, "pending");
        assert_eq!(summary.quantity_total, NumberLike::Number(4.0));
        assert_eq!(summary.servings_total, None);
        assert_eq!(summary.due_by_date, ts());
        assert!(!summary.is_event_finish);
    }

    #[test]
    fn accepts_empty_array() {
        let result = validate_prep_tasks(&RawValue::Array(vec![])).expect("should validate");
        assert!(result.is_empty());
    }

    #[test]
    fn rejects_non_array() {
        let err = validate_prep_tasks(&RawValue::Text("rows".to_string())).unwrap_err();
        assert!(matches!(err, ContractViolation::ExpectedArray));
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation: expected an array."
        );
    }

    #[test]
    fn rejects_non_object_element() {
        let err =
            validate_prep_tasks(&RawValue::Array(vec![RawValue::Number(1.0)])).unwrap_err();
        assert!(matches!(err, ContractViolation::ExpectedObject { index: 0 }));
    }

    #[test]
    fn rejects_missing_fields_with_index_and_field() {
        // A "dueByDate" that decoded as a string is not a date; but the id
        // check fires first because checks run in contract order.
        let row = BTreeMap::from([(
            "dueByDate".to_string(),
            RawValue::Text("2025-01-01".to_string()),
        )]);
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("PrepTask contract violation"), "{message}");
        assert_eq!(
            message,
            "PrepTask contract violation at index 0: 'id' must be a non-empty string."
        );
    }

    #[test]
    fn rejects_empty_name() {
        let mut row = valid_row();
        row.insert("name".to_string(), RawValue::Text(String::new()));
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 0: 'name' must be a non-empty string."
        );
    }

    #[test]
    fn quantity_total_accepts_numeric_string_and_decimal() {
        let mut row = valid_row();
        row.insert(
            "quantityTotal".to_string(),
            RawValue::Text("4".to_string()),
        );
        let result = validate_prep_tasks(&rows(vec![row])).expect("numeric string passes");
        assert_eq!(
            result[0].quantity_total,
            NumberLike::NumericString("4".to_string())
        );

        let mut row = valid_row();
        row.insert(
            "quantityTotal".to_string(),
            RawValue::Decimal("4.00".to_string()),
        );
        let result = validate_prep_tasks(&rows(vec![row])).expect("decimal passes");
        assert_eq!(
            result[0].quantity_total,
            NumberLike::DecimalLike("4.00".to_string())
        );
    }

    #[test]
    fn quantity_total_rejects_nan_and_null() {
        let mut row = valid_row();
        row.insert("quantityTotal".to_string(), RawValue::Number(f64::NAN));
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 0: 'quantityTotal' must be number-like."
        );

        let mut row = valid_row();
        row.insert("quantityTotal".to_string(), RawValue::Null);
        assert!(validate_prep_tasks(&rows(vec![row])).is_err());
    }

    #[test]
    fn servings_total_is_stricter_than_quantity() {
        // A numeric string passes quantityTotal but not servingsTotal.
        let mut row = valid_row();
        row.insert(
            "servingsTotal".to_string(),
            RawValue::Text("12".to_string()),
        );
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 0: 'servingsTotal' must be null or a number."
        );
    }

    #[test]
    fn servings_total_accepts_number() {
        let mut row = valid_row();
        row.insert("servingsTotal".to_string(), RawValue::Number(12.0));
        let result = validate_prep_tasks(&rows(vec![row])).expect("should validate");
        assert_eq!(result[0].servings_total, Some(12.0));
    }

    #[test]
    fn due_by_date_must_be_a_timestamp() {
        let mut row = valid_row();
        row.insert(
            "dueByDate".to_string(),
            RawValue::Text("2025-01-01".to_string()),
        );
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 0: 'dueByDate' must be a valid date."
        );
    }

    #[test]
    fn is_event_finish_must_be_boolean() {
        let mut row = valid_row();
        row.insert("isEventFinish".to_string(), RawValue::Number(1.0));
        let err = validate_prep_tasks(&rows(vec![row])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 0: 'isEventFinish' must be a boolean."
        );
    }

    #[test]
    fn violation_index_points_at_offending_row() {
        let mut bad = valid_row();
        bad.insert("status".to_string(), RawValue::Text(String::new()));
        let err = validate_prep_tasks(&rows(vec![valid_row(), bad])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "PrepTask contract violation at index 1: 'status' must be a non-empty string."
        );
    }

    #[test]
    fn number_like_predicates() {
        assert!(NumberLike::is_finite_number(&RawValue::Number(3.5)));
        assert!(!NumberLike::is_finite_number(&RawValue::Number(
            f64::INFINITY
        )));
        assert!(NumberLike::is_nonempty_string(&RawValue::Text(
            "7".to_string()
        )));
        assert!(!NumberLike::is_nonempty_string(&RawValue::Text(
            String::new()
        )));
        assert!(NumberLike::is_decimal_like(&RawValue::Decimal(
            "1.25".to_string()
        )));
        assert!(NumberLike::from_raw(&RawValue::Bool(true)).is_none());
        assert!(NumberLike::from_raw(&RawValue::Timestamp(ts())).is_none());
    }
}
