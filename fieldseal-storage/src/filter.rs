//! `where` clause evaluation.
//!
//! A clause maps field names to either a literal (equality) or an operator
//! object, and may combine sub-clauses with `AND`, `OR` and `NOT`.

use crate::error::{StorageError, StorageResult};
use fieldseal_types::Record;
use serde_json::Value;
use std::cmp::Ordering;

/// Whether `record` satisfies `filter`.
pub fn matches(record: &Record, filter: &Record) -> StorageResult<bool> {
    let each = |condition: &Value| -> StorageResult<Vec<bool>> {
        sub_clauses(condition)?
            .into_iter()
            .map(|clause| matches(record, clause))
            .collect()
    };

    for (key, condition) in filter {
        let ok = match key.as_str() {
            "AND" => each(condition)?.into_iter().all(|m| m),
            "OR" => each(condition)?.into_iter().any(|m| m),
            "NOT" => !each(condition)?.into_iter().any(|m| m),
            field => field_matches(record.get(field).unwrap_or(&Value::Null), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_clauses(condition: &Value) -> StorageResult<Vec<&Record>> {
    match condition {
        Value::Object(clause) => Ok(vec![clause]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object().ok_or_else(|| {
                    StorageError::InvalidQuery("logical operands must be objects".into())
                })
            })
            .collect(),
        _ => Err(StorageError::InvalidQuery(
            "logical operator expects an object or array".into(),
        )),
    }
}

fn field_matches(actual: &Value, condition: &Value) -> StorageResult<bool> {
    let Value::Object(ops) = condition else {
        return Ok(actual == condition);
    };

    for (op, operand) in ops {
        let ok = match op.as_str() {
            "equals" => actual == operand,
            "not" => match operand {
                Value::Object(_) => !field_matches(actual, operand)?,
                _ => actual != operand,
            },
            "in" => as_list(op, operand)?.contains(actual),
            "notIn" => !as_list(op, operand)?.contains(actual),
            "lt" => compare(actual, operand) == Some(Ordering::Less),
            "lte" => matches!(
                compare(actual, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            "gt" => compare(actual, operand) == Some(Ordering::Greater),
            "gte" => matches!(
                compare(actual, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            "contains" => string_test(actual, operand, |a, b| a.contains(b)),
            "startsWith" => string_test(actual, operand, |a, b| a.starts_with(b)),
            "endsWith" => string_test(actual, operand, |a, b| a.ends_with(b)),
            other => {
                return Err(StorageError::InvalidQuery(format!(
                    "unknown filter operator '{other}'"
                )));
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn as_list<'a>(op: &str, operand: &'a Value) -> StorageResult<&'a Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| StorageError::InvalidQuery(format!("'{op}' expects an array")))
}

fn string_test(actual: &Value, operand: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), operand.as_str()) {
        (Some(a), Some(b)) => test(a, b),
        _ => false,
    }
}

/// Compares two values of the same scalar kind; `None` across kinds.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A total order over JSON values for sorting: null < bool < number <
/// string < everything else.
pub fn total_order(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    compare(a, b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}
