//! Filter evaluation and ordering over the JSON form of records.

use std::cmp::Ordering;

use adminkit_core::{FieldValue, Filter, FilterOp, SortOrder};
use serde_json::Value;

/// Returns `true` if the row satisfies every filter.
pub fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

/// Evaluates one filter against a row.
///
/// Missing or null columns never match.
pub fn matches(row: &Value, filter: &Filter) -> bool {
    let Some(column) = row.get(&filter.name) else {
        return false;
    };
    if column.is_null() {
        return false;
    }

    if filter.exp == FilterOp::Like {
        let needle = filter.value.to_string();
        return match column {
            Value::String(s) => s.contains(&needle),
            other => other.to_string().contains(&needle),
        };
    }

    let Some(ordering) = compare_to_value(column, &filter.value) else {
        return false;
    };
    match filter.exp {
        FilterOp::Eq => ordering == Ordering::Equal,
        FilterOp::Neq => ordering != Ordering::Equal,
        FilterOp::Gt => ordering == Ordering::Greater,
        FilterOp::Gte => ordering != Ordering::Less,
        FilterOp::Lt => ordering == Ordering::Less,
        FilterOp::Lte => ordering != Ordering::Greater,
        FilterOp::Like => unreachable!("handled above"),
    }
}

fn json_as_i128(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

/// Compares a column value with a filter operand.
///
/// Numbers compare numerically (a text operand is parsed), everything else
/// compares by its string form.
fn compare_to_value(column: &Value, operand: &FieldValue) -> Option<Ordering> {
    if let Some(lhs) = json_as_i128(column) {
        let rhs = match operand {
            FieldValue::Text(text) => text.trim().parse::<i128>().ok()?,
            numeric => numeric.as_i128()?,
        };
        return Some(lhs.cmp(&rhs));
    }
    match column {
        Value::String(s) => Some(s.as_str().cmp(operand.to_string().as_str())),
        Value::Bool(b) => Some(b.to_string().as_str().cmp(operand.to_string().as_str())),
        _ => None,
    }
}

/// Orders two rows by a column. Nulls sort first.
pub fn compare_rows(a: &Value, b: &Value, order: &SortOrder) -> Ordering {
    let lhs = a.get(&order.column).unwrap_or(&Value::Null);
    let rhs = b.get(&order.column).unwrap_or(&Value::Null);
    let ordering = match (lhs, rhs) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (json_as_i128(lhs), json_as_i128(rhs)) {
            (Some(l), Some(r)) => l.cmp(&r),
            _ => lhs
                .as_str()
                .unwrap_or_default()
                .cmp(rhs.as_str().unwrap_or_default()),
        },
    };
    if order.descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_filters() {
        let row = json!({"size": 100, "user_id": 3});
        assert!(matches(&row, &Filter::new("size", FilterOp::Eq, 100u64)));
        assert!(matches(&row, &Filter::new("size", FilterOp::Gte, 100i64)));
        assert!(!matches(&row, &Filter::new("size", FilterOp::Gt, 100u64)));
        assert!(matches(&row, &Filter::new("size", FilterOp::Lt, "101")));
        assert!(matches(&row, &Filter::new("user_id", FilterOp::Neq, 4u64)));
    }

    #[test]
    fn test_text_filters() {
        let row = json!({"filename": "report.pdf", "deleted_at": null});
        assert!(matches(&row, &Filter::new("filename", FilterOp::Like, "port")));
        assert!(matches(&row, &Filter::new("filename", FilterOp::Eq, "report.pdf")));
        assert!(!matches(&row, &Filter::new("filename", FilterOp::Eq, "a.pdf")));
        assert!(!matches(&row, &Filter::new("deleted_at", FilterOp::Eq, "x")));
        assert!(!matches(&row, &Filter::new("missing", FilterOp::Eq, "x")));
    }

    #[test]
    fn test_compare_rows() {
        let a = json!({"id": 1, "name": "b"});
        let b = json!({"id": 2, "name": "a"});
        let by_id_desc = SortOrder {
            column: "id".into(),
            descending: true,
        };
        assert_eq!(compare_rows(&a, &b, &by_id_desc), Ordering::Greater);

        let by_name = SortOrder {
            column: "name".into(),
            descending: false,
        };
        assert_eq!(compare_rows(&a, &b, &by_name), Ordering::Greater);
    }
}
