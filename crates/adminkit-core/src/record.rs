//! The [`Record`] trait and the typed field values records expose to storage backends.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A scalar column value.
///
/// Storage backends bind these as query parameters, and sparse updates use
/// [`FieldValue::is_zero`] to decide which columns a partial update touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    U64(u64),
    I64(i64),
    I32(i32),
    Text(String),
}

impl FieldValue {
    /// Returns `true` for the zero value of the column type (`0` or `""`).
    ///
    /// Zero values are never written by a partial update, so a caller cannot
    /// clear a column through that path.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::U64(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::I32(v) => *v == 0,
            Self::Text(v) => v.is_empty(),
        }
    }

    /// Integer view of the value, if it is numeric.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U64(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the value into its JSON representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::U64(v) => serde_json::Value::from(*v),
            Self::I64(v) => serde_json::Value::from(*v),
            Self::I32(v) => serde_json::Value::from(*v),
            Self::Text(v) => serde_json::Value::from(v.as_str()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// An entity row owned by the backing store.
///
/// Serde field names must match the relational column names: backends decode
/// rows through the record's serde representation and evaluate filters on it.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Entity name used in errors, logs and metrics labels.
    const ENTITY: &'static str;

    /// Relational table name.
    const TABLE: &'static str;

    /// Cache key prefix. Must be unique per entity and end with `:`.
    const CACHE_PREFIX: &'static str;

    /// Column holding the natural identifier.
    const ID_COLUMN: &'static str;

    /// Whether the store generates the identifier on insert.
    ///
    /// Join-table records (role permissions, user roles) are keyed by a
    /// caller-supplied foreign key instead.
    const GENERATED_ID: bool;

    /// Whether the table has `created_at`, `updated_at` and `deleted_at` columns.
    const TIMESTAMPS: bool;

    /// Whitelist of column names accepted in filters and sort expressions.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Writable columns with their current values.
    ///
    /// Store-generated identifiers and timestamps are excluded; the store owns them.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// The sparse patch a partial update applies: every writable column whose
    /// value is not zero.
    fn patch(&self) -> Vec<(&'static str, FieldValue)> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| !value.is_zero())
            .collect()
    }

    /// Returns `true` if `column` is in the whitelist.
    fn has_column(column: &str) -> bool {
        Self::COLUMNS.contains(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::U64(0).is_zero());
        assert!(FieldValue::I64(0).is_zero());
        assert!(FieldValue::I32(0).is_zero());
        assert!(FieldValue::Text(String::new()).is_zero());
        assert!(!FieldValue::I64(-1).is_zero());
        assert!(!FieldValue::from("a.txt").is_zero());
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: FieldValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, FieldValue::U64(42));

        let v: FieldValue = serde_json::from_str("-7").unwrap();
        assert_eq!(v, FieldValue::I64(-7));

        let v: FieldValue = serde_json::from_str("\"image/png\"").unwrap();
        assert_eq!(v, FieldValue::Text("image/png".into()));
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(FieldValue::U64(5).as_i128(), Some(5));
        assert_eq!(FieldValue::I32(-5).as_i128(), Some(-5));
        assert_eq!(FieldValue::from("5").as_i128(), None);
        assert_eq!(FieldValue::from("5").as_str(), Some("5"));
    }
}
