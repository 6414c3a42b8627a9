//! List parameters: column filters, sorting and paging.
//!
//! Backends translate these into their own query language. Column names are
//! always checked against the record whitelist before translation.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::record::{FieldValue, Record};

/// Default page size when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Sort value that disables the total count query.
pub const IGNORE_COUNT: &str = "ignore count";

/// Comparison operator of a single filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    #[default]
    #[serde(alias = "=")]
    Eq,
    #[serde(alias = "!=")]
    Neq,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = ">=")]
    Gte,
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=")]
    Lte,
    /// Substring match.
    Like,
}

impl FilterOp {
    /// SQL operator for this comparison.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
        }
    }
}

/// A single column condition. Filters are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub exp: FilterOp,
    pub value: FieldValue,
}

impl Filter {
    pub fn new(name: impl Into<String>, exp: FilterOp, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            exp,
            value: value.into(),
        }
    }
}

/// Resolved sort expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: String,
    pub descending: bool,
}

/// Paginated list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Column name, optionally prefixed by `-` for descending order.
    /// Empty means descending by identifier. [`IGNORE_COUNT`] skips counting.
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub columns: Vec<Filter>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 0,
            limit: DEFAULT_LIMIT,
            sort: String::new(),
            columns: Vec::new(),
        }
    }
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    #[must_use]
    pub fn with_filter(
        mut self,
        name: impl Into<String>,
        exp: FilterOp,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.columns.push(Filter::new(name, exp, value));
        self
    }

    /// Whether the backend should compute the total row count.
    pub fn counts_total(&self) -> bool {
        self.sort != IGNORE_COUNT
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.limit)
    }

    /// Resolves the sort expression, defaulting to descending by `id_column`.
    pub fn sort_order(&self, id_column: &str) -> SortOrder {
        let sort = self.sort.trim();
        if sort.is_empty() || sort == IGNORE_COUNT {
            return SortOrder {
                column: id_column.to_string(),
                descending: true,
            };
        }
        match sort.strip_prefix('-') {
            Some(column) => SortOrder {
                column: column.to_string(),
                descending: true,
            },
            None => SortOrder {
                column: sort.to_string(),
                descending: false,
            },
        }
    }

    /// Checks paging bounds and every column name against the record whitelist.
    pub fn validate<R: Record>(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(CoreError::invalid_query("limit must be > 0"));
        }
        for filter in &self.columns {
            if !R::has_column(&filter.name) {
                return Err(CoreError::unknown_column(R::ENTITY, &filter.name));
            }
            if filter.exp == FilterOp::Like && filter.value.as_str().is_none() {
                return Err(CoreError::invalid_query(format!(
                    "like filter on '{}' requires a string value",
                    filter.name
                )));
            }
        }
        let order = self.sort_order(R::ID_COLUMN);
        if !R::has_column(&order.column) {
            return Err(CoreError::unknown_column(R::ENTITY, order.column));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Files;

    #[test]
    fn test_default_sort_is_id_desc() {
        let params = ListParams::new();
        assert_eq!(
            params.sort_order("id"),
            SortOrder {
                column: "id".into(),
                descending: true
            }
        );
        assert!(params.counts_total());
    }

    #[test]
    fn test_sort_parsing() {
        let asc = ListParams::new().with_sort("filename");
        assert!(!asc.sort_order("id").descending);

        let desc = ListParams::new().with_sort("-size");
        let order = desc.sort_order("id");
        assert_eq!(order.column, "size");
        assert!(order.descending);

        let ignore = ListParams::new().with_sort(IGNORE_COUNT);
        assert!(!ignore.counts_total());
        assert_eq!(ignore.sort_order("id").column, "id");
    }

    #[test]
    fn test_offset() {
        let params = ListParams::new().with_page(3, 20);
        assert_eq!(params.offset(), 60);
    }

    #[test]
    fn test_validate_rejects_unknown_columns() {
        let params = ListParams::new().with_filter("password", FilterOp::Eq, "x");
        assert_eq!(
            params.validate::<Files>(),
            Err(CoreError::unknown_column("files", "password"))
        );

        let params = ListParams::new().with_sort("-nope");
        assert!(params.validate::<Files>().is_err());

        let params = ListParams::new()
            .with_filter("filename", FilterOp::Like, "a")
            .with_sort("size");
        assert!(params.validate::<Files>().is_ok());
    }

    #[test]
    fn test_validate_like_requires_text() {
        let params = ListParams::new().with_filter("size", FilterOp::Like, 10u64);
        assert!(matches!(
            params.validate::<Files>(),
            Err(CoreError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_deserialize_symbolic_operators() {
        let params: ListParams = serde_json::from_str(
            r#"{"page":1,"columns":[{"name":"size","exp":">=","value":100}]}"#,
        )
        .unwrap();
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.columns[0].exp, FilterOp::Gte);
        assert_eq!(params.columns[0].value, FieldValue::U64(100));
    }
}
