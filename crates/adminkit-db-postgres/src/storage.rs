//! PostgreSQL implementation of the RecordStore trait.

use std::marker::PhantomData;

use adminkit_core::{FieldValue, Filter, FilterOp, ListParams, Record};
use adminkit_storage::{RecordStore, StorageError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx_core::arguments::Arguments;
use sqlx_core::error::Error as SqlxError;
use sqlx_core::query::query_with;
use sqlx_core::query_scalar::{query_scalar, query_scalar_with};
use sqlx_postgres::{PgArguments, PgPool};
use tracing::{debug, instrument};

use crate::error::is_unique_violation;

/// PostgreSQL storage backend for one record type.
///
/// Rows are read through `row_to_json` and decoded with the record's serde
/// representation, so column names must match the record's field names.
#[derive(Debug)]
pub struct PostgresStore<R: Record> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for PostgresStore<R> {
    fn clone(&self) -> Self {
        Self::from_pool(self.pool.clone())
    }
}

impl<R: Record> PostgresStore<R> {
    /// Creates a store on an existing connection pool.
    ///
    /// The pool is usually shared between the stores of every entity.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Quotes an identifier. Column names are whitelisted before they get here.
fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn to_i64(id: u64) -> Result<i64, StorageError> {
    i64::try_from(id).map_err(|_| StorageError::invalid_record(format!("id {id} is out of range")))
}

fn push_arg(args: &mut PgArguments, value: &FieldValue) -> Result<(), StorageError> {
    let pushed = match value {
        FieldValue::U64(v) => args.add(to_i64(*v)?),
        FieldValue::I64(v) => args.add(*v),
        FieldValue::I32(v) => args.add(*v),
        FieldValue::Text(v) => args.add(v.clone()),
    };
    pushed.map_err(|e| StorageError::invalid_query(format!("Failed to bind {value}: {e}")))
}

fn sql_error(entity: &str, action: &str, err: SqlxError) -> StorageError {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
            StorageError::connection_error(err.to_string())
        }
        other => StorageError::internal(format!("Failed to {action} {entity}: {other}")),
    }
}

fn decode<R: Record>(row: Value) -> Result<R, StorageError> {
    serde_json::from_value(row)
        .map_err(|e| StorageError::internal(format!("Failed to decode {} row: {e}", R::ENTITY)))
}

/// Builds the `WHERE` clause and its arguments for a list query.
fn filter_clause(filters: &[Filter]) -> Result<(String, PgArguments), StorageError> {
    let mut args = PgArguments::default();
    let mut conditions = Vec::with_capacity(filters.len());

    for (i, filter) in filters.iter().enumerate() {
        let placeholder = i + 1;
        let column = quote(&filter.name);
        if filter.exp == FilterOp::Like {
            conditions.push(format!("{column}::text LIKE ${placeholder}"));
            push_arg(&mut args, &FieldValue::Text(format!("%{}%", filter.value)))?;
        } else {
            conditions.push(format!("{column} {} ${placeholder}", filter.exp.as_sql()));
            push_arg(&mut args, &filter.value)?;
        }
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    Ok((clause, args))
}

#[async_trait]
impl<R: Record> RecordStore<R> for PostgresStore<R> {
    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn query(&self, id: u64) -> Result<R, StorageError> {
        let sql = format!(
            "SELECT row_to_json(t) FROM {} t WHERE {} = $1",
            quote(R::TABLE),
            quote(R::ID_COLUMN)
        );
        let row: Option<Value> = query_scalar(&sql)
            .bind(to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sql_error(R::ENTITY, "read", e))?;

        match row {
            Some(row) => decode(row),
            None => Err(StorageError::not_found(R::ENTITY, id)),
        }
    }

    #[instrument(skip(self, record), fields(entity = R::ENTITY))]
    async fn insert(&self, record: &R) -> Result<u64, StorageError> {
        if !R::GENERATED_ID && record.id() == 0 {
            return Err(StorageError::invalid_record(format!(
                "{} cannot be 0",
                R::ID_COLUMN
            )));
        }

        let columns = record.fields();
        let mut args = PgArguments::default();
        for (_, value) in &columns {
            push_arg(&mut args, value)?;
        }

        let table = quote(R::TABLE);
        let returning = quote(R::ID_COLUMN);
        let sql = if columns.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES RETURNING {returning}")
        } else {
            let names: Vec<String> = columns.iter().map(|(name, _)| quote(name)).collect();
            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
            format!(
                "INSERT INTO {table} ({}) VALUES ({}) RETURNING {returning}",
                names.join(", "),
                placeholders.join(", ")
            )
        };

        let id: i64 = query_scalar_with(&sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::already_exists(R::ENTITY, record.id())
                } else {
                    sql_error(R::ENTITY, "insert", e)
                }
            })?;

        debug!(id, "record inserted");
        u64::try_from(id)
            .map_err(|_| StorageError::internal(format!("negative id {id} for {}", R::ENTITY)))
    }

    #[instrument(skip(self), fields(entity = R::ENTITY))]
    async fn delete_by_id(&self, id: u64) -> Result<(), StorageError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            quote(R::TABLE),
            quote(R::ID_COLUMN)
        );
        let mut args = PgArguments::default();
        push_arg(&mut args, &FieldValue::U64(id))?;
        query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| sql_error(R::ENTITY, "delete", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(entity = R::ENTITY, id = record.id()))]
    async fn update_partial(&self, record: &R) -> Result<(), StorageError> {
        let id = record.id();
        if id == 0 {
            return Err(StorageError::invalid_record(format!(
                "{} cannot be 0",
                R::ID_COLUMN
            )));
        }

        let patch: Vec<_> = record
            .patch()
            .into_iter()
            .filter(|(name, _)| *name != R::ID_COLUMN)
            .collect();
        if patch.is_empty() {
            return Ok(());
        }

        let mut args = PgArguments::default();
        let mut assignments = Vec::with_capacity(patch.len() + 1);
        for (i, (name, value)) in patch.iter().enumerate() {
            assignments.push(format!("{} = ${}", quote(name), i + 1));
            push_arg(&mut args, value)?;
        }
        if R::TIMESTAMPS {
            assignments.push(format!("{} = now()", quote("updated_at")));
        }
        push_arg(&mut args, &FieldValue::U64(id))?;

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            quote(R::TABLE),
            assignments.join(", "),
            quote(R::ID_COLUMN),
            patch.len() + 1
        );
        let result = query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| sql_error(R::ENTITY, "update", e))?;

        debug!(rows = result.rows_affected(), "record updated");
        Ok(())
    }

    #[instrument(skip(self, params), fields(entity = R::ENTITY))]
    async fn query_by_filter(&self, params: &ListParams) -> Result<(Vec<R>, u64), StorageError> {
        params.validate::<R>()?;
        let table = quote(R::TABLE);

        let total = if params.counts_total() {
            let (clause, args) = filter_clause(&params.columns)?;
            let sql = format!("SELECT COUNT(*) FROM {table}{clause}");
            let total: i64 = query_scalar_with(&sql, args)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| sql_error(R::ENTITY, "count", e))?;
            if total == 0 {
                return Ok((Vec::new(), 0));
            }
            u64::try_from(total).unwrap_or_default()
        } else {
            0
        };

        let order = params.sort_order(R::ID_COLUMN);
        let direction = if order.descending {
            "DESC NULLS LAST"
        } else {
            "ASC NULLS FIRST"
        };
        let (clause, args) = filter_clause(&params.columns)?;
        let sql = format!(
            "SELECT row_to_json(t) FROM {table} t{clause} ORDER BY {} {direction} LIMIT {} OFFSET {}",
            quote(&order.column),
            params.limit,
            params.offset()
        );
        let rows: Vec<Value> = query_scalar_with(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sql_error(R::ENTITY, "list", e))?;

        let records = rows.into_iter().map(decode).collect::<Result<Vec<R>, _>>()?;
        Ok((records, total))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("order"), "\"order\"");
        assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_filter_clause() {
        let filters = vec![
            Filter::new("size", FilterOp::Gte, 100u64),
            Filter::new("filename", FilterOp::Like, "report"),
        ];
        let (clause, _) = filter_clause(&filters).unwrap();
        assert_eq!(
            clause,
            " WHERE \"size\" >= $1 AND \"filename\"::text LIKE $2"
        );

        let (clause, _) = filter_clause(&[]).unwrap();
        assert!(clause.is_empty());
    }

    #[test]
    fn test_out_of_range_id_is_rejected() {
        let mut args = PgArguments::default();
        let err = push_arg(&mut args, &FieldValue::U64(u64::MAX)).unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }
}
