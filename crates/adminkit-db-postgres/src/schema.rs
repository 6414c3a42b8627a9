//! Schema management for the PostgreSQL storage backend.
//!
//! One table per entity. Tables with store-generated identifiers use
//! `BIGSERIAL` keys and carry `created_at`, `updated_at` and `deleted_at`;
//! the join tables are keyed by the caller-supplied foreign key.

use sqlx_postgres::PgPool;
use tracing::{info, instrument};

use crate::error::{PostgresError, Result};

const FILES: &str = r#"
CREATE TABLE IF NOT EXISTS "files" (
    "id" BIGSERIAL PRIMARY KEY,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "deleted_at" TIMESTAMPTZ,
    "filename" TEXT NOT NULL DEFAULT '',
    "url" TEXT NOT NULL DEFAULT '',
    "size" BIGINT NOT NULL DEFAULT 0,
    "mime_type" TEXT NOT NULL DEFAULT '',
    "user_id" BIGINT NOT NULL DEFAULT 0
)"#;

const MENUS: &str = r#"
CREATE TABLE IF NOT EXISTS "menus" (
    "id" BIGSERIAL PRIMARY KEY,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "deleted_at" TIMESTAMPTZ,
    "name" TEXT NOT NULL DEFAULT '',
    "path" TEXT NOT NULL DEFAULT '',
    "icon" TEXT NOT NULL DEFAULT '',
    "parent_id" BIGINT NOT NULL DEFAULT 0,
    "order" INTEGER NOT NULL DEFAULT 0
)"#;

const PERMISSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS "permissions" (
    "id" BIGSERIAL PRIMARY KEY,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "deleted_at" TIMESTAMPTZ,
    "name" TEXT NOT NULL DEFAULT '',
    "code" TEXT NOT NULL DEFAULT '',
    "description" TEXT NOT NULL DEFAULT ''
)"#;

const ROLES: &str = r#"
CREATE TABLE IF NOT EXISTS "roles" (
    "id" BIGSERIAL PRIMARY KEY,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "deleted_at" TIMESTAMPTZ,
    "role_name" TEXT NOT NULL DEFAULT '',
    "role_code" TEXT NOT NULL DEFAULT '',
    "role_desc" TEXT NOT NULL DEFAULT '',
    "status" TEXT NOT NULL DEFAULT ''
)"#;

const ROLE_PERMISSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS "role_permissions" (
    "role_id" BIGINT PRIMARY KEY,
    "permission_id" BIGINT NOT NULL DEFAULT 0
)"#;

const USER_ROLES: &str = r#"
CREATE TABLE IF NOT EXISTS "user_roles" (
    "user_id" BIGINT PRIMARY KEY,
    "role_id" BIGINT NOT NULL DEFAULT 0
)"#;

const USERS: &str = r#"
CREATE TABLE IF NOT EXISTS "users" (
    "id" BIGSERIAL PRIMARY KEY,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "deleted_at" TIMESTAMPTZ,
    "user_name" TEXT NOT NULL DEFAULT '',
    "password" TEXT NOT NULL DEFAULT '',
    "user_gender" TEXT NOT NULL DEFAULT '',
    "nick_name" TEXT NOT NULL DEFAULT '',
    "user_phone" TEXT NOT NULL DEFAULT '',
    "user_email" TEXT NOT NULL DEFAULT '',
    "status" TEXT NOT NULL DEFAULT ''
)"#;

/// Table name and DDL for every entity, in creation order.
pub const TABLES: &[(&str, &str)] = &[
    ("files", FILES),
    ("menus", MENUS),
    ("permissions", PERMISSIONS),
    ("roles", ROLES),
    ("role_permissions", ROLE_PERMISSIONS),
    ("user_roles", USER_ROLES),
    ("users", USERS),
];

/// Creates the entity tables.
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: PgPool,
}

impl SchemaManager {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates every missing entity table. Idempotent.
    #[instrument(skip(self))]
    pub async fn ensure_tables(&self) -> Result<()> {
        for (table, ddl) in TABLES {
            sqlx_core::query::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| PostgresError::schema(format!("Failed to create {table}: {e}")))?;
        }
        info!(tables = TABLES.len(), "Entity tables ready");
        Ok(())
    }
}
