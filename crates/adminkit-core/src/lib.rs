//! # adminkit-core
//!
//! Record types shared by every AdminKit crate.
//!
//! A [`Record`] is one row of an admin entity (files, menus, permissions, roles,
//! role permissions, user roles, users). The trait carries everything the storage
//! backends and the cache layer need to know about an entity: its table, its cache
//! key prefix, its identifier column and its writable fields.

pub mod error;
pub mod model;
pub mod query;
pub mod record;

pub use error::{CoreError, Result};
pub use model::{Files, Menus, Permissions, RolePermissions, Roles, UserRoles, Users};
pub use query::{DEFAULT_LIMIT, Filter, FilterOp, IGNORE_COUNT, ListParams, SortOrder};
pub use record::{FieldValue, Record};
