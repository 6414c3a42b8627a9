//! Entity records.
//!
//! Every record serializes with its relational column names so the same serde
//! representation is used for cache entries, JSON row decoding and filtering.

mod files;
mod menus;
mod permissions;
mod role_permissions;
mod roles;
mod user_roles;
mod users;

pub use files::Files;
pub use menus::Menus;
pub use permissions::Permissions;
pub use role_permissions::RolePermissions;
pub use roles::Roles;
pub use user_roles::UserRoles;
pub use users::Users;
