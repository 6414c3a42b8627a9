use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Role to permission assignment, keyed by the role id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    #[serde(default)]
    pub role_id: u64,
    #[serde(default)]
    pub permission_id: u64,
}

impl Record for RolePermissions {
    const ENTITY: &'static str = "rolePermissions";
    const TABLE: &'static str = "role_permissions";
    const CACHE_PREFIX: &'static str = "rolePermissions:";
    const ID_COLUMN: &'static str = "role_id";
    const GENERATED_ID: bool = false;
    const TIMESTAMPS: bool = false;
    const COLUMNS: &'static [&'static str] = &["role_id", "permission_id"];

    fn id(&self) -> u64 {
        self.role_id
    }

    fn set_id(&mut self, id: u64) {
        self.role_id = id;
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("role_id", FieldValue::U64(self.role_id)),
            ("permission_id", FieldValue::U64(self.permission_id)),
        ]
    }
}
