use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// User to role assignment, keyed by the user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoles {
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub role_id: u64,
}

impl Record for UserRoles {
    const ENTITY: &'static str = "userRoles";
    const TABLE: &'static str = "user_roles";
    const CACHE_PREFIX: &'static str = "userRoles:";
    const ID_COLUMN: &'static str = "user_id";
    const GENERATED_ID: bool = false;
    const TIMESTAMPS: bool = false;
    const COLUMNS: &'static [&'static str] = &["user_id", "role_id"];

    fn id(&self) -> u64 {
        self.user_id
    }

    fn set_id(&mut self, id: u64) {
        self.user_id = id;
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("user_id", FieldValue::U64(self.user_id)),
            ("role_id", FieldValue::U64(self.role_id)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_user_id() {
        let mut record = UserRoles {
            user_id: 7,
            role_id: 2,
        };
        assert_eq!(record.id(), 7);
        record.set_id(8);
        assert_eq!(record.user_id, 8);
        assert!(!UserRoles::GENERATED_ID);
    }
}
