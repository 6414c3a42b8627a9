use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::{FieldValue, Record};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roles {
    #[serde(default)]
    pub id: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub role_name: String,
    #[serde(default)]
    pub role_code: String,
    #[serde(default)]
    pub role_desc: String,
    #[serde(default)]
    pub status: String,
}

impl Record for Roles {
    const ENTITY: &'static str = "roles";
    const TABLE: &'static str = "roles";
    const CACHE_PREFIX: &'static str = "roles:";
    const ID_COLUMN: &'static str = "id";
    const GENERATED_ID: bool = true;
    const TIMESTAMPS: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "role_name",
        "role_code",
        "role_desc",
        "status",
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("role_name", FieldValue::from(self.role_name.as_str())),
            ("role_code", FieldValue::from(self.role_code.as_str())),
            ("role_desc", FieldValue::from(self.role_desc.as_str())),
            ("status", FieldValue::from(self.status.as_str())),
        ]
    }
}
