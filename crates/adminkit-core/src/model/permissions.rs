use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::{FieldValue, Record};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub id: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl Record for Permissions {
    const ENTITY: &'static str = "permissions";
    const TABLE: &'static str = "permissions";
    const CACHE_PREFIX: &'static str = "permissions:";
    const ID_COLUMN: &'static str = "id";
    const GENERATED_ID: bool = true;
    const TIMESTAMPS: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "name",
        "code",
        "description",
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", FieldValue::from(self.name.as_str())),
            ("code", FieldValue::from(self.code.as_str())),
            ("description", FieldValue::from(self.description.as_str())),
        ]
    }
}
