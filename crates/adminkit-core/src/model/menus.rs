use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::{FieldValue, Record};

/// A navigation menu entry. Menus form a tree through `parent_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Menus {
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
    pub path: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub parent_id: u64,
    #[serde(default)]
    pub order: i32,
}

impl Record for Menus {
    const ENTITY: &'static str = "menus";
    const TABLE: &'static str = "menus";
    const CACHE_PREFIX: &'static str = "menus:";
    const ID_COLUMN: &'static str = "id";
    const GENERATED_ID: bool = true;
    const TIMESTAMPS: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "name",
        "path",
        "icon",
        "parent_id",
        "order",
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
            ("path", FieldValue::from(self.path.as_str())),
            ("icon", FieldValue::from(self.icon.as_str())),
            ("parent_id", FieldValue::U64(self.parent_id)),
            ("order", FieldValue::I32(self.order)),
        ]
    }
}
