use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::{FieldValue, Record};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Users {
    #[serde(default)]
    pub id: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_gender: String,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub user_phone: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub status: String,
}

impl Record for Users {
    const ENTITY: &'static str = "users";
    const TABLE: &'static str = "users";
    const CACHE_PREFIX: &'static str = "users:";
    const ID_COLUMN: &'static str = "id";
    const GENERATED_ID: bool = true;
    const TIMESTAMPS: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "user_name",
        "password",
        "user_gender",
        "nick_name",
        "user_phone",
        "user_email",
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
            ("user_name", FieldValue::from(self.user_name.as_str())),
            ("password", FieldValue::from(self.password.as_str())),
            ("user_gender", FieldValue::from(self.user_gender.as_str())),
            ("nick_name", FieldValue::from(self.nick_name.as_str())),
            ("user_phone", FieldValue::from(self.user_phone.as_str())),
            ("user_email", FieldValue::from(self.user_email.as_str())),
            ("status", FieldValue::from(self.status.as_str())),
        ]
    }
}
