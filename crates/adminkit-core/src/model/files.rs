use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::record::{FieldValue, Record};

/// An uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Files {
    #[serde(default)]
    pub id: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub user_id: u64,
}

impl Record for Files {
    const ENTITY: &'static str = "files";
    const TABLE: &'static str = "files";
    const CACHE_PREFIX: &'static str = "files:";
    const ID_COLUMN: &'static str = "id";
    const GENERATED_ID: bool = true;
    const TIMESTAMPS: bool = true;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "filename",
        "url",
        "size",
        "mime_type",
        "user_id",
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("filename", FieldValue::from(self.filename.as_str())),
            ("url", FieldValue::from(self.url.as_str())),
            ("size", FieldValue::I64(self.size)),
            ("mime_type", FieldValue::from(self.mime_type.as_str())),
            ("user_id", FieldValue::U64(self.user_id)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_only_non_zero_fields() {
        let patch = Files {
            id: 3,
            size: 100,
            ..Default::default()
        }
        .patch();
        assert_eq!(patch, vec![("size", FieldValue::I64(100))]);
    }

    #[test]
    fn test_column_names_in_json() {
        let record = Files {
            id: 1,
            filename: "a.txt".into(),
            mime_type: "text/plain".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["filename"], "a.txt");
        assert_eq!(json["mime_type"], "text/plain");
        assert!(json["created_at"].is_null());
    }

    #[test]
    fn test_decode_row_json_with_timestamps() {
        let row = serde_json::json!({
            "id": 9,
            "created_at": "2024-05-01T12:00:00.123456+00:00",
            "updated_at": "2024-05-01T12:00:00+00:00",
            "deleted_at": null,
            "filename": "report.pdf",
            "url": "/files/report.pdf",
            "size": 2048,
            "mime_type": "application/pdf",
            "user_id": 4
        });
        let record: Files = serde_json::from_value(row).unwrap();
        assert_eq!(record.id, 9);
        assert!(record.created_at.is_some());
        assert!(record.deleted_at.is_none());
        assert_eq!(record.size, 2048);
    }

    #[test]
    fn test_messagepack_roundtrip_with_timestamps() {
        let record = Files {
            id: 2,
            created_at: Some(time::macros::datetime!(2024-01-02 03:04:05 UTC)),
            filename: "b.txt".into(),
            ..Default::default()
        };
        let bytes = rmp_serde::to_vec_named(&record).unwrap();
        let decoded: Files = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, record);
    }
}
