use diesel::prelude::*;

use crate::db::schema::clipboard_history;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = clipboard_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryRow {
    pub id: String,
    pub timestamp_ms: i64,
    pub data_type: String,
    pub plain_text: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    /// JSON array of paths.
    pub file_paths: Option<String>,
}
