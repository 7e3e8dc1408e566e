use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::orm::{DataMapper, Fields, MappingError, SqliteAdapter};

/// Grants `user_id` read access to a file owned by someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub id: i64,
    user_id: i64,
    file_id: i64,
}

impl ShareRecord {
    pub fn new(user_id: i64, file_id: i64) -> Self {
        Self { id: 0, user_id, file_id }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn file_id(&self) -> i64 {
        self.file_id
    }

    pub fn check_unique_against(&self, other: &ShareRecord) -> AppResult<()> {
        if self.user_id == other.user_id && self.file_id == other.file_id {
            return Err(AppError::bad_request("You already shared this file with this user"));
        }
        Ok(())
    }
}

pub struct ShareRecordMapper {
    adapter: SqliteAdapter,
}

impl DataMapper for ShareRecordMapper {
    type Entity = ShareRecord;
    const TABLE: &'static str = "share_records";

    fn from_adapter(adapter: SqliteAdapter) -> Self {
        Self { adapter }
    }

    fn adapter(&self) -> &SqliteAdapter {
        &self.adapter
    }

    fn to_fields(&self, record: &ShareRecord) -> Fields {
        Fields::new().with("user_id", record.user_id).with("file_id", record.file_id)
    }

    fn from_fields(&self, fields: Fields) -> Result<ShareRecord, MappingError> {
        Ok(ShareRecord { id: fields.i64("id")?, user_id: fields.i64("user_id")?, file_id: fields.i64("file_id")? })
    }
}
