use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::http::BodyData;
use crate::orm::{DataMapper, Fields, MappingError, SqliteAdapter};

/// Metadata of one stored file. The content itself lives outside the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: i64,
    name: String,
    user_id: i64,
    folder_id: i64,
    size_kb: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, user_id: i64, folder_id: i64, size_kb: i64, now: NaiveDateTime) -> AppResult<Self> {
        let mut file = Self {
            id: 0,
            name: String::new(),
            user_id,
            folder_id,
            size_kb: size_kb.max(0),
            created_at: now,
            updated_at: now,
        };
        file.set_name(name)?;
        Ok(file)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn folder_id(&self) -> i64 {
        self.folder_id
    }

    pub fn size_kb(&self) -> i64 {
        self.size_kb
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::bad_request("Name is empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_folder_id(&mut self, folder_id: i64) {
        self.folder_id = folder_id;
    }

    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = now;
    }

    /// Rename, and move when the body names a `folderId`.
    pub fn apply(&mut self, body: &BodyData) -> AppResult<()> {
        self.set_name(body.string("name")?)?;
        if body.contains("folderId") {
            self.set_folder_id(body.i64("folderId")?);
        }
        Ok(())
    }

    pub fn check_access(&self, user_id: i64) -> AppResult<()> {
        if self.user_id != user_id {
            return Err(AppError::forbidden("You have no permission to view or edit this file"));
        }
        Ok(())
    }

    /// Two files with the same name may not share a folder.
    pub fn check_unique_against(&self, other: &FileEntry) -> AppResult<()> {
        if other.id != self.id && other.name == self.name && other.folder_id == self.folder_id {
            return Err(AppError::bad_request(format!(
                "The file with a name {} already exists in this folder",
                self.name
            )));
        }
        Ok(())
    }
}

pub struct FileMapper {
    adapter: SqliteAdapter,
}

impl DataMapper for FileMapper {
    type Entity = FileEntry;
    const TABLE: &'static str = "files";

    fn from_adapter(adapter: SqliteAdapter) -> Self {
        Self { adapter }
    }

    fn adapter(&self) -> &SqliteAdapter {
        &self.adapter
    }

    fn to_fields(&self, file: &FileEntry) -> Fields {
        Fields::new()
            .with("name", file.name.as_str())
            .with("user_id", file.user_id)
            .with("folder_id", file.folder_id)
            .with("size_kb", file.size_kb)
            .with("created_at", file.created_at)
            .with("updated_at", file.updated_at)
    }

    fn from_fields(&self, fields: Fields) -> Result<FileEntry, MappingError> {
        let name = fields.string("name")?;
        if name.is_empty() {
            return Err(MappingError::Invalid("File name is empty".into()));
        }
        Ok(FileEntry {
            id: fields.i64("id")?,
            name,
            user_id: fields.i64("user_id")?,
            folder_id: fields.i64("folder_id")?,
            size_kb: fields.i64("size_kb")?,
            created_at: fields.timestamp("created_at")?,
            updated_at: fields.timestamp("updated_at")?,
        })
    }
}
