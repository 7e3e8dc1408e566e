use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::http::BodyData;
use crate::orm::{DataMapper, Fields, MappingError, SqliteAdapter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i64,
    name: String,
    user_id: i64,
    /// `None` only for a user's root folder.
    parent_id: Option<i64>,
}

impl Folder {
    pub fn blank(user_id: i64) -> Self {
        Self { id: 0, name: String::new(), user_id, parent_id: None }
    }

    /// The root folder created for a freshly registered user; named after the user id.
    pub fn root_for(user_id: i64) -> Self {
        Self { id: 0, name: user_id.to_string(), user_id, parent_id: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::bad_request("name is empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.user_id = user_id;
    }

    pub fn set_parent_id(&mut self, parent_id: Option<i64>) {
        self.parent_id = parent_id;
    }

    pub fn apply(&mut self, body: &BodyData) -> AppResult<()> {
        self.set_name(body.string("name")?)?;
        self.set_parent_id(body.opt_i64("parentId")?);
        Ok(())
    }

    pub fn check_access(&self, user_id: i64) -> AppResult<()> {
        if self.user_id != user_id {
            return Err(AppError::forbidden("You have no permission to view or edit this folder"));
        }
        Ok(())
    }

    /// Two folders with the same name may not share a parent.
    pub fn check_unique_against(&self, other: &Folder) -> AppResult<()> {
        if other.id != self.id && other.name == self.name && other.parent_id == self.parent_id {
            return Err(AppError::bad_request(format!(
                "The folder with a name {} already exists in this folder",
                self.name
            )));
        }
        Ok(())
    }
}

pub struct FolderMapper {
    adapter: SqliteAdapter,
}

impl DataMapper for FolderMapper {
    type Entity = Folder;
    const TABLE: &'static str = "folders";

    fn from_adapter(adapter: SqliteAdapter) -> Self {
        Self { adapter }
    }

    fn adapter(&self) -> &SqliteAdapter {
        &self.adapter
    }

    fn to_fields(&self, folder: &Folder) -> Fields {
        Fields::new()
            .with("name", folder.name.as_str())
            .with("user_id", folder.user_id)
            .with("parent_id", folder.parent_id)
    }

    fn from_fields(&self, fields: Fields) -> Result<Folder, MappingError> {
        let name = fields.string("name")?;
        if name.is_empty() {
            return Err(MappingError::Invalid("Folder name is empty".into()));
        }
        Ok(Folder {
            id: fields.i64("id")?,
            name,
            user_id: fields.i64("user_id")?,
            parent_id: fields.opt_i64("parent_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_check_scoped_to_parent() {
        let mut a = Folder::blank(1);
        a.set_name("docs").unwrap();
        a.set_parent_id(Some(10));

        let mut b = a.clone();
        b.id = 2;
        assert!(a.check_unique_against(&b).is_err());

        b.set_parent_id(Some(11));
        assert!(a.check_unique_against(&b).is_ok());
    }

    #[test]
    fn test_access_is_owner_only() {
        let folder = Folder::root_for(5);
        assert_eq!(folder.name(), "5");
        assert!(folder.check_access(5).is_ok());
        assert!(folder.check_access(6).is_err());
    }
}
