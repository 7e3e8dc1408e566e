use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;
use validator::ValidateEmail;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::http::BodyData;
use crate::orm::{DataMapper, Fields, MappingError, SqliteAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    first_name: String,
    last_name: String,
    email: String,
    /// Argon2 PHC string, never the raw password.
    password: String,
    is_admin: bool,
    gender: Option<Gender>,
    root_folder_id: Option<i64>,
    storage_used_kb: i64,
    storage_size_kb: i64,
    created_at: NaiveDateTime,
}

impl User {
    /// An account that has not been stored yet. Every field still has to be
    /// filled through the setters or [`User::apply_registration`].
    pub fn blank(created_at: NaiveDateTime) -> Self {
        Self {
            id: 0,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            is_admin: false,
            gender: None,
            root_folder_id: None,
            storage_used_kb: 0,
            storage_size_kb: 0,
            created_at,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn root_folder_id(&self) -> Option<i64> {
        self.root_folder_id
    }

    pub fn storage_used_kb(&self) -> i64 {
        self.storage_used_kb
    }

    pub fn storage_size_kb(&self) -> i64 {
        self.storage_size_kb
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) -> AppResult<()> {
        let first_name = first_name.into();
        if first_name.is_empty() {
            return Err(AppError::bad_request("firstName is empty"));
        }
        self.first_name = first_name;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
    }

    pub fn set_email(&mut self, email: &str) -> AppResult<()> {
        let email = email.trim();
        if !email.validate_email() {
            return Err(AppError::bad_request("Wrong email format"));
        }
        self.email = email.to_string();
        Ok(())
    }

    /// Hashes and stores `raw`. Hashing runs on the blocking pool.
    pub async fn set_password(&mut self, raw: &str) -> AppResult<()> {
        if raw.is_empty() {
            return Err(AppError::bad_request("password is empty string"));
        }
        let raw = raw.to_string();
        let hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(raw.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))
        })
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
        self.password = hash;
        Ok(())
    }

    pub async fn check_password(&self, raw: &str) -> bool {
        let hash = self.password.clone();
        let raw = raw.to_string();
        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&hash) {
                Ok(h) => h,
                Err(_) => return false,
            };
            Argon2::default().verify_password(raw.as_bytes(), &parsed).is_ok()
        })
        .await
        .unwrap_or(false)
    }

    pub fn set_is_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
    }

    pub fn set_gender(&mut self, code: Option<&str>) -> AppResult<()> {
        self.gender = match code {
            None => None,
            Some(code) => Some(Gender::from_code(code).ok_or_else(|| AppError::bad_request("Wrong gender value"))?),
        };
        Ok(())
    }

    pub fn set_root_folder_id(&mut self, folder_id: i64) {
        self.root_folder_id = Some(folder_id);
    }

    /// Negative usage clamps to zero; usage beyond the quota is refused.
    pub fn set_storage_used(&mut self, used_kb: i64) -> AppResult<()> {
        if used_kb > self.storage_size_kb {
            return Err(AppError::bad_request("User total storage is used up"));
        }
        self.storage_used_kb = used_kb.max(0);
        Ok(())
    }

    pub fn set_storage_size(&mut self, size_kb: i64, bounds: &StorageConfig) -> AppResult<()> {
        if size_kb < bounds.min_size_kb() {
            return Err(AppError::bad_request(format!(
                "User storage size can not be less than {}",
                bounds.min_size_kb()
            )));
        }
        if size_kb > bounds.max_size_kb() {
            return Err(AppError::bad_request(format!(
                "User storage size can not be more than {}",
                bounds.max_size_kb()
            )));
        }
        self.storage_size_kb = size_kb;
        Ok(())
    }

    /// Profile update a user may perform on their own account.
    pub fn apply(&mut self, body: &BodyData) -> AppResult<()> {
        self.set_first_name(body.string("firstName")?)?;
        self.set_last_name(body.string("lastName")?);
        self.set_gender(body.opt_string("gender")?.as_deref())
    }

    pub async fn apply_registration(&mut self, body: &BodyData) -> AppResult<()> {
        self.set_first_name(body.string("firstName")?)?;
        self.set_last_name(body.string("lastName")?);
        self.set_email(&body.string("email")?)?;
        self.set_password(&body.string("password")?).await?;
        self.set_gender(body.opt_string("gender")?.as_deref())
    }

    /// Update an administrator may perform on any account.
    pub fn apply_admin(&mut self, body: &BodyData) -> AppResult<()> {
        self.apply(body)?;
        self.set_email(&body.string("email")?)?;
        self.set_is_admin(body.bool("isAdmin")?);
        Ok(())
    }

    /// What any logged in user may see about another.
    pub fn safe_properties(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "gender": self.gender,
        })
    }

    pub fn properties(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "firstName": self.first_name,
            "lastName": self.last_name,
            "email": self.email,
            "isAdmin": self.is_admin,
            "gender": self.gender,
            "rootFolderId": self.root_folder_id,
            "storageUsedKb": self.storage_used_kb,
            "storageSizeKb": self.storage_size_kb,
            "createdAt": self.created_at,
        })
    }
}

pub struct UserMapper {
    adapter: SqliteAdapter,
}

impl DataMapper for UserMapper {
    type Entity = User;
    const TABLE: &'static str = "users";

    fn from_adapter(adapter: SqliteAdapter) -> Self {
        Self { adapter }
    }

    fn adapter(&self) -> &SqliteAdapter {
        &self.adapter
    }

    fn to_fields(&self, user: &User) -> Fields {
        Fields::new()
            .with("first_name", user.first_name.as_str())
            .with("last_name", user.last_name.as_str())
            .with("email", user.email.as_str())
            .with("password", user.password.as_str())
            .with("is_admin", user.is_admin)
            .with("gender", user.gender.map(Gender::code))
            .with("root_folder_id", user.root_folder_id)
            .with("storage_used_kb", user.storage_used_kb)
            .with("storage_size_kb", user.storage_size_kb)
            .with("created_at", user.created_at)
    }

    fn from_fields(&self, fields: Fields) -> Result<User, MappingError> {
        let gender = match fields.opt_string("gender")? {
            None => None,
            Some(code) => Some(
                Gender::from_code(&code)
                    .ok_or_else(|| MappingError::Invalid("Got wrong gender value from database".into()))?,
            ),
        };
        let first_name = fields.string("first_name")?;
        if first_name.is_empty() {
            return Err(MappingError::Invalid("First name is empty".into()));
        }

        Ok(User {
            id: fields.i64("id")?,
            first_name,
            last_name: fields.string("last_name")?,
            email: fields.string("email")?,
            password: fields.string("password")?,
            is_admin: fields.bool("is_admin")?,
            gender,
            root_folder_id: fields.opt_i64("root_folder_id")?,
            storage_used_kb: fields.i64("storage_used_kb")?,
            storage_size_kb: fields.i64("storage_size_kb")?,
            created_at: fields.timestamp("created_at")?,
        })
    }
}
