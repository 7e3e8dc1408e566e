//! Shared fixtures: a schema-initialized temporary SQLite database, a default
//! config, and quick ways to get users and request contexts.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::NamedTempFile;

use crate::config::AppConfig;
use crate::kernel::{Services, Session, SessionUser};
use crate::models::{self, Folder, User};
use crate::orm::Repository;
use crate::state::AppState;

/// Keeps the backing file alive for as long as the pool is used.
pub struct TestDb {
    pub pool: SqlitePool,
    _file: NamedTempFile,
}

pub async fn test_db() -> TestDb {
    let file = NamedTempFile::new().unwrap();
    let options = SqliteConnectOptions::new().filename(file.path()).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await.unwrap();
    crate::db::init_db(&pool).await.unwrap();
    TestDb { pool, _file: file }
}

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub async fn test_state() -> (AppState, TestDb) {
    test_state_with(test_config()).await
}

pub async fn test_state_with(config: AppConfig) -> (AppState, TestDb) {
    let db = test_db().await;
    (AppState::new(db.pool.clone(), config), db)
}

pub fn anonymous(state: &AppState) -> Services {
    Services::new(state.clone(), Session::anonymous())
}

pub fn logged_in(state: &AppState, user: &User) -> Services {
    let session = Session::authenticated("test-token", SessionUser { id: user.id, is_admin: user.is_admin() });
    Services::new(state.clone(), session)
}

/// Stores a user with a root folder. The password is left unset; hashing is
/// only exercised where login is under test.
pub async fn create_user(state: &AppState, email: &str, is_admin: bool) -> User {
    let services = anonymous(state);
    let mut user = User::blank(models::now());
    user.set_first_name("Test").unwrap();
    user.set_last_name("User");
    user.set_email(email).unwrap();
    user.set_is_admin(is_admin);
    let storage = &state.config.storage;
    user.set_storage_size(storage.default_size_kb(), storage).unwrap();

    let users = services.users();
    user.id = users.create(&user).await.unwrap();
    let root_id = services.folders().create(&Folder::root_for(user.id)).await.unwrap();
    user.set_root_folder_id(root_id);
    users.update(user.id, &user).await.unwrap();
    user
}

pub async fn create_folder(state: &AppState, owner: &User, name: &str, parent_id: i64) -> Folder {
    let mut folder = Folder::blank(owner.id);
    folder.set_name(name).unwrap();
    folder.set_parent_id(Some(parent_id));
    folder.id = anonymous(state).folders().create(&folder).await.unwrap();
    folder
}

pub async fn create_file(state: &AppState, owner: &User, name: &str, folder_id: i64, size_kb: i64) -> models::FileEntry {
    let services = anonymous(state);
    let mut file = models::FileEntry::new(name, owner.id, folder_id, size_kb, models::now()).unwrap();
    file.id = services.files().create(&file).await.unwrap();

    let users = services.users();
    let mut stored = users.read(owner.id).await.unwrap().unwrap();
    stored.set_storage_used(stored.storage_used_kb() + size_kb).unwrap();
    users.update(owner.id, &stored).await.unwrap();
    file
}
