//! Domain entities and their data mappers.
//!
//! Entities keep their fields private and validate on every setter, so a
//! value that made it into an entity is always one the domain accepts.
//! Setter failures are client faults (400). Mapper failures are
//! [`MappingError`](crate::orm::MappingError)s: storage handed back a row the
//! domain cannot represent.

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::orm::MapperRepository;

pub mod file;
pub mod folder;
pub mod share_record;
pub mod user;

pub use file::{FileEntry, FileMapper};
pub use folder::{Folder, FolderMapper};
pub use share_record::{ShareRecord, ShareRecordMapper};
pub use user::{Gender, User, UserMapper};

pub type UserRepository = MapperRepository<UserMapper>;
pub type FolderRepository = MapperRepository<FolderMapper>;
pub type FileRepository = MapperRepository<FileMapper>;
pub type ShareRecordRepository = MapperRepository<ShareRecordMapper>;

/// Current UTC time truncated to whole seconds, the precision storage keeps.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}
