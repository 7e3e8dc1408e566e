use axum::http::StatusCode;
use serde_json::json;

use super::folders::delete_file;
use crate::error::{AppError, AppResult, OptionExt};
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services};
use crate::models::{self, FileEntry, ShareRecord};
use crate::orm::Repository;

pub async fn list(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let user_id = services.session().user_id()?;
    let files = services.files().get_by_property("user_id", user_id).await?;
    res.with_json(&files)
}

/// Records an uploaded `file` in the folder named by the `folderId` form
/// field and charges its size, rounded up to whole kilobytes, to the
/// uploader's quota. Only the metadata is stored.
pub async fn add(req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let user_id = services.session().user_id()?;
    let users = services.users();
    let mut owner = users.read(user_id).await?.ok_or_not_found("User")?;

    let folder_id = req
        .form()
        .get("folderId")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::bad_request("Passed folderId is not integer"))?;
    let folder = services
        .folders()
        .read(folder_id)
        .await?
        .ok_or_else(|| AppError::bad_request("This folder does not exist"))?;
    folder.check_access(user_id)?;

    let upload = req
        .files()
        .iter()
        .find(|f| f.field == "file")
        .ok_or_else(|| AppError::bad_request("No file posted"))?;
    let size_kb = i64::try_from((upload.bytes.len() as u64).div_ceil(1024)).unwrap_or(i64::MAX);

    let files = services.files();
    let mut file = FileEntry::new(upload.file_name.as_str(), user_id, folder.id, size_kb, models::now())?;
    for other in files.get_by_property("name", file.name()).await? {
        file.check_unique_against(&other)?;
    }
    owner.set_storage_used(owner.storage_used_kb().saturating_add(size_kb))?;

    file.id = files.create(&file).await?;
    if let Err(e) = users.update(user_id, &owner).await {
        tracing::warn!("Quota update for user {} failed, removing file {}: {}", user_id, file.id, e);
        files.delete(file.id).await?;
        return Err(e);
    }
    res.with_status(StatusCode::CREATED).with_json(&file)
}

/// Files other users shared with the logged in user.
pub async fn list_shared(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let user_id = services.session().user_id()?;
    let repo = services.files();
    let mut files = Vec::new();
    for record in services.share_records().get_by_property("user_id", user_id).await? {
        if let Some(file) = repo.read(record.file_id()).await? {
            files.push(file);
        }
    }
    res.with_json(&files)
}

pub async fn get(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let file = services.files().read(id).await?.ok_or_not_found("File")?;
    check_read_access(&services, &file).await?;
    res.with_json(&file)
}

/// Renames a file, moving it too when the body carries a `folderId`.
pub async fn rename(req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let user_id = services.session().user_id()?;
    let files = services.files();
    let mut file = files.read(id).await?.ok_or_not_found("File")?;
    file.check_access(user_id)?;

    let folder_before = file.folder_id();
    file.apply(&req.json()?)?;
    if file.folder_id() != folder_before {
        let target = services.folders().read(file.folder_id()).await?.ok_or_not_found("Folder")?;
        target.check_access(user_id)?;
    }
    for other in files.get_by_property("name", file.name()).await? {
        file.check_unique_against(&other)?;
    }

    file.touch(models::now());
    files.update(id, &file).await?;
    res.with_json(&file)
}

pub async fn remove(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let file = services.files().read(id).await?.ok_or_not_found("File")?;
    if !services.session().is_admin() {
        file.check_access(services.session().user_id()?)?;
    }
    delete_file(&services, &file).await?;
    res.with_json(&json!({ "deleted": id }))
}

pub async fn share_records(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let file = owned_file(&services, args.int("fileId")?, "This is not your file").await?;
    let records = services.share_records().get_by_property("file_id", file.id).await?;
    res.with_json(&records)
}

pub async fn share(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let user_id = args.int("userId")?;
    services.users().read(user_id).await?.ok_or_not_found("User")?;
    let file = owned_file(&services, args.int("fileId")?, "You can not share this file").await?;
    if file.user_id() == user_id {
        return Err(AppError::bad_request("You can not share a file with yourself"));
    }

    let repo = services.share_records();
    let mut record = ShareRecord::new(user_id, file.id);
    for other in repo.get_by_property("file_id", file.id).await? {
        record.check_unique_against(&other)?;
    }
    record.id = repo.create(&record).await?;
    res.with_json(&record)
}

pub async fn unshare(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let user_id = args.int("userId")?;
    let file = owned_file(&services, args.int("fileId")?, "You can not unshare this file").await?;

    let repo = services.share_records();
    let record = repo
        .get_by_property("file_id", file.id)
        .await?
        .into_iter()
        .find(|record| record.user_id() == user_id)
        .ok_or_not_found("Share record")?;
    repo.delete(record.id).await?;
    res.with_json(&json!({ "deleted": record.id }))
}

/// Owner or a user the file was shared with.
async fn check_read_access(services: &Services, file: &FileEntry) -> AppResult<()> {
    let user_id = services.session().user_id()?;
    let records = services.share_records().get_by_property("file_id", file.id).await?;
    if records.iter().any(|record| record.user_id() == user_id) {
        return Ok(());
    }
    file.check_access(user_id)
}

async fn owned_file(services: &Services, file_id: i64, denied: &str) -> AppResult<FileEntry> {
    let file = services.files().read(file_id).await?.ok_or_not_found("File")?;
    if file.user_id() != services.session().user_id()? {
        return Err(AppError::forbidden(denied));
    }
    Ok(file)
}
