use axum::http::StatusCode;
use serde_json::json;

use crate::error::{AppError, AppResult, OptionExt};
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services};
use crate::models::{FileEntry, Folder};
use crate::orm::Repository;

pub async fn add(req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let user_id = services.session().user_id()?;
    let mut folder = Folder::blank(user_id);
    folder.apply(&req.json()?)?;

    let parent_id = match folder.parent_id() {
        Some(id) => id,
        None => root_folder_id(&services, user_id).await?,
    };
    let folders = services.folders();
    let parent = folders.read(parent_id).await?.ok_or_not_found("Parent folder")?;
    if parent.user_id() != user_id {
        return Err(AppError::forbidden("Denied access to parent folder"));
    }
    folder.set_parent_id(Some(parent_id));

    for other in folders.get_by_property("name", folder.name()).await? {
        folder.check_unique_against(&other)?;
    }

    folder.id = folders.create(&folder).await?;
    res.with_status(StatusCode::CREATED).with_json(&folder)
}

pub async fn rename(req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let folders = services.folders();
    let mut folder = folders.read(id).await?.ok_or_not_found("Folder")?;
    folder.check_access(services.session().user_id()?)?;

    folder.set_name(req.json()?.string("name")?)?;
    for other in folders.get_by_property("name", folder.name()).await? {
        folder.check_unique_against(&other)?;
    }

    folders.update(id, &folder).await?;
    res.with_json(&folder)
}

/// The logged in user's root folder with its direct children.
pub async fn get_root(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let root_id = root_folder_id(&services, services.session().user_id()?).await?;
    let folder = services.folders().read(root_id).await?.ok_or_not_found("Folder")?;
    res.with_json(&folder_info(&services, &folder).await?)
}

pub async fn get(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let folder = services.folders().read(id).await?.ok_or_not_found("Folder")?;
    folder.check_access(services.session().user_id()?)?;
    res.with_json(&folder_info(&services, &folder).await?)
}

/// Deletes a folder with everything below it. Administrators may delete any
/// folder; root folders go away only together with their user.
pub async fn delete(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let folder = services.folders().read(id).await?.ok_or_not_found("Folder")?;
    if !services.session().is_admin() {
        folder.check_access(services.session().user_id()?)?;
    }
    if folder.parent_id().is_none() {
        return Err(AppError::bad_request("Root folder can not be deleted"));
    }

    delete_folder_tree(&services, folder).await?;
    res.with_json(&json!({ "deleted": id }))
}

async fn root_folder_id(services: &Services, user_id: i64) -> AppResult<i64> {
    let user = services.users().read(user_id).await?.ok_or_not_found("User")?;
    user.root_folder_id().ok_or_not_found("Root folder")
}

async fn folder_info(services: &Services, folder: &Folder) -> AppResult<serde_json::Value> {
    let folders = services.folders().get_by_property("parent_id", folder.id).await?;
    let files = services.files().get_by_property("folder_id", folder.id).await?;
    Ok(json!({ "properties": folder, "folders": folders, "files": files }))
}

/// Removes `root` and its whole subtree: nested folders, their files and the
/// files' share records. Not atomic; a failure part way leaves the rest in place.
pub(crate) async fn delete_folder_tree(services: &Services, root: Folder) -> AppResult<()> {
    let folders = services.folders();
    let files = services.files();

    // Breadth-first collection, so deleting in reverse removes children before parents.
    let mut tree = vec![root];
    let mut next = 0;
    while next < tree.len() {
        let children = folders.get_by_property("parent_id", tree[next].id).await?;
        tree.extend(children);
        next += 1;
    }

    for folder in tree.iter().rev() {
        for file in files.get_by_property("folder_id", folder.id).await? {
            delete_file(services, &file).await?;
        }
        folders.delete(folder.id).await?;
    }
    tracing::debug!("Deleted folder tree of {} folders", tree.len());
    Ok(())
}

/// Removes a file's share records and metadata and gives its size back to the owner's quota.
pub(crate) async fn delete_file(services: &Services, file: &FileEntry) -> AppResult<()> {
    let records = services.share_records();
    for record in records.get_by_property("file_id", file.id).await? {
        records.delete(record.id).await?;
    }
    services.files().delete(file.id).await?;

    let users = services.users();
    if let Some(mut owner) = users.read(file.user_id()).await? {
        owner.set_storage_used(owner.storage_used_kb() - file.size_kb())?;
        users.update(owner.id, &owner).await?;
    }
    Ok(())
}
