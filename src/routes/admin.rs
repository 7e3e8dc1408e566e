use serde_json::json;

use super::folders::delete_folder_tree;
use crate::error::{AppResult, OptionExt};
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services};
use crate::models::User;
use crate::orm::Repository;

pub async fn list(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let users = services.users().list().await?;
    let body: Vec<_> = users.iter().map(User::properties).collect();
    res.with_json(&body)
}

pub async fn get(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let user = services.users().read(args.int("id")?).await?.ok_or_not_found("User")?;
    res.with_json(&user.properties())
}

pub async fn update(req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let repo = services.users();
    let mut user = repo.read(id).await?.ok_or_not_found("User")?;

    user.apply_admin(&req.json()?)?;
    repo.update(id, &user).await?;
    res.with_json(&user.properties())
}

/// Deletes the user's whole folder tree, then the account, then its sessions.
pub async fn delete(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let users = services.users();
    let user = users.read(id).await?.ok_or_not_found("User")?;

    if let Some(root_id) = user.root_folder_id() {
        if let Some(root) = services.folders().read(root_id).await? {
            delete_folder_tree(&services, root).await?;
        }
    }
    users.delete(id).await?;
    let closed = services.sessions().close_user(id).await;

    tracing::info!("Deleted user {} and closed {} session(s)", id, closed);
    res.with_json(&json!({ "deleted": id }))
}
