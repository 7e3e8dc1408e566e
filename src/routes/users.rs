use axum::http::StatusCode;
use serde_json::json;

use crate::error::{AppError, AppResult, OptionExt};
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services, SessionUser};
use crate::models::{self, Folder, User};
use crate::orm::Repository;

pub async fn list(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let users = services.users().list().await?;
    let body: Vec<_> = users.iter().map(User::safe_properties).collect();
    res.with_json(&body)
}

pub async fn get(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let id = args.int("id")?;
    let user = services.users().read(id).await?.ok_or_not_found("User")?;
    res.with_json(&user.safe_properties())
}

/// Substring search on the email column.
pub async fn search(_req: Request, res: Response, services: Services, args: RouteArgs) -> AppResult<Response> {
    let needle = args.require("email")?;
    let users = services.users().get_like_property("email", needle).await?;
    let body: Vec<_> = users.iter().map(User::safe_properties).collect();
    res.with_json(&body)
}

/// Profile update of the logged in user.
pub async fn update(req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let id = services.session().user_id()?;
    let repo = services.users();
    let mut user = repo.read(id).await?.ok_or_not_found("User")?;

    user.apply(&req.json()?)?;
    repo.update(id, &user).await?;
    res.with_json(&user.safe_properties())
}

pub async fn register(req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let body = req.json()?;
    let mut user = User::blank(models::now());
    user.apply_registration(&body).await?;

    let storage = &services.config().storage;
    user.set_storage_size(storage.default_size_kb(), storage)?;

    let users = services.users();
    if !users.get_by_property("email", user.email()).await?.is_empty() {
        return Err(AppError::bad_request("The user with this email is already registered"));
    }

    user.id = users.create(&user).await?;
    if let Err(e) = create_root_folder(&services, &mut user).await {
        // No transaction spans the two inserts; undo the first by hand.
        tracing::warn!("Root folder creation for user {} failed, removing the user: {}", user.id, e);
        users.delete(user.id).await?;
        return Err(e);
    }

    tracing::info!("Registered user {}", user.id);
    res.with_status(StatusCode::CREATED).with_json(&user.safe_properties())
}

async fn create_root_folder(services: &Services, user: &mut User) -> AppResult<()> {
    let folder_id = services.folders().create(&Folder::root_for(user.id)).await?;
    user.set_root_folder_id(folder_id);
    services.users().update(user.id, user).await?;
    Ok(())
}

/// Checks the credentials and opens a session; the token goes back in the body.
pub async fn login(req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    let body = req.json()?;
    let email = body.string("email")?;
    let password = body.string("password")?;

    let wrong = || AppError::unauthorized("Wrong email or password");
    let user = services.users().get_by_property("email", email.as_str()).await?.into_iter().next().ok_or_else(wrong)?;
    if !user.check_password(&password).await {
        return Err(wrong());
    }

    let token = services.sessions().open(SessionUser { id: user.id, is_admin: user.is_admin() }).await;
    res.with_json(&json!({ "token": token, "user": user.safe_properties() }))
}

pub async fn logout(_req: Request, res: Response, services: Services, _args: RouteArgs) -> AppResult<Response> {
    if let Some(token) = services.session().token() {
        services.sessions().close(token).await;
    }
    res.with_json(&json!({ "loggedOut": true }))
}
