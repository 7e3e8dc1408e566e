//! Controllers and the route table.
//!
//! - `health`: liveness, readiness, version and metrics
//! - `users`: profile, search and the login/register/logout flow
//! - `admin`: account management for administrators
//! - `folders`: directory tree of the logged in user
//! - `files`: file metadata and sharing
//! - `errors`: the catch-all `not_found`

pub mod admin;
pub mod errors;
pub mod files;
pub mod folders;
pub mod health;
pub mod users;

use crate::error::AppResult;
use crate::kernel::Kernel;
use crate::middleware::{exceptions, http_errors, security_headers, Auth};

/// Registers every route and the global middleware. Called once at startup.
pub fn register(kernel: &mut Kernel) -> AppResult<()> {
    let routes = &mut kernel.routes;

    let probes = routes.add_group("");
    probes.add_get("/healthz", health::healthz)?;
    probes.add_get("/readyz", health::readyz)?;
    probes.add_get("/version", health::version)?;
    probes.add_get("/metrics", health::metrics)?;
    probes.add_get("/metrics/prometheus", health::metrics_prometheus)?;

    let profile = routes.add_group("/users");
    profile.add_get("/list", users::list)?;
    profile.add_get("/get/{id}", users::get)?;
    profile.add_put("/update", users::update)?;
    profile.add_get("/search/{email}", users::search)?;
    profile.add_middleware(Auth::user());

    let anonymous = routes.add_group("");
    anonymous.add_post("/login", users::login)?;
    anonymous.add_post("/register", users::register)?;

    let authorized = routes.add_group("");
    authorized.add_get("/logout", users::logout)?;
    authorized.add_middleware(Auth::user());

    let admin_users = routes.add_group("/admin/users");
    admin_users.add_get("/list", admin::list)?;
    admin_users.add_get("/get/{id}", admin::get)?;
    admin_users.add_put("/update/{id}", admin::update)?;
    admin_users.add_delete("/delete/{id}", admin::delete)?;
    admin_users.add_middleware(Auth::admin());

    let directories = routes.add_group("/directories");
    directories.add_post("/add", folders::add)?;
    directories.add_put("/rename/{id}", folders::rename)?;
    directories.add_get("/get", folders::get_root)?;
    directories.add_get("/get/{id}", folders::get)?;
    directories.add_delete("/delete/{id}", folders::delete)?;
    directories.add_middleware(Auth::user());

    let file_routes = routes.add_group("/files");
    file_routes.add_post("/add", files::add)?;
    file_routes.add_get("/list", files::list)?;
    file_routes.add_get("/list-shared", files::list_shared)?;
    file_routes.add_get("/get/{id}", files::get)?;
    file_routes.add_put("/rename/{id}", files::rename)?;
    file_routes.add_delete("/remove/{id}", files::remove)?;
    file_routes.add_middleware(Auth::user());

    let share = routes.add_group("/files/share");
    share.add_get("/{fileId}", files::share_records)?;
    share.add_put("/{fileId}/{userId}", files::share)?;
    share.add_delete("/{fileId}/{userId}", files::unshare)?;
    share.add_middleware(Auth::user());

    routes.add_all("*", errors::not_found)?;

    // Last added runs first: security_headers, then exceptions, then http_errors.
    kernel.add_middleware(http_errors);
    kernel.add_middleware(exceptions);
    kernel.add_middleware(security_headers);

    Ok(())
}
