use crate::error::{AppError, AppResult};
use crate::http::{Request, Response};
use crate::kernel::{RouteArgs, Services};

/// Action of the trailing catch-all route.
pub async fn not_found(_req: Request, _res: Response, _services: Services, _args: RouteArgs) -> AppResult<Response> {
    Err(AppError::not_found("Route not found"))
}
