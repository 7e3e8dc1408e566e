use futures::future::BoxFuture;

use crate::error::{AppError, AppResult};
use crate::http::{Request, Response};
use crate::kernel::{Middleware, Next, Services};

/// Who may pass the [`Auth`] middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    LoggedIn,
    Admin,
}

/// Refuses requests whose session does not satisfy the required access.
///
/// Both refusals are 403; the request never reaches the action.
#[derive(Debug, Clone, Copy)]
pub struct Auth {
    access: Access,
}

impl Auth {
    pub fn user() -> Self {
        Self { access: Access::LoggedIn }
    }

    pub fn admin() -> Self {
        Self { access: Access::Admin }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn check(&self, services: &Services) -> AppResult<()> {
        let session = services.session();
        if !session.is_logged_in() {
            return Err(AppError::forbidden("Only logged in users can access this route"));
        }
        if self.access == Access::Admin && !session.is_admin() {
            return Err(AppError::forbidden("Only administrator users can access this route"));
        }
        Ok(())
    }
}

impl Middleware for Auth {
    fn call(&self, request: Request, next: Next, services: Services) -> BoxFuture<'static, AppResult<Response>> {
        let checked = self.check(&services);
        Box::pin(async move {
            checked?;
            next(request).await
        })
    }
}
