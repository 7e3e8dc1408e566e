//! The kernel's view of HTTP: request, response, JSON body access and the
//! axum boundary that converts between them and the server types.

mod body;
mod request;
mod response;
pub mod transport;

pub use body::BodyData;
pub use request::{Request, UploadedFile};
pub use response::Response;
pub use transport::dispatch;
