use std::sync::Arc;

use super::handler::{Middleware, Next};
use super::services::Services;
use crate::http::Request;

/// Ordered, append-only list of middleware composed around a terminal handler.
///
/// Each added middleware wraps everything added before it, so the last one
/// added runs first and the first one added runs right before the terminal
/// handler.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stack: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware>(&mut self, middleware: M) {
        self.stack.push(Arc::new(middleware));
    }

    /// Pushes an instance that is shared with other chains (group broadcast).
    pub fn add_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.stack.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Builds the onion: `terminal` innermost, the last-added middleware outermost.
    pub fn wrap(&self, terminal: Next, services: &Services) -> Next {
        self.stack.iter().fold(terminal, |next, middleware| {
            let middleware = Arc::clone(middleware);
            let services = services.clone();
            let wrapped: Next =
                Arc::new(move |request: Request| middleware.call(request, Arc::clone(&next), services.clone()));
            wrapped
        })
    }
}
