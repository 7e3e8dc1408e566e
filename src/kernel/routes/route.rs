use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use regex::{Regex, RegexBuilder};

use crate::error::{AppError, AppResult};
use crate::http::{Request, Response};
use crate::kernel::handler::{Action, BoundAction, Middleware};
use crate::kernel::middleware::MiddlewareChain;
use crate::kernel::services::Services;

/// Named path arguments extracted from a request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteArgs(HashMap<String, String>);

impl RouteArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// A missing argument means the action is bound to the wrong pattern.
    pub fn require(&self, name: &str) -> AppResult<&str> {
        self.get(name)
            .ok_or_else(|| AppError::Config(format!("route has no `{{{}}}` parameter", name)))
    }

    /// Parses an integer argument; a non-numeric value is the client's fault.
    pub fn int(&self, name: &str) -> AppResult<i64> {
        self.require(name)?
            .parse()
            .map_err(|_| AppError::bad_request(format!("Passed {} is not integer", name)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RouteArgs {
    fn from(pairs: [(&str, &str); N]) -> Self {
        RouteArgs(pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

/// One path pattern bound to an action for a set of methods.
///
/// Patterns consist of literal segments, `{name}` parameters matching one
/// segment of word characters, and `*` matching the rest of the path. The
/// pattern is compiled once, at registration.
pub struct Route {
    methods: Vec<Method>,
    pattern: String,
    regex: Regex,
    action: Arc<dyn Action>,
    middleware: MiddlewareChain,
}

impl Route {
    pub fn new(methods: Vec<Method>, pattern: impl Into<String>, action: Arc<dyn Action>) -> AppResult<Self> {
        let pattern = pattern.into();
        if methods.is_empty() {
            return Err(AppError::Config(format!("route `{}` accepts no methods", pattern)));
        }
        let regex = compile(&pattern)
            .map_err(|e| AppError::Config(format!("invalid route pattern `{}`: {}", pattern, e)))?;
        Ok(Self { methods, pattern, regex, action, middleware: MiddlewareChain::new() })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    pub fn add_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.add(middleware);
        self
    }

    pub(crate) fn add_shared_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.add_shared(middleware);
    }

    pub fn is_match(&self, method: &Method, path: &str) -> bool {
        if !self.methods.contains(method) {
            return false;
        }
        self.regex.is_match(&normalize(path))
    }

    /// Walks pattern and path segment by segment, stopping at the first wildcard.
    pub fn args(&self, path: &str) -> RouteArgs {
        let path = normalize(path);
        let request_segments: Vec<&str> = path.split('/').collect();
        let mut args = HashMap::new();

        for (i, segment) in normalize(&self.pattern).split('/').enumerate() {
            if segment.contains('*') {
                break;
            }
            if let (Some(name), Some(value)) = (param_name(segment), request_segments.get(i)) {
                args.insert(name.to_string(), (*value).to_string());
            }
        }

        RouteArgs(args)
    }

    /// The action with this path's arguments pre-applied.
    pub fn action(&self, path: &str) -> BoundAction {
        let args = self.args(path);
        let action = Arc::clone(&self.action);
        Arc::new(move |request: Request, response: Response, services: Services| {
            action.call(request, response, services, args.clone())
        })
    }
}

fn normalize(path: &str) -> Cow<'_, str> {
    if path.ends_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{}/", path))
    }
}

fn param_name(segment: &str) -> Option<&str> {
    let name = segment.trim().strip_prefix('{')?.strip_suffix('}')?;
    let is_word = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_word.then_some(name)
}

/// `/users/get/{id}` becomes `^/users/get/((?-u:\w)+)/$`, case-insensitive.
/// Parameters match ASCII word characters only.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    for (i, segment) in normalize(pattern).split('/').enumerate() {
        if i > 0 {
            source.push('/');
        }
        if param_name(segment).is_some() {
            source.push_str(r"((?-u:\w)+)");
        } else {
            let literal: Vec<String> = segment.split('*').map(regex::escape).collect();
            source.push_str(&literal.join(".*"));
        }
    }
    source.push('$');
    RegexBuilder::new(&source).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_shapes() {
        assert_eq!(compile("/users/get/{id}").unwrap().as_str(), r"^/users/get/((?-u:\w)+)/$");
        assert_eq!(compile("*").unwrap().as_str(), r"^.*/$");
        assert_eq!(compile("/a.b/").unwrap().as_str(), r"^/a\.b/$");
    }

    #[test]
    fn test_param_name() {
        assert_eq!(param_name("{id}"), Some("id"));
        assert_eq!(param_name("{file_id}"), Some("file_id"));
        assert_eq!(param_name("{}"), None);
        assert_eq!(param_name("{a-b}"), None);
        assert_eq!(param_name("id"), None);
        assert_eq!(param_name("{naïve}"), None);
    }

    #[test]
    fn test_params_match_ascii_word_characters_only() {
        let regex = compile("/users/get/{id}").unwrap();
        assert!(regex.is_match("/users/get/Ab_12/"));
        assert!(!regex.is_match("/users/get/é/"));
        assert!(!regex.is_match("/users/get/café/"));
    }
}
