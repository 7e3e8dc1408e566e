#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{HeaderValue, Method, StatusCode};

    use crate::error::{AppError, AppResult};
    use crate::http::{Request, Response};
    use crate::kernel::{Next, Route, RouteArgs, RoutesGroup, RoutesResolver, Services};
    use crate::tests::support;

    async fn noop(_req: Request, res: Response, _services: Services, _args: RouteArgs) -> AppResult<Response> {
        Ok(res)
    }

    type Ready = futures::future::Ready<AppResult<Response>>;

    /// Answers with the body `tag`, so tests can tell which action ran.
    fn tagged(tag: &'static str) -> impl Fn(Request, Response, Services, RouteArgs) -> Ready + Send + Sync + 'static {
        move |_req, res, _services, _args| futures::future::ready(Ok(res.with_body(tag)))
    }

    fn route(methods: &[Method], pattern: &str) -> Route {
        Route::new(methods.to_vec(), pattern, Arc::new(noop)).unwrap()
    }

    #[test]
    fn test_literal_and_param_matching() {
        let r = route(&[Method::GET], "/users/get/{id}");
        assert!(r.is_match(&Method::GET, "/users/get/42"));
        assert!(r.is_match(&Method::GET, "/users/get/42/"));
        assert!(r.is_match(&Method::GET, "/users/get/abc_1"));
        assert!(!r.is_match(&Method::GET, "/users/get/"));
        assert!(!r.is_match(&Method::GET, "/users/get/4-2"));
        assert!(!r.is_match(&Method::GET, "/users/get/42/extra"));
        assert!(!r.is_match(&Method::GET, "/prefix/users/get/42"));
    }

    #[test]
    fn test_method_must_be_in_set() {
        let r = route(&[Method::GET, Method::POST], "/x");
        assert!(r.is_match(&Method::GET, "/x"));
        assert!(r.is_match(&Method::POST, "/x"));
        assert!(!r.is_match(&Method::DELETE, "/x"));
        assert_eq!(r.methods(), &[Method::GET, Method::POST]);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let r = route(&[Method::GET], "/Files/List");
        assert!(r.is_match(&Method::GET, "/files/list"));
        assert!(r.is_match(&Method::GET, "/FILES/LIST/"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let r = route(&[Method::GET], "/a.b/list-shared");
        assert!(r.is_match(&Method::GET, "/a.b/list-shared"));
        assert!(!r.is_match(&Method::GET, "/aXb/list-shared"));
    }

    #[test]
    fn test_substituted_pattern_matches_itself() {
        let patterns = [
            ("/files/share/{fileId}/{userId}", "/files/share/7/9"),
            ("/users/search/{email}", "/users/search/ann"),
            ("/{a}/{b}/{c}", "/x/y/z"),
            ("/directories/get", "/directories/get"),
        ];
        for (pattern, path) in patterns {
            assert!(route(&[Method::PUT], pattern).is_match(&Method::PUT, path), "{} vs {}", pattern, path);
        }
    }

    #[test]
    fn test_args_are_extracted_by_position() {
        let r = route(&[Method::PUT], "/files/share/{fileId}/{userId}");
        let args = r.args("/files/share/7/9/");
        assert_eq!(args.len(), 2);
        assert_eq!(args.get("fileId"), Some("7"));
        assert_eq!(args.get("userId"), Some("9"));
        assert_eq!(args.int("fileId").unwrap(), 7);
    }

    #[test]
    fn test_args_stop_at_wildcard() {
        let r = route(&[Method::GET], "/a/{x}/*/{y}");
        assert!(r.is_match(&Method::GET, "/a/1/anything/else/2"));
        let args = r.args("/a/1/anything/else/2");
        assert_eq!(args.get("x"), Some("1"));
        assert_eq!(args.get("y"), None);

        let catch_all = route(&[Method::GET], "*");
        assert!(catch_all.is_match(&Method::GET, "/whatever/{id}"));
        assert!(catch_all.args("/whatever/12").is_empty());
    }

    #[test]
    fn test_non_integer_arg_is_client_fault() {
        let args = RouteArgs::from([("id", "abc")]);
        let err = args.int("id").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.public_message(), "Passed id is not integer");
        assert!(matches!(args.require("missing"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_route_without_methods_is_rejected() {
        let result = Route::new(Vec::new(), "/x", Arc::new(noop));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_group_prefixes_patterns_and_scans_in_order() {
        let mut group = RoutesGroup::new("/files");
        group.add_get("/get/{id}", tagged("first")).unwrap();
        group.add_get("/get/{other}", tagged("second")).unwrap();
        group.add_post("/add", noop).unwrap();

        assert_eq!(group.prefix(), "/files");
        assert_eq!(group.routes()[0].pattern(), "/files/get/{id}");
        let hit = group.matching_route(&Method::GET, "/files/get/3").unwrap();
        assert_eq!(hit.pattern(), "/files/get/{id}");
        assert!(group.matching_route(&Method::GET, "/files/add").is_none());
        assert!(group.matching_route(&Method::GET, "/get/3").is_none());
    }

    #[test]
    fn test_group_add_all_accepts_every_method() {
        let mut group = RoutesGroup::new("");
        group.add_all("/any", noop).unwrap();
        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(group.matching_route(&method, "/any").is_some(), "{}", method);
        }
    }

    #[test]
    fn test_group_middleware_is_a_one_time_broadcast() {
        async fn mark(req: Request, next: Next, _services: Services) -> AppResult<Response> {
            next(req).await
        }

        let mut group = RoutesGroup::new("/g");
        group.add_get("/before", noop).unwrap();
        group.add_middleware(mark);
        group.add_get("/after", noop).unwrap();

        assert_eq!(group.routes()[0].middleware().len(), 1);
        assert!(group.routes()[1].middleware().is_empty());
    }

    #[test]
    fn test_resolver_first_group_wins() {
        let mut resolver = RoutesResolver::new();
        resolver.add_group("/x").add_get("", tagged("A")).unwrap();
        resolver.add_group("/x").add_get("", tagged("B")).unwrap();

        let route = resolver.resolve(&Method::GET, "/x").unwrap();
        assert!(std::ptr::eq(route, &resolver.groups()[0].routes()[0]));
    }

    #[test]
    fn test_resolver_miss_is_route_not_found() {
        let mut resolver = RoutesResolver::new();
        resolver.add_group("/users").add_get("/list", noop).unwrap();

        match resolver.resolve(&Method::DELETE, "/unknown") {
            Err(AppError::RouteNotFound { method, path }) => {
                assert_eq!(method, "DELETE");
                assert_eq!(path, "/unknown");
            }
            other => panic!("expected RouteNotFound, got {:?}", other.map(|r| r.pattern().to_string())),
        }
    }

    #[test]
    fn test_catch_all_only_when_nothing_else_matches() {
        let mut resolver = RoutesResolver::new();
        resolver.add_group("/users").add_get("/list", noop).unwrap();
        resolver.add_all("*", noop).unwrap();

        assert_eq!(resolver.resolve(&Method::GET, "/users/list").unwrap().pattern(), "/users/list");
        assert_eq!(resolver.resolve(&Method::DELETE, "/unknown").unwrap().pattern(), "*");
        assert_eq!(resolver.resolve(&Method::POST, "/users/list").unwrap().pattern(), "*");
    }

    #[test]
    fn test_resolver_shortcuts_create_one_group_each() {
        let mut resolver = RoutesResolver::new();
        resolver.add_get("/a", noop).unwrap();
        resolver.add_post("/b", noop).unwrap();
        resolver.add_delete("/c", noop).unwrap();

        assert_eq!(resolver.groups().len(), 3);
        assert!(resolver.groups().iter().all(|g| g.prefix().is_empty() && g.routes().len() == 1));
    }

    #[tokio::test]
    async fn test_trailing_slash_request_reaches_handler_with_args() {
        async fn echo_id(_req: Request, res: Response, _s: Services, args: RouteArgs) -> AppResult<Response> {
            Ok(res.with_body(args.require("id")?.to_string()))
        }

        let (state, _db) = support::test_state().await;
        let mut resolver = RoutesResolver::new();
        resolver.add_group("/users").add_get("/get/{id}", echo_id).unwrap();

        let route = resolver.resolve(&Method::GET, "/users/get/42/").unwrap();
        assert_eq!(route.args("/users/get/42/"), RouteArgs::from([("id", "42")]));

        let action = route.action("/users/get/42/");
        let res = action(Request::new(Method::GET, "/users/get/42/"), Response::new(), support::anonymous(&state))
            .await
            .unwrap();
        assert_eq!(res.body_str(), Some("42"));
    }

    #[tokio::test]
    async fn test_bound_action_receives_the_given_response() {
        let (state, _db) = support::test_state().await;
        let r = Route::new(vec![Method::GET], "/t", Arc::new(tagged("body"))).unwrap();
        let initial = Response::new().with_header(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        let res = r.action("/t")(Request::new(Method::GET, "/t"), initial, support::anonymous(&state)).await.unwrap();
        assert_eq!(res.header("content-type"), Some("text/plain"));
        assert_eq!(res.body_str(), Some("body"));
    }
}
