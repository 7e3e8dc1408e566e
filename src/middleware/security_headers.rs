//! Security headers for every kernel response.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::http::{HeaderName, HeaderValue};

use crate::config::SecurityConfig;
use crate::error::AppResult;
use crate::http::{Request, Response};
use crate::kernel::{Next, Services};

/// Adds standard security-related headers to the response `next` produces.
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY`
/// - `Referrer-Policy: no-referrer`
/// - `Cross-Origin-Opener-Policy` / `Cross-Origin-Resource-Policy: same-origin`
/// - Optional: `Strict-Transport-Security` and `Content-Security-Policy` via configuration
///
/// JSON responses are additionally marked as not cacheable. Errors from `next`
/// pass through untouched.
pub async fn security_headers(request: Request, next: Next, services: Services) -> AppResult<Response> {
    let response = next(request).await?;
    Ok(apply(response, services.config().security.as_ref()))
}

pub(crate) fn apply(response: Response, security: Option<&SecurityConfig>) -> Response {
    let mut response = response
        .with_header(HeaderName::from_static("x-content-type-options"), HeaderValue::from_static("nosniff"))
        .with_header(HeaderName::from_static("x-frame-options"), HeaderValue::from_static("DENY"))
        .with_header(HeaderName::from_static("referrer-policy"), HeaderValue::from_static("no-referrer"))
        .with_header(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        )
        .with_header(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        );

    if let Some(sec) = security {
        if sec.enable_hsts.unwrap_or(false) {
            let max_age = sec.hsts_max_age.unwrap_or(31536000); // 1 year
            let include_sub =
                if sec.hsts_include_subdomains.unwrap_or(false) { "; includeSubDomains" } else { "" };
            let value = format!("max-age={}{}", max_age, include_sub);
            response = response.with_header(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("max-age=31536000")),
            );
        }
        if let Some(csp) = sec.csp.as_deref().filter(|csp| !csp.trim().is_empty()) {
            if let Ok(val) = HeaderValue::from_str(csp) {
                response = response.with_header(HeaderName::from_static("content-security-policy"), val);
            }
        }
    }

    let is_json = response.header(CONTENT_TYPE.as_str()).is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        response = response
            .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .with_header(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_headers_follow_config() {
        let base = Response::new().with_json(&serde_json::json!({})).unwrap();

        let plain = apply(base.clone(), None);
        assert_eq!(plain.header("x-content-type-options"), Some("nosniff"));
        assert_eq!(plain.header("cache-control"), Some("no-store"));
        assert!(plain.header("strict-transport-security").is_none());

        let sec = SecurityConfig {
            enable_hsts: Some(true),
            hsts_max_age: Some(60),
            hsts_include_subdomains: Some(true),
            csp: Some("default-src 'none'".into()),
        };
        let strict = apply(base, Some(&sec));
        assert_eq!(strict.header("strict-transport-security"), Some("max-age=60; includeSubDomains"));
        assert_eq!(strict.header("content-security-policy"), Some("default-src 'none'"));
    }
}
