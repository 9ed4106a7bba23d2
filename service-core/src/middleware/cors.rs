//! Cross-origin policy.
//!
//! Two postures are supported: any origin, or an explicit allow-list that
//! also permits credentials. Non-preflight `OPTIONS` requests are answered
//! with an empty 200 regardless of path.

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::str::FromStr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Every origin, method and request header.
    #[default]
    Any,
    /// Listed origins only; GET, POST and OPTIONS with credentials.
    AllowList(Vec<String>),
}

impl FromStr for CorsPolicy {
    type Err = String;

    /// `*` or empty selects [`CorsPolicy::Any`]; otherwise a comma-separated origin list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(CorsPolicy::Any);
        }

        let origins: Vec<String> = trimmed
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        for origin in &origins {
            if origin == "*" {
                return Err("Wildcard origin cannot be combined with an allow-list".to_string());
            }
            HeaderValue::from_str(origin)
                .map_err(|e| format!("Invalid CORS origin '{}': {}", origin, e))?;
        }

        Ok(CorsPolicy::AllowList(origins))
    }
}

pub fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    match policy {
        CorsPolicy::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsPolicy::AllowList(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(origin = %o, error = %e, "Skipping invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true)
        }
    }
}

/// Preflights are answered by [`cors_layer`]; this catches every other `OPTIONS`.
pub async fn options_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router, body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get,
    };
    use tower::util::ServiceExt;

    fn app(policy: &CorsPolicy) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(options_middleware))
            .layer(cors_layer(policy))
    }

    #[test]
    fn test_parse_any() {
        assert_eq!("".parse::<CorsPolicy>().unwrap(), CorsPolicy::Any);
        assert_eq!(" * ".parse::<CorsPolicy>().unwrap(), CorsPolicy::Any);
    }

    #[test]
    fn test_parse_allow_list() {
        let policy: CorsPolicy = "https://a.example, https://b.example,".parse().unwrap();
        assert_eq!(
            policy,
            CorsPolicy::AllowList(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_rejects_wildcard_in_list() {
        assert!("https://a.example,*".parse::<CorsPolicy>().is_err());
    }

    #[tokio::test]
    async fn test_any_origin_allowed() {
        let response = app(&CorsPolicy::Any)
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://anywhere.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_allow_list_preflight() {
        let policy = CorsPolicy::AllowList(vec!["http://allowed.test".to_string()]);

        let response = app(&policy)
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/")
                    .header(header::ORIGIN, "http://allowed.test")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://allowed.test"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_allow_list_rejects_other_origin() {
        let policy = CorsPolicy::AllowList(vec!["http://allowed.test".to_string()]);

        let response = app(&policy)
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header(header::ORIGIN, "http://evil.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn test_plain_options_returns_empty_ok() {
        let response = app(&CorsPolicy::Any)
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
}
