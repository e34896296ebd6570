use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{articles, auth, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(articles::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{Claims, JwtKeys};
    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::{header, Method, Request, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::util::ServiceExt;

    // Every request below must be answered before the lazy pool is touched;
    // there is no database behind these tests.

    fn app() -> Router {
        build_app(AppState::fake())
    }

    fn token_for(user_id: i64) -> String {
        let keys = JwtKeys::from_ref(&AppState::fake());
        keys.sign(user_id).expect("sign")
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn health_is_open() {
        let res = app().oneshot(request(Method::GET, "/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_auth_header_is_rejected() {
        let req = json_request(Method::PUT, "/users/1", None, r#"{"username":"a","email":"a@b.c"}"#);
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/users/1")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let req = json_request(
            Method::POST,
            "/articles",
            Some("definitely-not-a-jwt"),
            r#"{"title":"t","body":"b","category":"c"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: 1,
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap();
        let req = json_request(Method::DELETE, "/users/1", Some(&token), "");
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: 1,
            iat: now as usize,
            exp: (now + 3600) as usize,
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(b"wrong-secret")).unwrap();
        let req = json_request(Method::DELETE, "/users/1", Some(&token), "");
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unauthorized_body_has_the_error_shape() {
        let req = json_request(Method::PUT, "/users/1", None, r#"{"username":"a","email":"a@b.c"}"#);
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("error").and_then(|v| v.as_str()).is_some());
    }

    #[tokio::test]
    async fn put_on_foreign_account_is_forbidden() {
        let token = token_for(1);
        let req = json_request(
            Method::PUT,
            "/users/2",
            Some(&token),
            r#"{"username":"mallory","email":"mallory@example.com"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patch_on_foreign_account_is_forbidden() {
        let token = token_for(1);
        let req = json_request(
            Method::PATCH,
            "/users/2",
            Some(&token),
            r#"{"email":"mallory@example.com"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_on_foreign_account_is_forbidden() {
        let token = token_for(1);
        let req = json_request(Method::DELETE, "/users/2", Some(&token), "");
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let req = json_request(
            Method::POST,
            "/auth/register",
            None,
            r#"{"username":"","email":"a@b.c","password":"hunter22"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let req = json_request(
            Method::POST,
            "/auth/register",
            None,
            r#"{"username":"alice","email":"not-an-email","password":"hunter22"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_article_rejects_missing_fields() {
        let token = token_for(1);
        let req = json_request(
            Method::POST,
            "/articles",
            Some(&token),
            r#"{"title":"","body":"b","category":"c"}"#,
        );
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_user_id_is_rejected() {
        let res = app()
            .oneshot(request(Method::GET, "/users/abc/articles"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
