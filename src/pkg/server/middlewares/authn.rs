use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use standard_error::{StandardError, Status};

use crate::{
    pkg::internal::auth::{Caller, USER_ID_HEADER, USER_ROLE_HEADER},
    prelude::Result,
};

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn authenticate(headers: HeaderMap, mut request: Request, next: Next) -> Result<Response> {
    let caller = Caller::from_parts(
        header(&headers, USER_ID_HEADER),
        header(&headers, USER_ROLE_HEADER),
    );
    match caller {
        Some(caller) => {
            if caller.role.is_none() {
                tracing::warn!("{} forwarded with unrecognised role", caller.user_id);
            }
            request.extensions_mut().insert(Arc::new(caller));
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("caller identity missing, authentication denied");
            Err(StandardError::new("ERR-AUTH-001").code(StatusCode::UNAUTHORIZED))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use tower::util::ServiceExt;
    use tracing_test::traced_test;

    use crate::pkg::internal::lifecycle::JobRole;

    async fn whoami(Extension(caller): Extension<Arc<Caller>>) -> String {
        match caller.role {
            Some(role) => format!("{}:{}", caller.user_id, role),
            None => format!("{}:none", caller.user_id),
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(whoami))
            .layer(middleware::from_fn(authenticate))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[traced_test]
    #[tokio::test]
    async fn forwards_caller_identity() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(USER_ID_HEADER, "emp-1")
            .header(USER_ROLE_HEADER, "employer")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            format!("emp-1:{}", JobRole::Employer)
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn unknown_role_passes_without_permissions() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(USER_ID_HEADER, "g-1")
            .header(USER_ROLE_HEADER, "guest")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "g-1:none");
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_user_id_is_unauthorized() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(USER_ROLE_HEADER, "admin")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
