use axum::middleware::from_fn;
use axum::routing::post;
use axum::{Router, routing::get};

use super::handlers::jobs;
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(jobs::create).get(jobs::list))
        .route(
            "/jobs/:id",
            get(jobs::retrieve)
                .patch(jobs::update)
                .delete(jobs::delete),
        )
        .route("/jobs/:id/clone", post(jobs::clone_post))
        .route("/jobs/:id/apply", post(jobs::apply))
        .route("/jobs/:id/actions/:action", post(jobs::transition))
        .layer(from_fn(authn::authenticate))
}

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = job_routes()
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::auth::{USER_ID_HEADER, USER_ROLE_HEADER};

    #[traced_test]
    #[tokio::test]
    async fn livez_needs_no_identity() {
        let app = build_routes().await.unwrap();
        let request = Request::builder().uri("/livez").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[traced_test]
    #[tokio::test]
    async fn job_routes_require_identity() {
        let app = build_routes().await.unwrap();
        let request = Request::builder().uri("/jobs").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[traced_test]
    #[tokio::test]
    async fn unknown_role_cannot_list_jobs() {
        let app = build_routes().await.unwrap();
        let request = Request::builder()
            .uri("/jobs")
            .header(USER_ID_HEADER, "g-1")
            .header(USER_ROLE_HEADER, "guest")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    fn admin_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, "adm-1")
            .header(USER_ROLE_HEADER, "admin")
            .body(Body::empty())
            .unwrap()
    }

    #[traced_test]
    #[tokio::test]
    async fn unknown_action_on_job_is_forbidden() {
        let app = build_routes().await.unwrap();
        let response = app
            .oneshot(admin_request("POST", "/jobs/1/actions/bogus"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[traced_test]
    #[tokio::test]
    async fn action_names_are_case_sensitive() {
        let app = build_routes().await.unwrap();
        let response = app
            .oneshot(admin_request("POST", "/jobs/1/actions/Activate"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[traced_test]
    #[tokio::test]
    async fn non_numeric_job_id_is_rejected() {
        let app = build_routes().await.unwrap();
        let response = app
            .oneshot(admin_request("GET", "/jobs/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let app = build_routes().await.unwrap();
        let response = app
            .oneshot(admin_request("POST", "/jobs/abc/actions/activate"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
