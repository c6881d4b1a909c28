use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use subweaver::infrastructure::observability::{
    REQUEST_ID_HEADER, RequestId, request_id_middleware,
};

fn echo_router() -> Router {
    Router::new()
        .route(
            "/echo",
            get(|Extension(id): Extension<RequestId>| async move { id.0 }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

async fn call(request: Request<Body>) -> (String, String) {
    let response = echo_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers()[REQUEST_ID_HEADER]
        .to_str()
        .unwrap()
        .to_string();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (header, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn given_no_request_id_when_handling_then_generated_uuid_is_echoed_and_exposed() {
    let request = Request::builder().uri("/echo").body(Body::empty()).unwrap();

    let (header, seen_by_handler) = call(request).await;

    assert!(uuid::Uuid::parse_str(&header).is_ok());
    assert_eq!(header, seen_by_handler);
}

#[tokio::test]
async fn given_empty_request_id_when_handling_then_a_fresh_id_replaces_it() {
    let request = Request::builder()
        .uri("/echo")
        .header(REQUEST_ID_HEADER, "")
        .body(Body::empty())
        .unwrap();

    let (header, _) = call(request).await;

    assert!(uuid::Uuid::parse_str(&header).is_ok());
}

#[tokio::test]
async fn given_caller_request_id_when_handling_then_it_is_kept() {
    let request = Request::builder()
        .uri("/echo")
        .header(REQUEST_ID_HEADER, "upload-7f3a")
        .body(Body::empty())
        .unwrap();

    let (header, seen_by_handler) = call(request).await;

    assert_eq!(header, "upload-7f3a");
    assert_eq!(seen_by_handler, "upload-7f3a");
}
