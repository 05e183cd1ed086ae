use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use shared::domain::PipelineStatus;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage, i64) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let profile = storage.create_profile("mira").await.expect("profile");
    let api = ApiContext {
        storage,
        max_list_limit: 100,
    };
    let app = build_router(Arc::new(AppState { api: api.clone() }), 16 * 1024);
    (app, api.storage, profile.user_id.0)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage, _user_id) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn profile_routes_create_and_load() {
    let (app, _storage, _user_id) = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/profiles",
            serde_json::json!({ "display_name": "jun" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let profile: ProfileSummary = read_json(response).await;
    assert_eq!(profile.display_name, "jun");

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/profiles/{}", profile.user_id.0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/profiles/9999")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn artwork_create_list_and_status_routes_work() {
    let (app, storage, user_id) = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/artworks",
            serde_json::json!({
                "user_id": user_id,
                "fields": {
                    "title": "Harbour at dusk",
                    "medium": "oil",
                    "price": 1200.0,
                    "status": "concept"
                }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: ArtworkRecord = read_json(response).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/artworks/{}/status", created.id.0),
            serde_json::json!({ "status": "in-progress" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = storage
        .load_artwork(created.id)
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(stored.status, PipelineStatus::Wip);

    let response = app
        .oneshot(
            Request::get(format!("/artworks?user_id={user_id}&status=wip&limit=10"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listed: ArtworkList = read_json(response).await;
    assert_eq!(listed.data.len(), 1);
    assert_eq!(listed.data[0].id, created.id);
}

#[tokio::test]
async fn patch_and_delete_routes_work() {
    let (app, storage, user_id) = test_app().await;
    let created = storage
        .insert_artwork(
            UserId(user_id),
            &shared::protocol::ArtworkFields::new("Tide", "ink", PipelineStatus::Finished),
        )
        .await
        .expect("insert");

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/artworks/{}", created.id.0),
            serde_json::json!({ "price": 80.0 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let patched: ArtworkRecord = read_json(response).await;
    assert_eq!(patched.price, Some(80.0));
    assert_eq!(patched.title, "Tide");

    let delete = || {
        Request::delete(format!("/artworks/{}", created.id.0))
            .body(Body::empty())
            .expect("request")
    };
    let response = app.clone().oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.oneshot(delete()).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn patch_route_clears_fields_sent_as_null() {
    let (app, storage, user_id) = test_app().await;
    let mut fields = shared::protocol::ArtworkFields::new("Tide", "ink", PipelineStatus::Wip);
    fields.price = Some(10.0);
    fields.description = Some("d".into());
    fields.due_date = "2026-11-30".parse().ok();
    let created = storage
        .insert_artwork(UserId(user_id), &fields)
        .await
        .expect("insert");

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/artworks/{}", created.id.0),
            serde_json::json!({ "title": "t2", "price": null, "description": "  " }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let patched: ArtworkRecord = read_json(response).await;
    assert_eq!(patched.title, "t2");
    assert_eq!(patched.price, None);
    assert_eq!(patched.description, None);
    assert_eq!(patched.due_date, fields.due_date);
}

#[tokio::test]
async fn validation_failures_map_to_bad_request() {
    let (app, _storage, user_id) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/artworks",
            serde_json::json!({
                "user_id": user_id,
                "fields": { "title": " ", "medium": "oil", "status": "concept" }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn status_update_for_unknown_artwork_is_not_found() {
    let (app, _storage, _user_id) = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/artworks/424242/status",
            serde_json::json!({ "status": "sold" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let (app, _storage, user_id) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/artworks",
            serde_json::json!({
                "user_id": user_id,
                "fields": {
                    "title": "Big",
                    "medium": "oil",
                    "description": "x".repeat(32 * 1024),
                    "status": "concept"
                }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
