use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use vetrina::application::catalog::CatalogService;
use vetrina::application::ports::{CacheStore, ContentClient, DocumentQuery, FetchError};
use vetrina::domain::documents::{DocumentData, DocumentPage, RemoteDocument, RemoteSlice};
use vetrina::domain::repository::RepositoryId;
use vetrina::infra::cache::MemoryCacheStore;
use vetrina::infra::http::{ApiState, build_router};

struct ScriptedClient {
    pages: Vec<DocumentPage>,
}

#[async_trait]
impl ContentClient for ScriptedClient {
    async fn fetch_page(
        &self,
        _repository: &RepositoryId,
        page: u32,
        _query: &DocumentQuery,
    ) -> Result<DocumentPage, FetchError> {
        self.pages
            .get(page as usize - 1)
            .cloned()
            .ok_or_else(|| FetchError::Transport(format!("page {page} out of range")))
    }
}

struct OfflineClient;

#[async_trait]
impl ContentClient for OfflineClient {
    async fn fetch_page(
        &self,
        repository: &RepositoryId,
        _page: u32,
        _query: &DocumentQuery,
    ) -> Result<DocumentPage, FetchError> {
        Err(FetchError::Status {
            repository: repository.as_str().to_string(),
            status: 503,
        })
    }
}

fn document(id: &str, doc_type: &str, slices: Vec<RemoteSlice>) -> RemoteDocument {
    RemoteDocument {
        id: id.to_string(),
        uid: Some(id.to_string()),
        doc_type: doc_type.to_string(),
        href: None,
        lang: "en-us".to_string(),
        first_publication_date: None,
        last_publication_date: None,
        slugs: vec![id.to_string()],
        data: DocumentData { slices },
    }
}

fn single_page(results: Vec<RemoteDocument>) -> DocumentPage {
    DocumentPage {
        page: 1,
        total_pages: 1,
        next_page: None,
        results,
    }
}

fn build_app(content: Arc<dyn ContentClient>) -> axum::Router {
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
    let catalog = Arc::new(CatalogService::new(cache.clone(), content));
    build_router(ApiState { catalog, cache })
}

fn sample_app() -> axum::Router {
    build_app(Arc::new(ScriptedClient {
        pages: vec![single_page(vec![
            document(
                "home",
                "page",
                vec![RemoteSlice {
                    id: Some("hero$0".to_string()),
                    slice_type: "hero".to_string(),
                    slice_label: None,
                    variation: Some("default".to_string()),
                }],
            ),
            document("about", "page", vec![]),
            document("launch", "post", vec![]),
        ])],
    }))
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn documents_route_returns_simplified_documents_with_cache_hint() {
    let app = sample_app();

    let response = app
        .oneshot(
            Request::get("/api/documents/demo")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("s-maxage=300, stale-while-revalidate")
    );

    let body = json_body(response).await;
    let documents = body.as_array().expect("array body");
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[0]["id"], "home");
    assert_eq!(documents[0]["type"], "page");
    // The simplified shape carries slices without any embedded content payload.
    assert_eq!(documents[0]["slices"][0]["slice_type"], "hero");
}

#[tokio::test]
async fn document_types_route_deduplicates() {
    let app = sample_app();

    let response = app
        .oneshot(
            Request::get("/api/documents/types/demo")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!(["page", "post"]));
}

#[tokio::test]
async fn slices_route_summarizes_slice_types() {
    let app = sample_app();

    let response = app
        .oneshot(
            Request::get("/api/slices/demo")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body[0]["slice_type"], "hero");
    assert_eq!(body[0]["variations"], serde_json::json!(["default"]));
}

#[tokio::test]
async fn blank_repository_id_is_a_client_error() {
    let app = sample_app();

    let response = app
        .oneshot(
            Request::get("/api/documents/%20%20")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Repository ID is required");
}

#[tokio::test]
async fn remote_outage_maps_to_bad_gateway() {
    let app = build_app(Arc::new(OfflineClient));

    let response = app
        .oneshot(
            Request::get("/api/documents/demo")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "failed to fetch from content repository");
}

#[tokio::test]
async fn repositories_roundtrip_through_post_and_get() {
    let app = sample_app();

    let post = app
        .clone()
        .oneshot(
            Request::post("/api/repositories")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"repositoryId": "demo"}"#))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(post.status(), StatusCode::OK);
    assert_eq!(json_body(post).await, serde_json::json!({"success": true}));

    let get = app
        .oneshot(
            Request::get("/api/repositories")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(get.status(), StatusCode::OK);
    assert_eq!(json_body(get).await, serde_json::json!(["demo"]));
}

#[tokio::test]
async fn add_repository_without_id_is_rejected() {
    let app = sample_app();

    let response = app
        .oneshot(
            Request::post("/api/repositories")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Repository ID is required");
}

#[tokio::test]
async fn health_reports_no_content_when_cache_responds() {
    let app = sample_app();

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
