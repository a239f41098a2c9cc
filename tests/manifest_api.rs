//! Manifest endpoint tests.
//!
//! Drives the full router with `oneshot` against an in-memory `SiteStore`
//! that records how many queries it served.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use pwa_manifest::cache_tag::cache_tag;
use pwa_manifest::store::{SettingsDocument, SiteDocument, SiteStore, StoreError};
use pwa_manifest::{create_router, AppState};

#[derive(Default)]
struct FakeStore {
    settings: HashMap<String, Vec<SettingsDocument>>,
    sites: HashMap<String, SiteDocument>,
    fail_settings: bool,
    fail_sites: bool,
    queries: AtomicUsize,
}

impl FakeStore {
    fn with_settings(mut self, site_id: &str, docs: Vec<SettingsDocument>) -> Self {
        self.settings.insert(site_id.to_string(), docs);
        self
    }

    fn with_site(mut self, site_id: &str, url: &str) -> Self {
        self.sites.insert(
            site_id.to_string(),
            SiteDocument {
                url: Some(url.to_string()),
            },
        );
        self
    }

    fn failing() -> Self {
        Self {
            fail_settings: true,
            fail_sites: true,
            ..Default::default()
        }
    }

    fn with_failing_sites(mut self) -> Self {
        self.fail_sites = true;
        self
    }
}

#[async_trait]
impl SiteStore for FakeStore {
    async fn find_settings(&self, site_id: &str) -> Result<Vec<SettingsDocument>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_settings {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(self.settings.get(site_id).cloned().unwrap_or_default())
    }

    async fn find_site(&self, site_id: &str) -> Result<Option<SiteDocument>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_sites {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(self.sites.get(site_id).cloned())
    }
}

fn general_settings() -> SettingsDocument {
    SettingsDocument {
        name: Some(Some("MySite".to_string())),
        icon_src: Some(Some("http://x/icon.png".to_string())),
        ..Default::default()
    }
}

fn example_store() -> FakeStore {
    FakeStore::default()
        .with_settings("abc123", vec![general_settings()])
        .with_site("abc123", "http://x/")
}

async fn get(store: Arc<FakeStore>, uri: &str) -> Response {
    let app = create_router(AppState::new(store));

    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.expect("failed to make request")
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

fn cache_tag_header(response: &Response) -> String {
    response
        .headers()
        .get("cache-tag")
        .expect("Cache-Tag header should be set")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn unmatched_route_is_not_found_without_store_access() {
    let store = Arc::new(example_store());

    for uri in ["/", "/pwa/v1", "/pwa/v1/", "/pwa/v2/abc123", "/pwa/v1/abc123/extra"] {
        let response = get(store.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
        assert_eq!(json_body(response).await["error"], "Route not found.");
    }

    assert_eq!(store.queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_settings_is_not_found() {
    let store = Arc::new(FakeStore::default().with_site("abc123", "http://x/"));

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get("cache-tag").is_none());
    assert_eq!(
        json_body(response).await["error"],
        "No settings found with this siteId"
    );
}

#[tokio::test]
async fn missing_settings_reported_before_missing_site() {
    let store = Arc::new(FakeStore::default());

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(
        json_body(response).await["error"],
        "No settings found with this siteId"
    );
}

#[tokio::test]
async fn missing_settings_reported_over_site_query_failure() {
    let store = Arc::new(FakeStore::default().with_failing_sites());

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"],
        "No settings found with this siteId"
    );
}

#[tokio::test]
async fn site_query_failure_with_settings_is_internal_error() {
    let store = Arc::new(
        FakeStore::default()
            .with_settings("abc123", vec![general_settings()])
            .with_failing_sites(),
    );

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_site_is_not_found() {
    let store = Arc::new(FakeStore::default().with_settings("abc123", vec![general_settings()]));

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await["error"],
        "No sites found with this siteId."
    );
}

#[tokio::test]
async fn manifest_is_built_from_settings_and_site() {
    let store = Arc::new(example_store());

    let response = get(store.clone(), "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache_tag_header(&response), "Z1F");
    assert_eq!(store.queries.load(Ordering::SeqCst), 2);

    let manifest = json_body(response).await;
    assert_eq!(manifest["name"], "MySite");
    assert!(manifest.get("short_name").is_none());
    assert_eq!(manifest["description"], "");
    assert_eq!(manifest["start_url"], "http://x/");
    assert_eq!(manifest["theme_color"], "");

    let icons = manifest["icons"].as_array().expect("icons should be an array");
    assert_eq!(icons.len(), 11);
    assert_eq!(icons[0]["src"], "http://x/icon.png?profile=android-icon-1024");
    assert_eq!(icons[0]["sizes"], "1024x1024");
    assert_eq!(icons[0]["type"], "image/png");
    assert_eq!(icons[10]["sizes"], "36x36");
}

#[tokio::test]
async fn trailing_slash_is_accepted() {
    let store = Arc::new(example_store());

    let response = get(store, "/pwa/v1/abc123/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache_tag_header(&response), "Z1F");
}

#[tokio::test]
async fn later_settings_document_overwrites_earlier() {
    let first = SettingsDocument {
        name: Some(Some("Old".to_string())),
        main_color: Some(Some("#111111".to_string())),
        ..Default::default()
    };
    let second = SettingsDocument {
        name: Some(Some("New".to_string())),
        ..Default::default()
    };
    let store = Arc::new(
        FakeStore::default()
            .with_settings("site-42", vec![first, second])
            .with_site("site-42", "https://site.example/"),
    );

    let manifest = json_body(get(store, "/pwa/v1/site-42").await).await;

    assert_eq!(manifest["name"], "New");
    assert_eq!(manifest["theme_color"], "#111111");
}

#[tokio::test]
async fn null_name_in_later_document_falls_back_to_app_name() {
    let first = SettingsDocument {
        name: Some(Some("A".to_string())),
        app_name: Some(Some("App".to_string())),
        ..Default::default()
    };
    let second = SettingsDocument {
        name: Some(None),
        ..Default::default()
    };
    let store = Arc::new(
        FakeStore::default()
            .with_settings("abc123", vec![first, second])
            .with_site("abc123", "http://x/"),
    );

    let manifest = json_body(get(store, "/pwa/v1/abc123").await).await;

    assert_eq!(manifest["name"], "App");
    assert_eq!(manifest["short_name"], "App");
}

#[tokio::test]
async fn percent_encoded_id_is_used_as_sent() {
    let store = Arc::new(
        FakeStore::default()
            .with_settings("a%2Fb", vec![general_settings()])
            .with_site("a%2Fb", "http://x/"),
    );

    let response = get(store, "/pwa/v1/a%2Fb").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache_tag_header(&response), cache_tag("a%2Fb").unwrap());
}

#[tokio::test]
async fn route_prefix_is_case_sensitive() {
    let store = Arc::new(example_store());

    let response = get(store.clone(), "/PWA/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Route not found.");
    assert_eq!(store.queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cache_tag_is_three_chars_and_stable() {
    let mut store = FakeStore::default();
    let ids = ["abc123", "a", "site-42", "5a0f3c2b1e", "Site_ID.9"];
    for id in ids {
        store = store
            .with_settings(id, vec![general_settings()])
            .with_site(id, "http://x/");
    }
    let store = Arc::new(store);

    for id in ids {
        let uri = format!("/pwa/v1/{}", id);
        let first = cache_tag_header(&get(store.clone(), &uri).await);
        let second = cache_tag_header(&get(store.clone(), &uri).await);
        assert_eq!(first.chars().count(), 3, "tag for {}", id);
        assert_eq!(first, second, "tag for {}", id);
    }
}

#[tokio::test]
async fn fixed_fields_ignore_settings() {
    let doc = SettingsDocument {
        main_color: Some(Some("#abcdef".to_string())),
        description: Some(Some("Noticias".to_string())),
        app_name: Some(Some("App".to_string())),
        ..Default::default()
    };
    let store = Arc::new(
        FakeStore::default()
            .with_settings("abc123", vec![doc])
            .with_site("abc123", "http://x/"),
    );

    let manifest = json_body(get(store, "/pwa/v1/abc123").await).await;

    assert_eq!(manifest["name"], "App");
    assert_eq!(manifest["short_name"], "App");
    assert_eq!(manifest["description"], "Noticias");
    assert_eq!(manifest["theme_color"], "#abcdef");
    assert_eq!(manifest["background_color"], "#FFF");
    assert_eq!(manifest["dir"], "auto");
    assert_eq!(manifest["display"], "standalone");
    assert_eq!(manifest["orientation"], "portrait");
    assert_eq!(manifest["lang"], "es");
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let store = Arc::new(FakeStore::failing());

    let response = get(store, "/pwa/v1/abc123").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal server error");
}

#[tokio::test]
async fn health_check_does_not_touch_store() {
    let store = Arc::new(example_store());

    let response = get(store.clone(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
    assert_eq!(store.queries.load(Ordering::SeqCst), 0);
}
