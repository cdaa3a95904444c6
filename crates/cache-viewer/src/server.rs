//! HTTP server for the cache viewer
//!
//! Provides /health, /images, /images/{name}, /delete-cache, /delete-image
//! and /open-file. Handlers keep no state between requests: each one goes
//! straight to the cache directory.

use crate::error::ApiError;
use crate::types::{DeleteCacheResponse, HealthResponse, ImageInfo, ImagesResponse, PathQuery};
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use cache_dir::CacheDir;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: CacheDir,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: CacheDir) -> Self {
        Self {
            cache,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState, assets_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/images", get(list_images))
        .route("/images/{*name}", get(get_image))
        .route("/delete-cache", post(delete_cache))
        .route("/delete-image", post(delete_image))
        .route("/open-file", post(open_file))
        .with_state(state);

    match assets_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router,
    }
}

/// Start the HTTP server on loopback
pub async fn start_server(
    state: SharedState,
    port: u16,
    assets_dir: Option<PathBuf>,
) -> std::io::Result<()> {
    let router = create_router(state, assets_dir);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server at http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache_dir: state.cache.root().display().to_string(),
    })
}

/// Normalize the cache directory and list its images newest first
async fn list_images(State(state): State<SharedState>) -> Result<Json<ImagesResponse>, ApiError> {
    let entries = state.cache.list().await?;
    let images: Vec<ImageInfo> = entries.iter().map(ImageInfo::from).collect();

    Ok(Json(ImagesResponse {
        total: images.len(),
        images,
    }))
}

/// Stream one image; Range and conditional requests are handled by `ServeFile`
async fn get_image(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let file = match state.cache.open(&name).await {
        Ok(file) => file,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match ServeFile::new(&file.path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Delete every file in the cache directory
async fn delete_cache(
    State(state): State<SharedState>,
) -> Result<Json<DeleteCacheResponse>, ApiError> {
    let summary = state.cache.delete_all().await?;
    info!(deleted = summary.deleted, "Deleted all cache entries");

    Ok(Json(DeleteCacheResponse {
        total: summary.deleted,
    }))
}

/// Delete a single image named by `?path=`
async fn delete_image(
    State(state): State<SharedState>,
    Query(query): Query<PathQuery>,
) -> Result<StatusCode, ApiError> {
    let name = required_path(query)?;
    state.cache.delete_one(&name).await?;
    Ok(StatusCode::OK)
}

/// Reveal the image named by `?path=` in the native file manager
async fn open_file(
    State(state): State<SharedState>,
    Query(query): Query<PathQuery>,
) -> Result<StatusCode, ApiError> {
    let name = required_path(query)?;
    state.cache.reveal(&name)?;
    Ok(StatusCode::OK)
}

fn required_path(query: PathQuery) -> Result<String, ApiError> {
    query
        .path
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingParam("path"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method};
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn create_test_state(cache_dir: PathBuf) -> SharedState {
        Arc::new(ServerState::new(CacheDir::new(cache_dir)))
    }

    fn request(method: Method, uri: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn list(router: &Router) -> serde_json::Value {
        let response = router
            .clone()
            .oneshot(request(Method::GET, "/images"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router.oneshot(request(Method::GET, "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].as_u64().is_some());
    }

    #[tokio::test]
    async fn test_list_renames_and_orders() {
        let dir = tempdir().unwrap();
        let t2 = SystemTime::now() - Duration::from_secs(86_400);
        let t1 = t2 + Duration::from_secs(60);
        for (name, mtime) in [("a", t1), ("b.png", t2)] {
            let path = dir.path().join(name);
            std::fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(mtime)
                .unwrap();
        }
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let json = list(&router).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["images"][0]["name"], "a.png");
        assert_eq!(json["images"][1]["name"], "b.png");
        assert_eq!(json["images"][0]["size"], "1.00 MB");
        assert!(json["images"][0]["timestamp"]
            .as_str()
            .unwrap()
            .ends_with('Z'));

        assert!(dir.path().join("a.png").exists());
        assert!(!dir.path().join("a").exists());
    }

    #[tokio::test]
    async fn test_list_unreadable_root_is_500() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().join("missing")), None);

        let response = router.oneshot(request(Method::GET, "/images")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_get_image_bytes_and_content_type() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"\x89PNG-data").unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router
            .oneshot(request(Method::GET, "/images/pic.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, b"\x89PNG-data");
    }

    #[tokio::test]
    async fn test_get_image_range() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"0123456789").unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/images/pic.png")
                    .header(header::RANGE, "bytes=2-5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_bytes(response).await, b"2345");
    }

    #[tokio::test]
    async fn test_get_image_missing_is_404() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router
            .oneshot(request(Method::GET, "/images/nope.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_image_traversal_is_400() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("cache");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
        let router = create_router(create_test_state(root), None);

        let response = router
            .oneshot(request(Method::GET, "/images/..%2Fsecret.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_image_flow() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router
            .clone()
            .oneshot(request(Method::POST, "/delete-image?path=a.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = list(&router).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["images"][0]["name"], "b.png");

        let again = router
            .oneshot(request(Method::POST, "/delete-image?path=a.png"))
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_image_bad_requests() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("cache");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("keep"), b"x").unwrap();
        let router = create_router(create_test_state(root), None);

        for uri in [
            "/delete-image",
            "/delete-image?path=",
            "/delete-image?path=..%2Fkeep",
            "/delete-image?path=%2Fetc%2Fpasswd",
        ] {
            let response = router
                .clone()
                .oneshot(request(Method::POST, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert!(outer.path().join("keep").exists());
    }

    #[tokio::test]
    async fn test_delete_cache_then_list_empty() {
        let dir = tempdir().unwrap();
        for name in ["x", "y", "z.png"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        let response = router
            .clone()
            .oneshot(request(Method::POST, "/delete-cache"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["total"], 3);

        let json = list(&router).await;
        assert_eq!(json["total"], 0);
        assert!(json["images"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_bad_requests() {
        let dir = tempdir().unwrap();
        let router = create_router(create_test_state(dir.path().to_path_buf()), None);

        for uri in ["/open-file", "/open-file?path=..%2F..%2Fetc"] {
            let response = router
                .clone()
                .oneshot(request(Method::POST, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = String::from_utf8(body_bytes(response).await).unwrap();
            assert!(!body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_assets_fallback() {
        let cache = tempdir().unwrap();
        let assets = tempdir().unwrap();
        std::fs::write(assets.path().join("index.html"), b"<html>viewer</html>").unwrap();
        let router = create_router(
            create_test_state(cache.path().to_path_buf()),
            Some(assets.path().to_path_buf()),
        );

        let response = router.oneshot(request(Method::GET, "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<html>viewer</html>");
    }

    #[test]
    fn test_server_state_new() {
        let dir = tempdir().unwrap();
        let state = ServerState::new(CacheDir::new(dir.path().to_path_buf()));

        let diff = (Utc::now() - state.started_at).num_seconds();
        assert!((0..5).contains(&diff));
    }

    #[cfg(unix)]
    fn set_mode(dir: &std::path::Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_delete_cache_partial_failure_is_500() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("one.png"), b"1").unwrap();
        std::fs::write(dir.path().join("two.png"), b"2").unwrap();

        set_mode(dir.path(), 0o555);
        let check = dir.path().join(".write-check");
        if std::fs::write(&check, b"").is_ok() {
            // Permissions are not enforced for this user
            std::fs::remove_file(&check).unwrap();
            set_mode(dir.path(), 0o755);
            return;
        }

        let router = create_router(create_test_state(dir.path().to_path_buf()), None);
        let response = router
            .oneshot(request(Method::POST, "/delete-cache"))
            .await
            .unwrap();
        set_mode(dir.path(), 0o755);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(body.starts_with("Unable to delete 2 of 2 files"), "{body}");
        assert!(body.contains("\none.png: "), "{body}");
        assert!(body.contains("\ntwo.png: "), "{body}");
        assert!(dir.path().join("one.png").exists());
    }
}
