//! Web服务器

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::handlers::{
    analysis_status, api_root, clear_analysis, disease_data, get_disease, get_report, get_theme, health,
    list_diseases, notifications, pending_image, print_report, start_analysis, toggle_theme, upload_image,
};
use crate::state::AppState;
use crate::static_files::{create_static_service, index_page};

/// 请求体上限，高于上传限制，超限文件交给上传校验报告
pub const REQUEST_BODY_LIMIT: usize = 32 * 1024 * 1024;

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState, static_dir: impl AsRef<Path>) -> Self {
        let app = create_app(state, static_dir);
        Self { addr, app }
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start web server: {}", e))?;

        Ok(())
    }
}

/// 组装全部路由和中间件
pub fn create_app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        // 首页
        .route("/", get(index_page))
        // 健康检查
        .route("/health", get(health))
        // API路由
        .nest("/api", api_routes())
        .with_state(state)
        // 静态文件服务
        .nest_service("/static", create_static_service(static_dir))
        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT)),
        )
}

/// API 路由
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .route("/disease-data", get(disease_data))
        .route("/diseases", get(list_diseases))
        .route("/diseases/:id", get(get_disease))
        .route("/analysis", get(analysis_status).delete(clear_analysis))
        .route("/analysis/image", get(pending_image).post(upload_image))
        .route("/analysis/start", post(start_analysis))
        .route("/report", get(get_report))
        .route("/report/print", post(print_report))
        .route("/theme", get(get_theme))
        .route("/theme/toggle", post(toggle_theme))
        .route("/notifications", get(notifications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeStore, THEME_STORAGE_KEY};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use palm_catalog::{BundledCatalogSource, DiseaseCatalog};
    use palm_report::FileExportSurface;
    use palm_workflow::{AnalysisTiming, AnalysisWorkflow, NotificationQueue, UploadPolicy, UploadValidator};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    async fn test_app() -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Arc::new(DiseaseCatalog::load(&BundledCatalogSource).await);
        let notifications = Arc::new(NotificationQueue::new());

        let workflow = AnalysisWorkflow::new(catalog, notifications.clone())
            .with_validator(UploadValidator::new(UploadPolicy {
                max_bytes: 1024,
                ..UploadPolicy::default()
            }))
            .with_timing(AnalysisTiming {
                delay: Duration::from_millis(300),
                stage_interval: Duration::from_millis(100),
                ..AnalysisTiming::default()
            });

        let theme = ThemeStore::load(dir.path().join("prefs.json"), THEME_STORAGE_KEY).await;
        let surface = Arc::new(FileExportSurface::new(dir.path().join("reports")));
        let state = AppState::new(workflow, notifications, theme, surface);

        (create_app(state, dir.path().join("static")), dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str) -> Request<Body> {
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    }

    fn upload(media_type: &str, name: &str, bytes: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analysis/image")
            .header("content-type", media_type)
            .header("x-file-name", name)
            .body(Body::from(bytes))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_and_catalog() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["catalog"]["entries"], 8);

        let (status, body) = send(&app, get_request("/api/disease-data")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"]["name"], "Healthy Palm");

        let (_, body) = send(&app, get_request("/api/diseases")).await;
        assert_eq!(body["total"], 8);
        assert_eq!(body["fallback"], false);
        assert!(body["notice"].is_null());
        assert_eq!(body["diseases"][0]["disease_id"], "healthy");
    }

    #[tokio::test]
    async fn test_disease_detail_by_id_and_slot() {
        let (app, _dir) = test_app().await;

        let (status, by_id) = send(&app, get_request("/api/diseases/black_scorch")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, by_slot) = send(&app, get_request("/api/diseases/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_id, by_slot);

        let (status, body) = send(&app, get_request("/api/diseases/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_rejected_upload_notifies_and_keeps_state() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, upload("application/pdf", "leaf.pdf", vec![1, 2, 3])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Please upload a valid image file (JPG, PNG)");

        let (status, body) = send(&app, upload("image/png", "big.png", vec![0; 2048])).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "too_large");

        let (_, body) = send(&app, get_request("/api/analysis")).await;
        assert_eq!(body["state"], "idle");
        assert!(body["pending_image"].is_null());

        let (_, body) = send(&app, get_request("/api/notifications")).await;
        assert_eq!(body["notifications"].as_array().unwrap().len(), 2);
        let (_, body) = send(&app, get_request("/api/notifications")).await;
        assert!(body["notifications"].as_array().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_analysis_round() {
        let (app, dir) = test_app().await;

        let (status, body) = send(&app, upload("image/png", "leaf.png", PNG_BYTES.to_vec())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "previewing");
        assert_eq!(body["pending_image"]["name"], "leaf.png");

        let response = app.clone().oneshot(get_request("/api/analysis/image")).await.unwrap();
        assert_eq!(response.headers()["content-type"], "image/png");

        let (status, body) = send(&app, post_request("/api/analysis/start")).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["state"], "analyzing");

        // 重复提交被拒绝
        let (status, _) = send(&app, post_request("/api/analysis/start")).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, get_request("/api/report")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        tokio::time::sleep(Duration::from_millis(350)).await;

        let (_, body) = send(&app, get_request("/api/analysis")).await;
        assert_eq!(body["state"], "result_ready");
        let percent = body["result"]["confidence_percent"].as_u64().unwrap();
        assert!((70..=100).contains(&percent));

        let (status, report) = send(&app, get_request("/api/report")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["confidence_percent"], body["result"]["confidence_percent"]);

        let response = app.clone().oneshot(get_request("/api/report?format=html")).await.unwrap();
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains(&format!("Confidence: {}%", percent)));
        assert!(html.contains("consult with a professional plant pathologist"));

        let (status, body) = send(&app, post_request("/api/report/print")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "PalmAI Analysis Report");
        let exported = std::fs::read_dir(dir.path().join("reports")).unwrap().count();
        assert_eq!(exported, 1);

        let clear = Request::builder().method("DELETE").uri("/api/analysis").body(Body::empty()).unwrap();
        let (_, body) = send(&app, clear).await;
        assert_eq!(body["state"], "idle");
        assert!(body["result"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_during_analysis_discards_result() {
        let (app, _dir) = test_app().await;

        send(&app, upload("image/jpeg", "leaf.jpg", vec![0xff, 0xd8, 0xff])).await;
        send(&app, post_request("/api/analysis/start")).await;

        let clear = Request::builder().method("DELETE").uri("/api/analysis").body(Body::empty()).unwrap();
        send(&app, clear).await;

        tokio::time::sleep(Duration::from_millis(350)).await;

        let (_, body) = send(&app, get_request("/api/analysis")).await;
        assert_eq!(body["state"], "idle");
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_start_without_image_is_conflict() {
        let (app, _dir) = test_app().await;

        let (status, body) = send(&app, post_request("/api/analysis/start")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_theme_toggle() {
        let (app, dir) = test_app().await;

        let (_, body) = send(&app, get_request("/api/theme")).await;
        assert_eq!(body["theme"], "light");

        let (status, body) = send(&app, post_request("/api/theme/toggle")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");

        let saved = std::fs::read_to_string(dir.path().join("prefs.json")).unwrap();
        assert!(saved.contains("\"palmai-theme\": \"dark\""));
    }

    #[tokio::test]
    async fn test_index_page() {
        let (app, _dir) = test_app().await;

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("<title>PalmAI</title>"));
    }
}
