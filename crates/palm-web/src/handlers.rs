//! HTTP处理器

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use bytes::Bytes;
use palm_core::ImagePayload;
use palm_report::{render_on_screen, render_printable, DiseaseDetail};
use palm_workflow::{AnalysisOutcome, AnalysisWorkflow, CATALOG_FALLBACK_MESSAGE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// 未提供文件名时使用的名称
const DEFAULT_UPLOAD_NAME: &str = "upload";
const FILE_NAME_HEADER: &str = "x-file-name";

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "PalmAI API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "disease_data": "/api/disease-data",
            "diseases": "/api/diseases",
            "analysis": "/api/analysis",
            "report": "/api/report",
            "theme": "/api/theme",
            "notifications": "/api/notifications"
        }
    }))
}

/// 健康检查处理器
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "catalog": {
            "entries": state.catalog.len(),
            "fallback": state.catalog.is_fallback()
        }
    }))
}

/// 原始病害目录
pub async fn disease_data(State(state): State<AppState>) -> ApiResult<Response> {
    let body = state.catalog.to_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// 病害卡片列表
pub async fn list_diseases(State(state): State<AppState>) -> impl IntoResponse {
    let cards = state.cards.cards(&state.catalog);
    let fallback = state.catalog.is_fallback();
    Json(json!({
        "diseases": cards,
        "total": cards.len(),
        "fallback": fallback,
        "notice": fallback.then_some(CATALOG_FALLBACK_MESSAGE)
    }))
}

/// 病害详情，`id` 可以是病害标识或卡片位置
pub async fn get_disease(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<DiseaseDetail>> {
    if let Some(record) = state.catalog.get(&id) {
        return Ok(Json(DiseaseDetail::new(&id, record)));
    }

    id.parse::<usize>()
        .ok()
        .and_then(|slot| state.cards.detail(&state.catalog, slot))
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Disease '{}' not found", id)))
}

/// 工作流状态
pub async fn analysis_status(State(state): State<AppState>) -> impl IntoResponse {
    let workflow = state.workflow.lock().await;
    Json(workflow_snapshot(&workflow))
}

/// 上传图片（文件选择、拖放或相机拍照）
///
/// 请求体为图片原始字节，媒体类型取自 `Content-Type`。
pub async fn upload_image(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<impl IntoResponse> {
    let media_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_string())
        .unwrap_or_default();
    let name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_NAME)
        .to_string();

    debug!("Received upload '{}' ({}, {} bytes)", name, media_type, body.len());
    let payload = ImagePayload::new(name, media_type, body);

    let mut workflow = state.workflow.lock().await;
    workflow.select_image(payload).map_err(ApiError::rejected)?;

    Ok(Json(workflow_snapshot(&workflow)))
}

/// 开始分析
///
/// 立即返回，分析在后台延时完成。
pub async fn start_analysis(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let (ticket, delay, snapshot) = {
        let mut workflow = state.workflow.lock().await;
        let ticket = workflow
            .begin_analysis()
            .ok_or_else(|| ApiError::conflict(format!("Analysis cannot start in state {}", workflow.state())))?;
        (ticket, workflow.timing().delay, workflow_snapshot(&workflow))
    };

    let workflow = state.workflow.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let outcome = workflow.lock().await.finish_analysis(ticket);
        match outcome {
            AnalysisOutcome::Completed(result) => info!("Background analysis finished: {}", result.condition),
            AnalysisOutcome::Failed(reason) => warn!("Background analysis failed: {}", reason),
            AnalysisOutcome::Superseded | AnalysisOutcome::NotStarted => {
                debug!("Background analysis result discarded")
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// 清除图片和结果
pub async fn clear_analysis(State(state): State<AppState>) -> impl IntoResponse {
    let mut workflow = state.workflow.lock().await;
    workflow.new_analysis();
    Json(workflow_snapshot(&workflow))
}

/// 待分析图片的原始内容
pub async fn pending_image(State(state): State<AppState>) -> ApiResult<Response> {
    let workflow = state.workflow.lock().await;
    let image = workflow
        .pending_image()
        .ok_or_else(|| ApiError::not_found("No image selected"))?;

    Ok(([(header::CONTENT_TYPE, image.media_type.clone())], image.bytes.clone()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// `html` 返回可打印报告，否则返回展示字段
    pub format: Option<String>,
}

/// 分析报告
pub async fn get_report(State(state): State<AppState>, Query(query): Query<ReportQuery>) -> ApiResult<Response> {
    let workflow = state.workflow.lock().await;
    let result = workflow
        .result()
        .ok_or_else(|| ApiError::not_found("No analysis result available"))?;

    match query.format.as_deref() {
        Some("html") => Ok(Html(render_printable(result).html).into_response()),
        _ => Ok(Json(render_on_screen(result)).into_response()),
    }
}

/// 导出可打印报告
pub async fn print_report(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let report = {
        let workflow = state.workflow.lock().await;
        let result = workflow
            .result()
            .ok_or_else(|| ApiError::not_found("No analysis result available"))?;
        render_printable(result)
    };

    // 导出写文件，放到阻塞线程池执行
    let surface = state.print_surface.clone();
    let report = tokio::task::spawn_blocking(move || surface.open(&report).map(|_| report))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                format!("Report export task failed: {}", e),
            )
        })??;

    Ok(Json(json!({
        "title": report.title,
        "generated_on": report.generated_on.to_string()
    })))
}

/// 当前主题
pub async fn get_theme(State(state): State<AppState>) -> impl IntoResponse {
    let theme = state.theme.current().await;
    Json(json!({ "theme": theme }))
}

/// 切换主题
pub async fn toggle_theme(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let theme = state.theme.toggle().await?;
    Ok(Json(json!({ "theme": theme })))
}

/// 取走待显示的通知
pub async fn notifications(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "notifications": state.notifications.drain() }))
}

fn workflow_snapshot(workflow: &AnalysisWorkflow) -> Value {
    let pending_image = workflow.pending_image().map(|image| {
        json!({
            "id": image.id,
            "name": image.name,
            "media_type": image.media_type,
            "size": image.size,
            "selected_at": image.selected_at.to_rfc3339()
        })
    });

    json!({
        "state": workflow.state(),
        "analysis_in_progress": workflow.is_analysis_in_progress(),
        "pending_image": pending_image,
        "progress": workflow.progress(),
        "result": workflow.result().map(render_on_screen)
    })
}
