use crate::config::Config;
use crate::core::{RawInput, SampleResult, SourceFormat};
use crate::error::{EngineError, Result};
use crate::protocol::{PerformSamplingRequest, SamplingResponse};
use crate::service::SamplingService;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::BytesRejection,
        Extension, Multipart,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub service: SamplingService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            service: SamplingService::from_config(&config),
            config,
        }
    }
}

// 解析与抽样是 CPU 密集操作，放到阻塞线程池
async fn run_blocking<F>(job: F) -> Result<Json<SamplingResponse>>
where
    F: FnOnce() -> Result<SampleResult> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| EngineError::Internal(anyhow::Error::new(e)))??;

    Ok(Json(SamplingResponse::success(result)))
}

// 提取器拒绝时也返回统一的响应结构
fn transport_error(status: StatusCode, message: String, limit: usize) -> EngineError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        EngineError::TooLarge { size: None, limit }
    } else {
        EngineError::InvalidInput(message)
    }
}

fn multipart_error(e: MultipartError, limit: usize) -> EngineError {
    transport_error(e.status(), e.body_text(), limit)
}

pub async fn sample(
    Extension(state): Extension<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<SamplingResponse>> {
    let limit = state.config.max_file_size;
    let body = body.map_err(|e| transport_error(e.status(), e.body_text(), limit))?;

    // 自行解析 JSON，保证错误也以 error 字段返回
    let request: PerformSamplingRequest = serde_json::from_slice(&body)
        .map_err(|e| EngineError::InvalidInput(format!("invalid request body: {}", e)))?;

    let service = state.service.clone();
    run_blocking(move || service.handle_request(request)).await
}

pub async fn sample_upload(
    Extension(state): Extension<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<SamplingResponse>> {
    let limit = state.config.max_file_size;
    let mut multipart =
        multipart.map_err(|e| transport_error(e.status(), e.body_text(), limit))?;

    let mut file: Option<(String, Bytes)> = None;
    let mut has_header = false;
    let mut policy_kind: Option<String> = None;
    let mut policy_value: Option<f64> = None;
    let mut format: Option<SourceFormat> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, limit))?;
            file = Some((file_name, data));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| multipart_error(e, limit))?;

        match name.as_str() {
            "hasHeader" => has_header = parse_flag(&text),
            "sizePolicyKind" => policy_kind = Some(text),
            "sizePolicyValue" => {
                let value = text.trim().parse::<f64>().map_err(|_| {
                    EngineError::InvalidInput(format!("sampling value '{}' is not a number", text))
                })?;
                policy_value = Some(value);
            }
            "format" if !text.trim().is_empty() => format = Some(text.parse()?),
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| EngineError::InvalidInput("no file provided".to_string()))?;
    let input = RawInput::new(data, file_name).with_format(format);

    let service = state.service.clone();
    run_blocking(move || {
        service.execute(&input, has_header, policy_kind.as_deref(), policy_value)
    })
    .await
}

fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
