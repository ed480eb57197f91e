use crate::protocol::SamplingResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    // 请求参数错误
    InvalidInput(String),
    InvalidPolicy(String),
    TooLarge { size: Option<usize>, limit: usize },

    // 解析错误
    UnsupportedFormat(String),
    Malformed(String),
    Empty,

    // 系统错误
    Internal(anyhow::Error),
}

impl EngineError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidPolicy(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Malformed(_) | Self::Empty => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::InvalidPolicy(msg) => write!(f, "Invalid sampling policy: {}", msg),
            Self::TooLarge {
                size: Some(size),
                limit,
            } => write!(f, "File too large: {} bytes, limit is {}", size, limit),
            Self::TooLarge { size: None, limit } => {
                write!(f, "File too large: request exceeds the {} byte limit", limit)
            }
            Self::UnsupportedFormat(what) => write!(f, "Unsupported format: {}", what),
            Self::Malformed(msg) => write!(f, "Malformed input: {}", msg),
            Self::Empty => write!(f, "Empty input: no data rows to sample"),
            Self::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<anyhow::Error> for EngineError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

// Fast-fail: 错误只通过 error 字段返回，不附带任何行数据
impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(SamplingResponse::failure(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
