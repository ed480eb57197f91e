use crate::core::SampleResult;
use serde::{Deserialize, Serialize};

/// Request body of the sampling operation. Every field is optional on the
/// wire so that missing values surface as input errors, not transport ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformSamplingRequest {
    pub file_bytes_base64: Option<String>,
    pub file_name: Option<String>,
    #[serde(default)]
    pub has_header: bool,
    pub size_policy_kind: Option<String>,
    pub size_policy_value: Option<f64>,
    /// `spreadsheet` or `delimited-text`; overrides the file extension.
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingResponse {
    pub array: Vec<Vec<String>>,
    pub headers: Vec<String>,
    pub csv_content_base64: String,
    pub error: String,
}

impl SamplingResponse {
    pub fn success(result: SampleResult) -> Self {
        use base64::Engine;

        Self {
            csv_content_base64: base64::engine::general_purpose::STANDARD.encode(&result.csv),
            array: result.rows,
            headers: result.header,
            error: String::new(),
        }
    }

    pub fn failure(error: &impl std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            ..Self::default()
        }
    }
}
