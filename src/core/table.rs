use crate::error::{EngineError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub type Row = Vec<String>;
pub type Table = Vec<Row>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    Spreadsheet,
    DelimitedText,
}

impl SourceFormat {
    /// 根据扩展名推断格式（不区分大小写）
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                EngineError::UnsupportedFormat(format!("cannot infer format of '{}'", file_name))
            })?;

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "csv" | "txt" => Ok(Self::DelimitedText),
            other => Err(EngineError::UnsupportedFormat(format!(
                "unrecognized extension '.{}'",
                other
            ))),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" => Ok(Self::Spreadsheet),
            "delimited-text" => Ok(Self::DelimitedText),
            other => Err(EngineError::UnsupportedFormat(format!(
                "unknown format tag '{}'",
                other
            ))),
        }
    }
}

/// One request's file: bytes plus whatever identifies their format.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub data: Bytes,
    pub file_name: String,
    pub format: Option<SourceFormat>,
}

impl RawInput {
    pub fn new(data: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            file_name: file_name.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: Option<SourceFormat>) -> Self {
        self.format = format;
        self
    }

    /// 显式格式优先，否则由文件名推断
    pub fn resolve_format(&self) -> Result<SourceFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => SourceFormat::from_file_name(&self.file_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleResult {
    pub rows: Table,
    pub header: Row,
    pub csv: String,
    pub total_rows: usize,
}
