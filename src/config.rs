use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    #[serde(default)]
    pub sample_seed: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3000
}
fn default_max_file_size() -> usize {
    64 * 1024 * 1024 // 64MB
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_port),
            max_file_size: std::env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_file_size),
            sample_seed: std::env::var("SAMPLE_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            log_level: std::env::var("LOG_LEVEL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_log_level),
        };

        Ok(config)
    }

    /// 请求体上限：base64 膨胀 4/3，再留出表单字段的余量
    pub fn body_limit(&self) -> usize {
        self.max_file_size
            .saturating_mul(4)
            .saturating_div(3)
            .saturating_add(64 * 1024)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_file_size: default_max_file_size(),
            sample_seed: None,
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_covers_base64_inflation() {
        let config = Config {
            max_file_size: 3 * 1024,
            ..Config::default()
        };
        assert!(config.body_limit() >= 4 * 1024);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.tracing_level(), tracing::Level::INFO);

        let config = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
    }
}
