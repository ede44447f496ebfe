use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Fetching {url} failed after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },
}

/// 錯誤類別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Storage,
}

/// 錯誤嚴重程度，決定程式的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::FetchExhausted { .. } => ErrorCategory::Network,
            EtlError::TomlError(_)
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤只影響單一年份，下次排程可重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) | EtlError::FetchExhausted { .. } => {
                "Check network connectivity or retry later; the source site may be rate limiting"
            }
            EtlError::IoError(_) => "Check that the output directory exists and is writable",
            EtlError::TomlError(_) => "Fix the syntax of the TOML configuration file",
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Review the configuration values reported above"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::FetchExhausted { url, .. } => format!("無法取得日曆頁面: {}", url),
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定值錯誤 ({}): {}", field, reason)
            }
            EtlError::MissingConfigError { field } => format!("缺少設定: {}", field),
            EtlError::IoError(e) => format!("檔案寫入失敗: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
