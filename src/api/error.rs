// ==========================================
// 生产监控系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向调用方的错误消息
// 红线: 数据拉取失败/超时 → 本次刷新整体失败，不返回部分结果
// ==========================================

use crate::api::export::ExportError;
use crate::config::error::ConfigError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 数据源错误
    // ==========================================
    #[error("数据拉取超时 (source={source_name}, timeout={timeout_ms}ms)")]
    FetchTimeout { source_name: String, timeout_ms: u64 },

    #[error("数据源不可用: {0}")]
    DataSourceUnavailable(String),

    // ==========================================
    // 输入与配置错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error(transparent)]
    Export(#[from] ExportError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为数据拉取阶段的失败（超时或数据源不可用）
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ApiError::FetchTimeout { .. } | ApiError::DataSourceUnavailable(_)
        )
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Other(e) => ApiError::Other(e),
            other => ApiError::DataSourceUnavailable(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidTarget { line, value } => {
                ApiError::InvalidInput(format!("产线{}的目标无效: {}", line, value))
            }
            ConfigError::Other(e) => ApiError::Other(e),
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::InvalidInput(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) | RepositoryError::LockError(msg) => {
                ApiError::DataSourceUnavailable(msg)
            }
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
