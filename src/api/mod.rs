// ==========================================
// 生产监控系统 - API 层
// ==========================================
// 职责: 刷新入口、CSV 导出、告警文案，供 CLI / 展示层调用
// ==========================================

pub mod alert_text;
pub mod dashboard_api;
pub mod error;
pub mod export;

// 重导出核心类型
pub use alert_text::{AlertText, IncidentText};
pub use dashboard_api::{DashboardApi, RefreshRequest, RefreshResponse};
pub use error::{ApiError, ApiResult};
pub use export::{export_file_name, ExportError};
