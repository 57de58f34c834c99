// ==========================================
// 生产监控系统 - 配置层
// ==========================================
// 职责: 产线目标、数据源范围、告警模式
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dashboard_config_trait;
pub mod error;
pub mod target_registry;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_config_trait::{DashboardConfig, DashboardConfigReader};
pub use error::{ConfigError, ConfigResult};
pub use target_registry::{TargetRegistry, DEFAULT_HOURLY_TARGET, KNOWN_LINES};
