// ==========================================
// 生产监控系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::DashboardApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::SqliteRowSource;
use crate::repository::ProductionRecordRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PRODUCTION_MONITOR_DB_PATH";

/// 应用状态
///
/// 所有组件共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器（读取 + 编辑产线目标）
    pub config_manager: Arc<ConfigManager>,

    /// 生产记录仓储
    pub production_repo: Arc<ProductionRecordRepository>,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 打开数据库并确保 schema 存在，然后组装仓储、配置和 API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库 schema 初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let production_repo = Arc::new(ProductionRecordRepository::from_connection(conn));

        let source = Arc::new(SqliteRowSource::new(production_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(config_manager.clone(), source));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            production_repo,
            dashboard_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先环境变量 PRODUCTION_MONITOR_DB_PATH，其次用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./production_monitor.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("production-monitor-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("production-monitor");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("production_monitor.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RefreshRequest;
    use chrono::NaiveDate;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_refresh_on_fresh_db() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("monitor.db").to_string_lossy().to_string();

        let state = AppState::new(db_path).unwrap();
        let reference = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let response = state
            .dashboard_api
            .refresh(RefreshRequest::at(reference))
            .await
            .unwrap();
        assert!(response.snapshot.records.is_empty());
        assert_eq!(response.snapshot.plant, "Sopó");
    }
}
