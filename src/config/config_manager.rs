// ==========================================
// 生产监控系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::dashboard_config_trait::{defaults, DashboardConfigReader};
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::target_registry::TargetRegistry;
use crate::db::open_sqlite_connection;
use crate::domain::record::WindowMode;
use crate::domain::types::IncidentMode;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        Ok(())
    }

    /// 读取产线目标覆写 (JSON: {"Litro": 800, ...})
    ///
    /// 格式错误时返回空覆写并告警，不阻断刷新
    fn read_target_overrides(&self) -> ConfigResult<HashMap<String, f64>> {
        let value = self.get_config_or_default(config_keys::LINE_TARGETS, "{}")?;
        let overrides: HashMap<String, f64> = serde_json::from_str(&value).unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::LINE_TARGETS,
                raw_value = %value,
                "产线目标配置格式错误，使用默认目标"
            );
            HashMap::new()
        });
        Ok(overrides)
    }

    /// 更新单条产线目标（持久化到 line_targets）
    ///
    /// 负数截断为 0
    pub fn set_line_target(&self, line: &str, value: f64) -> ConfigResult<()> {
        let mut overrides = self.read_target_overrides()?;
        let clipped = if value.is_finite() && value > 0.0 { value } else { 0.0 };
        overrides.insert(line.to_string(), clipped);

        let json = serde_json::to_string(&overrides)?;
        self.set_global_config_value(config_keys::LINE_TARGETS, &json)?;

        tracing::info!(line = line, target = clipped, "产线目标已更新");
        Ok(())
    }

    fn parse_or_default<T: std::str::FromStr + Copy>(
        &self,
        key: &str,
        default: T,
    ) -> ConfigResult<T> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// DashboardConfigReader Trait 实现
// ==========================================
#[async_trait]
impl DashboardConfigReader for ConfigManager {
    async fn get_plant(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::PLANT, defaults::PLANT)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(defaults::PLANT.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_line_targets(&self) -> ConfigResult<TargetRegistry> {
        let mut registry = TargetRegistry::with_defaults();
        registry.merge(&self.read_target_overrides()?);
        Ok(registry)
    }

    async fn get_lookback_days(&self) -> ConfigResult<i64> {
        let days = self.parse_or_default(config_keys::LOOKBACK_DAYS, defaults::LOOKBACK_DAYS)?;
        Ok(if days > 0 { days } else { defaults::LOOKBACK_DAYS })
    }

    async fn get_fetch_timeout_ms(&self) -> ConfigResult<u64> {
        let ms = self.parse_or_default(config_keys::FETCH_TIMEOUT_MS, defaults::FETCH_TIMEOUT_MS)?;
        Ok(if ms > 0 { ms } else { defaults::FETCH_TIMEOUT_MS })
    }

    async fn get_incident_mode(&self) -> ConfigResult<IncidentMode> {
        self.parse_or_default(config_keys::INCIDENT_MODE, IncidentMode::default())
    }

    async fn get_window_mode(&self) -> ConfigResult<WindowMode> {
        self.parse_or_default(config_keys::WINDOW_MODE, WindowMode::default())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数据源
    pub const PLANT: &str = "plant";
    pub const LOOKBACK_DAYS: &str = "lookback_days";
    pub const FETCH_TIMEOUT_MS: &str = "fetch_timeout_ms";

    // 目标 (JSON)
    pub const LINE_TARGETS: &str = "line_targets";

    // 对账与告警
    pub const INCIDENT_MODE: &str = "incident_mode";
    pub const WINDOW_MODE: &str = "window_mode";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn setup() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let conn = open_sqlite_connection(&path).unwrap();
        init_schema(&conn).unwrap();
        let manager = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        (temp_file, manager)
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let (_tmp, manager) = setup();
        let config = manager.load_dashboard_config().await.unwrap();
        assert_eq!(config.plant, "Sopó");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.incident_mode, IncidentMode::WithNotes);
        assert_eq!(config.window_mode, WindowMode::FullDay);
        assert_eq!(config.targets.get("Litro"), 100.0);
    }

    #[tokio::test]
    async fn test_set_line_target_persists_and_merges() {
        let (_tmp, manager) = setup();
        manager.set_line_target("Litro", 800.0).unwrap();
        manager.set_line_target("Vertical 2", -10.0).unwrap();

        let targets = manager.get_line_targets().await.unwrap();
        assert_eq!(targets.get("Litro"), 800.0);
        assert_eq!(targets.get("Vertical 2"), 0.0);
        assert_eq!(targets.get("Atlanta 1"), 100.0);
    }

    #[tokio::test]
    async fn test_malformed_values_fall_back_to_defaults() {
        let (_tmp, manager) = setup();
        manager
            .set_global_config_value(config_keys::LINE_TARGETS, "not json")
            .unwrap();
        manager
            .set_global_config_value(config_keys::LOOKBACK_DAYS, "siete")
            .unwrap();
        manager
            .set_global_config_value(config_keys::INCIDENT_MODE, "strict")
            .unwrap();

        assert_eq!(manager.get_line_targets().await.unwrap().get("Litro"), 100.0);
        assert_eq!(manager.get_lookback_days().await.unwrap(), 7);
        assert_eq!(manager.get_incident_mode().await.unwrap(), IncidentMode::Strict);
    }
}
