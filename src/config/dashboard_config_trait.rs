// ==========================================
// 生产监控系统 - 看板配置读取 Trait
// ==========================================
// 职责: 定义刷新流程所需的配置读取接口（不包含实现）
// 红线: 不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::target_registry::TargetRegistry;
use crate::domain::record::WindowMode;
use crate::domain::types::IncidentMode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// DashboardConfig - 单次刷新的配置快照
// ==========================================
/// 刷新开始时读取一次，整个 pass 内不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub plant: String,
    pub targets: TargetRegistry,
    pub lookback_days: i64,
    pub fetch_timeout_ms: u64,
    pub incident_mode: IncidentMode,
    pub window_mode: WindowMode,
}

impl DashboardConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            plant: defaults::PLANT.to_string(),
            targets: TargetRegistry::with_defaults(),
            lookback_days: defaults::LOOKBACK_DAYS,
            fetch_timeout_ms: defaults::FETCH_TIMEOUT_MS,
            incident_mode: IncidentMode::default(),
            window_mode: WindowMode::default(),
        }
    }
}

/// 配置默认值
pub mod defaults {
    pub const PLANT: &str = "Sopó";
    pub const LOOKBACK_DAYS: i64 = 7;
    pub const FETCH_TIMEOUT_MS: u64 = 10_000;
}

// ==========================================
// DashboardConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DashboardConfigReader: Send + Sync {
    /// 获取工厂标识
    ///
    /// # 默认值
    /// - "Sopó"
    async fn get_plant(&self) -> ConfigResult<String>;

    /// 获取产线小时目标（覆写合并到默认目标上）
    ///
    /// # 默认值
    /// - 已知产线各 100
    async fn get_line_targets(&self) -> ConfigResult<TargetRegistry>;

    /// 获取数据源回看天数
    ///
    /// # 默认值
    /// - 7
    async fn get_lookback_days(&self) -> ConfigResult<i64>;

    /// 获取数据源查询超时（毫秒）
    ///
    /// # 默认值
    /// - 10000
    async fn get_fetch_timeout_ms(&self) -> ConfigResult<u64>;

    /// 获取事件筛选模式
    ///
    /// # 默认值
    /// - WITH_NOTES
    async fn get_incident_mode(&self) -> ConfigResult<IncidentMode>;

    /// 获取对账窗口模式
    ///
    /// # 默认值
    /// - FULL_DAY
    async fn get_window_mode(&self) -> ConfigResult<WindowMode>;

    /// 读取完整配置快照
    async fn load_dashboard_config(&self) -> ConfigResult<DashboardConfig> {
        Ok(DashboardConfig {
            plant: self.get_plant().await?,
            targets: self.get_line_targets().await?,
            lookback_days: self.get_lookback_days().await?,
            fetch_timeout_ms: self.get_fetch_timeout_ms().await?,
            incident_mode: self.get_incident_mode().await?,
            window_mode: self.get_window_mode().await?,
        })
    }
}

// ==========================================
// 固定配置快照（离线文件模式 / 测试）
// ==========================================
#[async_trait]
impl DashboardConfigReader for DashboardConfig {
    async fn get_plant(&self) -> ConfigResult<String> {
        Ok(self.plant.clone())
    }

    async fn get_line_targets(&self) -> ConfigResult<TargetRegistry> {
        Ok(self.targets.clone())
    }

    async fn get_lookback_days(&self) -> ConfigResult<i64> {
        Ok(self.lookback_days)
    }

    async fn get_fetch_timeout_ms(&self) -> ConfigResult<u64> {
        Ok(self.fetch_timeout_ms)
    }

    async fn get_incident_mode(&self) -> ConfigResult<IncidentMode> {
        Ok(self.incident_mode)
    }

    async fn get_window_mode(&self) -> ConfigResult<WindowMode> {
        Ok(self.window_mode)
    }

    async fn load_dashboard_config(&self) -> ConfigResult<DashboardConfig> {
        Ok(self.clone())
    }
}
