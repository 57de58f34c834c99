// ==========================================
// 生产监控系统 - 核心库
// ==========================================
// 职责: 小时级产量对账 + 停机告警分级
// 技术栈: Rust + SQLite
// 流程: 原始行 → 规范化 → 筛选 → 缺口对账 → 累计汇总 → 事件分级
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 对账与告警规则
pub mod engine;

// 数据源层 - 外部数据
pub mod importer;

// 配置层 - 目标与系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/schema）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 刷新与导出
pub mod api;

// 应用层 - 组件组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{IncidentMode, LineFilter, RecordOrigin, Selection, Severity, Shift, ShiftFilter};

// 领域实体
pub use domain::{
    DashboardSnapshot, HourSlot, Incident, ProductionRecord, ProductionTotals, RawProductionRow,
    ReconcileOutcome, ReconcileStatus, RecordTime, TimeWindow, WindowMode,
};

// 配置
pub use config::{DashboardConfig, TargetRegistry};

// 引擎
pub use engine::{
    Aggregator, DashboardPipeline, FilterStage, GapFill, GapReconciler, IncidentClassifier,
    PipelineInput, RecordNormalizer,
};

// API
pub use api::{ApiError, DashboardApi, RefreshRequest, RefreshResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Monitor de Producción";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
