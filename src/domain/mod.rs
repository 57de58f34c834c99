// ==========================================
// 生产监控系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod incident;
pub mod record;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use incident::Incident;
pub use record::{HourSlot, ProductionRecord, RawProductionRow, RecordTime, TimeWindow, WindowMode};
pub use summary::{
    DashboardSnapshot, DataStatus, DetailRow, ProductionTotals, ReconcileOutcome,
    ReconcileStatus, SelectionSnapshot,
};
pub use types::{IncidentMode, LineFilter, RecordOrigin, Selection, Severity, Shift, ShiftFilter};
