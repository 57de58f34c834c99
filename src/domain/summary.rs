// ==========================================
// 生产监控系统 - 汇总与对账结果
// ==========================================
// ReconcileOutcome: Gap Reconciler 输出
// ProductionTotals: 窗口汇总指标
// DashboardSnapshot: 单次刷新的完整结果（交给展示层）
// ==========================================

use crate::domain::incident::Incident;
use crate::domain::record::{HourSlot, ProductionRecord, TimeWindow};
use crate::domain::types::{IncidentMode, LineFilter, Severity, ShiftFilter};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 对账状态
// ==========================================
// 红线: "无数据" 与 "无缺口" 必须可区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileStatus {
    /// 窗口内没有任何记录
    NoData,
    /// 有记录，但没有可解析的小时
    NoValidHours,
    /// 小时连续，无缺口
    Complete,
    /// 存在缺口，已补位
    GapsFilled,
}

/// Gap Reconciler 输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub records: Vec<ProductionRecord>,
    /// 升序
    pub missing_hours: Vec<HourSlot>,
    pub status: ReconcileStatus,
}

impl ReconcileOutcome {
    pub fn is_no_data(&self) -> bool {
        self.status == ReconcileStatus::NoData
    }
}

// ==========================================
// 汇总指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionTotals {
    pub total_actual: f64,
    pub total_target: f64,
    pub total_lost_minutes: f64,
    /// 百分比；目标为 0 时为 0
    pub efficiency: f64,
}

impl ProductionTotals {
    /// 相对 100% 的偏差（指标卡的 delta）
    pub fn efficiency_delta(&self) -> f64 {
        self.efficiency - 100.0
    }
}

// ==========================================
// 明细行
// ==========================================
/// 明细表中的一行（不含补位记录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub record: ProductionRecord,
    /// 行级高亮等级；None 表示无需高亮
    pub highlight: Option<Severity>,
}

// ==========================================
// 刷新结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataStatus {
    /// 至少一条有效产量
    Ready,
    /// 当前筛选下没有有效产量记录
    NoValidData,
}

/// 本次刷新所用的筛选条件
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub line: LineFilter,
    pub shift: ShiftFilter,
    pub incident_mode: IncidentMode,
}

/// 单次刷新的完整结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub plant: String,
    pub reference: NaiveDateTime,
    pub window: Option<TimeWindow>,
    pub selection: SelectionSnapshot,
    pub status: DataStatus,
    pub reconcile_status: ReconcileStatus,
    /// 对账 + 累计后的序列（含补位记录）
    pub records: Vec<ProductionRecord>,
    pub missing_hours: Vec<HourSlot>,
    pub totals: ProductionTotals,
    pub incidents: Vec<Incident>,
    pub detail_rows: Vec<DetailRow>,
}

impl DashboardSnapshot {
    pub fn has_valid_data(&self) -> bool {
        self.status == DataStatus::Ready
    }

    /// 导出用记录（排除补位记录）
    pub fn observed_records(&self) -> impl Iterator<Item = &ProductionRecord> {
        self.records.iter().filter(|r| !r.is_gap_fill())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_efficiency_delta() {
        let totals = ProductionTotals {
            total_actual: 90.0,
            total_target: 100.0,
            total_lost_minutes: 0.0,
            efficiency: 90.0,
        };
        assert!((totals.efficiency_delta() + 10.0).abs() < 1e-9);
    }
}
