// ==========================================
// 生产监控系统 - 停机事件
// ==========================================
// 派生对象，不落库；每次刷新重新计算
// ==========================================

use crate::domain::record::{ProductionRecord, RecordTime};
use crate::domain::types::{Severity, Shift};
use serde::{Deserialize, Serialize};

/// 停机/备注事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub timestamp: RecordTime,
    pub line: Option<String>,
    pub shift: Shift,
    pub operator: Option<String>,
    pub lost_minutes: f64,
    pub notes: String,
    pub severity: Severity,
}

impl Incident {
    pub fn from_record(record: &ProductionRecord, shift: Shift, severity: Severity) -> Self {
        Self {
            timestamp: record.timestamp.clone(),
            line: record.line.clone(),
            shift,
            operator: record.operator.clone(),
            lost_minutes: record.lost_minutes,
            notes: record.notes.clone(),
            severity,
        }
    }
}
