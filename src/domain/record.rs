// ==========================================
// 生产监控系统 - 生产记录领域模型
// ==========================================
// 原始行 (RawProductionRow) → 规范化记录 (ProductionRecord)
// 红线: 原始行只在导入边界出现，下游只消费 ProductionRecord
// ==========================================

use crate::domain::types::{RecordOrigin, Shift};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RawProductionRow - 数据源原始行
// ==========================================
/// 数据源返回的一行，所有字段均为未校验文本
///
/// 时间信息二选一: `timestamp`，或 `date` + `hour`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProductionRow {
    pub line: Option<String>,
    pub operator: Option<String>,
    pub shift: Option<String>,
    pub operator_count: Option<String>,
    pub actual_output: Option<String>,
    pub lost_minutes: Option<String>,
    pub notes: Option<String>,
    pub timestamp: Option<String>,
    pub date: Option<String>,
    pub hour: Option<String>,
}

// ==========================================
// HourSlot - 小时槽位
// ==========================================
/// 对账的最小时间单位
///
/// - `date = Some`: 带日期的绝对小时，跨零点连续
/// - `date = None`: 仅有小时 (0..=23)，无日期维度
///
/// 排序: 无日期槽位在前，其次按 (date, hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourSlot {
    pub date: Option<NaiveDate>,
    pub hour: u32,
}

impl HourSlot {
    pub fn hour_of_day(hour: u32) -> Self {
        Self { date: None, hour }
    }

    pub fn dated(date: NaiveDate, hour: u32) -> Self {
        Self {
            date: Some(date),
            hour,
        }
    }

    /// 解析为具体时间点；无日期槽位挂靠到 anchor_date
    pub fn resolve(&self, anchor_date: NaiveDate) -> Option<NaiveDateTime> {
        let date = self.date.unwrap_or(anchor_date);
        NaiveTime::from_hms_opt(self.hour, 0, 0).map(|t| date.and_time(t))
    }
}

impl fmt::Display for HourSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{} {:02}:00", date, self.hour),
            None => write!(f, "{:02}:00", self.hour),
        }
    }
}

// ==========================================
// RecordTime - 记录时间
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordTime {
    /// 带日期的时间点
    At(NaiveDateTime),
    /// 仅小时 (0..=23)
    HourOfDay(u32),
    /// 无法解析，保留原文
    Unparsed(String),
}

impl RecordTime {
    /// 对应的小时槽位；无法解析返回 None
    pub fn slot(&self) -> Option<HourSlot> {
        match self {
            RecordTime::At(ts) => Some(HourSlot::dated(ts.date(), ts.hour())),
            RecordTime::HourOfDay(h) => Some(HourSlot::hour_of_day(*h)),
            RecordTime::Unparsed(_) => None,
        }
    }

    /// 用于窗口判断的时间点
    pub fn resolve(&self, anchor_date: NaiveDate) -> Option<NaiveDateTime> {
        match self {
            RecordTime::At(ts) => Some(*ts),
            RecordTime::HourOfDay(_) => self.slot().and_then(|s| s.resolve(anchor_date)),
            RecordTime::Unparsed(_) => None,
        }
    }

    pub fn from_slot(slot: HourSlot) -> RecordTime {
        match slot.date {
            Some(date) => match NaiveTime::from_hms_opt(slot.hour, 0, 0) {
                Some(t) => RecordTime::At(date.and_time(t)),
                None => RecordTime::Unparsed(slot.to_string()),
            },
            None => RecordTime::HourOfDay(slot.hour),
        }
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTime::At(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M")),
            RecordTime::HourOfDay(h) => write!(f, "{}", h),
            RecordTime::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

// ==========================================
// ProductionRecord - 规范化生产记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    // ===== 标识 =====
    pub timestamp: RecordTime,
    pub line: Option<String>,
    pub operator: Option<String>,
    pub shift: Option<Shift>,
    pub operator_count: Option<i32>,

    // ===== 产量 =====
    /// None = 本小时无记录（区别于记录为 0）
    pub actual_output: Option<f64>,
    pub target_output: f64,

    // ===== 停机 =====
    /// 不变量: >= 0
    pub lost_minutes: f64,
    pub notes: String,

    // ===== 派生（Aggregator 填充）=====
    pub cumulative_actual: Option<f64>,
    pub cumulative_target: Option<f64>,

    pub origin: RecordOrigin,
}

impl ProductionRecord {
    /// 构造缺失小时的补位记录；除时间与目标外均为空
    pub fn gap_fill(slot: HourSlot, target_output: f64) -> Self {
        Self {
            timestamp: RecordTime::from_slot(slot),
            line: None,
            operator: None,
            shift: None,
            operator_count: None,
            actual_output: None,
            target_output,
            lost_minutes: 0.0,
            notes: String::new(),
            cumulative_actual: None,
            cumulative_target: None,
            origin: RecordOrigin::GapFill,
        }
    }

    pub fn slot(&self) -> Option<HourSlot> {
        self.timestamp.slot()
    }

    pub fn is_gap_fill(&self) -> bool {
        self.origin == RecordOrigin::GapFill
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

// ==========================================
// TimeWindow - 时间窗口
// ==========================================
/// 半开区间 [start, end)
///
/// `anchor_date` 用于挂靠无日期的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub anchor_date: NaiveDate,
}

impl TimeWindow {
    /// 参考时间所在的自然日 [00:00, 次日 00:00)
    pub fn full_day(reference: NaiveDateTime) -> Self {
        let start = reference.date().and_time(NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(1),
            anchor_date: reference.date(),
        }
    }

    /// 参考时间之前的 N 小时；参考时间所在小时整体计入
    pub fn trailing_hours(reference: NaiveDateTime, hours: i64) -> Self {
        let current_hour = reference
            .date()
            .and_time(NaiveTime::MIN)
            + Duration::hours(i64::from(reference.hour()));
        let end = current_hour + Duration::hours(1);
        Self {
            start: end - Duration::hours(hours),
            end,
            anchor_date: reference.date(),
        }
    }

    /// 无日期小时在窗口内的位置: 窗口结束前最近一次出现的该小时
    ///
    /// 跨零点的窗口中，晚于参考小时的无日期记录归到前一天
    pub fn resolve_hour(&self, hour: u32) -> Option<NaiveDateTime> {
        let same_day = HourSlot::hour_of_day(hour).resolve(self.anchor_date)?;
        if same_day >= self.end {
            Some(same_day - Duration::days(1))
        } else {
            Some(same_day)
        }
    }

    /// 记录在窗口时间线上的时间点
    pub fn resolve(&self, time: &RecordTime) -> Option<NaiveDateTime> {
        match time {
            RecordTime::HourOfDay(h) => self.resolve_hour(*h),
            other => other.resolve(self.anchor_date),
        }
    }

    pub fn contains(&self, time: &RecordTime) -> bool {
        match self.resolve(time) {
            Some(ts) => ts >= self.start && ts < self.end,
            None => false,
        }
    }
}

// ==========================================
// WindowMode - 窗口模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowMode {
    #[default]
    FullDay,
    #[serde(rename = "TRAILING_24H")]
    Trailing24h,
    #[serde(rename = "NONE")]
    Unbounded,
}

impl WindowMode {
    pub fn to_window(&self, reference: NaiveDateTime) -> Option<TimeWindow> {
        match self {
            WindowMode::FullDay => Some(TimeWindow::full_day(reference)),
            WindowMode::Trailing24h => Some(TimeWindow::trailing_hours(reference, 24)),
            WindowMode::Unbounded => None,
        }
    }
}

impl std::str::FromStr for WindowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FULL_DAY" | "TODAY" => Ok(WindowMode::FullDay),
            "TRAILING_24H" | "24H" => Ok(WindowMode::Trailing24h),
            "NONE" | "UNBOUNDED" => Ok(WindowMode::Unbounded),
            other => Err(format!("未知的窗口模式: {}", other)),
        }
    }
}

impl fmt::Display for WindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowMode::FullDay => write!(f, "FULL_DAY"),
            WindowMode::Trailing24h => write!(f, "TRAILING_24H"),
            WindowMode::Unbounded => write!(f, "NONE"),
        }
    }
}
