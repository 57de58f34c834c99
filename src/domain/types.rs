// ==========================================
// 生产监控系统 - 领域类型定义
// ==========================================
// 班次 / 严重等级 / 事件筛选模式 / 筛选选择
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 班次 (Shift)
// ==========================================
// 每天 3 个固定 8 小时班次
// Shift1: 06:00-14:00 / Shift2: 14:00-22:00 / Shift3: 22:00-06:00
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Shift1,
    Shift2,
    Shift3,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Shift1, Shift::Shift2, Shift::Shift3];

    /// 班次起止小时 (start, end)，end 为开区间
    pub fn hours(&self) -> (u32, u32) {
        match self {
            Shift::Shift1 => (6, 14),
            Shift::Shift2 => (14, 22),
            Shift::Shift3 => (22, 6),
        }
    }

    /// 判断某个小时是否落在本班次内（Shift3 跨零点）
    pub fn covers_hour(&self, hour: u32) -> bool {
        let (start, end) = self.hours();
        if start < end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    /// 班次序号 (1..=3)
    pub fn number(&self) -> u8 {
        match self {
            Shift::Shift1 => 1,
            Shift::Shift2 => 2,
            Shift::Shift3 => 3,
        }
    }

    /// 解析数据源中的班次文本
    ///
    /// 兼容: "Turno 1" / "Shift 1" / "Shift1" / "T1" / "1"
    /// 无法识别返回 None
    pub fn parse_label(value: &str) -> Option<Shift> {
        let compact: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();

        let digits = compact
            .strip_prefix("turno")
            .or_else(|| compact.strip_prefix("shift"))
            .or_else(|| compact.strip_prefix('t'))
            .unwrap_or(&compact);

        match digits {
            "1" => Some(Shift::Shift1),
            "2" => Some(Shift::Shift2),
            "3" => Some(Shift::Shift3),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Turno {}", self.number())
    }
}

// ==========================================
// 严重等级 (Severity)
// ==========================================
// 顺序: Note < Minor < Moderate < Critical
// 仅表达分类结果，视觉样式由展示层映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Note,     // 无停机，仅有备注
    Minor,    // 0 < 分钟 <= 15
    Moderate, // 15 < 分钟 <= 45
    Critical, // 分钟 > 45
}

impl Severity {
    pub const MINOR_MAX_MINUTES: f64 = 15.0;
    pub const MODERATE_MAX_MINUTES: f64 = 45.0;

    /// 按停机分钟数分级；分钟数 <= 0 返回 None
    pub fn from_lost_minutes(minutes: f64) -> Option<Severity> {
        if !(minutes > 0.0) {
            None
        } else if minutes <= Self::MINOR_MAX_MINUTES {
            Some(Severity::Minor)
        } else if minutes <= Self::MODERATE_MAX_MINUTES {
            Some(Severity::Moderate)
        } else {
            Some(Severity::Critical)
        }
    }

    /// i18n 键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Severity::Note => "severity.note",
            Severity::Minor => "severity.minor",
            Severity::Moderate => "severity.moderate",
            Severity::Critical => "severity.critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "NOTE"),
            Severity::Minor => write!(f, "MINOR"),
            Severity::Moderate => write!(f, "MODERATE"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 事件筛选模式 (Incident Mode)
// ==========================================
// Strict: 仅 lost_minutes > 0
// WithNotes: 另含 lost_minutes == 0 且备注非空的记录 (Note)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentMode {
    Strict,
    #[default]
    WithNotes,
}

impl FromStr for IncidentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STRICT" => Ok(IncidentMode::Strict),
            "WITH_NOTES" | "NOTES" => Ok(IncidentMode::WithNotes),
            other => Err(format!("未知的事件模式: {}", other)),
        }
    }
}

impl fmt::Display for IncidentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentMode::Strict => write!(f, "STRICT"),
            IncidentMode::WithNotes => write!(f, "WITH_NOTES"),
        }
    }
}

// ==========================================
// 记录来源 (Record Origin)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordOrigin {
    Observed, // 数据源真实记录
    GapFill,  // 缺失小时补位
}

// ==========================================
// 筛选选择 (Selection)
// ==========================================
// All 为哨兵值，表示不限制
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

fn is_all_sentinel(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "" | "all" | "todas" | "todos"
    )
}

/// 产线筛选
pub type LineFilter = Selection<String>;

/// 班次筛选
pub type ShiftFilter = Selection<Shift>;

impl LineFilter {
    /// 解析产线筛选文本
    pub fn parse_line(value: &str) -> LineFilter {
        if is_all_sentinel(value) {
            Selection::All
        } else {
            Selection::Only(value.trim().to_string())
        }
    }
}

impl ShiftFilter {
    /// 解析班次筛选文本
    pub fn parse_shift(value: &str) -> Result<ShiftFilter, String> {
        if is_all_sentinel(value) {
            return Ok(Selection::All);
        }
        Shift::parse_label(value)
            .map(Selection::Only)
            .ok_or_else(|| format!("未知的班次: {}", value.trim()))
    }
}
