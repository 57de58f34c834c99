// ==========================================
// 生产监控系统 - 记录规范化引擎
// ==========================================
// 职责: 原始行 → ProductionRecord，附加小时目标
// 输入: RawProductionRow 序列 + TargetRegistry 快照
// 输出: ProductionRecord 序列（与输入同序、同长度）
// 红线: actual_output 缺失保持缺失，不得补 0
// ==========================================

use crate::config::TargetRegistry;
use crate::domain::record::{ProductionRecord, RawProductionRow, RecordTime};
use crate::domain::types::{RecordOrigin, Shift};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, instrument};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
/// 带时区偏移的导出格式（如 "2026-03-01 06:00:00.000+00"），取当地墙上时间
const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// 数据源导出中代表"空"的字面值
const EMPTY_NOTE_LITERALS: [&str; 3] = ["none", "nan", "null"];

// ==========================================
// RecordNormalizer
// ==========================================
pub struct RecordNormalizer<'a> {
    registry: &'a TargetRegistry,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(registry: &'a TargetRegistry) -> Self {
        Self { registry }
    }

    /// 批量规范化；空输入返回空输出
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub fn normalize(&self, rows: &[RawProductionRow]) -> Vec<ProductionRecord> {
        rows.iter().map(|row| self.normalize_row(row)).collect()
    }

    pub fn normalize_row(&self, row: &RawProductionRow) -> ProductionRecord {
        let line = non_empty(row.line.as_deref());
        let target_output = line.as_deref().map_or(0.0, |l| self.registry.get(l));

        ProductionRecord {
            timestamp: parse_record_time(row),
            operator: non_empty(row.operator.as_deref()),
            shift: row.shift.as_deref().and_then(Shift::parse_label),
            operator_count: row.operator_count.as_deref().and_then(parse_operator_count),
            actual_output: row.actual_output.as_deref().and_then(parse_actual_output),
            target_output,
            lost_minutes: parse_lost_minutes(row.lost_minutes.as_deref()),
            notes: clean_notes(row.notes.as_deref()),
            cumulative_actual: None,
            cumulative_target: None,
            origin: RecordOrigin::Observed,
            line,
        }
    }
}

// ==========================================
// 字段解析
// ==========================================

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 停机分钟: 缺失 / 非数字 / 负数 → 0
pub fn parse_lost_minutes(raw: Option<&str>) -> f64 {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0.0;
    };
    match parse_number(text) {
        Some(m) if m >= 0.0 => m,
        Some(m) => {
            debug!(value = m, "停机分钟为负，按 0 处理");
            0.0
        }
        None => {
            debug!(raw = text, "停机分钟无法解析，按 0 处理");
            0.0
        }
    }
}

/// 实际产量: 非数字 / 负数视为缺失
pub fn parse_actual_output(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    match parse_number(text) {
        Some(v) if v >= 0.0 => Some(v),
        other => {
            debug!(raw = text, parsed = ?other, "实际产量无效，视为缺失");
            None
        }
    }
}

/// 操作工人数，兼容 "3.0"
fn parse_operator_count(raw: &str) -> Option<i32> {
    let text = raw.trim();
    if let Ok(n) = text.parse::<i32>() {
        return Some(n);
    }
    parse_number(text)
        .filter(|v| v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v as i32)
}

fn clean_notes(raw: Option<&str>) -> String {
    let text = raw.map(str::trim).unwrap_or("");
    if EMPTY_NOTE_LITERALS.contains(&text.to_lowercase().as_str()) {
        String::new()
    } else {
        text.to_string()
    }
}

// ==========================================
// 时间解析
// ==========================================

/// 优先 timestamp，其次 date + hour，最后仅 hour
pub fn parse_record_time(row: &RawProductionRow) -> RecordTime {
    if let Some(ts) = row.timestamp.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(parsed) = parse_timestamp(ts) {
            return RecordTime::At(parsed);
        }
        // timestamp 也可能只是一个小时文本
        if let Some(hour) = parse_hour(ts) {
            return with_date(row.date.as_deref(), hour);
        }
        debug!(raw = ts, "时间戳无法解析");
        return RecordTime::Unparsed(ts.to_string());
    }

    match row.hour.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(hour_text) => match parse_hour(hour_text) {
            Some(hour) => with_date(row.date.as_deref(), hour),
            None => {
                debug!(raw = hour_text, "小时无法解析");
                RecordTime::Unparsed(hour_text.to_string())
            }
        },
        None => RecordTime::Unparsed(String::new()),
    }
}

fn with_date(date: Option<&str>, hour: u32) -> RecordTime {
    let date = date.and_then(parse_date);
    match (date, NaiveTime::from_hms_opt(hour, 0, 0)) {
        (Some(d), Some(t)) => RecordTime::At(d.and_time(t)),
        _ => RecordTime::HourOfDay(hour),
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            OFFSET_TIMESTAMP_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.naive_local())
        })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    // "2026-03-01 00:00:00" 形式的日期列只取日期部分
    let text = text.get(..10).filter(|d| d.contains('-')).unwrap_or(text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// 小时文本: "06:00" / "6" / "6.0" / "06:00:00"，取冒号前部分
pub fn parse_hour(raw: &str) -> Option<u32> {
    let head = raw.trim().split(':').next()?.trim();
    if head.is_empty() {
        return None;
    }
    let hour = match head.parse::<u32>() {
        Ok(h) => h,
        Err(_) => {
            let v = head.parse::<f64>().ok()?;
            if v.fract() != 0.0 || v < 0.0 {
                return None;
            }
            v as u32
        }
    };
    (hour <= 23).then_some(hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Severity;

    fn registry() -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        registry.set("Litro", 800.0);
        registry
    }

    fn row(hour: &str, actual: Option<&str>, lost: Option<&str>) -> RawProductionRow {
        RawProductionRow {
            line: Some("Litro".to_string()),
            hour: Some(hour.to_string()),
            actual_output: actual.map(str::to_string),
            lost_minutes: lost.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_empty_input() {
        let registry = registry();
        assert!(RecordNormalizer::new(&registry).normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_keeps_order_and_attaches_target() {
        let registry = registry();
        let rows = vec![
            row("07:00", Some("90"), None),
            row("6", Some("80"), Some("5")),
            RawProductionRow {
                line: Some("Desconocida".to_string()),
                hour: Some("8".to_string()),
                ..Default::default()
            },
        ];

        let records = RecordNormalizer::new(&registry).normalize(&rows);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].timestamp, RecordTime::HourOfDay(7));
        assert_eq!(records[1].timestamp, RecordTime::HourOfDay(6));
        assert_eq!(records[0].target_output, 800.0);
        assert_eq!(records[2].target_output, 0.0);
        assert_eq!(records[2].actual_output, None);
    }

    #[test]
    fn test_lost_minutes_coercion() {
        assert_eq!(parse_lost_minutes(None), 0.0);
        assert_eq!(parse_lost_minutes(Some("")), 0.0);
        assert_eq!(parse_lost_minutes(Some("abc")), 0.0);
        assert_eq!(parse_lost_minutes(Some("-4")), 0.0);
        assert_eq!(parse_lost_minutes(Some("12.5")), 12.5);
        assert_eq!(Severity::from_lost_minutes(parse_lost_minutes(Some("abc"))), None);
    }

    #[test]
    fn test_actual_output_absent_is_not_zero() {
        assert_eq!(parse_actual_output(""), None);
        assert_eq!(parse_actual_output("n/a"), None);
        assert_eq!(parse_actual_output("-1"), None);
        assert_eq!(parse_actual_output("0"), Some(0.0));
    }

    #[test]
    fn test_parse_hour_variants() {
        assert_eq!(parse_hour("06:00"), Some(6));
        assert_eq!(parse_hour("6"), Some(6));
        assert_eq!(parse_hour("6.0"), Some(6));
        assert_eq!(parse_hour("06:00:00"), Some(6));
        assert_eq!(parse_hour("24"), None);
        assert_eq!(parse_hour("6.5"), None);
        assert_eq!(parse_hour("mañana"), None);
    }

    #[test]
    fn test_parse_time_sources() {
        let dated = RawProductionRow {
            date: Some("20260301".to_string()),
            hour: Some("22:00".to_string()),
            ..Default::default()
        };
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        assert_eq!(parse_record_time(&dated), RecordTime::At(expected));

        let stamped = RawProductionRow {
            timestamp: Some("2026-03-01T22:15:00".to_string()),
            ..Default::default()
        };
        assert!(matches!(parse_record_time(&stamped), RecordTime::At(_)));

        let broken = RawProductionRow {
            hour: Some("xx".to_string()),
            ..Default::default()
        };
        assert_eq!(
            parse_record_time(&broken),
            RecordTime::Unparsed("xx".to_string())
        );
    }

    #[test]
    fn test_parse_timestamp_fractional_and_offset() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2026-03-01 06:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T06:00:00.250").map(|t| t.date()), Some(expected.date()));
        assert_eq!(parse_timestamp("2026-03-01T06:00:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01 06:00:00.000+00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01 06:00"), Some(expected));
        assert_eq!(parse_timestamp("ayer"), None);

        let row = RawProductionRow {
            timestamp: Some("2026-03-01 06:00:00.000".to_string()),
            ..Default::default()
        };
        assert_eq!(parse_record_time(&row), RecordTime::At(expected));
    }

    #[test]
    fn test_notes_and_operator_count_cleanup() {
        let registry = registry();
        let record = RecordNormalizer::new(&registry).normalize_row(&RawProductionRow {
            notes: Some(" nan ".to_string()),
            operator_count: Some("3.0".to_string()),
            shift: Some("Turno 2".to_string()),
            ..Default::default()
        });
        assert_eq!(record.notes, "");
        assert_eq!(record.operator_count, Some(3));
        assert_eq!(record.shift, Some(Shift::Shift2));
        assert_eq!(record.line, None);
    }
}
