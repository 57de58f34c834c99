// ==========================================
// 生产监控系统 - 筛选阶段
// ==========================================
// 按产线 / 班次收窄记录集；纯函数，保持原顺序
// ==========================================

use crate::domain::record::ProductionRecord;
use crate::domain::types::{LineFilter, ShiftFilter};

pub struct FilterStage;

impl FilterStage {
    /// 结果可能为空
    pub fn filter(
        &self,
        records: &[ProductionRecord],
        line: &LineFilter,
        shift: &ShiftFilter,
    ) -> Vec<ProductionRecord> {
        records
            .iter()
            .filter(|r| Self::matches(r, line, shift))
            .cloned()
            .collect()
    }

    pub fn matches(record: &ProductionRecord, line: &LineFilter, shift: &ShiftFilter) -> bool {
        let line_ok = match line.as_only() {
            None => true,
            Some(wanted) => record.line.as_deref() == Some(wanted.as_str()),
        };
        let shift_ok = match shift.as_only() {
            None => true,
            Some(wanted) => record.shift.as_ref() == Some(wanted),
        };
        line_ok && shift_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{HourSlot, RecordTime};
    use crate::domain::types::{RecordOrigin, Selection, Shift};

    fn record(line: &str, shift: Option<Shift>, hour: u32) -> ProductionRecord {
        ProductionRecord {
            timestamp: RecordTime::HourOfDay(hour),
            line: Some(line.to_string()),
            shift,
            origin: RecordOrigin::Observed,
            ..ProductionRecord::gap_fill(HourSlot::hour_of_day(hour), 0.0)
        }
    }

    #[test]
    fn test_all_sentinels_keep_everything() {
        let records = vec![
            record("Litro", Some(Shift::Shift1), 6),
            record("Atlanta 1", None, 7),
        ];
        let out = FilterStage.filter(&records, &LineFilter::parse_line("Todas"), &Selection::All);
        assert_eq!(out, records);
    }

    #[test]
    fn test_line_and_shift_exact_match_preserves_order() {
        let records = vec![
            record("Litro", Some(Shift::Shift1), 9),
            record("Atlanta 1", Some(Shift::Shift1), 8),
            record("Litro", Some(Shift::Shift2), 15),
            record("Litro", Some(Shift::Shift1), 7),
        ];
        let out = FilterStage.filter(
            &records,
            &Selection::Only("Litro".to_string()),
            &Selection::Only(Shift::Shift1),
        );
        let hours: Vec<_> = out.iter().filter_map(|r| r.slot()).map(|s| s.hour).collect();
        assert_eq!(hours, vec![9, 7]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let records = vec![record("Litro", Some(Shift::Shift1), 6)];
        let out = FilterStage.filter(
            &records,
            &Selection::Only("Vertical 3".to_string()),
            &Selection::All,
        );
        assert!(out.is_empty());
    }
}
