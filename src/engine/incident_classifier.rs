// ==========================================
// 生产监控系统 - 停机事件分级引擎
// ==========================================
// 分级: 0 < m <= 15 Minor / 15 < m <= 45 Moderate / m > 45 Critical
// 模式: STRICT 只看停机分钟；WITH_NOTES 额外收录"仅备注"的记录 (Note)
// 红线: 只处理有班次的记录；输出保持输入顺序，不去重
// ==========================================

use crate::domain::incident::Incident;
use crate::domain::record::ProductionRecord;
use crate::domain::types::{IncidentMode, Severity};

pub struct IncidentClassifier;

impl IncidentClassifier {
    pub fn classify(&self, records: &[ProductionRecord], mode: IncidentMode) -> Vec<Incident> {
        records
            .iter()
            .filter_map(|record| {
                let shift = record.shift?;
                let severity = self.severity_for(record, mode)?;
                Some(Incident::from_record(record, shift, severity))
            })
            .collect()
    }

    /// 明细行的高亮等级（与模式无关: 仅备注也给出 Note）
    pub fn row_highlight(&self, record: &ProductionRecord) -> Option<Severity> {
        self.severity_for(record, IncidentMode::WithNotes)
    }

    fn severity_for(&self, record: &ProductionRecord, mode: IncidentMode) -> Option<Severity> {
        if let Some(severity) = Severity::from_lost_minutes(record.lost_minutes) {
            return Some(severity);
        }
        match mode {
            IncidentMode::WithNotes if record.lost_minutes == 0.0 && record.has_notes() => {
                Some(Severity::Note)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{HourSlot, RecordTime};
    use crate::domain::types::{RecordOrigin, Shift};

    fn record(hour: u32, lost: f64, notes: &str, shift: Option<Shift>) -> ProductionRecord {
        ProductionRecord {
            timestamp: RecordTime::HourOfDay(hour),
            line: Some("Litro".to_string()),
            shift,
            lost_minutes: lost,
            notes: notes.to_string(),
            origin: RecordOrigin::Observed,
            ..ProductionRecord::gap_fill(HourSlot::hour_of_day(hour), 0.0)
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        let cases = [
            (15.0, Severity::Minor),
            (15.0001, Severity::Moderate),
            (45.0, Severity::Moderate),
            (45.0001, Severity::Critical),
            (0.5, Severity::Minor),
        ];
        for (minutes, expected) in cases {
            let records = vec![record(6, minutes, "", Some(Shift::Shift1))];
            let incidents = IncidentClassifier.classify(&records, IncidentMode::Strict);
            assert_eq!(incidents.len(), 1, "minutes = {}", minutes);
            assert_eq!(incidents[0].severity, expected, "minutes = {}", minutes);
        }
    }

    #[test]
    fn test_modes_differ_on_notes_only() {
        let records = vec![
            record(6, 0.0, "Cambio de referencia", Some(Shift::Shift1)),
            record(7, 20.0, "", Some(Shift::Shift1)),
            record(8, 0.0, "", Some(Shift::Shift1)),
        ];

        let strict = IncidentClassifier.classify(&records, IncidentMode::Strict);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].severity, Severity::Moderate);

        let with_notes = IncidentClassifier.classify(&records, IncidentMode::WithNotes);
        let severities: Vec<_> = with_notes.iter().map(|i| i.severity).collect();
        assert_eq!(severities, vec![Severity::Note, Severity::Moderate]);
    }

    #[test]
    fn test_records_without_shift_are_skipped() {
        let records = vec![record(6, 60.0, "Paro", None)];
        assert!(IncidentClassifier
            .classify(&records, IncidentMode::WithNotes)
            .is_empty());
    }

    #[test]
    fn test_duplicates_not_merged() {
        let records = vec![
            record(6, 10.0, "", Some(Shift::Shift1)),
            record(6, 10.0, "", Some(Shift::Shift1)),
        ];
        assert_eq!(IncidentClassifier.classify(&records, IncidentMode::Strict).len(), 2);
    }

    #[test]
    fn test_row_highlight() {
        assert_eq!(
            IncidentClassifier.row_highlight(&record(6, 50.0, "", None)),
            Some(Severity::Critical)
        );
        assert_eq!(
            IncidentClassifier.row_highlight(&record(6, 0.0, "Limpieza", None)),
            Some(Severity::Note)
        );
        assert_eq!(IncidentClassifier.row_highlight(&record(6, 0.0, "", None)), None);
    }
}
