// ==========================================
// 生产监控系统 - 看板流水线
// ==========================================
// 职责: 单次刷新的纯计算过程
// 流程: 规范化 → 筛选 → 对账 → 累计/汇总 → 事件分级
// 红线: 不做 IO；参考时间、配置、筛选全部由调用方传入
// ==========================================

use crate::config::TargetRegistry;
use crate::domain::record::{RawProductionRow, WindowMode};
use crate::domain::summary::{DashboardSnapshot, DataStatus, DetailRow, SelectionSnapshot};
use crate::engine::aggregator::Aggregator;
use crate::engine::filter::FilterStage;
use crate::engine::gap_reconciler::{GapFill, GapReconciler};
use crate::engine::incident_classifier::IncidentClassifier;
use crate::engine::normalizer::RecordNormalizer;
use chrono::NaiveDateTime;
use tracing::{info, instrument};

/// 单次刷新的输入
#[derive(Debug, Clone)]
pub struct PipelineInput<'a> {
    pub plant: &'a str,
    pub rows: &'a [RawProductionRow],
    pub registry: &'a TargetRegistry,
    pub selection: SelectionSnapshot,
    pub window_mode: WindowMode,
    pub reference: NaiveDateTime,
}

pub struct DashboardPipeline;

impl DashboardPipeline {
    #[instrument(skip(self, input), fields(plant = input.plant, rows = input.rows.len()))]
    pub fn run(&self, input: PipelineInput<'_>) -> DashboardSnapshot {
        let PipelineInput {
            plant,
            rows,
            registry,
            selection,
            window_mode,
            reference,
        } = input;

        // 1. 规范化
        let records = RecordNormalizer::new(registry).normalize(rows);

        // 2. 筛选
        let filtered = FilterStage.filter(&records, &selection.line, &selection.shift);

        // 3. 对账
        let window = window_mode.to_window(reference);
        let fill = match selection.line.as_only() {
            Some(line) => GapFill {
                target_output: registry.get(line),
            },
            None => GapFill::default(),
        };
        let mut outcome = GapReconciler.reconcile(&filtered, window.as_ref(), &fill);

        // 4. 累计 + 汇总
        Aggregator.aggregate(&mut outcome.records);
        let totals = Aggregator.totals(&outcome.records);
        let status = if Aggregator.has_valid_output(&outcome.records) {
            DataStatus::Ready
        } else {
            DataStatus::NoValidData
        };

        // 5. 事件分级 + 明细高亮
        let incidents = IncidentClassifier.classify(&outcome.records, selection.incident_mode);
        let detail_rows: Vec<DetailRow> = outcome
            .records
            .iter()
            .filter(|r| !r.is_gap_fill())
            .map(|r| DetailRow {
                highlight: IncidentClassifier.row_highlight(r),
                record: r.clone(),
            })
            .collect();

        info!(
            plant,
            normalized = records.len(),
            filtered = filtered.len(),
            reconciled = outcome.records.len(),
            missing_hours = outcome.missing_hours.len(),
            incidents = incidents.len(),
            efficiency = totals.efficiency,
            reconcile_status = ?outcome.status,
            "看板刷新计算完成"
        );

        DashboardSnapshot {
            plant: plant.to_string(),
            reference,
            window,
            selection,
            status,
            reconcile_status: outcome.status,
            records: outcome.records,
            missing_hours: outcome.missing_hours,
            totals,
            incidents,
            detail_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::ReconcileStatus;
    use crate::domain::types::{IncidentMode, Selection, Severity, Shift};
    use chrono::NaiveDate;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn raw(hour: &str, actual: &str, lost: &str, notes: &str) -> RawProductionRow {
        RawProductionRow {
            line: Some("Litro".to_string()),
            shift: Some("Turno 1".to_string()),
            date: Some("2026-03-01".to_string()),
            hour: Some(hour.to_string()),
            actual_output: Some(actual.to_string()),
            lost_minutes: Some(lost.to_string()),
            notes: Some(notes.to_string()),
            ..Default::default()
        }
    }

    fn run(rows: &[RawProductionRow], selection: SelectionSnapshot) -> DashboardSnapshot {
        let mut registry = TargetRegistry::new();
        registry.set("Litro", 800.0);
        DashboardPipeline.run(PipelineInput {
            plant: "Sopó",
            rows,
            registry: &registry,
            selection,
            window_mode: WindowMode::FullDay,
            reference: reference(),
        })
    }

    #[test]
    fn test_pipeline_fills_gap_and_classifies() {
        let rows = vec![
            raw("06:00", "700", "", ""),
            raw("07:00", "810", "50", "Falla etiquetadora"),
            raw("09:00", "790", "", "Cambio de turno"),
        ];
        let selection = SelectionSnapshot {
            line: Selection::Only("Litro".to_string()),
            ..Default::default()
        };

        let snapshot = run(&rows, selection);

        assert_eq!(snapshot.status, DataStatus::Ready);
        assert_eq!(snapshot.reconcile_status, ReconcileStatus::GapsFilled);
        assert_eq!(snapshot.records.len(), 4);
        assert_eq!(snapshot.missing_hours.len(), 1);
        assert_eq!(snapshot.records[3].cumulative_actual, Some(2300.0));
        assert_eq!(snapshot.records[3].cumulative_target, Some(3200.0));
        assert_eq!(snapshot.detail_rows.len(), 3);

        let severities: Vec<_> = snapshot.incidents.iter().map(|i| i.severity).collect();
        assert_eq!(severities, vec![Severity::Critical, Severity::Note]);
        assert_eq!(snapshot.incidents[0].shift, Shift::Shift1);
    }

    #[test]
    fn test_pipeline_strict_mode_and_shift_filter() {
        let mut rows = vec![
            raw("06:00", "700", "", "Solo nota"),
            raw("07:00", "810", "10", ""),
        ];
        rows.push(RawProductionRow {
            shift: Some("Turno 2".to_string()),
            ..raw("15:00", "500", "30", "")
        });

        let snapshot = run(
            &rows,
            SelectionSnapshot {
                line: Selection::All,
                shift: Selection::Only(Shift::Shift1),
                incident_mode: IncidentMode::Strict,
            },
        );

        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.incidents.len(), 1);
        assert_eq!(snapshot.incidents[0].severity, Severity::Minor);
    }

    #[test]
    fn test_pipeline_no_rows() {
        let snapshot = run(&[], SelectionSnapshot::default());
        assert_eq!(snapshot.status, DataStatus::NoValidData);
        assert_eq!(snapshot.reconcile_status, ReconcileStatus::NoData);
        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.totals.efficiency, 0.0);
    }
}
