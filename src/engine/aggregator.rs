// ==========================================
// 生产监控系统 - 汇总引擎
// ==========================================
// 职责: 累计产量 / 累计目标 + 窗口汇总指标
// 规则: 缺失的实际产量按 0 累计
// ==========================================

use crate::domain::record::ProductionRecord;
use crate::domain::summary::ProductionTotals;

pub struct Aggregator;

impl Aggregator {
    /// 按当前顺序写入累计值（原地）
    pub fn aggregate(&self, records: &mut [ProductionRecord]) {
        let mut running_actual = 0.0;
        let mut running_target = 0.0;
        for record in records.iter_mut() {
            running_actual += record.actual_output.unwrap_or(0.0);
            running_target += record.target_output;
            record.cumulative_actual = Some(running_actual);
            record.cumulative_target = Some(running_target);
        }
    }

    /// 汇总指标；目标为 0 时效率为 0
    pub fn totals<'a, I>(&self, records: I) -> ProductionTotals
    where
        I: IntoIterator<Item = &'a ProductionRecord>,
    {
        let mut totals = ProductionTotals::default();
        for record in records {
            totals.total_actual += record.actual_output.unwrap_or(0.0);
            totals.total_target += record.target_output;
            totals.total_lost_minutes += record.lost_minutes;
        }
        totals.efficiency = if totals.total_target > 0.0 {
            totals.total_actual / totals.total_target * 100.0
        } else {
            0.0
        };
        totals
    }

    /// 是否至少有一条有实际产量的记录
    pub fn has_valid_output(&self, records: &[ProductionRecord]) -> bool {
        records.iter().any(|r| r.actual_output.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::HourSlot;

    fn record(actual: Option<f64>, target: f64, lost: f64) -> ProductionRecord {
        ProductionRecord {
            actual_output: actual,
            lost_minutes: lost,
            ..ProductionRecord::gap_fill(HourSlot::hour_of_day(6), target)
        }
    }

    #[test]
    fn test_cumulative_sums_are_monotonic() {
        let mut records = vec![
            record(Some(10.0), 100.0, 0.0),
            record(None, 100.0, 0.0),
            record(Some(0.0), 100.0, 0.0),
            record(Some(25.5), 100.0, 0.0),
        ];
        Aggregator.aggregate(&mut records);

        let cumulative: Vec<f64> = records.iter().filter_map(|r| r.cumulative_actual).collect();
        assert_eq!(cumulative, vec![10.0, 10.0, 10.0, 35.5]);
        assert!(cumulative.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(records[3].cumulative_target, Some(400.0));
    }

    #[test]
    fn test_totals_and_efficiency() {
        let records = vec![record(Some(90.0), 100.0, 5.0), record(None, 100.0, 10.0)];
        let totals = Aggregator.totals(&records);
        assert_eq!(totals.total_actual, 90.0);
        assert_eq!(totals.total_target, 200.0);
        assert_eq!(totals.total_lost_minutes, 15.0);
        assert!((totals.efficiency - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_target_efficiency_is_zero() {
        let records = vec![record(Some(50.0), 0.0, 0.0)];
        assert_eq!(Aggregator.totals(&records).efficiency, 0.0);
        assert_eq!(Aggregator.totals(&Vec::<ProductionRecord>::new()).efficiency, 0.0);
    }

    #[test]
    fn test_has_valid_output() {
        assert!(!Aggregator.has_valid_output(&[record(None, 100.0, 0.0)]));
        assert!(Aggregator.has_valid_output(&[record(Some(0.0), 100.0, 0.0)]));
    }
}
