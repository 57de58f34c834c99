// ==========================================
// 生产监控系统 - 缺口对账引擎
// ==========================================
// 职责: 窗口截取 → 小时范围 → 缺失小时 → 左连接补位
// 输入: 已筛选的 ProductionRecord 序列 + 可选时间窗口
// 输出: ReconcileOutcome（记录 + 缺失小时 + 状态）
// 红线: "无数据" 与 "无缺口" 必须区分
// 红线: 同一小时的多条观测记录全部保留
// ==========================================

use crate::domain::record::{HourSlot, ProductionRecord, TimeWindow};
use crate::domain::summary::{ReconcileOutcome, ReconcileStatus};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// 补位记录的取值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapFill {
    /// 单产线筛选时为该产线目标，否则 0
    pub target_output: f64,
}

pub struct GapReconciler;

impl GapReconciler {
    #[instrument(skip(self, records, fill), fields(count = records.len()))]
    pub fn reconcile(
        &self,
        records: &[ProductionRecord],
        window: Option<&TimeWindow>,
        fill: &GapFill,
    ) -> ReconcileOutcome {
        // 1. 窗口截取
        let windowed: Vec<&ProductionRecord> = match window {
            Some(w) => records.iter().filter(|r| w.contains(&r.timestamp)).collect(),
            None => records.iter().collect(),
        };

        if windowed.is_empty() {
            return ReconcileOutcome {
                records: Vec::new(),
                missing_hours: Vec::new(),
                status: ReconcileStatus::NoData,
            };
        }

        // 2. 去重的有效小时（带日期 / 无日期各自成线），按时间线位置排序
        let mut dated = BTreeSet::new();
        let mut hour_only = BTreeSet::new();
        for record in &windowed {
            match timeline_key(record, window) {
                Some((true, position)) => {
                    dated.insert(position);
                }
                Some((false, position)) => {
                    hour_only.insert(position);
                }
                None => {}
            }
        }

        // 3. 没有任何可解析小时 → 原样返回
        if dated.is_empty() && hour_only.is_empty() {
            debug!(count = windowed.len(), "没有可解析的小时，跳过对账");
            return ReconcileOutcome {
                records: windowed.into_iter().cloned().collect(),
                missing_hours: Vec::new(),
                status: ReconcileStatus::NoValidHours,
            };
        }

        // 4-5. 期望序列与缺失小时（无日期线在前）
        let missing: Vec<(bool, NaiveDateTime)> = missing_in_timeline(&hour_only)
            .into_iter()
            .map(|p| (false, p))
            .chain(missing_in_timeline(&dated).into_iter().map(|p| (true, p)))
            .collect();
        let missing_hours: Vec<HourSlot> = missing
            .iter()
            .map(|&(is_dated, p)| slot_at(is_dated, p))
            .collect();

        // 6. 左连接: 观测记录 + 补位
        let mut joined: Vec<((bool, NaiveDateTime), ProductionRecord)> =
            Vec::with_capacity(windowed.len() + missing.len());
        let mut unparsed = Vec::new();
        for record in windowed {
            match timeline_key(record, window) {
                Some(key) => joined.push((key, record.clone())),
                None => unparsed.push(record.clone()),
            }
        }
        for (key, slot) in missing.iter().zip(&missing_hours) {
            joined.push((
                *key,
                ProductionRecord::gap_fill(*slot, fill.target_output),
            ));
        }

        // 7. 按时间线升序；同小时保持输入顺序（稳定排序），无法解析的追加在末尾
        joined.sort_by_key(|(key, _)| *key);
        let mut out: Vec<ProductionRecord> = joined.into_iter().map(|(_, r)| r).collect();
        out.extend(unparsed);

        let status = if missing_hours.is_empty() {
            ReconcileStatus::Complete
        } else {
            ReconcileStatus::GapsFilled
        };

        debug!(
            records = out.len(),
            missing = missing_hours.len(),
            ?status,
            "对账完成"
        );

        ReconcileOutcome {
            records: out,
            missing_hours,
            status,
        }
    }
}

/// 记录在对账时间线上的位置: (是否带日期, 时间点)
///
/// 无日期记录在有窗口时按窗口解析（跨零点归到前一天），否则挂在同一虚拟日
fn timeline_key(record: &ProductionRecord, window: Option<&TimeWindow>) -> Option<(bool, NaiveDateTime)> {
    let slot = record.slot()?;
    match slot.date {
        Some(_) => slot.resolve(NaiveDate::MIN).map(|p| (true, p)),
        None => window
            .and_then(|w| w.resolve_hour(slot.hour))
            .or_else(|| slot.resolve(NaiveDate::MIN))
            .map(|p| (false, p)),
    }
}

fn slot_at(is_dated: bool, position: NaiveDateTime) -> HourSlot {
    if is_dated {
        HourSlot::dated(position.date(), position.hour())
    } else {
        HourSlot::hour_of_day(position.hour())
    }
}

/// 同一时间线内 [min..max] 中缺失的整点
fn missing_in_timeline(present: &BTreeSet<NaiveDateTime>) -> Vec<NaiveDateTime> {
    let (Some(first), Some(last)) = (present.first(), present.last()) else {
        return Vec::new();
    };

    let mut missing = Vec::new();
    let mut cursor = *first;
    while cursor <= *last {
        if !present.contains(&cursor) {
            missing.push(cursor);
        }
        cursor += Duration::hours(1);
    }
    missing
}
