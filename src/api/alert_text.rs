// ==========================================
// 生产监控系统 - 告警文案
// ==========================================
// 职责: 快照 → 本地化的提示文本（标题 / 缺失小时 / 事件 / 无数据）
// 视觉样式（颜色、图标）由展示层决定，这里只产出文本
// ==========================================

use crate::api::error::ApiError;
use crate::domain::incident::Incident;
use crate::domain::record::HourSlot;
use crate::domain::summary::{DashboardSnapshot, SelectionSnapshot};
use crate::domain::types::{Severity, Shift};
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentText {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

/// 一次刷新的全部提示文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertText {
    pub title: String,
    pub caption: String,
    pub missing_hours: Option<String>,
    pub incident_banner: Option<String>,
    pub incidents: Vec<IncidentText>,
    pub no_data: Option<String>,
}

impl AlertText {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        Self {
            title: t_with_args("caption.title", &[("plant", snapshot.plant.as_str())]),
            caption: selection_caption(&snapshot.selection),
            missing_hours: missing_hours_warning(&snapshot.missing_hours),
            incident_banner: incident_banner(snapshot.incidents.len()),
            incidents: snapshot.incidents.iter().map(incident_text).collect(),
            no_data: (!snapshot.has_valid_data()).then(|| t("alert.no_data")),
        }
    }
}

pub fn severity_label(severity: Severity) -> String {
    t(severity.i18n_key())
}

/// 缺失小时提示；无缺失返回 None
pub fn missing_hours_warning(missing: &[HourSlot]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let hours = missing
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(t_with_args("alert.missing_hours", &[("hours", hours.as_str())]))
}

/// 数据源失败提示；其他错误返回 None
pub fn fetch_failed_notice(err: &ApiError) -> Option<String> {
    if !err.is_fetch_failure() {
        return None;
    }
    let reason = err.to_string();
    Some(t_with_args("alert.fetch_failed", &[("reason", reason.as_str())]))
}

pub fn incident_banner(count: usize) -> Option<String> {
    (count > 0).then(|| t_with_args("alert.incident_count", &[("count", count.to_string().as_str())]))
}

pub fn incident_text(incident: &Incident) -> IncidentText {
    let label = severity_label(incident.severity);
    let hour = incident
        .timestamp
        .slot()
        .map(|s| s.hour.to_string())
        .unwrap_or_else(|| incident.timestamp.to_string());

    let shift = incident.shift.to_string();
    let minutes = format!("{:.0}", incident.lost_minutes);

    let title = t_with_args(
        "alert.incident_title",
        &[
            ("severity", label.as_str()),
            ("hour", hour.as_str()),
            ("line", incident.line.as_deref().unwrap_or("-")),
            ("shift", shift.as_str()),
        ],
    );

    let body = match incident.severity {
        Severity::Note => t("alert.note_only"),
        _ => t_with_args(
            "alert.impact",
            &[
                ("severity", label.as_str()),
                ("minutes", minutes.as_str()),
            ],
        ),
    };

    IncidentText {
        severity: incident.severity,
        title,
        body,
    }
}

/// 筛选说明: "Línea: X | Horario: Turno 1 (06:00 - 14:00)"
pub fn selection_caption(selection: &SelectionSnapshot) -> String {
    let mut parts = Vec::new();
    if let Some(line) = selection.line.as_only() {
        parts.push(t_with_args("caption.line", &[("line", line.as_str())]));
    }
    if let Some(shift) = selection.shift.as_only() {
        parts.push(t_with_args("caption.shift", &[("shift", shift_range_label(*shift).as_str())]));
    }
    if parts.is_empty() {
        t("caption.default")
    } else {
        parts.join(" | ")
    }
}

fn shift_range_label(shift: Shift) -> String {
    let (start, end) = shift.hours();
    format!("{} ({:02}:00 - {:02}:00)", shift, start, end)
}
