// ==========================================
// 生产监控系统 - CSV 导出
// ==========================================
// 只导出观测记录（补位记录不导出）
// 文件名: reporte_{planta}_{YYYYMMDD}.csv
// ==========================================

use crate::domain::record::ProductionRecord;
use crate::domain::summary::DashboardSnapshot;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 导出列（与现场报表一致）
pub const EXPORT_HEADERS: [&str; 11] = [
    "Hora",
    "Proceso",
    "Operador",
    "Turno",
    "Operarios",
    "Producción Real",
    "Meta por Hora",
    "Tiempo Perdido (min)",
    "Observaciones",
    "Acumulado Real",
    "Acumulado Meta",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("导出文件写入失败: {0}")]
    Io(#[from] std::io::Error),
}

pub fn export_file_name(plant: &str, date: NaiveDate) -> String {
    format!("reporte_{}_{}.csv", plant, date.format("%Y%m%d"))
}

/// 写出快照的观测记录，返回写出的记录条数
pub fn write_csv<W: Write>(snapshot: &DashboardSnapshot, writer: W) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    let mut count = 0;
    for record in snapshot.observed_records() {
        csv_writer.write_record(record_fields(record))?;
        count += 1;
    }
    csv_writer.flush()?;
    Ok(count)
}

/// 导出到目录，返回文件路径
pub fn export_to_dir(
    snapshot: &DashboardSnapshot,
    dir: &Path,
) -> Result<(PathBuf, usize), ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&snapshot.plant, snapshot.reference.date()));
    let file = std::fs::File::create(&path)?;
    let count = write_csv(snapshot, file)?;
    tracing::info!(path = %path.display(), count, "CSV 导出完成");
    Ok((path, count))
}

fn record_fields(record: &ProductionRecord) -> [String; 11] {
    [
        record.timestamp.to_string(),
        record.line.clone().unwrap_or_default(),
        record.operator.clone().unwrap_or_default(),
        record.shift.map(|s| s.to_string()).unwrap_or_default(),
        record
            .operator_count
            .map(|n| n.to_string())
            .unwrap_or_default(),
        format_optional(record.actual_output),
        format_number(record.target_output),
        format_number(record.lost_minutes),
        record.notes.clone(),
        format_optional(record.cumulative_actual),
        format_optional(record.cumulative_target),
    ]
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

/// 整数值不带小数位
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
