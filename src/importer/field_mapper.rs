// ==========================================
// 生产监控系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → RawProductionRow 字段
// 兼容: 数据源视图的西语列名 + 英文列名，大小写不敏感
// ==========================================

use crate::domain::record::RawProductionRow;
use std::collections::HashMap;

/// 映射后的一行，附带数据源范围字段
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub plant: Option<String>,
    pub deleted: bool,
    pub row: RawProductionRow,
}

pub struct FieldMapper;

impl FieldMapper {
    /// 表头/单元格 map → MappedRow
    pub fn map_row(&self, row: &HashMap<String, String>) -> MappedRow {
        let normalized: HashMap<String, &str> = row
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.as_str()))
            .collect();

        MappedRow {
            plant: self.get_string(&normalized, &["plant", "planta", "sede"]),
            deleted: self
                .get_string(&normalized, &["deleted_at", "eliminado"])
                .is_some(),
            row: RawProductionRow {
                line: self.get_string(&normalized, &["line", "proceso", "línea", "linea"]),
                operator: self.get_string(&normalized, &["operator", "operador"]),
                shift: self.get_string(&normalized, &["shift", "turno"]),
                operator_count: self.get_string(&normalized, &["operator_count", "operarios"]),
                actual_output: self.get_string(
                    &normalized,
                    &["actual_output", "producción real", "produccion real"],
                ),
                lost_minutes: self.get_string(
                    &normalized,
                    &["lost_minutes", "tiempo perdido (min)", "tiempo perdido"],
                ),
                notes: self.get_string(&normalized, &["notes", "observaciones"]),
                timestamp: self.get_string(
                    &normalized,
                    &["timestamp", "recorded_at", "fecha hora"],
                ),
                date: self.get_string(&normalized, &["date", "record_date", "fecha"]),
                hour: self.get_string(&normalized, &["hour", "hora"]),
            },
        }
    }

    /// 提取字符串字段，按别名顺序尝试；空白视为缺失
    fn get_string(&self, row: &HashMap<String, &str>, aliases: &[&str]) -> Option<String> {
        for alias in aliases {
            if let Some(v) = row.get(*alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_spanish_headers() {
        let mapped = FieldMapper.map_row(&cells(&[
            ("Hora", "06:00"),
            ("Proceso", "Litro"),
            ("Operador", "Ana"),
            ("Turno", "Turno 1"),
            ("Operarios", "4"),
            ("Producción Real", "90"),
            ("Tiempo Perdido (min)", ""),
            ("Observaciones", "Cambio de formato"),
            ("Planta", "Sopó"),
        ]));

        assert_eq!(mapped.plant.as_deref(), Some("Sopó"));
        assert!(!mapped.deleted);
        assert_eq!(mapped.row.hour.as_deref(), Some("06:00"));
        assert_eq!(mapped.row.line.as_deref(), Some("Litro"));
        assert_eq!(mapped.row.operator_count.as_deref(), Some("4"));
        assert_eq!(mapped.row.lost_minutes, None);
        assert_eq!(mapped.row.notes.as_deref(), Some("Cambio de formato"));
    }

    #[test]
    fn test_map_english_headers_case_insensitive() {
        let mapped = FieldMapper.map_row(&cells(&[
            ("TIMESTAMP", "2026-03-01 06:00:00"),
            ("Line", "Atlanta 1"),
            ("Deleted_At", "2026-03-02"),
        ]));

        assert_eq!(mapped.row.timestamp.as_deref(), Some("2026-03-01 06:00:00"));
        assert_eq!(mapped.row.line.as_deref(), Some("Atlanta 1"));
        assert!(mapped.deleted);
        assert_eq!(mapped.plant, None);
    }
}
