// ==========================================
// 生产监控系统 - 生产记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 按工厂 + 回看日期读取原始行（排除软删除）
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::record::RawProductionRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductionRecordRepository - 生产记录仓储
// ==========================================
/// 生产记录仓储
/// 职责: 管理 production_record 表的读取与写入
/// 红线: 不做类型转换，数值列原样以文本返回
pub struct ProductionRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionRecordRepository {
    /// 创建新的 ProductionRecordRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取工厂最近的原始行
    ///
    /// # 参数
    /// - plant: 工厂标识
    /// - since: 起始日期（含）；无日期的行（仅小时）总是返回
    ///
    /// # 返回
    /// - 按日期、写入顺序排列的原始行
    ///
    /// # 说明
    /// - deleted_at 非空的行视为软删除，不返回
    pub fn find_recent_by_plant(
        &self,
        plant: &str,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<RawProductionRow>> {
        let conn = self.get_conn()?;
        // day_key: 日期列优先，其次时间戳；紧凑的 YYYYMMDD 先补全分隔符再比较
        let mut stmt = conn.prepare(
            r#"
            WITH scoped AS (
                SELECT
                    record_id, line, operator, shift, operator_count,
                    actual_output, lost_minutes, notes,
                    recorded_at, record_date, hour,
                    COALESCE(NULLIF(trim(record_date), ''), NULLIF(trim(recorded_at), '')) AS day_raw
                FROM production_record
                WHERE plant = ?1
                  AND deleted_at IS NULL
            ),
            keyed AS (
                SELECT
                    *,
                    CASE
                        WHEN day_raw IS NULL THEN NULL
                        WHEN length(day_raw) = 8 AND instr(day_raw, '-') = 0
                            THEN substr(day_raw, 1, 4) || '-' || substr(day_raw, 5, 2) || '-' || substr(day_raw, 7, 2)
                        ELSE substr(day_raw, 1, 10)
                    END AS day_key
                FROM scoped
            )
            SELECT
                line, operator, shift, operator_count,
                actual_output, lost_minutes, notes,
                recorded_at, record_date, hour
            FROM keyed
            WHERE day_key IS NULL OR day_key >= ?2
            ORDER BY day_key, record_id
            "#,
        )?;

        let rows = stmt
            .query_map(params![plant, since.format("%Y-%m-%d").to_string()], map_raw_row)?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(plant = plant, since = %since, rows = rows.len(), "读取生产原始行");
        Ok(rows)
    }

    /// 写入一条原始行（采集端 / 演示数据）
    ///
    /// # 返回
    /// - Ok(i64): record_id
    pub fn insert_raw(&self, plant: &str, row: &RawProductionRow) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_record (
                plant, line, operator, shift, operator_count,
                actual_output, lost_minutes, notes,
                recorded_at, record_date, hour
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                plant,
                row.line,
                row.operator,
                row.shift,
                row.operator_count,
                row.actual_output,
                row.lost_minutes,
                row.notes,
                row.timestamp,
                row.date,
                row.hour,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量写入（单事务）
    pub fn batch_insert_raw(&self, plant: &str, rows: &[RawProductionRow]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for row in rows {
            tx.execute(
                r#"
                INSERT INTO production_record (
                    plant, line, operator, shift, operator_count,
                    actual_output, lost_minutes, notes,
                    recorded_at, record_date, hour
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    plant,
                    row.line,
                    row.operator,
                    row.shift,
                    row.operator_count,
                    row.actual_output,
                    row.lost_minutes,
                    row.notes,
                    row.timestamp,
                    row.date,
                    row.hour,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 软删除
    pub fn soft_delete(&self, record_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE production_record SET deleted_at = datetime('now') WHERE record_id = ?1 AND deleted_at IS NULL",
            params![record_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "production_record".to_string(),
                id: record_id.to_string(),
            });
        }
        Ok(())
    }
}

/// 行映射：所有列以文本读取，保留 NULL
fn map_raw_row(row: &Row<'_>) -> rusqlite::Result<RawProductionRow> {
    Ok(RawProductionRow {
        line: value_to_text(row.get(0)?),
        operator: value_to_text(row.get(1)?),
        shift: value_to_text(row.get(2)?),
        operator_count: value_to_text(row.get(3)?),
        actual_output: value_to_text(row.get(4)?),
        lost_minutes: value_to_text(row.get(5)?),
        notes: value_to_text(row.get(6)?),
        timestamp: value_to_text(row.get(7)?),
        date: value_to_text(row.get(8)?),
        hour: value_to_text(row.get(9)?),
    })
}

/// SQLite 动态类型 → 文本
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}
