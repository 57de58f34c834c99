// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use production_monitor::db::{init_schema, open_sqlite_connection};
use production_monitor::{logging, RawProductionRow};
use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

pub const TEST_PLANT: &str = "Sopó";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    logging::init_test();
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not utf-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 写入一条 global 配置
pub fn insert_test_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

pub fn test_reference(hour: u32) -> NaiveDateTime {
    test_date().and_hms_opt(hour, 30, 0).expect("valid time")
}

/// 构造一条原始行（日期 + 小时）
pub fn raw_row(line: &str, hour: u32, actual: &str, lost: &str, notes: &str, shift: &str) -> RawProductionRow {
    RawProductionRow {
        line: Some(line.to_string()),
        operator: Some("Ana".to_string()),
        shift: Some(shift.to_string()).filter(|s| !s.is_empty()),
        operator_count: Some("4".to_string()),
        actual_output: Some(actual.to_string()).filter(|s| !s.is_empty()),
        lost_minutes: Some(lost.to_string()).filter(|s| !s.is_empty()),
        notes: Some(notes.to_string()).filter(|s| !s.is_empty()),
        timestamp: None,
        date: Some(test_date().format("%Y-%m-%d").to_string()),
        hour: Some(format!("{:02}:00", hour)),
    }
}
