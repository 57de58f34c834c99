// ==========================================
// 生产监控系统 - 原始行数据源
// ==========================================
// 职责: 数据源边界；核心引擎只消费返回的行序列
// 实现: SqliteRowSource（生产库） / FileRowSource（离线导出文件）
// 红线: 阻塞 IO 一律放到 spawn_blocking，超时由调用方控制
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::domain::record::RawProductionRow;
use crate::engine::normalizer::{parse_date, parse_timestamp};
use crate::repository::ProductionRecordRepository;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;

// ==========================================
// RowQuery - 查询范围
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub plant: String,
    /// 起始日期（含）
    pub since: NaiveDate,
}

impl RowQuery {
    /// 以参考日期回看 N 天
    pub fn lookback(plant: &str, reference: NaiveDate, lookback_days: i64) -> Self {
        Self {
            plant: plant.to_string(),
            since: reference - Duration::days(lookback_days.max(0)),
        }
    }
}

// ==========================================
// ProductionRowSource Trait
// ==========================================
#[async_trait]
pub trait ProductionRowSource: Send + Sync {
    /// 拉取原始行
    ///
    /// # 返回
    /// - Ok(rows): 可能为空（空结果不是错误）
    /// - Err: 数据源不可用 / 查询失败
    async fn fetch_rows(&self, query: &RowQuery) -> ImportResult<Vec<RawProductionRow>>;

    /// 数据源描述（日志用）
    fn describe(&self) -> String;
}

// ==========================================
// SqliteRowSource - 生产库数据源
// ==========================================
pub struct SqliteRowSource {
    repo: Arc<ProductionRecordRepository>,
}

impl SqliteRowSource {
    pub fn new(repo: Arc<ProductionRecordRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProductionRowSource for SqliteRowSource {
    async fn fetch_rows(&self, query: &RowQuery) -> ImportResult<Vec<RawProductionRow>> {
        let repo = Arc::clone(&self.repo);
        let query = query.clone();

        let rows = tokio::task::spawn_blocking(move || {
            repo.find_recent_by_plant(&query.plant, query.since)
        })
        .await??;
        Ok(rows)
    }

    fn describe(&self) -> String {
        "sqlite:production_record".to_string()
    }
}

// ==========================================
// FileRowSource - 离线文件数据源
// ==========================================
/// 文件中若含 plant / deleted_at 列，按与生产库相同的规则过滤；
/// 不含日期的文件不做回看过滤
pub struct FileRowSource {
    path: PathBuf,
}

impl FileRowSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductionRowSource for FileRowSource {
    async fn fetch_rows(&self, query: &RowQuery) -> ImportResult<Vec<RawProductionRow>> {
        let path = self.path.clone();
        let query = query.clone();

        tokio::task::spawn_blocking(move || -> ImportResult<Vec<RawProductionRow>> {
            let records = UniversalFileParser.parse(&path)?;
            let mapper = FieldMapper;

            let rows: Vec<RawProductionRow> = records
                .iter()
                .map(|r| mapper.map_row(r))
                .filter(|m| !m.deleted)
                .filter(|m| m.plant.as_deref().map_or(true, |p| p == query.plant))
                .filter(|m| row_on_or_after(&m.row, query.since))
                .map(|m| m.row)
                .collect();

            tracing::debug!(
                path = %path.display(),
                total = records.len(),
                kept = rows.len(),
                "读取离线生产文件"
            );
            Ok(rows)
        })
        .await
        .map_err(ImportError::from)?
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// 行日期是否在回看范围内；无法判断日期的行保留
fn row_on_or_after(row: &RawProductionRow, since: NaiveDate) -> bool {
    let date = match non_blank(row.date.as_deref()) {
        Some(text) => parse_date(text),
        None => non_blank(row.timestamp.as_deref())
            .and_then(|ts| parse_timestamp(ts).map(|t| t.date()).or_else(|| parse_date(ts))),
    };

    match date {
        Some(date) => date >= since,
        None => true,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
