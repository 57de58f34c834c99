// ==========================================
// 生产监控系统 - 看板 API
// ==========================================
// 职责: 读配置 → 拉取原始行（带超时）→ 运行流水线 → 产出快照与提示文本
// 红线: 拉取失败或超时 → 本次刷新整体失败，不产出部分快照
// 红线: 空结果不是错误（快照状态 NO_DATA）
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::alert_text::AlertText;
use crate::api::error::{ApiError, ApiResult};
use crate::api::export;
use crate::config::DashboardConfigReader;
use crate::domain::record::WindowMode;
use crate::domain::summary::{DashboardSnapshot, SelectionSnapshot};
use crate::domain::types::{IncidentMode, LineFilter, ShiftFilter};
use crate::engine::{DashboardPipeline, PipelineInput};
use crate::importer::{ProductionRowSource, RowQuery};

// ==========================================
// 请求 / 响应
// ==========================================

/// 刷新请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// 产线筛选文本；None 或 "Todas" 表示全部
    pub line: Option<String>,
    /// 班次筛选文本；None 或 "Todos" 表示全部
    pub shift: Option<String>,
    /// 参考时间（由调用方给出，流水线不读系统时钟）
    pub reference: NaiveDateTime,
    /// 覆盖配置中的事件模式
    pub incident_mode: Option<IncidentMode>,
    /// 覆盖配置中的窗口模式
    pub window_mode: Option<WindowMode>,
}

impl RefreshRequest {
    pub fn at(reference: NaiveDateTime) -> Self {
        Self {
            line: None,
            shift: None,
            reference,
            incident_mode: None,
            window_mode: None,
        }
    }
}

/// 刷新响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub pass_id: String,
    pub source: String,
    pub raw_rows: usize,
    pub snapshot: DashboardSnapshot,
    pub alerts: AlertText,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    config: Arc<dyn DashboardConfigReader>,
    source: Arc<dyn ProductionRowSource>,
}

impl DashboardApi {
    pub fn new(
        config: Arc<dyn DashboardConfigReader>,
        source: Arc<dyn ProductionRowSource>,
    ) -> Self {
        Self { config, source }
    }

    /// 执行一次刷新
    ///
    /// # 返回
    /// - Ok(RefreshResponse): 快照（可能为 NO_DATA）
    /// - Err(ApiError::InvalidInput): 筛选条件无法识别
    /// - Err(ApiError::FetchTimeout / DataSourceUnavailable): 拉取失败
    pub async fn refresh(&self, request: RefreshRequest) -> ApiResult<RefreshResponse> {
        let pass_id = Uuid::new_v4().to_string();
        let config = self.config.load_dashboard_config().await?;

        // 1. 筛选条件
        let line = LineFilter::parse_line(request.line.as_deref().unwrap_or(""));
        if let Some(name) = line.as_only() {
            if !config.targets.contains(name) {
                return Err(ApiError::InvalidInput(format!("未知的产线: {}", name)));
            }
        }
        let shift = ShiftFilter::parse_shift(request.shift.as_deref().unwrap_or(""))
            .map_err(ApiError::InvalidInput)?;

        let selection = SelectionSnapshot {
            line,
            shift,
            incident_mode: request.incident_mode.unwrap_or(config.incident_mode),
        };
        let window_mode = request.window_mode.unwrap_or(config.window_mode);

        // 2. 拉取原始行（带超时）
        let query = RowQuery::lookback(&config.plant, request.reference.date(), config.lookback_days);
        let source_name = self.source.describe();
        let rows = match tokio::time::timeout(config.fetch_timeout(), self.source.fetch_rows(&query)).await
        {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                warn!(pass_id = %pass_id, source = %source_name, error = %e, "数据拉取失败");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    pass_id = %pass_id,
                    source = %source_name,
                    timeout_ms = config.fetch_timeout_ms,
                    "数据拉取超时"
                );
                return Err(ApiError::FetchTimeout {
                    source_name,
                    timeout_ms: config.fetch_timeout_ms,
                });
            }
        };

        // 3. 纯计算
        let snapshot = DashboardPipeline.run(PipelineInput {
            plant: &config.plant,
            rows: &rows,
            registry: &config.targets,
            selection,
            window_mode,
            reference: request.reference,
        });
        let alerts = AlertText::from_snapshot(&snapshot);

        info!(
            pass_id = %pass_id,
            source = %source_name,
            raw_rows = rows.len(),
            status = ?snapshot.status,
            "看板刷新完成"
        );

        Ok(RefreshResponse {
            pass_id,
            source: source_name,
            raw_rows: rows.len(),
            snapshot,
            alerts,
        })
    }

    /// 可选产线（排序后），供筛选下拉使用
    pub async fn available_lines(&self) -> ApiResult<Vec<String>> {
        Ok(self.config.get_line_targets().await?.known_lines())
    }

    /// 导出快照的观测记录到目录
    pub fn export_csv(&self, snapshot: &DashboardSnapshot, dir: &Path) -> ApiResult<(PathBuf, usize)> {
        Ok(export::export_to_dir(snapshot, dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::domain::record::RawProductionRow;
    use crate::domain::summary::DataStatus;
    use crate::importer::{ImportError, ImportResult};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct StaticSource(Vec<RawProductionRow>);

    #[async_trait]
    impl ProductionRowSource for StaticSource {
        async fn fetch_rows(&self, _query: &RowQuery) -> ImportResult<Vec<RawProductionRow>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct SlowSource;

    #[async_trait]
    impl ProductionRowSource for SlowSource {
        async fn fetch_rows(&self, _query: &RowQuery) -> ImportResult<Vec<RawProductionRow>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ProductionRowSource for BrokenSource {
        async fn fetch_rows(&self, _query: &RowQuery) -> ImportResult<Vec<RawProductionRow>> {
            Err(ImportError::SourceUnavailable("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn api(source: Arc<dyn ProductionRowSource>, timeout_ms: u64) -> DashboardApi {
        let config = DashboardConfig {
            fetch_timeout_ms: timeout_ms,
            ..Default::default()
        };
        DashboardApi::new(Arc::new(config), source)
    }

    #[tokio::test]
    async fn test_refresh_empty_source_is_no_data() {
        let api = api(Arc::new(StaticSource(Vec::new())), 1_000);
        let response = api.refresh(RefreshRequest::at(reference())).await.unwrap();
        assert_eq!(response.snapshot.status, DataStatus::NoValidData);
        assert!(response.alerts.no_data.is_some());
        assert!(!response.pass_id.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_timeout_is_error() {
        let api = api(Arc::new(SlowSource), 20);
        let err = api.refresh(RefreshRequest::at(reference())).await.unwrap_err();
        assert!(matches!(err, ApiError::FetchTimeout { timeout_ms: 20, .. }));
    }

    #[tokio::test]
    async fn test_refresh_source_failure_is_error() {
        let api = api(Arc::new(BrokenSource), 1_000);
        let err = api.refresh(RefreshRequest::at(reference())).await.unwrap_err();
        assert!(matches!(err, ApiError::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_unknown_filters() {
        let api = api(Arc::new(StaticSource(Vec::new())), 1_000);

        let mut request = RefreshRequest::at(reference());
        request.line = Some("Línea 99".to_string());
        assert!(matches!(
            api.refresh(request).await,
            Err(ApiError::InvalidInput(_))
        ));

        let mut request = RefreshRequest::at(reference());
        request.shift = Some("Turno 7".to_string());
        assert!(matches!(
            api.refresh(request).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_available_lines_sorted() {
        let api = api(Arc::new(StaticSource(Vec::new())), 1_000);
        let lines = api.available_lines().await.unwrap();
        assert_eq!(lines.first().map(String::as_str), Some("Atlanta 1"));
        assert_eq!(lines.len(), 6);
    }
}
