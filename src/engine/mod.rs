// ==========================================
// 生产监控系统 - 引擎层
// ==========================================
// 职责: 对账与告警规则，纯计算
// 红线: Engine 不做 IO，不拼 SQL
// ==========================================

pub mod aggregator;
pub mod filter;
pub mod gap_reconciler;
pub mod incident_classifier;
pub mod normalizer;
pub mod pipeline;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use filter::FilterStage;
pub use gap_reconciler::{GapFill, GapReconciler};
pub use incident_classifier::IncidentClassifier;
pub use normalizer::RecordNormalizer;
pub use pipeline::{DashboardPipeline, PipelineInput};
