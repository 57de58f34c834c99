// ==========================================
// 生产监控系统 - 数据源层
// ==========================================
// 职责: 外部数据接入，输出未校验的原始行
// 支持: SQLite 生产库, CSV / Excel 导出文件
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod row_source;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MappedRow};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use row_source::{FileRowSource, ProductionRowSource, RowQuery, SqliteRowSource};
