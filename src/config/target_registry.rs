// ==========================================
// 生产监控系统 - 产线小时目标表
// ==========================================
// 职责: 产线 → 每小时目标产量
// 生命周期: 每次刷新由配置重新构建，不跨刷新共享
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 已知产线（与数据源 Proceso 列一致）
pub const KNOWN_LINES: [&str; 6] = [
    "Atlanta 1",
    "Atlanta 2",
    "Litro",
    "Vertical 1",
    "Vertical 2",
    "Vertical 3",
];

/// 已知产线的默认小时目标
pub const DEFAULT_HOURLY_TARGET: f64 = 100.0;

// ==========================================
// TargetRegistry - 目标表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRegistry {
    targets: HashMap<String, f64>,
}

impl TargetRegistry {
    /// 空目标表（所有产线目标为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 已知产线全部使用默认目标
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for line in KNOWN_LINES {
            registry.set(line, DEFAULT_HOURLY_TARGET);
        }
        registry
    }

    /// 查询产线目标；未知产线返回 0
    pub fn get(&self, line: &str) -> f64 {
        self.targets.get(line).copied().unwrap_or(0.0)
    }

    /// 写入/覆盖产线目标
    ///
    /// 负数与非有限值截断为 0
    pub fn set(&mut self, line: &str, value: f64) {
        let clipped = if value.is_finite() && value > 0.0 {
            value
        } else {
            if value != 0.0 {
                tracing::warn!(line = line, value = value, "产线目标非法，截断为 0");
            }
            0.0
        };
        self.targets.insert(line.to_string(), clipped);
    }

    /// 从文本写入产线目标
    ///
    /// # 返回
    /// - Err(ConfigError::InvalidTarget): 文本无法解析为数值
    pub fn set_from_text(&mut self, line: &str, raw: &str) -> ConfigResult<()> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidTarget {
                line: line.to_string(),
                value: raw.to_string(),
            })?;
        self.set(line, value);
        Ok(())
    }

    pub fn contains(&self, line: &str) -> bool {
        self.targets.contains_key(line)
    }

    /// 已配置的产线（排序，供选择器使用）
    pub fn known_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.targets.keys().cloned().collect();
        lines.sort();
        lines
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 合并覆写（用于把配置覆盖到默认目标上）
    pub fn merge(&mut self, overrides: &HashMap<String, f64>) {
        for (line, value) in overrides {
            self.set(line, *value);
        }
    }
}
