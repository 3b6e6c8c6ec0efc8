//! 运行配置
//!
//! 从可选的 JSON 文件加载，所有字段都有默认值；命令行参数再覆盖文件里的值。

use crate::error::{MonitorError, MonitorResult};
use crate::monitor::{Markers, ReportFormat, SpeedChange};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 宿主的绝对超时（毫秒），与原测试脚本一致
pub const DEFAULT_TIMEOUT_MS: u64 = 18_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 节点总数；缺省时由回放宿主取 trace 里的最大节点号
    pub total_nodes: Option<usize>,
    pub speed_limit: f64,
    pub timeout_ms: u64,
    pub markers: Markers,
    pub speed_change: Option<SpeedChange>,
    pub output_dir: PathBuf,
    pub report_format: ReportFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            total_nodes: None,
            speed_limit: 1.0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            markers: Markers::default(),
            speed_change: None,
            output_dir: PathBuf::from("."),
            report_format: ReportFormat::Full,
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(raw: &str) -> MonitorResult<Self> {
        let cfg: MonitorConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> MonitorResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn timeout(&self) -> SimTime {
        SimTime::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> MonitorResult<()> {
        if self.total_nodes == Some(0) {
            return Err(MonitorError::InvalidConfig(
                "total_nodes must be at least 1".to_string(),
            ));
        }
        check_speed("speed_limit", self.speed_limit)?;
        if let Some(change) = &self.speed_change {
            check_speed("speed_change.speed_limit", change.speed_limit)?;
        }

        let m = &self.markers;
        let named = [
            ("completion", &m.completion),
            ("schedule_update", &m.schedule_update),
            ("receive", &m.receive),
            ("transmit", &m.transmit),
            ("timeout", &m.timeout),
            ("neighbor_link", &m.neighbor_link),
        ];
        // 空子串会匹配所有消息
        for (name, marker) in named {
            if marker.is_empty() {
                return Err(MonitorError::InvalidConfig(format!(
                    "marker `{name}` must not be empty"
                )));
            }
        }
        if m.topology.iter().any(String::is_empty) {
            return Err(MonitorError::InvalidConfig(
                "topology markers must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_speed(name: &str, v: f64) -> MonitorResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(MonitorError::InvalidConfig(format!(
            "{name} must be a positive number, got {v}"
        )))
    }
}
