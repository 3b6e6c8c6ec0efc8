//! 监视模块
//!
//! 观察节点日志、按消息内容分类、累计每个节点的计数，所有节点上报完成后输出报告。

// 子模块声明
mod aggregator;
mod control;
mod event;
mod link_stats;
mod markers;
mod output;
mod run;
mod stats;

// 重新导出公共接口
pub use aggregator::{EventAggregator, RunPhase, RunState, schedule_installation_seconds};
pub use control::{HostControl, SpeedChange, SpeedTrigger};
pub use event::{LogEvent, NodeId};
pub use link_stats::{NeighborLinkReport, parse_neighbor_link};
pub use markers::{Classification, LINK_COUNT_MARKER, Markers, parse_link_count};
pub use output::{RunOutput, ReportFormat, raw_log_path, render_report, report_path};
pub use run::{HarnessPhase, RunMonitor, SLEEP_MESSAGE, sleep_delay};
pub use stats::{LegacyReport, NodeStats, Report};
