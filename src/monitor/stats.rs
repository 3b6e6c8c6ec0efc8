//! 统计信息
//!
//! 每个节点的计数器，以及运行结束时输出的报告。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 单个节点的统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub node_id: usize,
    pub tx_count: u64,
    pub rx_count: u64,
    pub timeout_count: u64,
    /// 邻居标识 -> 该邻居最近一次上报的链路统计
    pub neighbor_link_stats: BTreeMap<String, Map<String, Value>>,
}

impl NodeStats {
    pub fn new(node_id: usize) -> Self {
        Self {
            node_id,
            ..Self::default()
        }
    }
}

/// 运行报告（不可变快照）。正常完成和超时强制结束输出同一组字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// 首个调度包的时间戳；从未出现时为 `null`
    pub first_schedule_event_time: Option<u64>,
    /// 按节点号排序
    pub per_node_stats: Vec<NodeStats>,
    pub schedule_installation_duration_seconds: f64,
    pub speed_limit: f64,
    pub total_nodes: usize,
    pub completed_nodes: usize,
    /// 宿主超时触发的强制结束
    pub timed_out: bool,
}

/// 早期测试脚本写出的扁平格式，按节点号排列的计数数组。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyReport {
    /// 未出现调度包时为 0
    pub first_schedule_msg_time: u64,
    pub tx: Vec<u64>,
    pub rx: Vec<u64>,
    pub timeouts: Vec<u64>,
    pub schedule_installation_time: f64,
    pub speed_limit: f64,
}

impl Report {
    pub fn total_tx(&self) -> u64 {
        self.per_node_stats.iter().map(|s| s.tx_count).sum()
    }

    pub fn total_rx(&self) -> u64 {
        self.per_node_stats.iter().map(|s| s.rx_count).sum()
    }

    pub fn total_timeouts(&self) -> u64 {
        self.per_node_stats.iter().map(|s| s.timeout_count).sum()
    }

    pub fn to_legacy(&self) -> LegacyReport {
        let column = |f: fn(&NodeStats) -> u64| -> Vec<u64> {
            self.per_node_stats.iter().map(f).collect()
        };
        LegacyReport {
            first_schedule_msg_time: self.first_schedule_event_time.unwrap_or(0),
            tx: column(|s| s.tx_count),
            rx: column(|s| s.rx_count),
            timeouts: column(|s| s.timeout_count),
            schedule_installation_time: self.schedule_installation_duration_seconds,
            speed_limit: self.speed_limit,
        }
    }
}
