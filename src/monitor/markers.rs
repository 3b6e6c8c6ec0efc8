//! 消息分类
//!
//! 按子串匹配给日志消息分类，按固定优先级检查，先匹配者胜出。

use serde::{Deserialize, Serialize};

/// 各类消息的特征子串，可由配置覆盖。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub completion: String,
    pub schedule_update: String,
    pub receive: String,
    pub transmit: String,
    pub timeout: String,
    /// 任一子串命中即视为拓扑变化
    pub topology: Vec<String>,
    pub neighbor_link: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            completion: "pkt->type = complete".to_string(),
            schedule_update: "schedule_updater_pkt".to_string(),
            receive: "Received".to_string(),
            transmit: "Sending".to_string(),
            timeout: "Timer expired".to_string(),
            topology: vec!["Switching parent".to_string(), LINK_COUNT_MARKER.to_string()],
            neighbor_link: "neighbor".to_string(),
        }
    }
}

/// 拓扑应用打印链路数的前缀，后面跟十进制链路数。
pub const LINK_COUNT_MARKER: &str = "Graph n_links:";

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Completion,
    ScheduleUpdate,
    Receive,
    Transmit,
    Timeout,
    Topology,
    NeighborLink,
    Unmatched,
}

impl Markers {
    /// 对一条消息分类。
    ///
    /// `schedule_anchored` 为真时（首个调度包时间已记录），调度消息不再单独归类，
    /// 而是继续参与后面的匹配。
    pub fn classify(&self, message: &str, schedule_anchored: bool) -> Classification {
        if message.contains(self.completion.as_str()) {
            Classification::Completion
        } else if !schedule_anchored && message.contains(self.schedule_update.as_str()) {
            Classification::ScheduleUpdate
        } else if message.contains(self.receive.as_str()) {
            Classification::Receive
        } else if message.contains(self.transmit.as_str()) {
            Classification::Transmit
        } else if message.contains(self.timeout.as_str()) {
            Classification::Timeout
        } else if self.topology.iter().any(|m| message.contains(m.as_str())) {
            Classification::Topology
        } else if message.contains(self.neighbor_link.as_str()) {
            Classification::NeighborLink
        } else {
            Classification::Unmatched
        }
    }
}

/// 从 `Graph n_links: <n>` 形式的消息里取出链路数。
pub fn parse_link_count(message: &str) -> Option<usize> {
    let rest = &message[message.find(LINK_COUNT_MARKER)? + LINK_COUNT_MARKER.len()..];
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
