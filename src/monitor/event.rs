//! 节点日志事件
//!
//! 宿主仿真器产生的一条日志：来源节点、时间戳和原始消息文本。

use crate::sim::SimTime;
use std::fmt;

/// 节点（mote）标识符，从 1 开始编号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// 对应 `perNodeStats` 中的下标（`NodeId(1)` -> 0）。节点号为 0 时返回 `None`。
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一条日志事件，只被消费一次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub node: NodeId,
    pub at: SimTime,
    pub message: String,
}

impl LogEvent {
    pub fn new(node: usize, at: u64, message: impl Into<String>) -> Self {
        Self {
            node: NodeId(node),
            at: SimTime(at),
            message: message.into(),
        }
    }

    /// 原始日志里的一行：`<nodeId>:<message>`
    pub fn raw_line(&self) -> String {
        format!("{}:{}", self.node, self.message)
    }
}
