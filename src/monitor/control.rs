//! 宿主控制信号
//!
//! 监视器只通过这个 trait 影响宿主仿真器：调速、延时消息、宣告测试通过。

use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// 宿主仿真器暴露给测试脚本的控制面。
pub trait HostControl {
    /// 设置仿真时间相对真实时间的倍率
    fn set_speed_limit(&mut self, speed_limit: f64);
    /// 在 `delay` 之后向脚本投递一条宿主消息
    fn generate_message(&mut self, delay: SimTime, message: &str);
    /// 宣告测试通过，宿主随后结束本次运行
    fn test_ok(&mut self);
}

/// 拓扑稳定后的一次性调速。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedChange {
    /// 新的速度倍率
    pub speed_limit: f64,
    pub trigger: SpeedTrigger,
}

/// 调速的触发条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTrigger {
    /// 编号最大的节点报告了拓扑变化（例如切换父节点）
    LastNode,
    /// `Graph n_links:` 报告的链路数等于节点数减一（生成树已连通）
    LinkCount,
}
