//! 事件聚合器
//!
//! 把节点日志事件流折叠成一份运行报告。状态机只有两个状态：`Running`（初始）
//! 和 `Complete`（终态）；所有节点上报完成、或宿主超时强制结束时进入终态。

use super::control::{HostControl, SpeedChange, SpeedTrigger};
use super::event::{LogEvent, NodeId};
use super::link_stats::parse_neighbor_link;
use super::markers::{Classification, Markers, parse_link_count};
use super::stats::{NodeStats, Report};
use crate::error::{MonitorError, MonitorResult};
use crate::sim::SimTime;
use std::collections::BTreeSet;
use tracing::{debug, info, trace, warn};

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    Complete,
}

/// 一次运行的全部可变状态，由调用方持有并逐事件传入聚合器。
#[derive(Debug, Clone)]
pub struct RunState {
    completed_nodes: BTreeSet<NodeId>,
    first_schedule_event_time: Option<SimTime>,
    speed_limit: f64,
    total_nodes: usize,
    per_node: Vec<NodeStats>,
    phase: RunPhase,
    speed_changed: bool,
    events_seen: u64,
}

impl RunState {
    pub fn completed_nodes(&self) -> &BTreeSet<NodeId> {
        &self.completed_nodes
    }

    pub fn first_schedule_event_time(&self) -> Option<SimTime> {
        self.first_schedule_event_time
    }

    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }

    /// 节点统计，`node` 超出 `[1, total_nodes]` 时返回 `None`。
    pub fn node_stats(&self, node: NodeId) -> Option<&NodeStats> {
        self.per_node.get(node.index()?)
    }

    fn node_stats_mut(&mut self, node: NodeId) -> Option<&mut NodeStats> {
        let stats = node.index().and_then(|i| self.per_node.get_mut(i));
        if stats.is_none() {
            warn!(
                node = %node,
                total_nodes = self.total_nodes,
                "节点号越界，忽略该事件"
            );
        }
        stats
    }

    fn all_completed(&self) -> bool {
        self.completed_nodes.len() == self.total_nodes
    }

    /// 进入终态并生成报告。
    fn seal(&mut self, now: SimTime, timed_out: bool) -> Report {
        self.phase = RunPhase::Complete;
        let report = Report {
            first_schedule_event_time: self.first_schedule_event_time.map(|t| t.0),
            per_node_stats: self.per_node.clone(),
            schedule_installation_duration_seconds: schedule_installation_seconds(
                self.first_schedule_event_time,
                now,
                self.speed_limit,
            ),
            speed_limit: self.speed_limit,
            total_nodes: self.total_nodes,
            completed_nodes: self.completed_nodes.len(),
            timed_out,
        };
        info!(
            now = ?now,
            completed = report.completed_nodes,
            total = report.total_nodes,
            timed_out,
            duration_s = report.schedule_installation_duration_seconds,
            "🏁 运行结束，生成报告"
        );
        report
    }
}

/// 调度安装耗时（秒）：`(now - first) / 1_000_000 / speed_limit`。
///
/// 未记录调度包时以 0 为起点；`now` 早于起点时记为 0。
pub fn schedule_installation_seconds(
    first: Option<SimTime>,
    now: SimTime,
    speed_limit: f64,
) -> f64 {
    let anchor = first.unwrap_or(SimTime::ZERO);
    now.saturating_since(anchor) as f64 / 1_000_000.0 / speed_limit
}

/// 事件聚合器：分类规则和可选的一次性调速规则。本身无状态。
#[derive(Debug, Clone, Default)]
pub struct EventAggregator {
    markers: Markers,
    speed_change: Option<SpeedChange>,
}

impl EventAggregator {
    pub fn new(markers: Markers, speed_change: Option<SpeedChange>) -> Self {
        Self {
            markers,
            speed_change,
        }
    }

    /// 创建一次运行的初始状态：计数器清零，完成集合为空。
    pub fn initialize(&self, total_nodes: usize, speed_limit: f64) -> MonitorResult<RunState> {
        if total_nodes == 0 {
            return Err(MonitorError::InvalidConfig(
                "total_nodes must be at least 1".to_string(),
            ));
        }
        if !(speed_limit.is_finite() && speed_limit > 0.0) {
            return Err(MonitorError::InvalidConfig(format!(
                "speed_limit must be a positive number, got {speed_limit}"
            )));
        }
        debug!(total_nodes, speed_limit, "初始化运行状态");
        Ok(RunState {
            completed_nodes: BTreeSet::new(),
            first_schedule_event_time: None,
            speed_limit,
            total_nodes,
            per_node: (1..=total_nodes).map(NodeStats::new).collect(),
            phase: RunPhase::Running,
            speed_changed: false,
            events_seen: 0,
        })
    }

    /// 处理一条事件。最后一个节点上报完成时返回报告（以该事件的时间戳结算）。
    #[tracing::instrument(
        level = "trace",
        skip(self, state, event, host),
        fields(node = %event.node, at = event.at.0)
    )]
    pub fn handle_event(
        &self,
        state: &mut RunState,
        event: &LogEvent,
        host: &mut dyn HostControl,
    ) -> MonitorResult<Option<Report>> {
        if state.phase == RunPhase::Complete {
            return Err(MonitorError::RunFinished);
        }
        state.events_seen += 1;

        let class = self
            .markers
            .classify(&event.message, state.first_schedule_event_time.is_some());
        trace!(?class, "消息分类");

        match class {
            Classification::Completion => {
                if event.node.index().is_none_or(|i| i >= state.total_nodes) {
                    warn!(
                        node = %event.node,
                        total_nodes = state.total_nodes,
                        "完成消息来自未知节点，忽略"
                    );
                } else if state.completed_nodes.insert(event.node) {
                    info!(
                        node = %event.node,
                        completed = state.completed_nodes.len(),
                        total = state.total_nodes,
                        "节点上报完成"
                    );
                    if state.all_completed() {
                        return Ok(Some(state.seal(event.at, false)));
                    }
                }
            }
            Classification::ScheduleUpdate => {
                info!(at = ?event.at, node = %event.node, "记录首个调度包时间");
                state.first_schedule_event_time = Some(event.at);
            }
            Classification::Receive => {
                if let Some(stats) = state.node_stats_mut(event.node) {
                    stats.rx_count += 1;
                }
            }
            Classification::Transmit => {
                if let Some(stats) = state.node_stats_mut(event.node) {
                    stats.tx_count += 1;
                }
            }
            Classification::Timeout => {
                if let Some(stats) = state.node_stats_mut(event.node) {
                    stats.timeout_count += 1;
                }
            }
            Classification::Topology => self.maybe_change_speed(state, event, host),
            Classification::NeighborLink => match parse_neighbor_link(&event.message) {
                Some(link) => {
                    if let Some(stats) = state.node_stats_mut(event.node) {
                        trace!(neighbor = %link.neighbor, "更新邻居链路统计");
                        stats.neighbor_link_stats.insert(link.neighbor, link.fields);
                    }
                }
                None => debug!(node = %event.node, "链路统计解析失败，丢弃"),
            },
            Classification::Unmatched => {}
        }
        Ok(None)
    }

    /// 正常结算：要求所有节点都已上报完成。
    pub fn finalize(&self, state: &mut RunState, now: SimTime) -> MonitorResult<Report> {
        if state.phase == RunPhase::Complete {
            return Err(MonitorError::AlreadyFinalized);
        }
        if !state.all_completed() {
            return Err(MonitorError::NotComplete {
                completed: state.completed_nodes.len(),
                total: state.total_nodes,
            });
        }
        Ok(state.seal(now, false))
    }

    /// 超时强制结算：不检查完成情况，报告字段与正常结算一致。
    pub fn finalize_early(&self, state: &mut RunState, now: SimTime) -> MonitorResult<Report> {
        if state.phase == RunPhase::Complete {
            return Err(MonitorError::AlreadyFinalized);
        }
        warn!(
            completed = state.completed_nodes.len(),
            total = state.total_nodes,
            "未全部完成，强制结算"
        );
        Ok(state.seal(now, true))
    }

    fn maybe_change_speed(
        &self,
        state: &mut RunState,
        event: &LogEvent,
        host: &mut dyn HostControl,
    ) {
        let Some(change) = self.speed_change else {
            return;
        };
        if state.speed_changed {
            return;
        }
        let triggered = match change.trigger {
            SpeedTrigger::LastNode => event.node.0 == state.total_nodes,
            SpeedTrigger::LinkCount => {
                parse_link_count(&event.message) == Some(state.total_nodes - 1)
            }
        };
        if triggered {
            info!(
                node = %event.node,
                from = state.speed_limit,
                to = change.speed_limit,
                "⏩ 拓扑已稳定，调整速度倍率"
            );
            state.speed_changed = true;
            state.speed_limit = change.speed_limit;
            host.set_speed_limit(change.speed_limit);
        }
    }
}
