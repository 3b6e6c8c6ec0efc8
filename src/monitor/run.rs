//! 运行监视器
//!
//! 测试脚本本体：把聚合器接到输出文件和宿主控制信号上。
//!
//! 阶段：`Monitoring`（逐条记录并聚合日志）-> `Settling`（报告已写出，等待宿主的
//! `sleep` 消息）-> `Passed`（已宣告测试通过）。宿主超时可以从任何未通过的阶段直接
//! 结束运行。

use super::aggregator::{EventAggregator, RunState};
use super::control::HostControl;
use super::event::LogEvent;
use super::output::RunOutput;
use super::stats::Report;
use crate::config::MonitorConfig;
use crate::error::MonitorResult;
use crate::sim::SimTime;
use tracing::{debug, info, trace};

/// 结算后请求宿主延时投递的消息
pub const SLEEP_MESSAGE: &str = "sleep";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessPhase {
    Monitoring,
    Settling,
    Passed,
}

/// 结算后的等待时长（仿真毫秒）：倍率为 1 时等 5 秒，否则 `2000 * speed_limit`。
pub fn sleep_delay(speed_limit: f64) -> SimTime {
    if speed_limit == 1.0 {
        SimTime::from_millis(5_000)
    } else {
        SimTime((2_000.0 * speed_limit * 1_000.0).round() as u64)
    }
}

pub struct RunMonitor {
    aggregator: EventAggregator,
    state: RunState,
    output: Option<RunOutput>,
    phase: HarnessPhase,
    report: Option<Report>,
}

impl RunMonitor {
    /// 初始化运行状态并向宿主下发初始速度倍率。`output` 为 `None` 时不落盘。
    pub fn start(
        aggregator: EventAggregator,
        total_nodes: usize,
        speed_limit: f64,
        output: Option<RunOutput>,
        host: &mut dyn HostControl,
    ) -> MonitorResult<Self> {
        let state = aggregator.initialize(total_nodes, speed_limit)?;
        host.set_speed_limit(speed_limit);
        info!(total_nodes, speed_limit, "🚦 开始监视运行");
        Ok(Self {
            aggregator,
            state,
            output,
            phase: HarnessPhase::Monitoring,
            report: None,
        })
    }

    pub fn from_config(
        cfg: &MonitorConfig,
        total_nodes: usize,
        output: Option<RunOutput>,
        host: &mut dyn HostControl,
    ) -> MonitorResult<Self> {
        let aggregator = EventAggregator::new(cfg.markers.clone(), cfg.speed_change);
        Self::start(aggregator, total_nodes, cfg.speed_limit, output, host)
    }

    pub fn phase(&self) -> HarnessPhase {
        self.phase
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn into_report(self) -> Option<Report> {
        self.report
    }

    /// 宿主投递的一条节点日志。
    pub fn on_mote_event(
        &mut self,
        event: &LogEvent,
        host: &mut dyn HostControl,
    ) -> MonitorResult<()> {
        if self.phase != HarnessPhase::Monitoring {
            trace!(phase = ?self.phase, node = %event.node, "已结算，忽略节点日志");
            return Ok(());
        }
        // 先落原始日志，再分类
        if let Some(out) = self.output.as_mut() {
            out.append(event)?;
        }
        if let Some(report) = self.aggregator.handle_event(&mut self.state, event, host)? {
            self.conclude(report)?;
            let delay = sleep_delay(self.state.speed_limit());
            debug!(delay = ?delay, "请求宿主延时投递 sleep");
            host.generate_message(delay, SLEEP_MESSAGE);
            self.phase = HarnessPhase::Settling;
        }
        Ok(())
    }

    /// 宿主生成的消息（不属于任何节点）。
    pub fn on_host_message(&mut self, message: &str, host: &mut dyn HostControl) {
        if self.phase == HarnessPhase::Settling && message == SLEEP_MESSAGE {
            info!("✅ 等待结束，测试通过");
            host.test_ok();
            self.phase = HarnessPhase::Passed;
        } else {
            trace!(phase = ?self.phase, message, "忽略宿主消息");
        }
    }

    /// 宿主的绝对超时到期。未结算时强制结算并写出部分报告。
    pub fn on_timeout(&mut self, now: SimTime, host: &mut dyn HostControl) -> MonitorResult<()> {
        match self.phase {
            HarnessPhase::Monitoring => {
                info!(now = ?now, "⏰ 宿主超时，强制结算");
                let report = self.aggregator.finalize_early(&mut self.state, now)?;
                self.conclude(report)?;
            }
            HarnessPhase::Settling => {
                info!(now = ?now, "⏰ 宿主超时，跳过剩余等待");
            }
            HarnessPhase::Passed => return Ok(()),
        }
        host.test_ok();
        self.phase = HarnessPhase::Passed;
        Ok(())
    }

    fn conclude(&mut self, report: Report) -> MonitorResult<()> {
        let output = self.output.take();
        let report = self.report.insert(report);
        if let Some(out) = output {
            out.finish(report)?;
        }
        Ok(())
    }
}
