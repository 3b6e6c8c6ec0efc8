//! 回放调度
//!
//! 每条日志、超时和延时消息都是一个仿真事件，由 `Simulator` 按时间顺序逐个执行；
//! 测试通过或出错时叫停仿真器。

use super::trace::max_node_id;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::monitor::{HostControl, LogEvent, Report, RunMonitor, RunOutput};
use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;
use tracing::{debug, error, info};

/// 监视器发给宿主的控制信号记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlLog {
    /// 按调用顺序记录的速度倍率
    pub speed_limits: Vec<f64>,
    /// (投递时间, 消息)
    pub messages: Vec<(SimTime, String)>,
    /// 宣告测试通过的时间
    pub passed_at: Option<SimTime>,
}

impl ControlLog {
    pub fn passed(&self) -> bool {
        self.passed_at.is_some()
    }
}

/// 借用仿真器实现 `HostControl`，只在单个事件执行期间存在。
struct SimHost<'a> {
    sim: &'a mut Simulator,
    log: &'a mut ControlLog,
}

impl HostControl for SimHost<'_> {
    fn set_speed_limit(&mut self, speed_limit: f64) {
        debug!(speed_limit, "宿主：设置速度倍率");
        self.log.speed_limits.push(speed_limit);
    }

    fn generate_message(&mut self, delay: SimTime, message: &str) {
        let at = self.sim.now().saturating_add(delay);
        debug!(at = ?at, message, "宿主：安排延时消息");
        self.log.messages.push((at, message.to_string()));
        self.sim.schedule(
            at,
            HostMessage {
                message: message.to_string(),
            },
        );
    }

    fn test_ok(&mut self) {
        if self.log.passed_at.is_none() {
            self.log.passed_at = Some(self.sim.now());
        }
        self.sim.halt();
    }
}

/// 回放世界：持有运行监视器和控制信号记录。
pub struct ReplayWorld {
    monitor: RunMonitor,
    control: ControlLog,
    timed_out: bool,
    error: Option<MonitorError>,
}

impl World for ReplayWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ReplayWorld {
    fn fail(&mut self, err: MonitorError, sim: &mut Simulator) {
        error!(error = %err, "回放中止");
        self.error = Some(err);
        sim.halt();
    }
}

fn replay_world(world: &mut dyn World) -> &mut ReplayWorld {
    world
        .as_any_mut()
        .downcast_mut::<ReplayWorld>()
        .expect("world must be ReplayWorld")
}

/// 事件：投递一条节点日志。
struct DeliverLog {
    event: LogEvent,
}

impl Event for DeliverLog {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = replay_world(world);
        let mut host = SimHost {
            sim: &mut *sim,
            log: &mut w.control,
        };
        if let Err(err) = w.monitor.on_mote_event(&self.event, &mut host) {
            w.fail(err, sim);
        }
    }
}

/// 事件：投递一条宿主消息。
struct HostMessage {
    message: String,
}

impl Event for HostMessage {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = replay_world(world);
        let mut host = SimHost {
            sim: &mut *sim,
            log: &mut w.control,
        };
        w.monitor.on_host_message(&self.message, &mut host);
    }
}

/// 事件：宿主的绝对超时。
struct HostTimeout;

impl Event for HostTimeout {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = replay_world(world);
        w.timed_out = true;
        let now = sim.now();
        let mut host = SimHost {
            sim: &mut *sim,
            log: &mut w.control,
        };
        if let Err(err) = w.monitor.on_timeout(now, &mut host) {
            w.fail(err, sim);
        }
    }
}

/// 一次回放的结果
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub report: Option<Report>,
    pub control: ControlLog,
    pub timed_out: bool,
    pub total_nodes: usize,
    pub events_seen: u64,
    pub finished_at: SimTime,
}

/// 回放宿主
#[derive(Debug, Clone, Default)]
pub struct ReplayHost {
    cfg: MonitorConfig,
}

impl ReplayHost {
    pub fn new(cfg: MonitorConfig) -> Self {
        Self { cfg }
    }

    /// 回放 `events`，直到测试通过（正常完成或超时）。
    #[tracing::instrument(skip(self, events, output), fields(events = events.len()))]
    pub fn run(
        &self,
        events: Vec<LogEvent>,
        output: Option<RunOutput>,
    ) -> MonitorResult<ReplayOutcome> {
        let total_nodes = self
            .cfg
            .total_nodes
            .or_else(|| max_node_id(&events))
            .ok_or_else(|| {
                MonitorError::InvalidConfig(
                    "total_nodes not set and the trace has no events".to_string(),
                )
            })?;

        let mut sim = Simulator::default();
        let mut control = ControlLog::default();
        let monitor = {
            let mut host = SimHost {
                sim: &mut sim,
                log: &mut control,
            };
            RunMonitor::from_config(&self.cfg, total_nodes, output, &mut host)?
        };

        for event in events {
            sim.schedule(event.at, DeliverLog { event });
        }
        sim.schedule(self.cfg.timeout(), HostTimeout);

        let mut world = ReplayWorld {
            monitor,
            control,
            timed_out: false,
            error: None,
        };
        sim.run(&mut world);

        let ReplayWorld {
            monitor,
            control,
            timed_out,
            error,
        } = world;
        if let Some(err) = error {
            return Err(err);
        }

        let events_seen = monitor.state().events_seen();
        let outcome = ReplayOutcome {
            report: monitor.into_report(),
            control,
            timed_out,
            total_nodes,
            events_seen,
            finished_at: sim.now(),
        };
        info!(
            passed = outcome.control.passed(),
            timed_out,
            events_seen,
            finished_at = ?outcome.finished_at,
            "回放完成"
        );
        Ok(outcome)
    }
}
