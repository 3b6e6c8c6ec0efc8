//! 仿真器
//!
//! 宿主侧的事件驱动调度器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列，一次只执行一个事件。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    halted: bool,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 是否已被某个事件叫停
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// 停止调度：当前事件执行完后 `run` 立即返回，剩余事件保留在队列中。
    pub fn halt(&mut self) {
        debug!(now = ?self.now, remaining_queue = self.q.len(), "仿真被叫停");
        self.halted = true;
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(
        level = "trace",
        skip(self, ev),
        fields(event_type = std::any::type_name::<E>(), schedule_at = ?at)
    )]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 运行所有事件直到队列为空或被叫停。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始回放");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut event_count = 0_u64;
        while !self.halted {
            let Some(item) = self.q.pop() else { break };
            event_count += 1;
            self.now = item.at;

            trace!(
                event_num = event_count,
                now = ?self.now,
                seq = item.seq,
                remaining_queue = self.q.len(),
                "执行事件"
            );

            item.ev.execute(self, world);
            world.on_tick(self);
        }

        info!(
            total_events = event_count,
            final_time = ?self.now,
            halted = self.halted,
            "✅ 回放结束"
        );
    }
}
