//! 事件 trait
//!
//! 定义宿主调度的事件接口。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行。`self: Box<Self>` 让事件在执行时拿回自己的所有权（日志消息不必克隆）。
pub trait Event: 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
