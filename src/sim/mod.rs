//! 仿真核心模块
//!
//! 宿主侧的事件驱动调度：仿真时间、事件、世界和仿真器。回放宿主用它按时间顺序
//! 逐条投递节点日志。

// 子模块声明
mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
