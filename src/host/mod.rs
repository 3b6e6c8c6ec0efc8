//! 回放宿主
//!
//! 代替真实的网络仿真器：读入录制的节点日志，按时间顺序逐条投递给运行监视器，
//! 执行绝对超时，投递延时的宿主消息，并记录监视器发出的控制信号。

mod replay;
mod trace;

pub use replay::{ControlLog, ReplayHost, ReplayOutcome, ReplayWorld};
pub use trace::{max_node_id, parse_trace, parse_trace_line, read_trace};
