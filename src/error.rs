//! 错误类型
//!
//! 库里所有可失败的接口都返回 `Result<T, MonitorError>`。链路统计里内嵌 JSON
//! 解析失败不在此列：那类事件只会被静默丢弃。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("trace line {line}: {reason}")]
    TraceParse { line: usize, reason: String },

    /// 正常 finalize 要求所有节点都已上报完成。
    #[error("run not complete: {completed}/{total} nodes reported completion")]
    NotComplete { completed: usize, total: usize },

    #[error("run already finalized")]
    AlreadyFinalized,

    #[error("run finished, no more events accepted")]
    RunFinished,
}

pub type MonitorResult<T> = Result<T, MonitorError>;
