//! 节点日志 trace
//!
//! 宿主日志监听器导出的文本格式，每行一条：`<时间戳>\tID:<节点号>\t<消息>`。
//! 空行和以 `#` 开头的行被跳过。

use crate::error::{MonitorError, MonitorResult};
use crate::monitor::LogEvent;
use std::fs;
use std::path::Path;

/// 解析单行。
pub fn parse_trace_line(line: &str) -> Result<LogEvent, String> {
    let mut fields = line.splitn(3, '\t');
    let ts = fields.next().unwrap_or_default().trim();
    let at: u64 = ts.parse().map_err(|_| format!("bad timestamp `{ts}`"))?;

    let id_field = fields.next().ok_or("missing node field")?.trim();
    let id = id_field
        .strip_prefix("ID:")
        .ok_or_else(|| format!("node field `{id_field}` must look like `ID:<n>`"))?;
    let node: usize = id.parse().map_err(|_| format!("bad node id `{id}`"))?;
    if node == 0 {
        return Err("node ids start at 1".to_string());
    }

    let message = fields.next().unwrap_or_default();
    Ok(LogEvent::new(node, at, message))
}

pub fn parse_trace(raw: &str) -> MonitorResult<Vec<LogEvent>> {
    raw.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            parse_trace_line(line).map_err(|reason| MonitorError::TraceParse {
                line: line_no,
                reason,
            })
        })
        .collect()
}

pub fn read_trace(path: &Path) -> MonitorResult<Vec<LogEvent>> {
    let raw = fs::read_to_string(path)?;
    parse_trace(&raw)
}

/// trace 中出现过的最大节点号
pub fn max_node_id(events: &[LogEvent]) -> Option<usize> {
    events.iter().map(|e| e.node.0).max()
}
