//! 邻居链路统计
//!
//! 节点周期性打印 `{"tx": .., "ack": .., "rx": .., "neighbor": "<addr>"}` 形式的
//! 链路统计。这里把第一个 `{` 之后的 JSON 片段解析成无 schema 的键值表。

use serde_json::{Map, Value};

/// 一条解析成功的邻居链路统计
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborLinkReport {
    /// 邻居标识：字符串原样使用，其它 JSON 值取其 JSON 文本
    pub neighbor: String,
    /// 去掉 `neighbor` 字段后的其余字段
    pub fields: Map<String, Value>,
}

/// 解析消息中内嵌的链路统计。
///
/// 没有 `{`、JSON 非法、不是对象或缺少 `neighbor` 字段时返回 `None`。
/// 片段之后的多余文本（例如行尾残留）会被忽略。
pub fn parse_neighbor_link(message: &str) -> Option<NeighborLinkReport> {
    let start = message.find('{')?;
    let mut stream = serde_json::Deserializer::from_str(&message[start..]).into_iter::<Value>();
    let mut fields = match stream.next()? {
        Ok(Value::Object(map)) => map,
        _ => return None,
    };
    let neighbor = match fields.remove("neighbor")? {
        Value::String(s) => s,
        other => other.to_string(),
    };
    Some(NeighborLinkReport { neighbor, fields })
}
