//! 智能体工具参数 Schema（schemars 自动生成）
//!
//! 网格上的每个智能体工具共享同一套调用参数约定：prompt 必填，
//! propagate_history 可选；其余键原样转发给被调用方。

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// 智能体即工具的调用参数（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct AgentToolArgs {
    /// 发给被调用智能体的请求
    pub prompt: String,
    /// 是否向被调用方回放与其历史上的私有往来线程
    pub propagate_history: Option<bool>,
}

/// 智能体工具的参数 JSON Schema
pub fn agent_tool_schema() -> Value {
    serde_json::to_value(schema_for!(AgentToolArgs)).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": {"prompt": {"type": "string"}},
            "required": ["prompt"]
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_prompt() {
        let schema = agent_tool_schema();
        let required = schema.get("required").and_then(|v| v.as_array()).unwrap();
        assert!(required.iter().any(|v| v == "prompt"));
        assert!(!required.iter().any(|v| v == "propagate_history"));
    }
}
