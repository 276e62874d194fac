//! Echo 工具
//!
//! 最小的 Tool 实现：把 text 参数镜像到自己的 Stage 并作为 tool 消息返回。
//! 用于测试注册表、执行器与 Stage 链路。

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::Message;
use crate::core::AgentError;
use crate::tools::context::ToolCallParams;
use crate::tools::registry::Tool;

/// 回显工具
#[derive(Debug, Default)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "原样回显 text 参数"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "要回显的内容"}
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, params: ToolCallParams) -> Result<Message, AgentError> {
        let args: Value = serde_json::from_str(&params.tool_call.arguments)
            .map_err(|e| AgentError::Structural(format!("invalid echo arguments: {e}")))?;
        let text = args
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        params.stage.append_content(&text);
        Ok(Message::tool(text, params.tool_call.id.clone()))
    }
}
