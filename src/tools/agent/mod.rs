//! 智能体即工具（调用编排器）
//!
//! 把网格上的另一个智能体当作工具调用：解析参数、构造被调用方可见的消息
//! 列表、发起流式请求、驱动流重建，最终产出一条带 tool_call_id 的 tool 消息。
//! 网格上的所有应用都提供同一个聊天补全端点并遵循统一协议，因此互相调用
//! 与调用模型别无二致，由发起方提供并管理全部上下文。

pub mod collector;
pub mod history;
pub mod mesh;

pub use collector::{Collected, StreamCollector};
pub use history::prepare_messages;
pub use mesh::{
    calculations_agent, content_management_agent, web_search_agent, CALCULATIONS_DEPLOYMENT,
    CONTENT_MANAGEMENT_DEPLOYMENT, WEB_SEARCH_DEPLOYMENT,
};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::chat::{ChatBackend, ChatCall, ChatRequest, CustomContent, Message};
use crate::core::AgentError;
use crate::tools::context::ToolCallParams;
use crate::tools::registry::Tool;
use crate::tools::schema::agent_tool_schema;

/// 网格智能体工具：工具名同时是该智能体在转写 state 中的键
pub struct AgentTool {
    name: String,
    description: String,
    deployment: String,
    backend: Arc<dyn ChatBackend>,
}

impl AgentTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        deployment: impl Into<String>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            deployment: deployment.into(),
            backend,
        }
    }

    /// 被调用方的部署名
    pub fn deployment(&self) -> &str {
        &self.deployment
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        agent_tool_schema()
    }

    async fn execute(&self, params: ToolCallParams) -> Result<Message, AgentError> {
        // 1. 解析参数：prompt 必填；取出后追加到调用方 Stage 名称，
        //    其余键（含 propagate_history）原样作为不透明配置转发
        let mut arguments: Map<String, Value> = serde_json::from_str(&params.tool_call.arguments)
            .map_err(|e| AgentError::Structural(format!("invalid tool arguments: {e}")))?;
        let prompt = match arguments.remove("prompt") {
            Some(Value::String(prompt)) => prompt,
            Some(_) => {
                return Err(AgentError::Structural(
                    "'prompt' must be a string".to_string(),
                ))
            }
            None => {
                return Err(AgentError::Structural(
                    "missing required 'prompt'".to_string(),
                ))
            }
        };
        if !prompt.is_empty() {
            params.stage.append_name(&format!(": {}", prompt));
        }
        let propagate_history = arguments
            .get("propagate_history")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        // 2. 构造被调用方可见的消息列表并发起流式调用
        let messages = prepare_messages(&params.messages, &prompt, propagate_history, &self.name)?;
        let request =
            ChatRequest::streaming(messages).with_configuration(Value::Object(arguments));
        let chunks = self
            .backend
            .stream_chat(ChatCall {
                deployment: self.deployment.clone(),
                request,
                api_key: params.api_key.clone(),
                conversation_id: params.conversation_id.clone(),
            })
            .await?;

        // 3-5. 驱动流重建：镜像正文、重建 Stage 树、累计 state 与附件
        let collected = StreamCollector::new(params.stage.clone(), params.choice.clone())
            .collect(chunks, &params.cancel_token)
            .await?;

        // 6. 附件提升到响应面顶层；tool 消息带上累计 state 与附件，
        //    供后续把本次往来写回转写
        for attachment in &collected.attachments {
            params.choice.add_attachment(attachment.clone());
        }
        let custom_content = CustomContent {
            state: collected.state,
            attachments: Some(collected.attachments),
        };
        Ok(Message::tool(collected.content, params.tool_call.id.clone())
            .with_custom_content(custom_content))
    }
}
