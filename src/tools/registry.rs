//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按名注册与查找，ToolExecutor 在调用时加超时与审计日志。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::chat::Message;
use crate::core::AgentError;
use crate::tools::context::ToolCallParams;

/// 工具 trait：名称、描述（供上游模型理解）、参数 Schema、异步执行
///
/// execute 消费整个 ToolCallParams（每次调用独占），产出一条带
/// tool_call_id 的 tool 消息。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（同时是该工具在转写 state 中的键）
    fn name(&self) -> &str;

    /// 工具描述（供上游模型理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认空对象表示无参数约束
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具
    async fn execute(&self, params: ToolCallParams) -> Result<Message, AgentError>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub async fn execute(&self, name: &str, params: ToolCallParams) -> Result<Message, AgentError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;
        tool.execute(params).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 返回 (name, description) 列表，供上游拼装可用工具说明
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect()
    }

    /// 全部工具的声明 JSON（name / description / parameters），供上游模型消费
    pub fn to_schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|(name, tool)| {
                serde_json::json!({
                    "name": name,
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }
}
