//! 工具执行器
//!
//! 持有 ToolRegistry 与全局超时，execute(tool_name, params) 在超时内调用
//! registry.execute，超时映射为 AgentError::ToolTimeout；每次调用输出
//! 结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::chat::Message;
use crate::core::AgentError;
use crate::tools::context::ToolCallParams;
use crate::tools::registry::ToolRegistry;

/// 工具执行器：对每次调用施加超时，并输出 JSON 审计日志
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具；超时返回 ToolTimeout，其余错误原样向上传播
    pub async fn execute(
        &self,
        tool_name: &str,
        params: ToolCallParams,
    ) -> Result<Message, AgentError> {
        let start = Instant::now();
        let args_preview = args_preview(&params.tool_call.arguments);
        let result = timeout(self.timeout, self.registry.execute(tool_name, params)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(inner) => inner,
            Err(_) => Err(AgentError::ToolTimeout(tool_name.to_string())),
        }
    }

    pub fn get_tool(&self, name: &str) -> Option<std::sync::Arc<dyn crate::tools::Tool>> {
        self.registry.get(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.tool_names()
    }
}

fn args_preview(args: &str) -> String {
    if args.len() > 200 {
        format!("{}...", args.chars().take(200).collect::<String>())
    } else {
        args.to_string()
    }
}
