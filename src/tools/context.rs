//! 工具调用上下文
//!
//! 每次调用独占一份 ToolCallParams：调用 id 与原始参数、调用方自己的 Stage、
//! 共享响应面、可见转写、会话关联 id、凭证与取消令牌。并发调用之间从不共享。

use tokio_util::sync::CancellationToken;

use crate::chat::Message;
use crate::surface::{ResponseSurface, Stage};

/// 模型发起的一次工具调用：id、工具名与原始 JSON 参数串
#[derive(Clone, Debug)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// 单次工具调用的完整工作集
pub struct ToolCallParams {
    pub tool_call: ToolCall,
    /// 调用方自己的进度 Stage（正文实时镜像到这里）
    pub stage: Stage,
    /// 共享响应面（嵌套 Stage 与顶层附件渲染到这里）
    pub choice: ResponseSurface,
    /// 调用方可见的完整转写
    pub messages: Vec<Message>,
    /// 会话关联 id，随出站请求头转发
    pub conversation_id: String,
    /// 凭证令牌，按传输层约定转发
    pub api_key: String,
    /// 取消只影响本次调用
    pub cancel_token: CancellationToken,
}

impl ToolCallParams {
    pub fn new(
        tool_call: ToolCall,
        stage: Stage,
        choice: ResponseSurface,
        messages: Vec<Message>,
        conversation_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            tool_call,
            stage,
            choice,
            messages,
            conversation_id: conversation_id.into(),
            api_key: api_key.into(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }
}
