//! Mock 网格后端（测试用，无需真实端点）
//!
//! 以固定脚本回放 chunk 序列，并记录收到的调用，便于断言出站消息与配置载荷。

use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::chat::chunk::ChatChunk;
use crate::chat::client::{ChatBackend, ChunkStream};
use crate::chat::request::ChatCall;
use crate::core::AgentError;

/// Mock 后端：每次调用回放同一份 chunk 脚本，可选在末尾注入一个传输错误
#[derive(Debug, Default)]
pub struct MockChatBackend {
    chunks: Vec<ChatChunk>,
    trailing_error: Option<String>,
    calls: Mutex<Vec<ChatCall>>,
}

impl MockChatBackend {
    pub fn new(chunks: Vec<ChatChunk>) -> Self {
        Self {
            chunks,
            trailing_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 回放完脚本后以一个传输错误终止流（模拟中途断流）
    pub fn with_trailing_error(mut self, message: impl Into<String>) -> Self {
        self.trailing_error = Some(message.into());
        self
    }

    /// 已收到的全部调用（按到达顺序）
    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 最近一次调用
    pub fn last_call(&self) -> Option<ChatCall> {
        self.calls().pop()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn stream_chat(&self, call: ChatCall) -> Result<ChunkStream, AgentError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let mut items: Vec<Result<ChatChunk, AgentError>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(message) = &self.trailing_error {
            items.push(Err(AgentError::Transport(message.clone())));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}
