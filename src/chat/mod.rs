//! 统一聊天协议层：消息模型、流式 chunk、出站请求与网格后端抽象

pub mod chunk;
pub mod client;
pub mod message;
pub mod mock;
pub mod request;

pub use chunk::{
    ChatChunk, ChunkChoice, ChunkDelta, CustomContentDelta, StageDelta, STAGE_STATUS_COMPLETED,
};
pub use client::{ChatBackend, ChunkStream, HttpChatBackend};
pub use message::{is_meaningful_state, Attachment, CustomContent, Message, Role};
pub use mock::MockChatBackend;
pub use request::{ChatCall, ChatRequest, CustomFields};
