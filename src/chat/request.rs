//! 出站请求结构
//!
//! 请求体：消息列表 + stream 标志 + custom_fields.configuration（不透明配置，
//! 即工具调用参数去掉 prompt 后的剩余部分）。会话关联 id 与凭证经 ChatCall
//! 随请求头传递。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::message::Message;

/// 请求体中的 custom_fields 段
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
}

/// 一次聊天补全请求的请求体
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<CustomFields>,
}

impl ChatRequest {
    /// 流式请求
    pub fn streaming(messages: Vec<Message>) -> Self {
        Self {
            messages,
            stream: true,
            custom_fields: None,
        }
    }

    /// 附带不透明配置载荷（被调用方自行解释）
    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.custom_fields = Some(CustomFields {
            configuration: Some(configuration),
        });
        self
    }
}

/// 一次对网格部署的完整调用：部署名 + 请求体 + 凭证 + 会话关联 id
#[derive(Clone, Debug)]
pub struct ChatCall {
    pub deployment: String,
    pub request: ChatRequest,
    pub api_key: String,
    pub conversation_id: String,
}
