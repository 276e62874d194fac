//! 对话消息模型
//!
//! 与统一聊天协议一致的消息结构：角色、正文、tool_call_id 与 custom_content
//! （不透明 state + 附件）。消息一旦进入转写即视为不可变，传播时只做复制与转换。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 消息角色（与协议 wire 格式一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
}

/// 附件：不透明的外部内容引用，核心只原样透传、从不解释
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// 媒体类型（协议字段名为 type）
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl Attachment {
    /// 便于测试与联调的最小构造：仅含标题
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// 消息附带的自定义内容：不透明 state 与附件列表
///
/// 约定：助手消息上的 state 是以被调用方身份为键的映射，
/// 每个值是只有该被调用方自己能理解的子状态。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// 单条消息（一轮对话中的一个回合）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// wire 格式允许 null；本地构造函数总是填入 Some
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 仅 tool 消息携带，必须回显发起调用的 tool call id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<CustomContent>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_call_id: None,
            custom_content: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_call_id: None,
            custom_content: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_call_id: None,
            custom_content: None,
        }
    }

    /// tool 消息必须携带发起调用的 tool_call_id
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            custom_content: None,
        }
    }

    pub fn with_custom_content(mut self, custom_content: CustomContent) -> Self {
        self.custom_content = Some(custom_content);
        self
    }
}

/// state 是否「非空」：null 与空对象视为无内容（与上游协议的真值语义一致）
pub fn is_meaningful_state(state: &Value) -> bool {
    match state {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
