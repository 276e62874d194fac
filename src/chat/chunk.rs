//! 流式响应 chunk 的 wire 结构
//!
//! 每个 chunk 携带若干 choice delta；本核心只消费第一个 choice。
//! 未知字段与未知 status 值一律忽略（向前兼容优先于严格校验）。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::message::Attachment;

/// 唯一被识别的 Stage 关闭信号；其余 status 值忽略
pub const STAGE_STATUS_COMPLETED: &str = "completed";

/// 流式响应中的单个 chunk
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// chunk 中的一个 choice（本核心只取第一个）
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<ChunkDelta>,
}

/// 增量内容：正文片段与/或 custom_content 增量
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<CustomContentDelta>,
}

/// custom_content 增量：附件追加、state 整体替换、Stage 增量列表
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomContentDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<StageDelta>>,
}

/// 单个 Stage 的一次增量更新
///
/// index 只在一次调用的响应流内有意义。字段按 name > content > attachments >
/// completed 的固定优先级分发，一次只生效一个。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageDelta {
    pub index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ChatChunk {
    /// 仅含正文片段的 chunk
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: Some(ChunkDelta {
                    content: Some(text.into()),
                    custom_content: None,
                }),
            }],
        }
    }

    /// 仅含 custom_content 增量的 chunk
    pub fn custom(delta: CustomContentDelta) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: Some(ChunkDelta {
                    content: None,
                    custom_content: Some(delta),
                }),
            }],
        }
    }

    /// 仅含 Stage 增量的 chunk
    pub fn stages(stages: Vec<StageDelta>) -> Self {
        Self::custom(CustomContentDelta {
            stages: Some(stages),
            ..CustomContentDelta::default()
        })
    }
}

impl StageDelta {
    pub fn name(index: u64, name: impl Into<String>) -> Self {
        Self {
            index,
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn content(index: u64, content: impl Into<String>) -> Self {
        Self {
            index,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn attachments(index: u64, attachments: Vec<Attachment>) -> Self {
        Self {
            index,
            attachments: Some(attachments),
            ..Self::default()
        }
    }

    pub fn completed(index: u64) -> Self {
        Self {
            index,
            status: Some(STAGE_STATUS_COMPLETED.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_deserialization() {
        let raw = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "delta": {
                    "content": "He",
                    "custom_content": {
                        "state": {"calc": {"x": 1}},
                        "stages": [{"index": 0, "name": "Step"}]
                    }
                }
            }]
        });
        let chunk: ChatChunk = serde_json::from_value(raw).unwrap();
        let delta = chunk.choices[0].delta.as_ref().unwrap();
        assert_eq!(delta.content.as_deref(), Some("He"));
        let cc = delta.custom_content.as_ref().unwrap();
        assert_eq!(cc.state, Some(json!({"calc": {"x": 1}})));
        assert_eq!(cc.stages.as_ref().unwrap()[0].name.as_deref(), Some("Step"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let raw = json!({
            "choices": [{
                "delta": {
                    "content": "x",
                    "reasoning": "should be ignored",
                    "custom_content": {"stages": [{"index": 3, "status": "running"}]}
                }
            }]
        });
        let chunk: ChatChunk = serde_json::from_value(raw).unwrap();
        let delta = chunk.choices[0].delta.as_ref().unwrap();
        let stage = &delta.custom_content.as_ref().unwrap().stages.as_ref().unwrap()[0];
        assert_eq!(stage.status.as_deref(), Some("running"));
        assert_ne!(stage.status.as_deref(), Some(STAGE_STATUS_COMPLETED));
    }

    #[test]
    fn test_empty_chunk_tolerated() {
        let chunk: ChatChunk = serde_json::from_str("{}").unwrap();
        assert!(chunk.choices.is_empty());
    }
}
