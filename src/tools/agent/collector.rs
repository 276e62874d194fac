//! 流重建器
//!
//! 逐 chunk 消费被调用方的流式响应：累计正文并实时镜像到调用方 Stage，
//! 累计 state（后写覆盖）与附件，按 index 重建嵌套 Stage 树。唯一的挂起点
//! 是等待下一个 chunk（或取消），chunk 之间的处理全部同步、按到达顺序执行。

use std::collections::HashMap;

use futures_util::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::chat::{
    is_meaningful_state, Attachment, ChatChunk, ChunkStream, StageDelta, STAGE_STATUS_COMPLETED,
};
use crate::core::AgentError;
use crate::surface::{ResponseSurface, Stage};

/// 重建完成后的汇总结果
#[derive(Debug, Default)]
pub struct Collected {
    /// 累计正文（与镜像到调用方 Stage 的内容一致）
    pub content: String,
    /// 最后一次非空 state（整体替换，不合并）
    pub state: Option<Value>,
    /// 展平后的附件列表（按到达顺序）
    pub attachments: Vec<Attachment>,
}

/// 单次调用的流重建器；StageIndexMap 随本次消费存亡
pub struct StreamCollector {
    stage: Stage,
    choice: ResponseSurface,
    content: String,
    state: Option<Value>,
    attachments: Vec<Attachment>,
    stages: HashMap<u64, Stage>,
}

impl StreamCollector {
    pub fn new(stage: Stage, choice: ResponseSurface) -> Self {
        Self {
            stage,
            choice,
            content: String::new(),
            state: None,
            attachments: Vec::new(),
            stages: HashMap::new(),
        }
    }

    /// 消费整个 chunk 流
    ///
    /// 正常结束时关闭所有仍开启的 Stage；传输错误与取消同样先关闭再传播，
    /// 不把「进行中」的 UI 状态留在界面上。已经流出的部分内容保持已渲染状态。
    pub async fn collect(
        mut self,
        mut chunks: ChunkStream,
        cancel_token: &CancellationToken,
    ) -> Result<Collected, AgentError> {
        loop {
            let next = tokio::select! {
                _ = cancel_token.cancelled() => {
                    self.close_open_stages();
                    return Err(AgentError::Cancelled);
                }
                next = chunks.next() => next,
            };
            let Some(item) = next else {
                break;
            };
            match item {
                Ok(chunk) => self.apply_chunk(&chunk),
                Err(e) => {
                    self.close_open_stages();
                    return Err(e);
                }
            }
        }

        self.close_open_stages();
        Ok(Collected {
            content: self.content,
            state: self.state,
            attachments: self.attachments,
        })
    }

    /// 应用单个 chunk；只消费第一个 choice 的 delta
    fn apply_chunk(&mut self, chunk: &ChatChunk) {
        let Some(delta) = chunk.choices.first().and_then(|c| c.delta.as_ref()) else {
            return;
        };

        if let Some(text) = delta.content.as_deref() {
            self.stage.append_content(text);
            self.content.push_str(text);
        }

        let Some(cc) = delta.custom_content.as_ref() else {
            return;
        };
        if let Some(attachments) = cc.attachments.as_ref() {
            self.attachments.extend(attachments.iter().cloned());
        }
        if let Some(state) = cc.state.as_ref() {
            // 后写覆盖：只保留最近一次非空 state，空增量不清空已有值
            if is_meaningful_state(state) {
                self.state = Some(state.clone());
            }
        }
        if let Some(stage_deltas) = cc.stages.as_ref() {
            for stage_delta in stage_deltas {
                self.apply_stage_delta(stage_delta);
            }
        }
    }

    /// 应用单个 Stage 增量
    ///
    /// 字段按固定优先级分发：name > content > attachments > completed，
    /// 首个命中的字段生效，同一增量里更低优先级的字段不再应用。
    fn apply_stage_delta(&mut self, delta: &StageDelta) {
        if let Some(stage) = self.stages.get(&delta.index) {
            Self::apply_field(stage, delta);
        } else {
            // 首见该 index：以 name 开启；非 name 字段首见时以空名开启后再应用
            let stage = self.choice.open_stage(delta.name.clone().unwrap_or_default());
            if delta.name.is_none() {
                Self::apply_field(&stage, delta);
            }
            self.stages.insert(delta.index, stage);
        }
    }

    fn apply_field(stage: &Stage, delta: &StageDelta) {
        if let Some(name) = delta.name.as_deref() {
            stage.append_name(name);
        } else if let Some(content) = delta.content.as_deref() {
            stage.append_content(content);
        } else if let Some(attachments) = delta.attachments.as_ref() {
            for attachment in attachments {
                stage.add_attachment(attachment.clone());
            }
        } else if delta.status.as_deref() == Some(STAGE_STATUS_COMPLETED) {
            // 关闭幂等；其余 status 值一律忽略（向前兼容）
            stage.close();
        }
    }

    fn close_open_stages(&self) {
        for stage in self.stages.values() {
            stage.close();
        }
    }
}
