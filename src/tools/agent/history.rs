//! 被调用方上下文构造（历史传播）
//!
//! 两种模式：一次性（只发一条带 prompt 的 user 消息）；传播模式（从扁平转写
//! 中还原与该被调用方的私有往来线程，再追加新的 prompt）。每个被调用方只
//! 看见自己的线程，对兄弟线程一无所知。

use serde_json::Value;

use crate::chat::{is_meaningful_state, Message, Role};
use crate::core::AgentError;

/// 构造发给被调用方的消息列表
///
/// 传播模式下：对每条 state 中含有 callee 键的助手消息，先发它前面那条
/// 消息（原样），再发一份 state 收窄到该被调用方子状态的助手消息副本。
/// 顺序严格按转写顺序，不去重。转写中从未出现该键时退化为一次性模式。
pub fn prepare_messages(
    transcript: &[Message],
    prompt: &str,
    propagate_history: bool,
    callee: &str,
) -> Result<Vec<Message>, AgentError> {
    let mut messages = Vec::new();

    if propagate_history {
        for (idx, msg) in transcript.iter().enumerate() {
            if msg.role != Role::Assistant {
                continue;
            }
            let Some(sub_state) = callee_state(msg, callee) else {
                continue;
            };
            if idx == 0 {
                // 助手消息总该有前一条请求消息；没有说明转写本身已损坏
                return Err(AgentError::Structural(format!(
                    "assistant turn carrying state for '{callee}' has no preceding turn"
                )));
            }
            messages.push(transcript[idx - 1].clone());
            messages.push(narrowed_assistant(msg, sub_state.clone()));
        }
    }

    // 新的 user 消息总是携带当前最后一条转写消息的 custom_content，
    // 从不携带历史上的那份
    messages.push(Message {
        role: Role::User,
        content: Some(prompt.to_string()),
        tool_call_id: None,
        custom_content: transcript.last().and_then(|m| m.custom_content.clone()),
    });

    Ok(messages)
}

/// 取出该被调用方在助手消息 state 中的子状态；缺失或为空视为不匹配
fn callee_state<'a>(msg: &'a Message, callee: &str) -> Option<&'a Value> {
    let state = msg.custom_content.as_ref()?.state.as_ref()?;
    let sub = state.get(callee)?;
    is_meaningful_state(sub).then_some(sub)
}

/// 深拷贝并收窄：复制整条助手消息，state 替换为该被调用方自己的子状态。
/// 纯转换，产出新消息，从不原地修改共享转写。
fn narrowed_assistant(msg: &Message, sub_state: Value) -> Message {
    let mut copied = msg.clone();
    if let Some(cc) = copied.custom_content.as_mut() {
        cc.state = Some(sub_state);
    }
    copied
}
