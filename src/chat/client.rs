//! 网格后端抽象与 HTTP 实现
//!
//! ChatBackend：「发一个聊天请求，拿回一个 chunk 序列」的窄接口。
//! HttpChatBackend 按统一协议调用 {endpoint}/openai/deployments/{name}/chat/completions，
//! 以 SSE 读取流式响应（data: 行，[DONE] 结束）。本层不做任何重试。

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use crate::chat::chunk::ChatChunk;
use crate::chat::request::ChatCall;
use crate::config::MeshSection;
use crate::core::AgentError;

/// 流式响应的 chunk 序列；错误项终止整个流
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, AgentError>> + Send>>;

/// 网格后端：发送一次流式聊天请求并返回 chunk 流
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_chat(&self, call: ChatCall) -> Result<ChunkStream, AgentError>;
}

/// 基于 reqwest 的统一协议客户端
///
/// 凭证经 Api-Key 请求头传递，会话关联 id 经 x-conversation-id 请求头传递。
pub struct HttpChatBackend {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
}

impl HttpChatBackend {
    /// 创建客户端；connect 超时取 request 秒数，整次请求（含读流）超时取 stream 秒数
    pub fn new(
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
        request_timeout_secs: u64,
        stream_timeout_secs: u64,
    ) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(request_timeout_secs))
            .timeout(Duration::from_secs(stream_timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        })
    }

    /// 从 [mesh] 配置段创建
    pub fn from_config(mesh: &MeshSection) -> Result<Self, AgentError> {
        Self::new(
            &mesh.endpoint,
            &mesh.api_version,
            mesh.timeouts.request,
            mesh.timeouts.stream,
        )
    }

    fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn stream_chat(&self, call: ChatCall) -> Result<ChunkStream, AgentError> {
        let request_id = Uuid::new_v4();
        let url = self.completions_url(&call.deployment);
        tracing::info!(%request_id, deployment = %call.deployment, "mesh chat request");

        let response = self
            .http
            .post(&url)
            .header("Api-Key", &call.api_key)
            .header("x-conversation-id", &call.conversation_id)
            .json(&call.request)
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Transport(format!(
                "HTTP {status} from deployment {}",
                call.deployment
            )));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            'outer: while let Some(item) = bytes.next().await {
                let piece: Bytes = match item {
                    Ok(piece) => piece,
                    Err(e) => {
                        yield Err(AgentError::Transport(e.to_string()));
                        return;
                    }
                };
                buffer.extend_from_slice(&piece);
                while let Some((at, len)) = find_sse_delimiter(&buffer) {
                    let event = buffer[..at].to_vec();
                    buffer.drain(..at + len);
                    let raw = String::from_utf8_lossy(&event);
                    let Some(data) = parse_sse_data(&raw) else { continue };
                    if data.trim() == "[DONE]" {
                        break 'outer;
                    }
                    match serde_json::from_str::<ChatChunk>(&data) {
                        Ok(chunk) => yield Ok(chunk),
                        Err(e) => {
                            yield Err(AgentError::JsonParse(format!("chunk: {e}")));
                            return;
                        }
                    }
                }
            }
            tracing::debug!(%request_id, "mesh chat stream finished");
        };
        Ok(Box::pin(stream))
    }
}

/// 在缓冲区中找 SSE 事件分隔符，返回（位置, 分隔符长度）；兼容 \r\n\r\n 与 \n\n
fn find_sse_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((pos, 4));
    }
    if let Some(pos) = buf.windows(2).position(|w| w == b"\n\n") {
        return Some((pos, 2));
    }
    None
}

/// 取出事件里的 data 载荷（多行 data: 以换行拼接）；无 data 行返回 None
fn parse_sse_data(raw: &str) -> Option<String> {
    let mut data_lines = Vec::new();
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            // 按 SSE 规范仅去掉一个可选前导空格，载荷其余部分原样保留
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_sse_delimiter_prefers_crlf() {
        assert_eq!(find_sse_delimiter(b"a\r\n\r\nb"), Some((1, 4)));
        assert_eq!(find_sse_delimiter(b"a\n\nb"), Some((1, 2)));
        assert_eq!(find_sse_delimiter(b"no delimiter"), None);
    }

    #[test]
    fn test_parse_sse_data_joins_lines() {
        let raw = "event: message\ndata: first\ndata: second";
        assert_eq!(parse_sse_data(raw).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_parse_sse_data_without_payload() {
        assert_eq!(parse_sse_data("event: ping"), None);
        assert_eq!(parse_sse_data(": comment"), None);
    }

    #[test]
    fn test_completions_url() {
        let backend = HttpChatBackend::new("http://dial:8080/", "2025-01-01-preview", 60, 120)
            .unwrap();
        assert_eq!(
            backend.completions_url("web-search-agent"),
            "http://dial:8080/openai/deployments/web-search-agent/chat/completions?api-version=2025-01-01-preview"
        );
    }
}
