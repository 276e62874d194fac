//! 网格调用错误类型
//!
//! 整个 crate 共用一个 AgentError：参数与传播源的结构错误、流的传输错误、
//! chunk 解析错误、工具执行与超时、配置与取消，统一用 `?` 向上传播。

use thiserror::Error;

/// 智能体互调用过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 必填参数缺失或参数/传播源结构不合法；请求发出前即中止，不重试
    #[error("Structural error: {0}")]
    Structural(String),

    /// 打开或读取响应流失败；不重试，直接向上传播（重试策略属于外部传输层）
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Config error: {0}")]
    Config(String),

    /// 本次调用被取消；并发的兄弟调用不受影响
    #[error("Cancelled")]
    Cancelled,
}
