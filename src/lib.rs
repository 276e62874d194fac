//! Hive - Rust 多智能体网格
//!
//! 网格上的每个智能体都暴露同一个流式聊天补全端点，于是任何智能体都能把
//! 另一个智能体当作工具调用。本 crate 是这套互调用的核心。
//!
//! 模块划分：
//! - **chat**: 统一聊天协议（消息模型、流式 chunk、出站请求与网格后端）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **observability**: tracing 初始化
//! - **surface**: 共享响应面（Stage 树与顶层附件）
//! - **tools**: 工具 trait、注册表、执行器与「智能体即工具」编排

pub mod chat;
pub mod config;
pub mod core;
pub mod observability;
pub mod surface;
pub mod tools;
