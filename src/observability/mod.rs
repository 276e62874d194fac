//! 可观测性：tracing 初始化
//!
//! 默认 info 级别，RUST_LOG 可覆盖；工具执行的结构化审计日志见 tools::executor。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化 tracing 订阅器；重复调用安全（测试里可多次调用）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
