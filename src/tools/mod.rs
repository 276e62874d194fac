//! 工具层：Tool trait、注册表、执行器与「智能体即工具」编排

pub mod agent;
pub mod context;
pub mod echo;
pub mod executor;
pub mod registry;
pub mod schema;

pub use agent::{
    calculations_agent, content_management_agent, prepare_messages, web_search_agent, AgentTool,
    Collected, StreamCollector,
};
pub use context::{ToolCall, ToolCallParams};
pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
pub use schema::agent_tool_schema;
