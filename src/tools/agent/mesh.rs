//! 网格内置部署
//!
//! 三个互为工具的智能体部署（与核心配置中的部署名一致），工厂函数只在
//! 身份与描述上有差异，行为全部由通用的 AgentTool 承担。

use std::sync::Arc;

use crate::chat::ChatBackend;
use crate::tools::agent::AgentTool;

pub const CALCULATIONS_DEPLOYMENT: &str = "calculations-agent";
pub const WEB_SEARCH_DEPLOYMENT: &str = "web-search-agent";
pub const CONTENT_MANAGEMENT_DEPLOYMENT: &str = "content-management-agent";

/// 计算智能体：数学计算与数值推理
pub fn calculations_agent(backend: Arc<dyn ChatBackend>) -> AgentTool {
    AgentTool::new(
        CALCULATIONS_DEPLOYMENT,
        "调用计算智能体：数学计算与数值推理",
        CALCULATIONS_DEPLOYMENT,
        backend,
    )
}

/// 网络搜索智能体：联网检索与信息汇总
pub fn web_search_agent(backend: Arc<dyn ChatBackend>) -> AgentTool {
    AgentTool::new(
        WEB_SEARCH_DEPLOYMENT,
        "调用网络搜索智能体：联网检索与信息汇总",
        WEB_SEARCH_DEPLOYMENT,
        backend,
    )
}

/// 内容管理智能体：文档内容抽取与问答
pub fn content_management_agent(backend: Arc<dyn ChatBackend>) -> AgentTool {
    AgentTool::new(
        CONTENT_MANAGEMENT_DEPLOYMENT,
        "调用内容管理智能体：文档内容抽取与问答",
        CONTENT_MANAGEMENT_DEPLOYMENT,
        backend,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatBackend;
    use crate::tools::Tool;

    #[test]
    fn test_factories_share_the_generic_agent_tool() {
        let backend = Arc::new(MockChatBackend::new(vec![]));
        let search = web_search_agent(backend.clone());
        let calc = calculations_agent(backend);

        assert_eq!(search.name(), WEB_SEARCH_DEPLOYMENT);
        assert_eq!(search.deployment(), WEB_SEARCH_DEPLOYMENT);
        assert_eq!(calc.name(), CALCULATIONS_DEPLOYMENT);
        // 两者共享同一套参数约定
        assert_eq!(search.parameters_schema(), calc.parameters_schema());
    }
}
