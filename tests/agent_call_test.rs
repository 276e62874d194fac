//! 智能体互调用集成测试：注册表 + 执行器 + Mock 网格后端走完整链路

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use hive::chat::{
    Attachment, ChatChunk, CustomContent, CustomContentDelta, Message, MockChatBackend, Role,
    StageDelta,
};
use hive::core::AgentError;
use hive::surface::ResponseSurface;
use hive::tools::{
    web_search_agent, EchoTool, Tool, ToolCall, ToolCallParams, ToolExecutor, ToolRegistry,
};

fn scripted_chunks() -> Vec<ChatChunk> {
    vec![
        ChatChunk::content("He"),
        ChatChunk::content("llo"),
        ChatChunk::custom(CustomContentDelta {
            state: Some(json!({"step": 1})),
            ..CustomContentDelta::default()
        }),
        ChatChunk::stages(vec![StageDelta::name(0, "Searching")]),
        ChatChunk::stages(vec![StageDelta::content(0, "3 results")]),
        ChatChunk::custom(CustomContentDelta {
            state: Some(json!({"step": 2})),
            attachments: Some(vec![Attachment::titled("result page")]),
            ..CustomContentDelta::default()
        }),
        ChatChunk::stages(vec![StageDelta::completed(0)]),
    ]
}

fn executor_with(backend: Arc<MockChatBackend>, timeout_secs: u64) -> ToolExecutor {
    let mut registry = ToolRegistry::new();
    registry.register(web_search_agent(backend));
    registry.register(EchoTool);
    ToolExecutor::new(registry, timeout_secs)
}

fn invocation_params(
    surface: &ResponseSurface,
    transcript: Vec<Message>,
    arguments: &str,
) -> ToolCallParams {
    let stage = surface.open_stage("web-search-agent");
    ToolCallParams::new(
        ToolCall::new("call_42", "web-search-agent", arguments),
        stage,
        surface.clone(),
        transcript,
        "conv-7",
        "secret-key",
    )
}

#[tokio::test]
async fn test_full_invocation_produces_tool_turn() {
    hive::observability::init();

    let backend = Arc::new(MockChatBackend::new(scripted_chunks()));
    let executor = executor_with(backend.clone(), 30);
    let surface = ResponseSurface::new();
    let params = invocation_params(&surface, vec![], r#"{"prompt": "rust news"}"#);
    let caller_stage = params.stage.clone();

    let msg = executor.execute("web-search-agent", params).await.unwrap();

    // tool 消息：正文 = 累计内容，必须回显 tool_call_id
    assert_eq!(msg.role, Role::Tool);
    assert_eq!(msg.content.as_deref(), Some("Hello"));
    assert_eq!(msg.tool_call_id.as_deref(), Some("call_42"));

    // custom_content：最后一次非空 state + 展平的附件
    let cc = msg.custom_content.as_ref().unwrap();
    assert_eq!(cc.state, Some(json!({"step": 2})));
    assert_eq!(cc.attachments.as_ref().unwrap().len(), 1);

    // 正文实时镜像到调用方 Stage，名称带上 prompt
    let snap = caller_stage.snapshot();
    assert_eq!(snap.name, "web-search-agent: rust news");
    assert_eq!(snap.content, "Hello");

    // 被传播的 Stage 已按名称开启、累计内容并关闭
    let propagated = surface.stages()[1].snapshot();
    assert_eq!(propagated.name, "Searching");
    assert_eq!(propagated.content, "3 results");
    assert!(surface.stages()[1].is_closed());

    // 附件提升到响应面顶层
    let top = surface.attachments();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title.as_deref(), Some("result page"));

    // 出站请求：一次性模式只有一条 user 消息，会话关联 id 随调用转发
    let call = backend.last_call().unwrap();
    assert_eq!(call.conversation_id, "conv-7");
    assert_eq!(call.api_key, "secret-key");
    assert!(call.request.stream);
    assert_eq!(call.request.messages.len(), 1);
    assert_eq!(call.request.messages[0].content.as_deref(), Some("rust news"));
}

#[tokio::test]
async fn test_propagated_history_is_isolated_per_callee() {
    let transcript = vec![
        Message::user("search rust"),
        Message::assistant("found it").with_custom_content(CustomContent {
            state: Some(json!({
                "web-search-agent": {"query": "rust"},
                "calculations-agent": {"x": 1}
            })),
            attachments: None,
        }),
        Message::user("now calculate"),
        Message::assistant("4").with_custom_content(CustomContent {
            state: Some(json!({"calculations-agent": {"x": 2}})),
            attachments: None,
        }),
    ];

    let backend = Arc::new(MockChatBackend::new(vec![ChatChunk::content("ok")]));
    let executor = executor_with(backend.clone(), 30);
    let surface = ResponseSurface::new();
    let params = invocation_params(
        &surface,
        transcript,
        r#"{"prompt": "again", "propagate_history": true}"#,
    );

    executor.execute("web-search-agent", params).await.unwrap();

    let sent = backend.last_call().unwrap().request.messages;
    // 只还原本工具自己的线程：user + 收窄的 assistant + 新 prompt
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].content.as_deref(), Some("search rust"));
    let narrowed = sent[1].custom_content.as_ref().unwrap().state.clone().unwrap();
    assert_eq!(narrowed, json!({"query": "rust"}));
    assert!(narrowed.get("calculations-agent").is_none());
    assert_eq!(sent[2].content.as_deref(), Some("again"));
}

#[tokio::test]
async fn test_transport_failure_keeps_partial_render_and_closes_stages() {
    let backend = Arc::new(
        MockChatBackend::new(vec![
            ChatChunk::content("partial"),
            ChatChunk::stages(vec![StageDelta::name(0, "Fetching")]),
        ])
        .with_trailing_error("connection reset"),
    );
    let executor = executor_with(backend, 30);
    let surface = ResponseSurface::new();
    let params = invocation_params(&surface, vec![], r#"{"prompt": "x"}"#);
    let caller_stage = params.stage.clone();

    let err = executor
        .execute("web-search-agent", params)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Transport(_)));
    // 已流出的内容保持已渲染状态，只缺最终的 tool 消息
    assert_eq!(caller_stage.snapshot().content, "partial");
    assert!(surface.stages()[1].is_closed());
}

#[tokio::test]
async fn test_unknown_tool_is_rejected() {
    let backend = Arc::new(MockChatBackend::new(vec![]));
    let executor = executor_with(backend, 30);
    let surface = ResponseSurface::new();
    let params = invocation_params(&surface, vec![], r#"{"prompt": "x"}"#);

    let err = executor.execute("no-such-tool", params).await.unwrap_err();
    assert!(matches!(err, AgentError::UnknownTool(_)));
}

/// 一直不返回的工具，用于触发执行器超时
struct StallingTool;

#[async_trait]
impl Tool for StallingTool {
    fn name(&self) -> &str {
        "stall"
    }

    fn description(&self) -> &str {
        "never finishes"
    }

    async fn execute(&self, params: ToolCallParams) -> Result<Message, AgentError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Message::tool("unreachable", params.tool_call.id))
    }
}

#[tokio::test]
async fn test_executor_timeout_maps_to_tool_timeout() {
    let mut registry = ToolRegistry::new();
    registry.register(StallingTool);
    let executor = ToolExecutor::new(registry, 0);

    let surface = ResponseSurface::new();
    let params = invocation_params(&surface, vec![], r#"{"prompt": "x"}"#);
    let err = executor.execute("stall", params).await.unwrap_err();
    assert!(matches!(err, AgentError::ToolTimeout(_)));
}

#[tokio::test]
async fn test_concurrent_invocations_keep_their_own_stage_trees() {
    // 两个并发调用共享同一个响应面，各自的 Stage 索引互不串扰
    let backend_a = Arc::new(MockChatBackend::new(vec![
        ChatChunk::stages(vec![StageDelta::name(0, "A0")]),
        ChatChunk::content("from a"),
    ]));
    let backend_b = Arc::new(MockChatBackend::new(vec![
        ChatChunk::stages(vec![StageDelta::name(0, "B0")]),
        ChatChunk::content("from b"),
    ]));

    let surface = ResponseSurface::new();
    let tool_a = web_search_agent(backend_a);
    let tool_b = web_search_agent(backend_b);

    let params_a = invocation_params(&surface, vec![], r#"{"prompt": "a"}"#);
    let params_b = invocation_params(&surface, vec![], r#"{"prompt": "b"}"#);
    let stage_a = params_a.stage.clone();
    let stage_b = params_b.stage.clone();

    let (ra, rb) = tokio::join!(tool_a.execute(params_a), tool_b.execute(params_b));
    ra.unwrap();
    rb.unwrap();

    assert_eq!(stage_a.snapshot().content, "from a");
    assert_eq!(stage_b.snapshot().content, "from b");

    // 响应面共 4 个 Stage：两个调用方 Stage + 两个被传播的 Stage，全部关闭的只有被传播的
    let names: Vec<String> = surface
        .stages()
        .iter()
        .map(|s| s.snapshot().name)
        .collect();
    assert!(names.iter().any(|n| n == "A0"));
    assert!(names.iter().any(|n| n == "B0"));
}
