//! 共享响应面：Stage 树与顶层附件的渲染目标
//!
//! 多个并发调用共享同一个 ResponseSurface，各自开启自己的 Stage。句柄内部
//! 用互斥锁串行化追加（表面边界的单写者纪律）；单个 Stage 自身的追加顺序
//! 即调用方的调用顺序。锁只在同步短临界区内持有，从不跨越 await。

use std::sync::{Arc, Mutex, MutexGuard};

use crate::chat::Attachment;

/// Stage 生命周期：开启 -> 关闭，只关闭一次
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageStatus {
    Open,
    Closed,
}

#[derive(Debug)]
struct StageInner {
    name: String,
    content: String,
    attachments: Vec<Attachment>,
    status: StageStatus,
}

/// Stage 只读快照（渲染与测试用）
#[derive(Clone, Debug)]
pub struct StageSnapshot {
    pub name: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub status: StageStatus,
}

/// 进行中工作的一个命名单元；句柄可廉价 Clone、跨任务共享
///
/// 开启期间只追加、从不替换；关闭后的一切追加都是受保护的 no-op（记日志，
/// 不报错），关闭本身幂等。
#[derive(Clone, Debug)]
pub struct Stage {
    inner: Arc<Mutex<StageInner>>,
}

impl Stage {
    fn new(name: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StageInner {
                name,
                content: String::new(),
                attachments: Vec::new(),
                status: StageStatus::Open,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StageInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 追加名称后缀
    pub fn append_name(&self, suffix: &str) {
        let mut inner = self.lock();
        if inner.status == StageStatus::Closed {
            tracing::warn!(stage = %inner.name, "append_name on closed stage ignored");
            return;
        }
        inner.name.push_str(suffix);
    }

    /// 追加正文片段
    pub fn append_content(&self, delta: &str) {
        let mut inner = self.lock();
        if inner.status == StageStatus::Closed {
            tracing::warn!(stage = %inner.name, "append_content on closed stage ignored");
            return;
        }
        inner.content.push_str(delta);
    }

    /// 追加一个附件
    pub fn add_attachment(&self, attachment: Attachment) {
        let mut inner = self.lock();
        if inner.status == StageStatus::Closed {
            tracing::warn!(stage = %inner.name, "add_attachment on closed stage ignored");
            return;
        }
        inner.attachments.push(attachment);
    }

    /// 关闭 Stage；重复关闭是 no-op，从不报错
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.status = StageStatus::Closed;
    }

    pub fn status(&self) -> StageStatus {
        self.lock().status
    }

    pub fn is_closed(&self) -> bool {
        self.status() == StageStatus::Closed
    }

    pub fn snapshot(&self) -> StageSnapshot {
        let inner = self.lock();
        StageSnapshot {
            name: inner.name.clone(),
            content: inner.content.clone(),
            attachments: inner.attachments.clone(),
            status: inner.status,
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceInner {
    stages: Vec<Stage>,
    attachments: Vec<Attachment>,
}

/// 共享响应面：开启 Stage、追加顶层附件
///
/// 所有方法都可被并发调用安全访问；追加在句柄内部串行化。
#[derive(Clone, Debug, Default)]
pub struct ResponseSurface {
    inner: Arc<Mutex<SurfaceInner>>,
}

impl ResponseSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 开启一个新 Stage 并返回其句柄
    pub fn open_stage(&self, name: impl Into<String>) -> Stage {
        let stage = Stage::new(name.into());
        self.lock().stages.push(stage.clone());
        stage
    }

    /// 追加一个顶层附件（调用结束时附件从 Stage 内提升到这里）
    pub fn add_attachment(&self, attachment: Attachment) {
        self.lock().attachments.push(attachment);
    }

    /// 已开启的全部 Stage（按开启顺序）
    pub fn stages(&self) -> Vec<Stage> {
        self.lock().stages.clone()
    }

    /// 顶层附件（按追加顺序）
    pub fn attachments(&self) -> Vec<Attachment> {
        self.lock().attachments.clone()
    }
}
