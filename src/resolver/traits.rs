//! 回复引擎抽象
//!
//! 调度器只依赖 Responder；当前唯一实现是关键词规则（KeywordResponder），
//! 以后接真实后端时在此处换实现即可。

use async_trait::async_trait;

use super::rules::{Reply, ResolveContext};

/// 回复引擎：给定用户输入与上下文，产出一条助手回复
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str, ctx: &ResolveContext) -> Reply;

    /// 日志中显示的名字
    fn name(&self) -> &str {
        "responder"
    }
}
