//! 关键词回复引擎：直接套用 RuleSet，无网络、不会失败

use async_trait::async_trait;

use super::rules::{Reply, ResolveContext, RuleSet};
use super::Responder;

#[derive(Debug, Default, Clone)]
pub struct KeywordResponder {
    rules: RuleSet,
}

impl KeywordResponder {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl Responder for KeywordResponder {
    async fn respond(&self, input: &str, ctx: &ResolveContext) -> Reply {
        self.rules.resolve(input, ctx)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
