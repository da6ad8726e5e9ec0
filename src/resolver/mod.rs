//! 回复解析层：关键词规则（rules）、引擎抽象（traits）与 Mock 实现（keyword）

pub mod keyword;
pub mod rules;
pub mod traits;

pub use keyword::KeywordResponder;
pub use rules::{Reply, ResolutionRule, ResolveContext, RuleSet, DEFAULT_RESPONSE, TOPIC_PLACEHOLDER};
pub use traits::Responder;
