//! 关键词规则：按优先级顺序匹配，首个命中者胜出，兜底规则匹配一切
//!
//! 匹配只看小写后的输入；模板中的 `{topic}` 由当前话题标题填充。

use crate::memory::{Resource, SalesFramework};
use crate::playbook::Topic;

/// 模板中的话题占位符
pub const TOPIC_PLACEHOLDER: &str = "{topic}";
/// 无话题时的占位替换
const NO_TOPIC_LABEL: &str = "your current deal";

const STAR_RESPONSE: &str = "STAR stands for:\n\n\
**S**ituation - Understand the customer's current state\n\
**T**ension - Identify pain points and challenges\n\
**A**ffection - Build emotional connection and trust\n\
**R**esolution - Present your solution\n\n\
Would you like me to elaborate on any of these steps?";

const DOUBTS_RESPONSE: &str = "DOUBTS is our sales process framework:\n\n\
**D**efine - Define the opportunity\n\
**O**utline - Outline the approach\n\
**U**ncover - Uncover needs and pain points\n\
**B**uild - Build the solution\n\
**T**est - Test the proposal\n\
**S**ecure - Secure the commitment\n\n\
Which stage would you like to explore?";

const HELP_RESPONSE: &str = "I can help you with:\n\n\
• **STAR Methodology** - Consultative selling approach\n\
• **DOUBTS Process** - Complete sales framework\n\
• **Negotiation Tactics** - STAR Negotiator framework\n\
• **Account Management** - Relationship strategies\n\
• **Deal Coaching** - Analyze your specific deals\n\n\
What would you like to focus on?";

const DEAL_RESPONSE: &str = "Let's look at **{topic}** together.\n\n\
To coach you on this deal I'd start with:\n\n\
• **Situation** - Where does the customer stand today?\n\
• **Tension** - What pain is driving them to act now?\n\
• **Next step** - What commitment are you asking for in the next meeting?\n\n\
Share what you know about {topic} and I'll suggest questions for your next call.";

/// 默认回复（没有规则命中时）
pub const DEFAULT_RESPONSE: &str = "I'm Ask Penny AI, your sales coaching assistant. \
I can help you with STAR methodology, DOUBTS sales process, and other coaching frameworks. \
What would you like to know?";

/// 解析时可见的上下文（只读）
#[derive(Clone, Debug, Default)]
pub struct ResolveContext {
    pub topic: Option<Topic>,
}

impl ResolveContext {
    pub fn with_topic(topic: Option<Topic>) -> Self {
        Self { topic }
    }
}

/// 解析结果：Markdown 正文与引用
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub resources: Vec<Resource>,
}

/// 一条规则：任一关键词出现在小写输入中即命中
#[derive(Clone, Debug)]
pub struct ResolutionRule {
    pub name: String,
    /// 小写关键词
    keywords: Vec<String>,
    template: String,
    resources: Vec<Resource>,
}

impl ResolutionRule {
    pub fn new<I, S>(name: impl Into<String>, keywords: I, template: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            template: template.into(),
            resources: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// `normalized` 需已小写
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn render(&self, ctx: &ResolveContext) -> Reply {
        Reply {
            text: fill_template(&self.template, ctx),
            resources: self.resources.clone(),
        }
    }
}

fn fill_template(template: &str, ctx: &ResolveContext) -> String {
    if !template.contains(TOPIC_PLACEHOLDER) {
        return template.to_string();
    }
    let label = ctx
        .topic
        .as_ref()
        .map(|t| t.title.as_str())
        .unwrap_or(NO_TOPIC_LABEL);
    template.replace(TOPIC_PLACEHOLDER, label)
}

/// 有序规则集，进程启动时构建一次，之后只读
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<ResolutionRule>,
    fallback: String,
}

impl RuleSet {
    pub fn new(rules: Vec<ResolutionRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// 内置的教练规则（STAR / DOUBTS / 帮助 / 当前交易）
    pub fn coaching() -> Self {
        let rules = vec![
            ResolutionRule::new("star", ["star"], STAR_RESPONSE).with_resource(Resource {
                id: "res-star".into(),
                title: "STAR Methodology - Overview".into(),
                framework: SalesFramework::Star,
                excerpt: "Situation, Tension, Affection, Resolution: the four stages of a consultative sales conversation.".into(),
            }),
            ResolutionRule::new("doubts", ["doubts"], DOUBTS_RESPONSE).with_resource(Resource {
                id: "res-doubts".into(),
                title: "DOUBTS Sales Process".into(),
                framework: SalesFramework::Doubts,
                excerpt: "Define, Outline, Uncover, Build, Test, Secure: the end-to-end opportunity process.".into(),
            }),
            ResolutionRule::new("help", ["help", "what can you do"], HELP_RESPONSE),
            ResolutionRule::new("deal", ["deal", "playbook"], DEAL_RESPONSE),
        ];
        Self::new(rules, DEFAULT_RESPONSE)
    }

    pub fn rules(&self) -> &[ResolutionRule] {
        &self.rules
    }

    /// 纯函数、全函数：任何输入都返回非空回复，不修改上下文
    pub fn resolve(&self, input: &str, ctx: &ResolveContext) -> Reply {
        let normalized = input.to_lowercase();
        match self.rules.iter().find(|r| r.matches(&normalized)) {
            Some(rule) => {
                tracing::debug!(rule = %rule.name, "resolution rule matched");
                rule.render(ctx)
            }
            None => Reply {
                text: self.fallback.clone(),
                resources: Vec::new(),
            },
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::coaching()
    }
}
