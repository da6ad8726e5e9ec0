//! 对话记录：Turn 与 Transcript
//!
//! Turn 一经创建不再修改；Transcript 只追加，切换话题时整体替换。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息角色：只有用户与助手两种，渲染与逻辑按角色显式分支
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 回复引用的销售方法论
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesFramework {
    #[serde(rename = "STAR")]
    Star,
    #[serde(rename = "DOUBTS")]
    Doubts,
    #[serde(rename = "SLMA")]
    Slma,
    #[serde(rename = "STAR Negotiator")]
    StarNegotiator,
    #[serde(rename = "STAR Account Manager")]
    StarAccountManager,
    #[serde(rename = "STAR Recruiter")]
    StarRecruiter,
    #[serde(rename = "Sales Manager Pathway")]
    SalesManagerPathway,
    #[serde(rename = "DISC")]
    Disc,
    Other,
}

impl SalesFramework {
    pub fn label(&self) -> &'static str {
        match self {
            SalesFramework::Star => "STAR",
            SalesFramework::Doubts => "DOUBTS",
            SalesFramework::Slma => "SLMA",
            SalesFramework::StarNegotiator => "STAR Negotiator",
            SalesFramework::StarAccountManager => "STAR Account Manager",
            SalesFramework::StarRecruiter => "STAR Recruiter",
            SalesFramework::SalesManagerPathway => "Sales Manager Pathway",
            SalesFramework::Disc => "DISC",
            SalesFramework::Other => "Other",
        }
    }
}

/// 知识库引用（回复下方的「来源」）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub framework: SalesFramework,
    pub excerpt: String,
}

/// 单条对话
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    /// Markdown
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl Turn {
    fn new(role: Role, content: String, resources: Vec<Resource>) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            role,
            content,
            timestamp: Utc::now(),
            resources,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), Vec::new())
    }

    pub fn assistant_with_resources(content: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self::new(Role::Assistant, content.into(), resources)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// 有序对话列表：只追加，或整体替换
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// 丢弃全部历史，换成给定列表（切换话题时用）
    pub fn replace(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
