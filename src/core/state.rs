//! 会话状态：对话记录、等待标志、当前话题，以及投影给 UI 的 UiState
//!
//! 状态机：`Idle --submit--> Pending --complete--> Idle`；switch_topic / clear 从任意状态回到 Idle。
//! 不变量：pending 为真时最后一条必为用户消息，且尚未追加对应的助手回复。
//! generation 每次切换上下文自增，旧上下文的回复据此丢弃。

use crate::knowledge::KnowledgeLayer;
use crate::memory::{Transcript, Turn};
use crate::playbook::{greeting, Playbook, Topic};
use crate::resolver::{Reply, ResolveContext};
use crate::uploads::ProjectFile;

/// 一次被接受的提交，交给调度器
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub generation: u64,
    pub input: String,
}

/// submit 的结果码；两种 Ignored 均不改变状态
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(Submission),
    IgnoredBlank,
    IgnoredPending,
}

/// complete 的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Appended,
    /// 上下文已切换或当前无等待，回复被丢弃
    Stale,
}

/// 会话阶段（UI 投影用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Thinking,
}

#[derive(Clone, Debug, Default)]
pub struct ConversationState {
    topic: Option<Topic>,
    transcript: Transcript,
    pending: bool,
    generation: u64,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交用户输入；空白输入或已有等待中的回复时为空操作
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::IgnoredBlank;
        }
        if self.pending {
            return SubmitOutcome::IgnoredPending;
        }
        self.transcript.push(Turn::user(text));
        self.pending = true;
        SubmitOutcome::Accepted(Submission {
            generation: self.generation,
            input: text.to_string(),
        })
    }

    /// 回复送达：仅当仍是同一上下文且处于等待时追加
    pub fn complete(&mut self, generation: u64, reply: Reply) -> Completion {
        if generation != self.generation || !self.pending {
            return Completion::Stale;
        }
        self.transcript
            .push(Turn::assistant_with_resources(reply.text, reply.resources));
        self.pending = false;
        Completion::Appended
    }

    /// 切换话题：历史换成一条开场白，放弃任何未完成的回复
    pub fn switch_topic(&mut self, topic: Topic) {
        self.transcript
            .replace(vec![Turn::assistant(greeting(&topic))]);
        self.topic = Some(topic);
        self.reset_pending();
    }

    /// 在当前话题下重新开始（无话题时清空）
    pub fn clear(&mut self) {
        match self.topic.clone() {
            Some(topic) => self.switch_topic(topic),
            None => {
                self.transcript.replace(Vec::new());
                self.reset_pending();
            }
        }
    }

    fn reset_pending(&mut self) {
        self.pending = false;
        self.generation += 1;
    }

    /// 只读视图；每次调用从头开始
    pub fn current_turns(&self) -> std::slice::Iter<'_, Turn> {
        self.transcript.turns().iter()
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.pending {
            Phase::Thinking
        } else {
            Phase::Idle
        }
    }

    pub fn resolve_context(&self) -> ResolveContext {
        ResolveContext::with_topic(self.topic.clone())
    }

    /// 与文件列表、目录、知识层合并成 UI 可渲染的 UiState
    pub fn project(
        &self,
        files: &[ProjectFile],
        playbooks: &[Playbook],
        knowledge: Vec<KnowledgeLayer>,
    ) -> UiState {
        UiState {
            phase: self.phase(),
            topic: self.topic.clone(),
            turns: self.current_turns().cloned().collect(),
            pending: self.pending,
            files: files.to_vec(),
            playbooks: playbooks.to_vec(),
            knowledge,
        }
    }
}

/// UI 看到的「投影」状态
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub phase: Phase,
    pub topic: Option<Topic>,
    pub turns: Vec<Turn>,
    /// 为真时显示「正在输入」并锁定输入框
    pub pending: bool,
    pub files: Vec<ProjectFile>,
    pub playbooks: Vec<Playbook>,
    pub knowledge: Vec<KnowledgeLayer>,
}
