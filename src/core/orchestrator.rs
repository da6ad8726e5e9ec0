//! 编排器：唯一持有会话状态的后台任务
//!
//! 负责：按配置创建 Responder / 调度器 / 文件列表 / Playbook 目录，建立 cmd/state 两通道，
//! 在同一个事件循环里消费用户命令（Submit/SwitchTopic/Upload/...）与调度器的回复完成事件，
//! 每次变更后把 UiState 投影推给 UI。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::core::state::{Completion, ConversationState, SubmitOutcome, UiState};
use crate::core::task_scheduler::{Resolved, TurnScheduler};
use crate::core::PennyError;
use crate::knowledge::{self, UserRole};
use crate::playbook::PlaybookCatalog;
use crate::resolver::{KeywordResponder, Responder};
use crate::uploads::{FileDescriptor, ProjectFiles};

/// 从 UI 发往编排器的命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交用户输入
    Submit(String),
    /// 切换到指定 Playbook（未知 id 也接受）
    SwitchTopic(String),
    /// 新建 Playbook 并切换过去
    NewPlaybook { title: String, client: String },
    /// 上传文件（仅元数据）
    Upload(Vec<FileDescriptor>),
    RemoveFile(String),
    /// 在当前话题下重新开始
    Clear,
    Quit,
}

/// UI 侧句柄：发命令、读状态
#[derive(Clone)]
pub struct AssistantHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<UiState>,
}

impl AssistantHandle {
    pub fn send(&self, cmd: Command) -> Result<(), PennyError> {
        self.cmd_tx.send(cmd).map_err(|_| PennyError::ChannelClosed)
    }

    pub fn submit(&self, text: impl Into<String>) -> Result<(), PennyError> {
        self.send(Command::Submit(text.into()))
    }

    pub fn state(&self) -> watch::Receiver<UiState> {
        self.state_rx.clone()
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Command> {
        self.cmd_tx.clone()
    }
}

struct Orchestrator {
    state: ConversationState,
    scheduler: TurnScheduler,
    files: ProjectFiles,
    catalog: PlaybookCatalog,
    role: UserRole,
    state_tx: watch::Sender<UiState>,
}

impl Orchestrator {
    fn publish(&self) {
        let knowledge = knowledge::layers(self.role, self.files.len()).to_vec();
        let snapshot = self
            .state
            .project(self.files.files(), self.catalog.playbooks(), knowledge);
        let _ = self.state_tx.send(snapshot);
    }

    fn switch_topic(&mut self, id: &str) {
        let topic = self.catalog.topic(id);
        tracing::info!(topic = %topic.id, "switching topic");
        self.scheduler.reset();
        self.state.switch_topic(topic);
    }

    /// 处理一条命令；返回 false 表示退出
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Submit(input) => match self.state.submit(&input) {
                SubmitOutcome::Accepted(submission) => {
                    tracing::info!(generation = submission.generation, "submission accepted");
                    self.scheduler
                        .schedule(submission, self.state.resolve_context());
                }
                ignored => {
                    tracing::debug!(?ignored, "submission ignored");
                    return true;
                }
            },
            Command::SwitchTopic(id) => self.switch_topic(&id),
            Command::NewPlaybook { title, client } => {
                let id = self.catalog.create(title, client).id.clone();
                self.switch_topic(&id);
            }
            Command::Upload(batch) => {
                let offered = batch.len();
                let accepted = self.files.upload(batch);
                tracing::info!(offered, accepted, "files uploaded");
            }
            Command::RemoveFile(id) => {
                if !self.files.remove(&id) {
                    return true;
                }
            }
            Command::Clear => {
                self.scheduler.reset();
                self.state.clear();
            }
            Command::Quit => return false,
        }
        self.publish();
        true
    }

    fn on_resolved(&mut self, ev: Resolved) {
        match self.state.complete(ev.generation, ev.reply) {
            Completion::Appended => self.publish(),
            Completion::Stale => {
                tracing::debug!(generation = ev.generation, "stale reply dropped");
            }
        }
    }
}

/// 用内置关键词引擎创建助手
pub fn create_assistant(cfg: &AppConfig) -> (AssistantHandle, JoinHandle<()>) {
    create_assistant_with(cfg, Arc::new(KeywordResponder::default()))
}

/// 创建助手运行时：返回 UI 句柄与后台任务句柄；后台任务消费命令与回复事件并更新 state
pub fn create_assistant_with(
    cfg: &AppConfig,
    responder: Arc<dyn Responder>,
) -> (AssistantHandle, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (resolved_tx, mut resolved_rx) = mpsc::unbounded_channel::<Resolved>();

    let scheduler = TurnScheduler::new(cfg.chat.thinking_delay(), responder, resolved_tx);
    let files = ProjectFiles::new(cfg.uploads.policy(), Some(cfg.app.user_name.clone()));
    let catalog = PlaybookCatalog::sample();
    let role = cfg.app.role;

    let initial = ConversationState::new().project(
        &[],
        catalog.playbooks(),
        knowledge::layers(role, 0).to_vec(),
    );
    let (state_tx, state_rx) = watch::channel(initial);

    let mut orchestrator = Orchestrator {
        state: ConversationState::new(),
        scheduler,
        files,
        catalog,
        role,
        state_tx,
    };

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !orchestrator.handle(cmd) {
                            break;
                        }
                    }
                    // 所有句柄已释放
                    None => break,
                },
                Some(ev) = resolved_rx.recv() => orchestrator.on_resolved(ev),
            }
        }
        tracing::info!("assistant stopped");
    });

    (AssistantHandle { cmd_tx, state_rx }, task)
}
