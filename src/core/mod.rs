//! 核心编排层：错误、会话状态、上下文监管、回合调度、主控循环

pub mod error;
pub mod orchestrator;
pub mod session_supervisor;
pub mod state;
pub mod task_scheduler;

pub use error::PennyError;
pub use orchestrator::{create_assistant, create_assistant_with, AssistantHandle, Command};
pub use session_supervisor::SessionSupervisor;
pub use state::{Completion, ConversationState, Phase, SubmitOutcome, Submission, UiState};
pub use task_scheduler::{Resolved, TurnScheduler};
