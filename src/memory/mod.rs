//! 短期记忆：当前会话的对话记录（仅内存，页面会话结束即丢弃）

pub mod conversation;

pub use conversation::{Resource, Role, SalesFramework, Transcript, Turn};
