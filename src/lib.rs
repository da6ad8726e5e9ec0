//! Penny - 销售教练对话助手（终端版）
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话状态、回合调度、上下文监管、编排主循环
//! - **knowledge**: 知识库层级指示
//! - **memory**: 对话记录（Turn / Transcript）
//! - **observability**: tracing 初始化
//! - **playbook**: Playbook 目录与话题
//! - **resolver**: 关键词回复规则与 Responder 抽象
//! - **ui**: Ratatui TUI 界面
//! - **uploads**: 项目文件过滤与列表

pub mod config;
pub mod core;
pub mod knowledge;
pub mod memory;
pub mod observability;
pub mod playbook;
pub mod resolver;
pub mod ui;
pub mod uploads;
