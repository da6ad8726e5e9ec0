//! 助手端到端流程测试：提交 → 等待 → 回复；切换话题丢弃过期回复；上传过滤

use std::sync::Arc;
use std::time::Duration;

use penny::config::AppConfig;
use penny::core::{create_assistant, create_assistant_with, Command, Phase, UiState};
use penny::memory::Role;
use penny::resolver::{Reply, ResolveContext, Responder, DEFAULT_RESPONSE};
use penny::uploads::{FileDescriptor, FileStatus};
use tokio::sync::watch;

const MB: u64 = 1024 * 1024;

fn fast_config(delay_ms: u64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.chat.thinking_delay_ms = delay_ms;
    cfg
}

async fn wait_for(
    rx: &mut watch::Receiver<UiState>,
    pred: impl FnMut(&UiState) -> bool,
) -> UiState {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("assistant stopped")
        .clone()
}

#[tokio::test]
async fn test_submit_appends_user_then_assistant() {
    let (handle, _task) = create_assistant(&fast_config(200));
    let mut rx = handle.state();

    handle.submit("What is STAR?").unwrap();
    let pending = wait_for(&mut rx, |s| s.pending).await;
    assert_eq!(pending.turns.len(), 1);
    assert_eq!(pending.turns[0].role, Role::User);
    assert_eq!(pending.phase, Phase::Thinking);

    let done = wait_for(&mut rx, |s| !s.pending && s.turns.len() == 2).await;
    assert_eq!(done.turns[1].role, Role::Assistant);
    assert!(done.turns[1].content.contains("**S**ituation"));
    assert_eq!(done.phase, Phase::Idle);
}

#[tokio::test]
async fn test_second_submit_while_pending_ignored() {
    let (handle, _task) = create_assistant(&fast_config(100));
    let mut rx = handle.state();

    handle.submit("hello").unwrap();
    handle.submit("Tell me about DOUBTS").unwrap();
    handle.submit("   ").unwrap();

    let done = wait_for(&mut rx, |s| !s.pending && s.turns.len() >= 2).await;
    // 给可能的多余回复留出时间
    tokio::time::sleep(Duration::from_millis(250)).await;
    let state = rx.borrow().clone();
    assert_eq!(state.turns.len(), 2);
    assert_eq!(done.turns[0].content, "hello");
    assert_eq!(done.turns[1].content, DEFAULT_RESPONSE);
}

#[tokio::test]
async fn test_switch_topic_discards_outstanding_reply() {
    let (handle, _task) = create_assistant(&fast_config(300));
    let mut rx = handle.state();

    handle.submit("What is STAR?").unwrap();
    wait_for(&mut rx, |s| s.pending).await;
    handle.send(Command::SwitchTopic("pb-2".into())).unwrap();

    let switched = wait_for(&mut rx, |s| s.topic.as_ref().map(|t| t.id.as_str()) == Some("pb-2")).await;
    assert!(!switched.pending);
    assert_eq!(switched.turns.len(), 1);
    assert!(switched.turns[0].content.contains("Qualification - TechCorp Enterprise"));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let after = rx.borrow().clone();
    assert_eq!(after.turns.len(), 1);
}

/// 忽略取消、总是晚到的 Responder，用于验证 generation 检查
struct SlowResponder;

#[async_trait::async_trait]
impl Responder for SlowResponder {
    async fn respond(&self, input: &str, _ctx: &ResolveContext) -> Reply {
        tokio::time::sleep(Duration::from_millis(150)).await;
        Reply {
            text: format!("late: {input}"),
            resources: Vec::new(),
        }
    }
}

#[tokio::test]
async fn test_reply_already_resolving_is_still_dropped_after_switch() {
    let (handle, _task) = create_assistant_with(&fast_config(0), Arc::new(SlowResponder));
    let mut rx = handle.state();

    handle.submit("first").unwrap();
    wait_for(&mut rx, |s| s.pending).await;
    // 延迟为 0：Responder 已在执行，取消令牌来不及拦截
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.send(Command::SwitchTopic("pb-1".into())).unwrap();
    handle.submit("second").unwrap();

    let done = wait_for(&mut rx, |s| !s.pending && s.turns.len() == 3).await;
    assert_eq!(done.turns[1].content, "second");
    assert_eq!(done.turns[2].content, "late: second");
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.borrow().turns.iter().all(|t| t.content != "late: first"));
}

#[tokio::test]
async fn test_topic_template_uses_active_playbook() {
    let (handle, _task) = create_assistant(&fast_config(10));
    let mut rx = handle.state();

    handle.send(Command::SwitchTopic("pb-4".into())).unwrap();
    handle.submit("How should I approach this deal?").unwrap();
    let done = wait_for(&mut rx, |s| !s.pending && s.turns.len() == 3).await;
    assert!(done.turns[2].content.contains("**Negotiation - MarketLeaders Co**"));
}

#[tokio::test]
async fn test_uploads_filtered_and_listed() {
    let (handle, _task) = create_assistant(&fast_config(10));
    let mut rx = handle.state();

    handle
        .send(Command::Upload(vec![
            FileDescriptor::new("report.exe", MB, "application/octet-stream"),
            FileDescriptor::new("report.pdf", 5 * MB, "application/pdf"),
        ]))
        .unwrap();
    let state = wait_for(&mut rx, |s| !s.files.is_empty()).await;
    assert_eq!(state.files.len(), 1);
    assert_eq!(state.files[0].name, "report.pdf");
    assert_eq!(state.files[0].status, FileStatus::Ready);
    assert!(state.knowledge[2].active);

    let id = state.files[0].id.clone();
    handle.send(Command::RemoveFile(id)).unwrap();
    let state = wait_for(&mut rx, |s| s.files.is_empty()).await;
    assert!(!state.knowledge[2].active);
}

#[tokio::test]
async fn test_new_playbook_becomes_active_topic() {
    let (handle, _task) = create_assistant(&fast_config(10));
    let mut rx = handle.state();

    handle
        .send(Command::NewPlaybook {
            title: "Renewal - ACME".into(),
            client: "ACME Studios".into(),
        })
        .unwrap();
    let state = wait_for(&mut rx, |s| s.topic.is_some()).await;
    assert_eq!(state.topic.as_ref().unwrap().title, "Renewal - ACME");
    assert_eq!(state.playbooks[0].title, "Renewal - ACME");
    assert_eq!(state.playbooks.len(), 7);
}

#[tokio::test]
async fn test_quit_stops_task() {
    let (handle, task) = create_assistant(&fast_config(10));
    handle.send(Command::Quit).unwrap();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();
    assert!(handle.submit("hello").is_err());
}
