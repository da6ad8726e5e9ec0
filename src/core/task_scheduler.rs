//! 回合调度：固定的「思考」延迟后调用 Responder，把结果送回编排器事件队列
//!
//! 调度器从不直接修改会话状态；同一时刻至多一个未完成回复由 ConversationState 的
//! pending 标志保证。没有重试：Mock 引擎不会失败。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::state::Submission;
use crate::core::SessionSupervisor;
use crate::resolver::{Reply, ResolveContext, Responder};

/// 回复完成事件
#[derive(Clone, Debug)]
pub struct Resolved {
    pub generation: u64,
    pub reply: Reply,
}

pub struct TurnScheduler {
    delay: Duration,
    responder: Arc<dyn Responder>,
    supervisor: SessionSupervisor,
    events: mpsc::UnboundedSender<Resolved>,
}

impl TurnScheduler {
    pub fn new(
        delay: Duration,
        responder: Arc<dyn Responder>,
        events: mpsc::UnboundedSender<Resolved>,
    ) -> Self {
        Self {
            delay,
            responder,
            supervisor: SessionSupervisor::new(),
            events,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 延迟后解析并投递；当前上下文被 reset 时提前放弃
    pub fn schedule(&self, submission: Submission, ctx: ResolveContext) -> JoinHandle<()> {
        let token = self.supervisor.child_token();
        let delay = self.delay;
        let responder = self.responder.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(generation = submission.generation, "resolution abandoned");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let reply = responder.respond(&submission.input, &ctx).await;
            tracing::debug!(
                generation = submission.generation,
                responder = responder.name(),
                "resolution ready"
            );
            if events
                .send(Resolved {
                    generation: submission.generation,
                    reply,
                })
                .is_err()
            {
                tracing::debug!("event queue closed, reply dropped");
            }
        })
    }

    /// 放弃旧上下文下所有未完成的回复
    pub fn reset(&mut self) {
        self.supervisor.reset();
    }
}
