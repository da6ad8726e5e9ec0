//! Playbook（销售机会）目录与话题引用
//!
//! 对话的「话题」就是一个 Playbook；目录仅在内存中，启动时填入示例数据。

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 交易阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStage {
    Discovery,
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub fn label(&self) -> &'static str {
        match self {
            DealStage::Discovery => "Discovery",
            DealStage::Qualification => "Qualification",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
            DealStage::ClosedLost => "Closed Lost",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Playbook {
    pub id: String,
    pub title: String,
    pub client: String,
    pub deal_stage: DealStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
}

/// 对话当前所属话题（对 Playbook 的引用）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub id: String,
    pub title: String,
}

impl Topic {
    /// 目录中找不到的 id 以 id 本身作为标题
    pub fn unknown(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
        }
    }
}

impl From<&Playbook> for Topic {
    fn from(pb: &Playbook) -> Self {
        Self {
            id: pb.id.clone(),
            title: pb.title.clone(),
        }
    }
}

/// 为新话题合成的开场白
pub fn greeting(topic: &Topic) -> String {
    format!(
        "Hi! We're now working on **{}**.\n\n\
         Ask me about STAR methodology, the DOUBTS process, or how to move this deal forward.",
        topic.title
    )
}

/// 内存中的 Playbook 目录（按最近更新排序展示）
#[derive(Clone, Debug, Default)]
pub struct PlaybookCatalog {
    playbooks: Vec<Playbook>,
}

impl PlaybookCatalog {
    pub fn new(playbooks: Vec<Playbook>) -> Self {
        Self { playbooks }
    }

    /// 示例目录
    pub fn sample() -> Self {
        let pb = |id: &str,
                  title: &str,
                  client: &str,
                  stage: DealStage,
                  created: (u32, u32, u32),
                  updated: (u32, u32, u32),
                  description: &str| Playbook {
            id: id.into(),
            title: title.into(),
            client: client.into(),
            deal_stage: stage,
            created_at: utc(2026, 1, created),
            updated_at: utc(2026, 1, updated),
            description: Some(description.into()),
        };
        Self::new(vec![
            pb("pb-1", "Discovery Call - ACME Studios", "ACME Studios", DealStage::Discovery,
                (15, 10, 0), (17, 14, 30), "Initial discovery call to understand client needs and pain points"),
            pb("pb-2", "Qualification - TechCorp Enterprise", "TechCorp", DealStage::Qualification,
                (14, 9, 0), (16, 11, 20), "Qualifying budget authority and decision timeline"),
            pb("pb-3", "Proposal Review - GlobalSales Inc", "GlobalSales Inc", DealStage::Proposal,
                (12, 15, 30), (15, 16, 45), "Reviewing proposal with stakeholders"),
            pb("pb-4", "Negotiation - MarketLeaders Co", "MarketLeaders Co", DealStage::Negotiation,
                (10, 8, 0), (14, 10, 0), "Final pricing and terms negotiation"),
            pb("pb-5", "Closed Deal - Innovate Systems", "Innovate Systems", DealStage::ClosedWon,
                (8, 13, 0), (12, 9, 30), "Successfully closed enterprise deal"),
            pb("pb-6", "Lost Deal Analysis - RetailChain", "RetailChain", DealStage::ClosedLost,
                (5, 11, 0), (10, 14, 0), "Analysis of lost deal to competitor"),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Playbook> {
        self.playbooks.iter().find(|pb| pb.id == id)
    }

    /// 由 id 得到话题；未知 id 不报错
    pub fn topic(&self, id: &str) -> Topic {
        self.get(id)
            .map(Topic::from)
            .unwrap_or_else(|| Topic::unknown(id))
    }

    pub fn playbooks(&self) -> &[Playbook] {
        &self.playbooks
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.playbooks.iter().position(|pb| pb.id == id)
    }

    /// 新建 Playbook（阶段为 discovery），置顶并返回其引用
    pub fn create(&mut self, title: impl Into<String>, client: impl Into<String>) -> &Playbook {
        let now = Utc::now();
        let mut id = format!("pb-{}", now.timestamp_millis());
        // 同一毫秒内连续创建时避免 id 冲突
        while self.get(&id).is_some() {
            id.push('x');
        }
        let playbook = Playbook {
            id,
            title: title.into(),
            client: client.into(),
            deal_stage: DealStage::Discovery,
            created_at: now,
            updated_at: now,
            description: None,
        };
        tracing::info!(id = %playbook.id, "playbook created");
        self.playbooks.insert(0, playbook);
        &self.playbooks[0]
    }

    pub fn len(&self) -> usize {
        self.playbooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playbooks.is_empty()
    }
}

fn utc(year: i32, month: u32, (day, hour, min): (u32, u32, u32)) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_lookup() {
        let catalog = PlaybookCatalog::sample();
        assert_eq!(catalog.len(), 6);
        let pb = catalog.get("pb-4").unwrap();
        assert_eq!(pb.deal_stage, DealStage::Negotiation);
        assert_eq!(pb.deal_stage.label(), "Negotiation");
        assert!(catalog.get("pb-99").is_none());
    }

    #[test]
    fn test_unknown_topic_uses_id_as_title() {
        let catalog = PlaybookCatalog::sample();
        assert_eq!(catalog.topic("pb-1").title, "Discovery Call - ACME Studios");
        let t = catalog.topic("deal-x");
        assert_eq!(t, Topic::unknown("deal-x"));
        assert_eq!(t.title, "deal-x");
    }

    #[test]
    fn test_create_inserts_at_front() {
        let mut catalog = PlaybookCatalog::sample();
        let id = catalog.create("Renewal - ACME", "ACME Studios").id.clone();
        let id2 = catalog.create("Upsell - ACME", "ACME Studios").id.clone();
        assert_ne!(id, id2);
        assert!(id.starts_with("pb-"));
        assert_eq!(catalog.position(&id2), Some(0));
        assert_eq!(catalog.get(&id).unwrap().deal_stage, DealStage::Discovery);
    }

    #[test]
    fn test_greeting_references_topic() {
        let text = greeting(&Topic::unknown("pb-7"));
        assert!(text.contains("**pb-7**"));
    }

    #[test]
    fn test_deal_stage_serde() {
        let json = serde_json::to_string(&DealStage::ClosedWon).unwrap();
        assert_eq!(json, "\"closed-won\"");
    }
}
