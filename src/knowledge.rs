//! 知识库层级指示：三层上下文随用户角色与已上传文件数点亮

use serde::Deserialize;

/// 当前用户角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Coach,
    Manager,
    Rep,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeLayer {
    pub layer: u8,
    pub name: &'static str,
    pub description: String,
    pub active: bool,
    /// 仅 coach/manager 可用而当前角色不可用
    pub restricted: bool,
}

pub fn layers(role: UserRole, uploaded_files: usize) -> [KnowledgeLayer; 3] {
    let privileged = matches!(role, UserRole::Coach | UserRole::Manager);
    [
        KnowledgeLayer {
            layer: 1,
            name: "SalesStar IP",
            description: "STAR, DOUBTS, SLMA, Negotiator".into(),
            active: true,
            restricted: false,
        },
        KnowledgeLayer {
            layer: 2,
            name: "Org Knowledge",
            description: "Templates, playbooks, SFW, OMG".into(),
            active: privileged,
            restricted: !privileged,
        },
        KnowledgeLayer {
            layer: 3,
            name: "Project Files",
            description: if uploaded_files > 0 {
                format!("{uploaded_files} files uploaded")
            } else {
                "No files yet".into()
            },
            active: uploaded_files > 0,
            restricted: false,
        },
    ]
}
