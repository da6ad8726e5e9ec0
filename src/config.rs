//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `PENNY__*` 覆盖（双下划线表示嵌套，如 `PENNY__CHAT__THINKING_DELAY_MS=200`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::knowledge::UserRole;
use crate::uploads::UploadPolicy;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub chat: ChatSection,
    #[serde(default)]
    pub uploads: UploadsSection,
    #[serde(default)]
    pub theme: ThemeSection,
}

/// [app] 段：应用名、当前用户、日志文件
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// 上传者显示名
    #[serde(default = "default_user_name")]
    pub user_name: String,
    #[serde(default)]
    pub role: UserRole,
    /// TUI 占用终端，日志写入文件
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            user_name: default_user_name(),
            role: UserRole::default(),
            log_file: default_log_file(),
        }
    }
}

fn default_app_name() -> String {
    "Ask Penny AI".to_string()
}

fn default_user_name() -> String {
    "You".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("penny.log")
}

/// [chat] 段：模拟「思考」延迟
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSection {
    #[serde(default = "default_thinking_delay_ms")]
    pub thinking_delay_ms: u64,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            thinking_delay_ms: default_thinking_delay_ms(),
        }
    }
}

impl ChatSection {
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

fn default_thinking_delay_ms() -> u64 {
    1000
}

/// [uploads] 段：扩展名白名单与大小上限（MB）
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsSection {
    #[serde(default = "default_accepted_file_types")]
    pub accepted_file_types: Vec<String>,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            accepted_file_types: default_accepted_file_types(),
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

impl UploadsSection {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            &self.accepted_file_types,
            self.max_file_size_mb.saturating_mul(1024 * 1024),
        )
    }
}

fn default_accepted_file_types() -> Vec<String> {
    vec![".pdf".into(), ".docx".into(), ".txt".into(), ".xlsx".into()]
}

fn default_max_file_size_mb() -> u64 {
    10
}

/// [theme] 段：品牌色（十六进制），启动时显式传给渲染层
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSection {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_charcoal")]
    pub charcoal: String,
    #[serde(default = "default_user_message")]
    pub user_message: String,
    #[serde(default = "default_text_light")]
    pub text_light: String,
}

impl Default for ThemeSection {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            accent: default_accent(),
            charcoal: default_charcoal(),
            user_message: default_user_message(),
            text_light: default_text_light(),
        }
    }
}

fn default_primary() -> String {
    "#0170B9".to_string()
}

fn default_accent() -> String {
    "#E94629".to_string()
}

fn default_charcoal() -> String {
    "#302E33".to_string()
}

fn default_user_message() -> String {
    "#E3F2FD".to_string()
}

fn default_text_light() -> String {
    "#718096".to_string()
}

/// 从 config 目录加载配置，环境变量 PENNY__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 PENNY__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("PENNY")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.chat.thinking_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.app.role, UserRole::Coach);
        let policy = cfg.uploads.policy();
        assert_eq!(policy.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(policy.accepted_file_types.len(), 4);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("penny.toml");
        std::fs::write(
            &path,
            r#"
[app]
user_name = "Jonathan"
role = "rep"

[chat]
thinking_delay_ms = 250

[uploads]
accepted_file_types = ["pdf"]
max_file_size_mb = 2
"#,
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.user_name, "Jonathan");
        assert_eq!(cfg.app.role, UserRole::Rep);
        assert_eq!(cfg.chat.thinking_delay_ms, 250);
        let policy = cfg.uploads.policy();
        assert_eq!(policy.accepted_file_types, vec![".pdf".to_string()]);
        assert_eq!(policy.max_file_size_bytes, 2 * 1024 * 1024);
        // 未给出的段落使用默认值
        assert_eq!(cfg.theme.primary, "#0170B9");
    }
}
