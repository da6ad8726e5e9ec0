//! 事件处理
//!
//! 轮询 crossterm 键盘事件：Ctrl+L 清空、Ctrl+N/Ctrl+P 切换 Playbook、Ctrl+Q/Ctrl+C 退出，
//! 其余按键交给 run_app 拼 input_buffer；Enter 时由 parse_input 区分普通消息与斜杠命令。

use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::{AssistantHandle, Command};

/// 应用事件
#[derive(Debug, Clone)]
pub enum AppEvent {
    Command(Command),
    /// 相对当前 Playbook 的偏移（+1 下一个，-1 上一个）
    CycleTopic(isize),
    Quit,
    Key(KeyEvent),
}

/// 输入框内容解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit(String),
    SwitchTopic(String),
    NewPlaybook { title: String, client: String },
    Upload(Vec<PathBuf>),
    /// 侧栏文件序号（从 1 开始）
    RemoveFile(usize),
    Quit,
    /// 无法识别的斜杠命令，忽略
    Unknown(String),
}

/// `/topic <id>`、`/new <title> | <client>`、`/upload <path>...`、`/remove <n>`、`/quit`；其余原样提交
pub fn parse_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return InputAction::Submit(line.to_string());
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match (name.to_lowercase().as_str(), args) {
        ("quit" | "exit", _) => InputAction::Quit,
        ("topic", id) if !id.is_empty() => InputAction::SwitchTopic(id.to_string()),
        ("new", fields) if !fields.is_empty() => {
            let (title, client) = match fields.split_once('|') {
                Some((t, c)) => (t.trim(), c.trim()),
                None => (fields, ""),
            };
            InputAction::NewPlaybook {
                title: title.to_string(),
                client: client.to_string(),
            }
        }
        ("upload", paths) if !paths.is_empty() => {
            InputAction::Upload(paths.split_whitespace().map(PathBuf::from).collect())
        }
        ("remove", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => InputAction::RemoveFile(n),
            _ => InputAction::Unknown(trimmed.to_string()),
        },
        _ => InputAction::Unknown(trimmed.to_string()),
    }
}

/// 事件处理器：持有助手句柄，poll 时读键盘并返回 AppEvent
pub struct EventHandler {
    handle: AssistantHandle,
}

impl EventHandler {
    pub fn new(handle: AssistantHandle) -> Self {
        Self { handle }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('l') if ctrl => {
                self.send(Command::Clear);
                AppEvent::Command(Command::Clear)
            }
            KeyCode::Char('n') if ctrl => AppEvent::CycleTopic(1),
            KeyCode::Char('p') if ctrl => AppEvent::CycleTopic(-1),
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => AppEvent::Quit,
            _ => AppEvent::Key(key),
        }
    }

    pub fn send(&self, cmd: Command) {
        if let Err(e) = self.handle.send(cmd) {
            tracing::warn!("command not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_submitted_verbatim() {
        assert_eq!(
            parse_input("What is STAR?"),
            InputAction::Submit("What is STAR?".into())
        );
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_input("/topic pb-2"), InputAction::SwitchTopic("pb-2".into()));
        assert_eq!(parse_input("/QUIT"), InputAction::Quit);
        assert_eq!(
            parse_input("/new Renewal - ACME | ACME Studios"),
            InputAction::NewPlaybook {
                title: "Renewal - ACME".into(),
                client: "ACME Studios".into()
            }
        );
        assert_eq!(
            parse_input("/upload a.pdf  notes.txt"),
            InputAction::Upload(vec![PathBuf::from("a.pdf"), PathBuf::from("notes.txt")])
        );
        assert_eq!(parse_input("/remove 2"), InputAction::RemoveFile(2));
    }

    #[test]
    fn test_bad_slash_commands_unknown() {
        assert!(matches!(parse_input("/remove 0"), InputAction::Unknown(_)));
        assert!(matches!(parse_input("/topic"), InputAction::Unknown(_)));
        assert!(matches!(parse_input("/dance"), InputAction::Unknown(_)));
    }
}
