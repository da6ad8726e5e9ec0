//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将用户输入与快捷键转为 Command 发送给编排器，
//! 每帧用 draw 渲染 UiState 与输入缓冲。

use std::io::{self, Stdout};

use crossterm::event::KeyCode;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::{AssistantHandle, Command, UiState};
use crate::ui::event::{parse_input, AppEvent, EventHandler, InputAction};
use crate::ui::render::{draw, View};
use crate::ui::theme::Theme;
use crate::uploads::FileDescriptor;

/// 渲染所需的静态信息
pub struct AppOptions {
    pub app_name: String,
    pub user_name: String,
    pub theme: Theme,
}

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(handle: AssistantHandle, options: AppOptions) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &handle, &options).await;

    restore_terminal(&mut terminal)?;
    let _ = handle.send(Command::Quit);
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    handle: &AssistantHandle,
    options: &AppOptions,
) -> anyhow::Result<()> {
    let state_rx = handle.state();
    let event_handler = EventHandler::new(handle.clone());
    let mut input_buffer = String::new();
    let mut conversation_scroll = 0usize;
    let mut last_turn_count = 0usize;

    loop {
        let state = state_rx.borrow().clone();

        // 有新消息或进入等待时滚到底部
        let visible = state.turns.len() + usize::from(state.pending);
        if visible != last_turn_count {
            last_turn_count = visible;
            conversation_scroll = usize::MAX;
        }

        if let Ok(Some(ev)) = event_handler.poll() {
            match ev {
                AppEvent::Quit => break,
                AppEvent::Command(_) => {}
                AppEvent::CycleTopic(step) => {
                    if let Some(id) = cycle_topic(&state, step) {
                        event_handler.send(Command::SwitchTopic(id));
                    }
                }
                AppEvent::Key(key) => match key.code {
                    KeyCode::Enter => {
                        match parse_input(&input_buffer) {
                            InputAction::Quit => break,
                            // 等待回复时保留输入，不发送
                            InputAction::Submit(_) if state.pending => continue,
                            action => {
                                input_buffer.clear();
                                if let Some(cmd) = to_command(action, &state) {
                                    event_handler.send(cmd);
                                }
                            }
                        }
                    }
                    KeyCode::Backspace => {
                        input_buffer.pop();
                    }
                    KeyCode::Char(c) => input_buffer.push(c),
                    KeyCode::Up => conversation_scroll = conversation_scroll.saturating_sub(1),
                    KeyCode::Down => conversation_scroll = conversation_scroll.saturating_add(1),
                    KeyCode::PageUp => conversation_scroll = conversation_scroll.saturating_sub(10),
                    KeyCode::PageDown => {
                        conversation_scroll = conversation_scroll.saturating_add(10)
                    }
                    KeyCode::Home => conversation_scroll = 0,
                    KeyCode::End => conversation_scroll = usize::MAX,
                    _ => {}
                },
            }
        }

        let view = View {
            app_name: &options.app_name,
            user_name: &options.user_name,
            theme: &options.theme,
            input_buffer: &input_buffer,
            conversation_scroll,
        };
        let mut scroll_info = (0usize, 0usize);
        terminal.draw(|f| draw(f, &state, &view, &mut scroll_info))?;
        let (total_lines, viewport_height) = scroll_info;
        conversation_scroll = conversation_scroll.min(total_lines.saturating_sub(viewport_height));

        tokio::task::yield_now().await;
    }
    Ok(())
}

/// 输入动作转为编排器命令；无效的动作返回 None
fn to_command(action: InputAction, state: &UiState) -> Option<Command> {
    match action {
        InputAction::Submit(text) => Some(Command::Submit(text)),
        InputAction::SwitchTopic(id) => Some(Command::SwitchTopic(id)),
        InputAction::NewPlaybook { title, client } => Some(Command::NewPlaybook { title, client }),
        InputAction::Upload(paths) => {
            let batch: Vec<FileDescriptor> = paths
                .iter()
                .filter_map(|p| match FileDescriptor::from_path(p) {
                    Ok(desc) => Some(desc),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        None
                    }
                })
                .collect();
            (!batch.is_empty()).then_some(Command::Upload(batch))
        }
        InputAction::RemoveFile(n) => state
            .files
            .get(n - 1)
            .map(|f| Command::RemoveFile(f.id.clone())),
        InputAction::Unknown(raw) => {
            tracing::debug!(input = %raw, "unknown slash command");
            None
        }
        InputAction::Quit => None,
    }
}

/// 在目录中相对当前话题移动 step 位（循环）；无话题时从第一个开始
fn cycle_topic(state: &UiState, step: isize) -> Option<String> {
    let len = state.playbooks.len() as isize;
    if len == 0 {
        return None;
    }
    let current = state
        .topic
        .as_ref()
        .and_then(|t| state.playbooks.iter().position(|pb| pb.id == t.id));
    let next = match current {
        Some(i) => (i as isize + step).rem_euclid(len),
        None => 0,
    };
    Some(state.playbooks[next as usize].id.clone())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
