//! 界面渲染
//!
//! 左侧栏：Playbook 列表（阶段徽标、更新时间）、知识库层级、项目文件；
//! 右侧：对话记录（按角色着色、引用来源、按宽度换行）、「正在思考」提示与输入框。

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::core::{Phase, UiState};
use crate::memory::Role;
use crate::playbook::DealStage;
use crate::ui::format::{format_clock, format_file_size, format_relative};
use crate::ui::theme::Theme;

const SIDEBAR_WIDTH: u16 = 36;
const ASSISTANT_NAME: &str = "Ask Penny AI";

/// 每帧不随状态变化的渲染参数
pub struct View<'a> {
    pub app_name: &'a str,
    pub user_name: &'a str,
    pub theme: &'a Theme,
    pub input_buffer: &'a str,
    pub conversation_scroll: usize,
}

/// 将内容按宽度换行，支持 UTF-8（按字符数，避免在 UTF-8 中间截断）
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    for para in s.split('\n') {
        let mut line = String::new();
        for ch in para.chars() {
            if line.chars().count() >= width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch);
        }
        lines.push(line);
    }
    lines
}

fn stage_color(stage: DealStage) -> Color {
    match stage {
        DealStage::Discovery | DealStage::ClosedWon => Color::Green,
        DealStage::Qualification => Color::Blue,
        DealStage::Proposal => Color::Magenta,
        DealStage::Negotiation => Color::Yellow,
        DealStage::ClosedLost => Color::Red,
    }
}

/// 绘制一帧；将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(f: &mut Frame, state: &UiState, view: &View, out: &mut (usize, usize)) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(f.area());

    draw_sidebar(f, columns[0], state, view.theme);
    *out = draw_main(f, columns[1], state, view);
}

fn draw_sidebar(f: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(8),
            Constraint::Length(8),
        ])
        .split(area);

    let now = Utc::now();
    let active_id = state.topic.as_ref().map(|t| t.id.as_str());
    let mut lines: Vec<Line> = Vec::new();
    for pb in &state.playbooks {
        let active = Some(pb.id.as_str()) == active_id;
        let title_style = if active {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let marker = if active { "▌" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(pb.title.clone(), title_style),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(pb.client.clone(), Style::default().fg(theme.text_light)),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("[{}]", pb.deal_stage.label()),
                Style::default().fg(stage_color(pb.deal_stage)),
            ),
            Span::styled(
                format!(" {}", format_relative(pb.updated_at, now)),
                Style::default().fg(theme.text_light),
            ),
        ]));
    }
    let playbooks = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(" Recent Playbooks ")
                .title_bottom(" Ctrl+N / Ctrl+P ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.primary)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(playbooks, rows[0]);

    let kb_lines: Vec<Line> = state
        .knowledge
        .iter()
        .map(|layer| {
            let (icon, style) = if layer.active {
                ("✓ ", Style::default().fg(Color::Green))
            } else {
                ("○ ", Style::default().fg(theme.text_light))
            };
            let mut spans = vec![
                Span::styled(icon, style),
                Span::styled(format!("L{} {}", layer.layer, layer.name), style),
            ];
            if layer.restricted {
                spans.push(Span::styled(
                    " (Coach/Manager only)",
                    Style::default().fg(theme.text_light),
                ));
            }
            Line::from(spans)
        })
        .chain(state.knowledge.iter().map(|layer| {
            Line::from(Span::styled(
                format!("  L{}: {}", layer.layer, layer.description),
                Style::default().fg(theme.text_light),
            ))
        }))
        .collect();
    let kb = Paragraph::new(Text::from(kb_lines)).block(
        Block::default()
            .title(" Knowledge Base Context ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.charcoal)),
    );
    f.render_widget(kb, rows[1]);

    let file_lines: Vec<Line> = if state.files.is_empty() {
        vec![Line::from(Span::styled(
            "No files uploaded yet.",
            Style::default().fg(theme.text_light),
        ))]
    } else {
        state
            .files
            .iter()
            .enumerate()
            .map(|(i, file)| {
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Style::default().fg(theme.text_light)),
                    Span::raw(file.name.clone()),
                    Span::styled(
                        format!(" {}", format_file_size(file.size)),
                        Style::default().fg(theme.text_light),
                    ),
                ])
            })
            .collect()
    };
    let count = state.files.len();
    let files = Paragraph::new(Text::from(file_lines)).block(
        Block::default()
            .title(format!(
                " Project Files ({} file{}) ",
                count,
                if count == 1 { "" } else { "s" }
            ))
            .title_bottom(" /upload <path>  /remove <n> ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary)),
    );
    f.render_widget(files, rows[2]);
}

fn draw_main(f: &mut Frame, area: Rect, state: &UiState, view: &View) -> (usize, usize) {
    let theme = view.theme;
    // 输入区至少 5 行，便于多行输入可见
    let input_height = 5u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(input_height)])
        .split(area);

    let conv_area = chunks[0];
    let content_width = conv_area.width.saturating_sub(2).saturating_sub(1) as usize; // 边框 + 滚动条

    let topic = state
        .topic
        .as_ref()
        .map(|t| t.title.as_str())
        .unwrap_or("No playbook selected");
    let title = format!(" {} │ {} ", view.app_name, topic);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let mut text_lines: Vec<Line> = Vec::new();
    if state.turns.is_empty() {
        text_lines.push(Line::from(Span::styled(
            "Try asking about STAR methodology, DOUBTS process, or request coaching help.",
            Style::default().fg(theme.text_light),
        )));
    }
    for (idx, turn) in state.turns.iter().enumerate() {
        if idx > 0 {
            text_lines.push(Line::from(Span::raw("")));
        }
        let (name, color) = match turn.role {
            Role::User => (view.user_name, theme.user_message),
            Role::Assistant => (ASSISTANT_NAME, theme.primary),
        };
        text_lines.push(Line::from(vec![
            Span::styled(name.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", format_clock(turn.timestamp)),
                Style::default().fg(theme.text_light),
            ),
        ]));
        for line in wrap_text(&turn.content, content_width.max(20)) {
            text_lines.push(Line::from(Span::raw(line)));
        }
        for res in &turn.resources {
            text_lines.push(Line::from(Span::styled(
                format!("  ↳ {} [{}]", res.title, res.framework.label()),
                Style::default().fg(theme.text_light).add_modifier(Modifier::ITALIC),
            )));
        }
    }
    if state.phase == Phase::Thinking {
        text_lines.push(Line::from(Span::raw("")));
        text_lines.push(Line::from(Span::styled(
            "Penny is thinking…",
            Style::default().fg(theme.accent).add_modifier(Modifier::ITALIC),
        )));
    }

    let content_height = conv_area.height.saturating_sub(2) as usize; // 边框
    let total_lines = text_lines.len();
    let max_scroll = total_lines.saturating_sub(content_height);
    let scroll_offset = view.conversation_scroll.min(max_scroll);

    let paragraph = Paragraph::new(Text::from(text_lines))
        .block(block)
        .scroll((scroll_offset as u16, 0));
    f.render_widget(paragraph, conv_area);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, conv_area, &mut scrollbar_state);
    }

    let input_prompt = if state.pending {
        " Waiting for reply… "
    } else {
        " Ask Penny "
    };
    let hint = " Enter send │ ↑↓ PgUp/PgDn scroll │ Ctrl+L clear │ Ctrl+Q quit ";
    let input_block = Block::default()
        .title(input_prompt)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(theme.text_light))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary));

    let input = Paragraph::new(view.input_buffer)
        .block(input_block)
        .wrap(Wrap { trim: false })
        .style(if state.pending {
            Style::default().fg(theme.text_light)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[1]);

    (total_lines, content_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::core::ConversationState;
    use crate::knowledge::{layers, UserRole};
    use crate::playbook::{PlaybookCatalog, Topic};

    #[test]
    fn test_wrap_text_keeps_blank_lines() {
        let lines = wrap_text("abcdef\n\nxy", 4);
        assert_eq!(lines, vec!["abcd", "ef", "", "xy"]);
    }

    #[test]
    fn test_draw_shows_thinking_indicator() {
        let catalog = PlaybookCatalog::sample();
        let mut conv = ConversationState::new();
        conv.switch_topic(Topic::from(catalog.get("pb-1").unwrap()));
        conv.submit("What is STAR?");
        let state = conv.project(&[], catalog.playbooks(), layers(UserRole::Coach, 0).to_vec());

        let theme = Theme::default();
        let view = View {
            app_name: "Ask Penny AI",
            user_name: "You",
            theme: &theme,
            input_buffer: "",
            conversation_scroll: 0,
        };
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let mut out = (0, 0);
        terminal.draw(|f| draw(f, &state, &view, &mut out)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let rendered: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Penny is thinking"));
        assert!(rendered.contains("What is STAR?"));
        assert!(rendered.contains("Recent Playbooks"));
        assert!(out.0 > 0);
    }
}
