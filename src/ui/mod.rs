//! TUI 层：Ratatui + crossterm，主循环（app）、事件（event）、渲染（render）、格式与主题

pub mod app;
pub mod event;
pub mod format;
pub mod render;
pub mod theme;

pub use app::{run_app, AppOptions};
pub use event::EventHandler;
pub use render::draw;
pub use theme::Theme;
