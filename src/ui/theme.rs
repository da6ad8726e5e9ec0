//! 品牌主题：配置中的十六进制颜色解析为终端颜色，启动时构建一次后传给渲染层

use ratatui::style::Color;

use crate::config::ThemeSection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub accent: Color,
    pub charcoal: Color,
    pub user_message: Color,
    pub text_light: Color,
}

impl Theme {
    pub fn from_config(section: &ThemeSection) -> Self {
        Self {
            primary: parse_hex(&section.primary).unwrap_or(Color::Blue),
            accent: parse_hex(&section.accent).unwrap_or(Color::Red),
            charcoal: parse_hex(&section.charcoal).unwrap_or(Color::DarkGray),
            user_message: parse_hex(&section.user_message).unwrap_or(Color::Cyan),
            text_light: parse_hex(&section.text_light).unwrap_or(Color::Gray),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeSection::default())
    }
}

/// "#RRGGBB" 或 "RRGGBB"
fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 {
        tracing::warn!(color = s, "invalid theme colour, using fallback");
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_defaults() {
        let theme = Theme::default();
        assert_eq!(theme.primary, Color::Rgb(0x01, 0x70, 0xB9));
        assert_eq!(theme.accent, Color::Rgb(0xE9, 0x46, 0x29));
    }

    #[test]
    fn test_invalid_falls_back() {
        assert_eq!(parse_hex("zzzzzz"), None);
        assert_eq!(parse_hex("#123"), None);
        let section = ThemeSection {
            primary: "nope".into(),
            ..ThemeSection::default()
        };
        assert_eq!(Theme::from_config(&section).primary, Color::Blue);
    }
}
