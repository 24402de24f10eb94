use super::theme::get_theme;
use ratatui::{
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders},
};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub fn focused_block<'a>(title: impl Into<String>, is_focused: bool) -> Block<'a> {
    let theme = get_theme();
    let (border_color, border_type, title_style) = if is_focused {
        (
            theme.border_focused,
            BorderType::Thick,
            Style::default()
                .fg(theme.text_highlight)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (theme.border_unfocused, BorderType::Plain, Style::default())
    };

    Block::default()
        .title(title.into())
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

/// Cuts `text` to at most `max` characters, ending in an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
