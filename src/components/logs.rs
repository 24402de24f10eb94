use super::Component;
use crate::event::AppMsg;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use std::collections::VecDeque;

const MAX_LOG_LINES: usize = 500;

#[derive(Debug)]
pub struct LogsState {
    pub logs: VecDeque<String>,
    scroll_state: ScrollbarState,
    scroll_offset: u16,
    stick_to_bottom: bool,
}

impl Default for LogsState {
    fn default() -> Self {
        Self {
            logs: VecDeque::new(),
            scroll_state: ScrollbarState::default(),
            scroll_offset: 0,
            stick_to_bottom: true,
        }
    }
}

impl LogsState {
    pub fn add_log(&mut self, message: String) {
        self.logs.push_back(message);
        while self.logs.len() > MAX_LOG_LINES {
            self.logs.pop_front();
        }
    }

    fn scroll_up(&mut self, lines: u16) {
        self.stick_to_bottom = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);
    }
}

fn line_style(line: &str) -> Style {
    let theme = get_theme();
    let level = line.split_once(": ").map(|(marker, _)| marker);
    match level {
        Some("ERROR") => Style::default().fg(theme.status_failed),
        Some("WARN") => Style::default().fg(theme.status_idle),
        Some("DEBUG") | Some("TRACE") => Style::default().fg(theme.text_secondary),
        _ => Style::default().fg(theme.text_primary),
    }
}

impl Component for LogsState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::LogMessage(msg) => self.add_log(msg.clone()),
            AppMsg::ErrorOccurred(err) => self.add_log(format!("ERROR: {}", err)),
            AppMsg::Key(key) => match key.code {
                KeyCode::PageUp => self.scroll_up(10),
                KeyCode::PageDown => self.scroll_down(10),
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let block = focused_block("Logs", is_focused);
        let inner_area = block.inner(area);
        block.render(area, buf);

        let width = (inner_area.width as usize).saturating_sub(2);
        if width == 0 {
            return;
        }

        // Wrapped lines keep the style of the record they came from.
        let styled_lines: Vec<Line> = self
            .logs
            .iter()
            .flat_map(|log| {
                let style = line_style(log);
                textwrap::wrap(log, width)
                    .into_iter()
                    .map(move |l| Line::from(Span::styled(l.into_owned(), style)))
            })
            .collect();
        let total_height = styled_lines.len();

        let max_scroll = total_height.saturating_sub(inner_area.height as usize);
        self.scroll_state = self.scroll_state.content_length(total_height);

        if self.stick_to_bottom || self.scroll_offset as usize >= max_scroll {
            self.scroll_offset = max_scroll as u16;
            self.stick_to_bottom = true;
        }
        self.scroll_state = self.scroll_state.position(self.scroll_offset as usize);

        Paragraph::new(styled_lines)
            .scroll((self.scroll_offset, 0))
            .render(inner_area, buf);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        StatefulWidget::render(scrollbar, inner_area, buf, &mut self.scroll_state);
    }
}
