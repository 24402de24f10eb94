use super::Component;
use crate::event::AppMsg;
use crate::model::{Candidate, Category};
use crate::widgets::common::{focused_block, spinner_frame, truncate};
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use image::DynamicImage;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};

/// One candidate column. The protocol state has to stay alive for as long as
/// the preview is on screen.
pub struct PreviewSlot {
    pub candidate: Candidate,
    pub image: Option<StatefulProtocol>,
}

pub struct GalleryState {
    picker: Picker,
    pub category: Option<Category>,
    pub slots: Vec<PreviewSlot>,
    pub cursor: usize,
    pub selected: Option<usize>,
    pub loading: bool,
    pub spinner_ix: usize,
}

impl GalleryState {
    pub fn new(picker: Picker) -> Self {
        Self {
            picker,
            category: None,
            slots: Vec::new(),
            cursor: 0,
            selected: None,
            loading: false,
            spinner_ix: 0,
        }
    }

    pub fn begin_loading(&mut self, category: Category) {
        self.category = Some(category);
        self.slots.clear();
        self.cursor = 0;
        self.selected = None;
        self.loading = true;
    }

    pub fn show_results(
        &mut self,
        category: Category,
        candidates: &[Candidate],
        previews: &[Option<DynamicImage>],
    ) {
        self.category = Some(category);
        self.loading = false;
        self.cursor = 0;
        self.selected = None;
        self.slots = candidates
            .iter()
            .enumerate()
            .map(|(ix, candidate)| PreviewSlot {
                candidate: candidate.clone(),
                image: previews
                    .get(ix)
                    .and_then(|p| p.clone())
                    .map(|img| self.picker.new_resize_protocol(img)),
            })
            .collect();
    }

    fn choose(&mut self, index: usize) -> Option<AppMsg> {
        if index >= self.slots.len() {
            return None;
        }
        self.cursor = index;
        self.selected = Some(index);
        Some(AppMsg::CandidateChosen(index))
    }

    fn render_slot(&mut self, ix: usize, area: Rect, buf: &mut Buffer) {
        let theme = get_theme();
        let is_cursor = ix == self.cursor;
        let is_selected = self.selected == Some(ix);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if is_cursor { BorderType::Double } else { BorderType::Plain })
            .border_style(Style::default().fg(if is_selected {
                theme.status_completed
            } else if is_cursor {
                theme.text_highlight
            } else {
                theme.text_secondary
            }))
            .title(format!(" {} ", ix + 1));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(2), Constraint::Length(1)])
            .split(inner);

        let slot = &mut self.slots[ix];
        match slot.image.as_mut() {
            Some(protocol) => {
                StatefulWidget::render(StatefulImage::default(), chunks[0], buf, protocol);
            }
            None => {
                Paragraph::new("preview unavailable")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(theme.status_failed))
                    .render(chunks[0], buf);
            }
        }

        let caption = truncate(&slot.candidate.caption(), (chunks[1].width as usize) * 2);
        Paragraph::new(caption)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme.text_secondary))
            .render(chunks[1], buf);

        let radio = if is_selected { "(•) Selected" } else { "( ) Select" };
        let radio_style = if is_selected {
            Style::default()
                .fg(theme.status_completed)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_primary)
        };
        Paragraph::new(Line::from(Span::styled(radio, radio_style)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

impl Component for GalleryState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::Tick => {
                if self.loading {
                    self.spinner_ix = self.spinner_ix.wrapping_add(1);
                }
            }
            AppMsg::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.cursor = self.cursor.saturating_sub(1);
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    if self.cursor + 1 < self.slots.len() {
                        self.cursor += 1;
                    }
                }
                KeyCode::Enter | KeyCode::Char(' ') => return self.choose(self.cursor),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    return self.choose(index);
                }
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let title = match self.category {
            Some(category) => format!("Candidates: {}", category),
            None => "Candidates".to_string(),
        };
        let block = focused_block(title, is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.loading {
            let phrase = self.category.map(|c| c.phrase()).unwrap_or_default();
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} Searching \"{}\"...", spinner_frame(self.spinner_ix), phrase),
                    Style::default().fg(theme.status_running),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        if self.slots.is_empty() {
            let text = if self.category.is_some() {
                "No candidates for this category"
            } else {
                "Select a category to search"
            };
            Paragraph::new(vec![Line::from(""), Line::from(text)])
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.text_secondary))
                .render(inner, buf);
            return;
        }

        let count = self.slots.len() as u32;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints((0..count).map(|_| Constraint::Ratio(1, count)))
            .split(inner);

        for ix in 0..self.slots.len() {
            self.render_slot(ix, columns[ix], buf);
        }
    }
}
