use super::Component;
use crate::event::AppMsg;
use crate::model::Category;
use crate::widgets::common::{focused_block, truncate};
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, StatefulWidget, Widget},
};
use std::collections::HashSet;

pub struct CategoryListState {
    pub categories: Vec<Category>,
    pub list_state: ListState,
    pub active: Option<Category>,
    pub saved: HashSet<Category>,
}

impl Default for CategoryListState {
    fn default() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            categories: Category::all(),
            list_state,
            active: None,
            saved: HashSet::new(),
        }
    }
}

impl CategoryListState {
    pub fn with_saved(mut self, saved: impl IntoIterator<Item = Category>) -> Self {
        self.saved.extend(saved);
        self
    }

    pub fn highlighted(&self) -> Option<Category> {
        self.list_state
            .selected()
            .and_then(|ix| self.categories.get(ix).copied())
    }

    fn move_by(&mut self, delta: isize) {
        if self.categories.is_empty() {
            return;
        }
        let len = self.categories.len() as isize;
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.list_state.select(Some(next as usize));
    }

    fn set_active(&mut self, category: Category) {
        self.active = Some(category);
        if let Some(ix) = self.categories.iter().position(|c| *c == category) {
            self.list_state.select(Some(ix));
        }
    }
}

impl Component for CategoryListState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::Key(key) => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
                KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
                KeyCode::Home => self.list_state.select(Some(0)),
                KeyCode::End => self
                    .list_state
                    .select(Some(self.categories.len().saturating_sub(1))),
                KeyCode::Enter => {
                    return self.highlighted().map(AppMsg::CategorySelected);
                }
                _ => {}
            },
            AppMsg::CategorySelected(category) => self.set_active(*category),
            AppMsg::Saved(category) => {
                self.saved.insert(*category);
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let title = format!("Categories ({}/{} saved)", self.saved.len(), self.categories.len());
        let block = focused_block(title, is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let max_phrase = (inner.width as usize).saturating_sub(28);
        let items: Vec<ListItem> = self
            .categories
            .iter()
            .map(|category| {
                let is_active = self.active == Some(*category);
                let marker = if is_active { "▶" } else { " " };
                let check = if self.saved.contains(category) { "✓" } else { " " };

                let name_style = if is_active {
                    Style::default()
                        .fg(theme.text_highlight)
                        .add_modifier(Modifier::BOLD)
                } else if self.saved.contains(category) {
                    Style::default().fg(theme.status_completed)
                } else {
                    Style::default().fg(theme.text_primary)
                };

                let mut spans = vec![
                    Span::raw(format!("{} {} ", marker, check)),
                    Span::styled(format!("{:<23}", category.id()), name_style),
                ];
                if max_phrase > 3 {
                    spans.push(Span::styled(
                        truncate(category.phrase(), max_phrase),
                        Style::default().fg(theme.text_secondary),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list =
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, inner, buf, &mut self.list_state);
    }
}
