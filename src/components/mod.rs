use crate::event::AppMsg;
use ratatui::{buffer::Buffer, layout::Rect};

pub mod category_list;
pub mod gallery;
pub mod logs;

pub trait Component {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg>;

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool);
}
