use crossterm::event::KeyEvent;
use image::DynamicImage;

use crate::model::{Candidate, Category};

/// Identifies one dispatched search. A new ticket is issued for every category
/// switch, so a result can be matched against the search the UI is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    pub category: Category,
    pub generation: u64,
}

#[derive(Clone, Debug)]
pub enum AppMsg {
    Tick,
    Key(KeyEvent),
    Quit,

    // Category navigation
    CategorySelected(Category),
    NextCategory,
    Reload,

    // Search worker
    SearchCompleted {
        ticket: SearchTicket,
        candidates: Vec<Candidate>,
        previews: Vec<Option<DynamicImage>>,
    },
    SearchFailed {
        ticket: SearchTicket,
        error: String,
    },

    // Selection / export
    CandidateChosen(usize),
    SaveRequested,
    Saved(Category),

    // General
    ErrorOccurred(String),
    LogMessage(String),
}
