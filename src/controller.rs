use crate::event::SearchTicket;
use crate::model::{Candidate, Category, SessionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading(SearchTicket),
    Ready(Category),
}

/// What the UI should do with a finished search.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Stale,
}

/// Category switching, search bookkeeping and selection, independent of the
/// terminal.
#[derive(Debug)]
pub struct Controller {
    categories: Vec<Category>,
    active: Category,
    phase: Phase,
    session: SessionState,
    generation: u64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        let categories = Category::all();
        let active = categories.first().copied().unwrap_or_default();
        Self {
            categories,
            active,
            phase: Phase::Idle,
            session: SessionState::new(),
            generation: 0,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn active(&self) -> Category {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    /// Enters `Loading` for `category` and returns the ticket the search must be
    /// dispatched with. Any in-flight search is superseded.
    pub fn select_category(&mut self, category: Category) -> SearchTicket {
        self.generation += 1;
        let ticket = SearchTicket {
            category,
            generation: self.generation,
        };
        self.active = category;
        self.session.clear_results(category);
        self.phase = Phase::Loading(ticket);
        ticket
    }

    pub fn next_category(&mut self) -> SearchTicket {
        let next = self.active.next();
        self.select_category(next)
    }

    pub fn reload(&mut self) -> SearchTicket {
        self.select_category(self.active)
    }

    fn is_current(&self, ticket: SearchTicket) -> bool {
        self.phase == Phase::Loading(ticket)
    }

    pub fn complete_search(&mut self, ticket: SearchTicket, candidates: Vec<Candidate>) -> Delivery {
        if !self.is_current(ticket) {
            return Delivery::Stale;
        }
        self.session.set_results(ticket.category, candidates);
        self.phase = Phase::Ready(ticket.category);
        Delivery::Applied
    }

    /// A failed search leaves the category ready with no candidates.
    pub fn fail_search(&mut self, ticket: SearchTicket) -> Delivery {
        self.complete_search(ticket, Vec::new())
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self.phase {
            Phase::Ready(category) => self.session.results(category),
            _ => &[],
        }
    }

    pub fn choose(&mut self, index: usize) -> bool {
        match self.phase {
            Phase::Ready(category) => self.session.select(category, index),
            _ => false,
        }
    }

    pub fn selection(&self) -> Option<usize> {
        self.session.selection(self.active)
    }

    /// The category and candidate a save would export, if saving is possible.
    pub fn save_target(&self) -> Option<(Category, &Candidate)> {
        match self.phase {
            Phase::Ready(category) => self
                .session
                .selected_candidate(category)
                .map(|candidate| (category, candidate)),
            _ => None,
        }
    }
}
