use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use ratatui_image::picker::Picker;
use std::sync::Arc;
use std::{
    io,
    time::{Duration, Instant},
};

use crate::components::Component;
use crate::components::category_list::CategoryListState;
use crate::components::gallery::GalleryState;
use crate::components::logs::LogsState;
use crate::config::Config;
use crate::controller::{Controller, Delivery, Phase};
use crate::event::{AppMsg, SearchTicket};
use crate::pipeline::export::{Exporter, save_selection};
use crate::pipeline::fs_ops::existing_exports;
use crate::search_worker::SearchWorker;
use crate::unsplash::ImageSource;
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Gallery,
    Logs,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Categories => Focus::Gallery,
            Focus::Gallery => Focus::Logs,
            Focus::Logs => Focus::Categories,
        }
    }
}

pub struct App {
    pub config: Config,
    pub controller: Controller,
    pub categories: CategoryListState,
    pub gallery: GalleryState,
    pub logs: LogsState,
    pub focus: Focus,
    worker: SearchWorker,
    source: Arc<dyn ImageSource>,
    exporter: Exporter,
    rx: Receiver<AppMsg>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        picker: Picker,
        source: Arc<dyn ImageSource>,
        tx: Sender<AppMsg>,
        rx: Receiver<AppMsg>,
    ) -> Result<Self> {
        let worker = SearchWorker::new(tx, source.clone(), &config)?;
        let exporter = Exporter::from_config(&config);

        let controller = Controller::new();
        let already_saved = existing_exports(&config.output_dir);

        Ok(Self {
            categories: CategoryListState::default().with_saved(already_saved),
            gallery: GalleryState::new(picker),
            logs: LogsState::default(),
            focus: Focus::Gallery,
            controller,
            worker,
            source,
            exporter,
            rx,
            should_quit: false,
            config,
        })
    }

    /// Kicks off the search for the first category.
    pub fn start(&mut self) {
        log::info!(
            "Saving backgrounds to {} ({} of {} already present)",
            self.config.output_dir.display(),
            self.categories.saved.len(),
            self.controller.categories().len()
        );
        let first = self.controller.active();
        self.handle(AppMsg::CategorySelected(first));
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Waits up to `timeout` for one worker/log message and handles it.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => {
                self.handle(msg);
                true
            }
            Err(_) => false,
        }
    }

    pub fn handle(&mut self, msg: AppMsg) {
        match msg {
            AppMsg::Quit => self.should_quit = true,
            AppMsg::Tick => {
                self.gallery.update(&msg);
            }
            AppMsg::Key(key) => self.handle_key(key),
            AppMsg::CategorySelected(category) => {
                let ticket = self.controller.select_category(category);
                self.dispatch(ticket);
            }
            AppMsg::NextCategory => {
                let ticket = self.controller.next_category();
                self.dispatch(ticket);
            }
            AppMsg::Reload => {
                let ticket = self.controller.reload();
                self.dispatch(ticket);
            }
            AppMsg::SearchCompleted {
                ticket,
                candidates,
                previews,
            } => {
                let count = candidates.len();
                match self.controller.complete_search(ticket, candidates) {
                    Delivery::Applied => {
                        self.gallery
                            .show_results(ticket.category, self.controller.candidates(), &previews);
                        if count == 0 {
                            log::warn!("No results for {}", ticket.category);
                        } else {
                            log::info!("{} candidates for {}", count, ticket.category);
                        }
                    }
                    Delivery::Stale => {
                        log::debug!("Dropped stale results for {}", ticket.category);
                    }
                }
            }
            AppMsg::SearchFailed { ticket, error } => match self.controller.fail_search(ticket) {
                Delivery::Applied => {
                    self.gallery.show_results(ticket.category, &[], &[]);
                    log::error!("Search for {} failed: {}", ticket.category, error);
                }
                Delivery::Stale => {
                    log::debug!("Dropped stale failure for {}: {}", ticket.category, error);
                }
            },
            AppMsg::CandidateChosen(index) => {
                if self.controller.choose(index) {
                    log::info!("Picked #{} for {}", index + 1, self.controller.active());
                } else {
                    self.gallery.selected = self.controller.selection();
                }
            }
            AppMsg::SaveRequested => self.save(),
            AppMsg::Saved(_) => {
                self.categories.update(&msg);
            }
            AppMsg::LogMessage(_) | AppMsg::ErrorOccurred(_) => {
                self.logs.update(&msg);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.handle(AppMsg::Quit)
            }
            (KeyCode::Tab, _) => self.focus = self.focus.next(),
            (KeyCode::Char('n'), _) => self.handle(AppMsg::NextCategory),
            (KeyCode::Char('r'), _) => self.handle(AppMsg::Reload),
            (KeyCode::Char('s'), _) => self.handle(AppMsg::SaveRequested),
            (KeyCode::Char('1'..='9'), _) => self.forward(Focus::Gallery, AppMsg::Key(key)),
            _ => self.forward(self.focus, AppMsg::Key(key)),
        }
    }

    fn forward(&mut self, target: Focus, msg: AppMsg) {
        let reply = match target {
            Focus::Categories => self.categories.update(&msg),
            Focus::Gallery => self.gallery.update(&msg),
            Focus::Logs => self.logs.update(&msg),
        };
        if let Some(reply) = reply {
            self.handle(reply);
        }
    }

    fn dispatch(&mut self, ticket: SearchTicket) {
        self.categories
            .update(&AppMsg::CategorySelected(ticket.category));
        self.gallery.begin_loading(ticket.category);
        log::info!("Searching {}...", ticket.category);
        self.worker.start_search(ticket);
    }

    /// Runs on the UI thread and blocks input until the download and encode
    /// finish.
    fn save(&mut self) {
        let Some((category, candidate)) = self.controller.save_target() else {
            log::warn!("Nothing selected for {}", self.controller.active());
            return;
        };
        let candidate = candidate.clone();

        match save_selection(
            self.source.as_ref(),
            &self.exporter,
            category,
            &candidate,
            self.config.export_variant,
        ) {
            Ok(path) => {
                log::info!("Saved {}", path.display());
                self.handle(AppMsg::Saved(category));
            }
            Err(e) => self.handle(AppMsg::ErrorOccurred(format!(
                "Saving {} failed: {:#}",
                category, e
            ))),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        self.start();
        let res = self.event_loop(&mut terminal);

        // Restore terminal
        restore_terminal(&mut terminal)?;
        res
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let tick_rate = Duration::from_millis(120);
        let mut last_tick = Instant::now();

        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle(AppMsg::Key(key));
                    }
                }
            }

            while let Ok(msg) = self.rx.try_recv() {
                self.handle(msg);
            }

            if last_tick.elapsed() >= tick_rate {
                self.handle(AppMsg::Tick);
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame) {
        let theme = get_theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(f.area());

        let active = self.controller.active();
        let (phase_text, phase_color) = match self.controller.phase() {
            Phase::Idle => ("idle".to_string(), theme.status_idle),
            Phase::Loading(_) => ("loading".to_string(), theme.status_running),
            Phase::Ready(_) => match self.controller.selection() {
                Some(ix) => (format!("ready, #{} selected", ix + 1), theme.status_completed),
                None => ("ready".to_string(), theme.status_completed),
            },
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                active.id(),
                Style::default()
                    .fg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  \""),
            Span::raw(active.phrase()),
            Span::raw("\"  "),
            Span::styled(phase_text, Style::default().fg(phase_color)),
        ]))
        .alignment(Alignment::Center)
        .block(focused_block("weather-bg-picker", false));
        f.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(64), Constraint::Min(20)])
            .split(chunks[1]);

        let buf = f.buffer_mut();
        self.categories
            .render(body[0], buf, self.focus == Focus::Categories);
        self.gallery.render(body[1], buf, self.focus == Focus::Gallery);
        self.logs.render(chunks[2], buf, self.focus == Focus::Logs);

        let status = Paragraph::new(
            "Tab focus | Enter pick | 1-5 select | s save | n next | r reload | q quit",
        )
        .style(Style::default().fg(theme.text_secondary));
        f.render_widget(status, chunks[3]);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().ok();
    // LeaveAlternateScreen must be executed on the same stdout the backend uses
    let mut out = io::stdout();
    execute!(out, LeaveAlternateScreen)?;
    Ok(())
}
