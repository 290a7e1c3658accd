//! Main application state and logic.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};
use super::widgets::{
    format_clock, AnswerButtons, FlashcardWidget, KeyHints, Logo, RoscoResults, RoscoWheel,
    Scoreboard, StatsBar,
};
use crate::auth;
use crate::config::Config;
use crate::models::{AnswerRating, Report, UserData, WordEntry};
use crate::rosco::{AnswerOutcome, FinishReason, ItemStatus, RoscoSession, RoscoSummary};
use crate::scheduler::Scheduler;
use crate::storage::{GameStorage, GUEST_REPORTER};

/// The player allowed to review reports.
pub const ADMIN_USER: &str = "ADMIN";

const STATUS_TTL: Duration = Duration::from_secs(5);

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    /// Definition on the front, word on the back.
    Classic,
    /// Word on the front, definition on the back.
    Inverted,
}

impl CardMode {
    fn title(&self) -> &'static str {
        match self {
            CardMode::Classic => "Classic",
            CardMode::Inverted => "Inverted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    ModeSelect,
    Flashcards(CardMode),
    Rosco,
    RoscoResults,
    Reports,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuEntry {
    Cards(CardMode),
    Rosco,
    Reports,
}

impl MenuEntry {
    fn label(&self) -> (&'static str, &'static str) {
        match self {
            MenuEntry::Cards(CardMode::Classic) => ("Classic", "read the definition, guess the word"),
            MenuEntry::Cards(CardMode::Inverted) => ("Inverted", "read the word, recall the definition"),
            MenuEntry::Rosco => ("Rosco", "one clue per letter, against the clock"),
            MenuEntry::Reports => ("Reports", "review reported words"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RoscoFeedback {
    Answer(AnswerOutcome),
    Passed,
}

/// Text entry shown over the mode menu.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompt {
    Login(String),
    AdminPassword(String),
}

struct StatusMessage {
    text: String,
    at: Instant,
    is_error: bool,
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    config_path: PathBuf,
    pub theme: Theme,

    // Storage and player
    storage: GameStorage,
    catalog: Vec<WordEntry>,
    user: Option<String>,
    user_data: UserData,
    /// Words with a pending report; kept out of play.
    excluded: HashSet<String>,

    menu_state: ListState,
    prompt: Option<Prompt>,
    admin_unlocked: bool,

    // Flashcard state
    scheduler: Scheduler,
    current_card: Option<usize>,
    flipped: bool,
    next_card_at: Option<Instant>,
    cards_answered: usize,
    report_input: Option<String>,
    reset_pending: bool,

    // Rosco state
    rng: ChaCha8Rng,
    rosco: Option<RoscoSession>,
    rosco_input: String,
    rosco_feedback: Option<RoscoFeedback>,
    rosco_summary: Option<RoscoSummary>,
    rosco_new_best: bool,

    // Report review
    reports: Vec<(String, Report)>,
    report_list_state: ListState,

    status_message: Option<StatusMessage>,
}

impl App {
    pub fn new(
        storage: GameStorage,
        config: Config,
        config_path: PathBuf,
        catalog: Vec<WordEntry>,
    ) -> Self {
        let theme = Theme::from_name(&config.theme);
        let user = config.user.clone();

        let (user_data, load_error) = match storage.load_user(user.as_deref()) {
            Ok(data) => (data, None),
            Err(e) => {
                warn!(error = %e, "could not load progress, starting fresh");
                (Default::default(), Some(format!("Could not load progress: {}", e)))
            }
        };

        let mut app = Self {
            screen: Screen::ModeSelect,
            running: true,
            config,
            config_path,
            theme,
            storage,
            catalog,
            user,
            user_data,
            excluded: HashSet::new(),
            menu_state: ListState::default().with_selected(Some(0)),
            prompt: None,
            admin_unlocked: false,
            scheduler: Scheduler::new(),
            current_card: None,
            flipped: false,
            next_card_at: None,
            cards_answered: 0,
            report_input: None,
            reset_pending: false,
            rng: ChaCha8Rng::from_entropy(),
            rosco: None,
            rosco_input: String::new(),
            rosco_feedback: None,
            rosco_summary: None,
            rosco_new_best: false,
            reports: Vec::new(),
            report_list_state: ListState::default(),
            status_message: None,
        };
        app.refresh_excluded();
        if let Some(message) = load_error {
            app.set_error(message);
        }
        app
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_deref() == Some(ADMIN_USER)
    }

    fn user_label(&self) -> &str {
        self.user.as_deref().unwrap_or(GUEST_REPORTER)
    }

    fn menu_entries(&self) -> Vec<MenuEntry> {
        let mut entries = vec![
            MenuEntry::Cards(CardMode::Classic),
            MenuEntry::Cards(CardMode::Inverted),
            MenuEntry::Rosco,
        ];
        if self.is_admin() {
            entries.push(MenuEntry::Reports);
        }
        entries
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        self.save_config();
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save_to(&self.config_path) {
            self.store_failed("save config", e);
        }
    }

    /// Sign in as `name`, or as guest when blank. Progress and reports are
    /// reloaded and the card round starts over.
    pub fn switch_user(&mut self, name: &str) {
        let name = name.trim();
        self.user = if name.is_empty() { None } else { Some(name.to_string()) };
        self.admin_unlocked = false;

        match self.storage.load_user(self.user.as_deref()) {
            Ok(data) => self.user_data = data,
            Err(e) => {
                self.user_data = UserData::default();
                self.store_failed("load progress", e);
            }
        }
        self.refresh_excluded();
        self.scheduler.reset();
        self.menu_state.select(Some(0));
        info!(user = self.user_label(), "signed in");

        if self.is_admin() {
            self.prompt = Some(Prompt::AdminPassword(String::new()));
        } else {
            self.set_status(format!("Playing as {}", self.user_label()));
        }

        self.config.user = self.user.clone();
        self.save_config();
    }

    /// Check the ADMIN password. A wrong one signs the player out.
    fn unlock_admin(&mut self, password: &str) -> bool {
        let Some(hash) = self.config.admin_password_hash.clone() else {
            warn!("admin access attempted without a configured password");
            self.switch_user("");
            self.set_error("No admin password configured (set one with --admin-password)".to_string());
            return false;
        };

        if auth::verify_password(password, &hash) {
            info!("admin unlocked");
            self.admin_unlocked = true;
            true
        } else {
            warn!("admin password rejected");
            self.switch_user("");
            self.set_error("Wrong password, access denied".to_string());
            false
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(StatusMessage {
            text: message,
            at: Instant::now(),
            is_error: false,
        });
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(StatusMessage {
            text: message,
            at: Instant::now(),
            is_error: true,
        });
    }

    fn store_failed(&mut self, action: &str, err: anyhow::Error) {
        warn!(error = %err, action, "store operation failed");
        self.set_error(format!("Could not {}: {}", action, err));
    }

    fn save_progress(&mut self) {
        if let Err(e) = self.storage.save_user(self.user.as_deref(), &mut self.user_data) {
            self.store_failed("save progress", e);
        }
    }

    /// Re-read the reported words and drop the queued round.
    fn refresh_excluded(&mut self) {
        match self.storage.pending_word_ids() {
            Ok(ids) => self.excluded = ids,
            Err(e) => self.store_failed("read reports", e),
        }
        self.scheduler.invalidate();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Flashcards
    // ══════════════════════════════════════════════════════════════════════

    pub fn start_flashcards(&mut self, mode: CardMode) {
        self.scheduler.reset();
        self.cards_answered = 0;
        self.next_card_at = None;
        self.report_input = None;
        self.reset_pending = false;
        self.screen = Screen::Flashcards(mode);
        info!(mode = mode.title(), "flashcards started");
        self.draw_card();
    }

    fn draw_card(&mut self) {
        match self.scheduler.next(&self.catalog, &self.user_data, &self.excluded) {
            Ok(idx) => {
                debug!(card = idx, queued = self.scheduler.queued(), "card drawn");
                self.current_card = Some(idx);
                self.flipped = false;
            }
            Err(e) => {
                self.current_card = None;
                self.screen = Screen::ModeSelect;
                self.set_error(e.to_string());
            }
        }
    }

    fn current_word(&self) -> Option<&WordEntry> {
        self.current_card.and_then(|idx| self.catalog.get(idx))
    }

    pub fn flip(&mut self) {
        if self.next_card_at.is_none() {
            self.flipped = !self.flipped;
        }
    }

    /// Record an answer for the revealed card; the next one follows after a pause.
    pub fn answer_card(&mut self, rating: AnswerRating, now: Instant) {
        if !self.flipped || self.next_card_at.is_some() {
            return;
        }
        let Some(word_id) = self.current_word().map(|w| w.id.clone()) else {
            return;
        };

        let today = Local::now().date_naive();
        let status = self.user_data.record_answer(&word_id, rating, today).status;
        info!(word = %word_id, rating = rating.name(), ?status, "card answered");
        self.cards_answered += 1;
        self.save_progress();
        self.next_card_at = Some(now + self.config.timing.card_delay());
    }

    fn submit_report(&mut self, issue: &str) {
        let Some(word) = self.current_word().cloned() else {
            return;
        };
        match self.storage.submit_report(&word, issue, self.user.as_deref()) {
            Ok(_) => {
                self.set_status(format!("{} Reported \"{}\"", icons::CHECK, word.word));
                self.refresh_excluded();
                self.next_card_at = None;
                self.draw_card();
            }
            Err(e) => self.store_failed("send report", e),
        }
    }

    fn reset_progress(&mut self) {
        match self.storage.reset_user(self.user.as_deref(), &mut self.user_data) {
            Ok(()) => self.set_status("Progress reset".to_string()),
            Err(e) => self.store_failed("reset progress", e),
        }
        self.scheduler.reset();
        self.next_card_at = None;
        self.draw_card();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rosco
    // ══════════════════════════════════════════════════════════════════════

    pub fn start_rosco(&mut self, now: Instant) {
        let session = RoscoSession::start(
            &self.catalog,
            &self.excluded,
            self.config.timing.rosco(),
            &mut self.rng,
            now,
        );
        let finished = session.is_finished();
        self.rosco = Some(session);
        self.rosco_input.clear();
        self.rosco_feedback = None;
        self.rosco_summary = None;
        self.rosco_new_best = false;
        self.screen = Screen::Rosco;

        if finished {
            self.finish_rosco();
        }
    }

    fn submit_rosco(&mut self, now: Instant) {
        let Some(session) = self.rosco.as_mut() else {
            return;
        };
        if let Some(outcome) = session.submit_answer(&self.rosco_input, now) {
            self.rosco_feedback = Some(RoscoFeedback::Answer(outcome));
            self.rosco_input.clear();
        }
    }

    fn pass_rosco(&mut self, now: Instant) {
        let Some(session) = self.rosco.as_mut() else {
            return;
        };
        if session.skip(now) {
            self.rosco_feedback = Some(RoscoFeedback::Passed);
            self.rosco_input.clear();
        }
    }

    fn finish_rosco(&mut self) {
        let Some(session) = self.rosco.as_ref() else {
            return;
        };
        let summary = session.summary();
        let reason = session.finish_reason();
        for item in session.items().iter().filter(|i| i.status != ItemStatus::Correct) {
            debug!(word = %item.id, letter = %item.letter, "missed in rosco");
        }

        if reason == Some(FinishReason::NoWords) {
            self.rosco = None;
            self.screen = Screen::ModeSelect;
            self.set_error("No words available for a rosco".to_string());
            return;
        }

        self.rosco_new_best = self
            .user_data
            .record_rosco(summary.correct as u32, summary.seconds);
        if self.rosco_new_best {
            self.save_progress();
        }
        self.rosco_summary = Some(summary);
        self.screen = Screen::RoscoResults;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Reports
    // ══════════════════════════════════════════════════════════════════════

    fn open_reports(&mut self) {
        match self.storage.pending_reports() {
            Ok(reports) => self.reports = reports,
            Err(e) => self.store_failed("read reports", e),
        }
        let selected = if self.reports.is_empty() { None } else { Some(0) };
        self.report_list_state.select(selected);
        self.screen = Screen::Reports;
    }

    fn resolve_selected_report(&mut self) {
        let Some(i) = self.report_list_state.selected() else {
            return;
        };
        let Some((id, report)) = self.reports.get(i).cloned() else {
            return;
        };
        let resolver = self.user_label().to_string();
        match self.storage.resolve_report(&id, &resolver) {
            Ok(()) => {
                self.set_status(format!("{} Resolved \"{}\"", icons::CHECK, report.word));
                self.reports.remove(i);
                if i >= self.reports.len() {
                    self.report_list_state
                        .select(self.reports.len().checked_sub(1));
                }
                self.refresh_excluded();
            }
            Err(e) => self.store_failed("resolve report", e),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Clock
    // ══════════════════════════════════════════════════════════════════════

    /// Run time-driven steps: the rosco clock and the delayed next card.
    pub fn tick(&mut self, now: Instant) {
        if self.screen == Screen::Rosco {
            let ended = self.rosco.as_mut().and_then(|s| s.poll(now)).is_some();
            if ended {
                self.finish_rosco();
            }
        }

        if let Some(due) = self.next_card_at {
            if now >= due {
                self.next_card_at = None;
                self.draw_card();
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }

                let now = Instant::now();
                match self.screen {
                    Screen::ModeSelect => self.handle_mode_select_keys(key.code, now),
                    Screen::Flashcards(_) => self.handle_flashcard_keys(key.code, now),
                    Screen::Rosco => self.handle_rosco_keys(key.code, now),
                    Screen::RoscoResults => self.handle_results_keys(key.code, now),
                    Screen::Reports => self.handle_reports_keys(key.code),
                }
            }
        }
        Ok(())
    }

    fn handle_mode_select_keys(&mut self, key: KeyCode, now: Instant) {
        if let Some(ref mut prompt) = self.prompt {
            let text = match prompt {
                Prompt::Login(text) | Prompt::AdminPassword(text) => text,
            };
            match key {
                KeyCode::Esc => self.prompt = None,
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Char(c) => text.push(c),
                KeyCode::Enter => match self.prompt.take() {
                    Some(Prompt::Login(name)) => self.switch_user(&name),
                    Some(Prompt::AdminPassword(password)) => {
                        if self.unlock_admin(&password) {
                            self.open_reports();
                        }
                    }
                    None => {}
                },
                _ => {}
            }
            return;
        }

        let entries = self.menu_entries();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('j') | KeyCode::Down => {
                let i = self.menu_state.selected().unwrap_or(0);
                self.menu_state.select(Some((i + 1).min(entries.len() - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = self.menu_state.selected().unwrap_or(0);
                self.menu_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Enter => {
                let i = self.menu_state.selected().unwrap_or(0);
                match entries.get(i) {
                    Some(MenuEntry::Cards(mode)) => self.start_flashcards(*mode),
                    Some(MenuEntry::Rosco) => self.start_rosco(now),
                    Some(MenuEntry::Reports) if self.admin_unlocked => self.open_reports(),
                    Some(MenuEntry::Reports) => {
                        self.prompt = Some(Prompt::AdminPassword(String::new()));
                    }
                    None => {}
                }
            }
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('u') => self.prompt = Some(Prompt::Login(String::new())),
            _ => {}
        }
    }

    fn handle_flashcard_keys(&mut self, key: KeyCode, now: Instant) {
        if let Some(ref mut issue) = self.report_input {
            match key {
                KeyCode::Esc => self.report_input = None,
                KeyCode::Enter => {
                    let text = issue.trim().to_string();
                    if !text.is_empty() {
                        self.report_input = None;
                        self.submit_report(&text);
                    }
                }
                KeyCode::Backspace => {
                    issue.pop();
                }
                KeyCode::Char(c) => issue.push(c),
                _ => {}
            }
            return;
        }

        if key != KeyCode::Char('R') {
            self.reset_pending = false;
        }

        match key {
            KeyCode::Esc => {
                self.current_card = None;
                self.next_card_at = None;
                self.screen = Screen::ModeSelect;
            }
            KeyCode::Char(' ') => self.flip(),
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(rating) = AnswerRating::from_key(c) {
                    self.answer_card(rating, now);
                }
            }
            KeyCode::Char('r') => {
                if self.current_card.is_some() && self.next_card_at.is_none() {
                    self.report_input = Some(String::new());
                }
            }
            KeyCode::Char('R') => {
                if self.reset_pending {
                    self.reset_pending = false;
                    self.reset_progress();
                } else {
                    self.reset_pending = true;
                    self.set_status("Press R again to reset all progress".to_string());
                }
            }
            _ => {}
        }
    }

    fn handle_rosco_keys(&mut self, key: KeyCode, now: Instant) {
        let busy = self.rosco.as_ref().map_or(true, |s| s.is_busy());
        match key {
            KeyCode::Esc => {
                self.rosco = None;
                self.screen = Screen::ModeSelect;
            }
            KeyCode::Enter => self.submit_rosco(now),
            KeyCode::Tab => self.pass_rosco(now),
            KeyCode::Backspace if !busy => {
                self.rosco_input.pop();
            }
            KeyCode::Char(c) if !busy => self.rosco_input.push(c),
            _ => {}
        }
    }

    fn handle_results_keys(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Enter => self.start_rosco(now),
            KeyCode::Esc | KeyCode::Char('q') => {
                self.rosco = None;
                self.screen = Screen::ModeSelect;
            }
            _ => {}
        }
    }

    fn handle_reports_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::ModeSelect,
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.reports.is_empty() {
                    let i = self.report_list_state.selected().unwrap_or(0);
                    self.report_list_state
                        .select(Some((i + 1).min(self.reports.len() - 1)));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = self.report_list_state.selected().unwrap_or(0);
                self.report_list_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Enter => self.resolve_selected_report(),
            _ => {}
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        match self.screen {
            Screen::ModeSelect => self.render_mode_select(frame, area),
            Screen::Flashcards(mode) => self.render_flashcards(frame, area, mode),
            Screen::Rosco => self.render_rosco(frame, area),
            Screen::RoscoResults => self.render_rosco_results(frame, area),
            Screen::Reports => self.render_reports(frame, area),
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref status) = self.status_message {
            if status.at.elapsed() < STATUS_TTL {
                let color = if status.is_error {
                    self.theme.colors.error
                } else {
                    self.theme.colors.success
                };
                let paragraph = Paragraph::new(status.text.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(color));
                frame.render_widget(paragraph, area);
            }
        }
    }

    fn render_mode_select(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(1),   // Top padding
            Constraint::Length(8),   // Logo
            Constraint::Length(1),   // User
            Constraint::Length(1),   // Stats
            Constraint::Length(1),   // Personal best
            Constraint::Length(1),   // Spacing
            Constraint::Min(6),      // Modes
            Constraint::Length(1),   // Status
            Constraint::Length(2),   // Help
        ])
        .split(area);

        Logo::render_to(&self.theme, chunks[1], frame.buffer_mut());

        let user = Paragraph::new(Line::from(vec![
            Span::styled("Player: ", self.theme.subtitle()),
            Span::styled(self.user_label().to_string(), self.theme.highlight()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(user, chunks[2]);

        let stats = self.user_data.stats(self.catalog.len());
        frame.render_widget(
            StatsBar::new(stats, &self.theme),
            centered_rect(80, 100, chunks[3]),
        );

        let best = match self.user_data.rosco_best {
            Some(best) => Line::from(vec![
                Span::styled(format!("{} Rosco best: ", icons::TROPHY), self.theme.subtitle()),
                Span::styled(
                    format!("{} correct in {}", best.correct, format_clock(best.time)),
                    self.theme.highlight(),
                ),
            ]),
            None => Line::from(Span::styled("No rosco played yet", self.theme.key_hint())),
        };
        frame.render_widget(Paragraph::new(best).alignment(Alignment::Center), chunks[4]);

        let items: Vec<ListItem> = self
            .menu_entries()
            .iter()
            .map(|entry| {
                let (name, description) = entry.label();
                ListItem::new(Line::from(vec![
                    Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!("  {}", description),
                        Style::default().fg(self.theme.colors.text_muted),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Modes ")
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, centered_rect(60, 100, chunks[6]), &mut self.menu_state);

        self.render_status(frame, chunks[7]);

        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints_data: [(&str, &str); 5] = [
            ("j/k", "nav"),
            ("Enter", "play"),
            ("u", "user"),
            ("t", &theme_hint),
            ("q", "quit"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[8]);

        match self.prompt {
            Some(Prompt::Login(ref name)) => self.render_input_popup(
                frame,
                area,
                "Sign in",
                "Your name (leave blank to play as guest):",
                name,
                "sign in",
            ),
            Some(Prompt::AdminPassword(ref password)) => {
                let masked = "•".repeat(password.chars().count());
                self.render_input_popup(frame, area, "Admin access", "ADMIN password:", &masked, "enter");
            }
            None => {}
        }
    }

    fn render_flashcards(&mut self, frame: &mut Frame, area: Rect, mode: CardMode) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Header
            Constraint::Length(1),   // Stats
            Constraint::Length(1),   // Separator
            Constraint::Min(10),     // Card
            Constraint::Length(1),   // Status
            Constraint::Length(5),   // Buttons
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(mode.title(), self.theme.title()),
            Span::styled(
                format!("  {} answered this session", self.cards_answered),
                self.theme.subtitle(),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let stats = self.user_data.stats(self.catalog.len());
        frame.render_widget(
            StatsBar::new(stats, &self.theme),
            centered_rect(80, 100, chunks[1]),
        );

        let card_area = centered_rect(80, 100, chunks[3]);
        if let Some(word) = self.current_word() {
            let (front, back) = match mode {
                CardMode::Classic => (word.definition.as_str(), word.word.as_str()),
                CardMode::Inverted => (word.word.as_str(), word.definition.as_str()),
            };
            let (content, is_front) = if self.flipped { (back, false) } else { (front, true) };
            frame.render_widget(
                FlashcardWidget::new(word, content, is_front, &self.theme),
                card_area,
            );
        }

        self.render_status(frame, chunks[4]);

        let answering = self.flipped && self.next_card_at.is_none();
        frame.render_widget(
            AnswerButtons::new(answering, &self.theme),
            centered_rect(90, 100, chunks[5]),
        );

        let hints = if answering {
            KeyHints::new(&[
                ("1", "Correct"),
                ("2", "Practice"),
                ("3", "Wrong"),
                ("Space", "flip"),
                ("r", "report"),
                ("Esc", "back"),
            ], &self.theme)
        } else {
            KeyHints::new(&[
                ("Space", "show answer"),
                ("r", "report"),
                ("R", "reset"),
                ("Esc", "back"),
            ], &self.theme)
        };
        frame.render_widget(hints, chunks[6]);

        if let Some(ref issue) = self.report_input {
            let word = self.current_word().map(|w| w.word.as_str()).unwrap_or("");
            self.render_input_popup(
                frame,
                area,
                &format!("Report \"{}\"", word),
                "What is wrong with this word?",
                issue,
                "send",
            );
        }
    }

    fn render_input_popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        question: &str,
        value: &str,
        confirm: &str,
    ) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.warning))
            .title(format!(" {} ", title))
            .title_style(self.theme.highlight());
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(question).style(self.theme.subtitle()),
            rows[0],
        );

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.accent));
        let input_inner = input_block.inner(rows[1]);
        frame.render_widget(Paragraph::new(value).block(input_block), rows[1]);
        frame.set_cursor_position((input_inner.x + value.width() as u16, input_inner.y));

        frame.render_widget(
            KeyHints::new(&[("Enter", confirm), ("Esc", "cancel")], &self.theme),
            rows[3],
        );
    }

    fn render_rosco(&mut self, frame: &mut Frame, area: Rect) {
        let Some(session) = self.rosco.as_ref() else {
            return;
        };

        let chunks = Layout::vertical([
            Constraint::Length(1),   // Top padding
            Constraint::Length(1),   // Scoreboard
            Constraint::Min(12),     // Wheel
            Constraint::Length(3),   // Definition
            Constraint::Length(3),   // Input
            Constraint::Length(1),   // Feedback
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        frame.render_widget(
            Scoreboard::new(
                session.items().len(),
                session.correct_count(),
                session.wrong_count(),
                session.skipped_count(),
                session.seconds_elapsed(),
                &self.theme,
            ),
            chunks[1],
        );

        let slots = session.wheel();
        let current = session.current_item();
        let mut wheel = RoscoWheel::new(&slots, &self.theme);
        if let Some(item) = current {
            wheel = wheel.center(&item.letter, &item.rule);
        }
        frame.render_widget(wheel, centered_rect(70, 100, chunks[2]));

        if let Some(item) = current {
            let definition = Paragraph::new(item.definition.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(Style::default().fg(self.theme.colors.text));
            frame.render_widget(definition, centered_rect(80, 100, chunks[3]));
        }

        let input_area = centered_rect(50, 100, chunks[4]);
        let border = if session.is_busy() {
            self.theme.colors.text_dim
        } else {
            self.theme.colors.accent
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(" Answer ")
            .title_style(self.theme.subtitle());
        let input_inner = input_block.inner(input_area);
        frame.render_widget(
            Paragraph::new(self.rosco_input.as_str()).block(input_block),
            input_area,
        );
        if !session.is_busy() {
            frame.set_cursor_position((
                input_inner.x + self.rosco_input.width() as u16,
                input_inner.y,
            ));
        }

        let feedback = match self.rosco_feedback {
            Some(RoscoFeedback::Answer(ref outcome)) if outcome.accepted => Line::from(Span::styled(
                format!("{} Correct! {}", icons::CHECK, outcome.expected),
                Style::default().fg(self.theme.colors.answer_correct).add_modifier(Modifier::BOLD),
            )),
            Some(RoscoFeedback::Answer(ref outcome)) => Line::from(vec![
                Span::styled(
                    format!("{} Wrong. ", icons::CROSS),
                    Style::default().fg(self.theme.colors.answer_wrong).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{}: ", outcome.letter), self.theme.subtitle()),
                Span::styled(outcome.expected.clone(), self.theme.title()),
            ]),
            Some(RoscoFeedback::Passed) => Line::from(Span::styled(
                format!("{} Pasapalabra", icons::ARROW_RIGHT),
                Style::default().fg(self.theme.colors.answer_practice),
            )),
            None => Line::from(""),
        };
        frame.render_widget(Paragraph::new(feedback).alignment(Alignment::Center), chunks[5]);

        frame.render_widget(
            KeyHints::new(&[("Enter", "answer"), ("Tab", "pasapalabra"), ("Esc", "quit")], &self.theme),
            chunks[6],
        );
    }

    fn render_rosco_results(&mut self, frame: &mut Frame, area: Rect) {
        let Some(summary) = self.rosco_summary else {
            return;
        };
        frame.render_widget(
            RoscoResults::new(summary, self.user_data.rosco_best, self.rosco_new_best, &self.theme),
            centered_rect(50, 50, area),
        );
    }

    fn render_reports(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3),   // Header
            Constraint::Min(5),      // List
            Constraint::Length(1),   // Status
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Pending reports", self.theme.title()),
            Span::styled(format!("  ({})", self.reports.len()), self.theme.subtitle()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let list_area = centered_rect(80, 100, chunks[1]);
        if self.reports.is_empty() {
            let empty = Paragraph::new(format!("{} Nothing to review", icons::CHECK))
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.colors.info));
            frame.render_widget(empty, list_area);
        } else {
            let items: Vec<ListItem> = self
                .reports
                .iter()
                .map(|(_, report)| {
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::styled(report.word.as_str(), Style::default().add_modifier(Modifier::BOLD)),
                            Span::styled(
                                format!("  {} · {}", report.reported_by, report.timestamp.format("%d/%m/%Y %H:%M")),
                                Style::default().fg(self.theme.colors.text_muted),
                            ),
                        ]),
                        Line::from(Span::styled(
                            format!("  {}", report.issue),
                            Style::default().fg(self.theme.colors.text),
                        )),
                    ])
                })
                .collect();

            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(self.theme.colors.primary)),
                )
                .highlight_style(self.theme.selected())
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, list_area, &mut self.report_list_state);
        }

        self.render_status(frame, chunks[2]);

        frame.render_widget(
            KeyHints::new(&[("j/k", "nav"), ("Enter", "resolve"), ("Esc", "back")], &self.theme),
            chunks[3],
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MasteryStatus;
    use crate::storage::memory::MemoryDocumentStore;
    use tempfile::TempDir;

    fn entry(id: usize, letter: &str, word: &str) -> WordEntry {
        WordEntry {
            id: format!("word_{}", id),
            letter: letter.to_string(),
            word: word.to_string(),
            definition: format!("Definición de {}", word.to_lowercase()),
            rule: "Empieza por".to_string(),
        }
    }

    fn app_with_config(config: Config, catalog: Vec<WordEntry>) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(
            GameStorage::new(Box::new(MemoryDocumentStore::default())),
            config,
            dir.path().join("config.toml"),
            catalog,
        );
        (app, dir)
    }

    fn app_with(user: Option<&str>, catalog: Vec<WordEntry>) -> (App, TempDir) {
        let config = Config {
            user: user.map(str::to_string),
            ..Config::default()
        };
        app_with_config(config, catalog)
    }

    fn type_into_menu(app: &mut App, text: &str) {
        let now = Instant::now();
        for c in text.chars() {
            app.handle_mode_select_keys(KeyCode::Char(c), now);
        }
        app.handle_mode_select_keys(KeyCode::Enter, now);
    }

    #[test]
    fn reports_are_only_offered_to_admin() {
        let (guest, _guest_dir) = app_with(None, vec![entry(0, "A", "ABEJA")]);
        assert!(!guest.menu_entries().contains(&MenuEntry::Reports));

        let (admin, _admin_dir) = app_with(Some(ADMIN_USER), vec![entry(0, "A", "ABEJA")]);
        assert!(admin.menu_entries().contains(&MenuEntry::Reports));
    }

    #[test]
    fn cards_are_rated_only_after_flipping_and_advance_after_delay() {
        let (mut app, _dir) = app_with(Some("ana"), vec![entry(0, "A", "ABEJA"), entry(1, "B", "BARCO")]);
        let now = Instant::now();
        app.start_flashcards(CardMode::Classic);
        let first = app.current_card.unwrap();
        let first_id = app.catalog[first].id.clone();

        app.answer_card(AnswerRating::Correct, now);
        assert!(app.user_data.progress.is_empty());

        app.flip();
        app.answer_card(AnswerRating::Correct, now);
        assert_eq!(app.user_data.status_of(&first_id), MasteryStatus::Practicing);

        // Ignored while waiting for the next card.
        app.answer_card(AnswerRating::Wrong, now);
        assert_eq!(app.cards_answered, 1);

        app.tick(now + Duration::from_millis(100));
        assert_eq!(app.current_card, Some(first));
        assert!(app.flipped);
        app.tick(now + app.config.timing.card_delay());
        assert!(app.next_card_at.is_none());
        assert!(app.current_card.is_some());
        assert!(!app.flipped);
    }

    #[test]
    fn reported_word_leaves_play_until_resolved() {
        let catalog = vec![entry(0, "A", "ABEJA"), entry(1, "B", "BARCO")];
        let (mut app, _dir) = app_with(Some(ADMIN_USER), catalog);
        app.start_flashcards(CardMode::Inverted);
        let reported = app.current_word().unwrap().id.clone();

        app.submit_report("Definición incorrecta");
        assert!(app.excluded.contains(&reported));
        for _ in 0..10 {
            app.draw_card();
            assert_ne!(app.current_word().unwrap().id, reported);
        }

        app.open_reports();
        assert_eq!(app.reports.len(), 1);
        app.resolve_selected_report();
        assert!(app.reports.is_empty());
        assert!(app.excluded.is_empty());
    }

    #[test]
    fn finished_rosco_records_personal_best() {
        let (mut app, _dir) = app_with(None, vec![entry(0, "A", "ABEJA"), entry(1, "B", "BARCO")]);
        let mut now = Instant::now();
        app.start_rosco(now);
        assert_eq!(app.screen, Screen::Rosco);

        app.rosco_input = "abeja".to_string();
        app.submit_rosco(now);
        now += Duration::from_millis(700);
        app.tick(now);

        app.pass_rosco(now);
        assert_eq!(app.rosco_feedback, Some(RoscoFeedback::Passed));
        now += Duration::from_millis(300);
        app.tick(now);

        app.rosco_input = "xx".to_string();
        app.submit_rosco(now);
        assert_eq!(
            app.rosco.as_ref().unwrap().items()[1].status,
            ItemStatus::Wrong
        );
        now += Duration::from_millis(2100);
        app.tick(now);

        assert_eq!(app.screen, Screen::RoscoResults);
        assert!(app.rosco_new_best);
        let summary = app.rosco_summary.unwrap();
        assert_eq!((summary.correct, summary.wrong, summary.passes), (1, 1, 1));
        assert_eq!(app.user_data.rosco_best.map(|b| b.correct), Some(1));
    }

    #[test]
    fn rosco_without_words_returns_to_menu() {
        let (mut app, _dir) = app_with(None, Vec::new());
        app.start_rosco(Instant::now());
        assert_eq!(app.screen, Screen::ModeSelect);
        assert!(app.rosco.is_none());
        assert!(app.status_message.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn empty_catalog_keeps_player_on_menu() {
        let (mut app, _dir) = app_with(None, Vec::new());
        app.start_flashcards(CardMode::Classic);
        assert_eq!(app.screen, Screen::ModeSelect);
        assert!(app.current_card.is_none());
    }

    #[test]
    fn switching_user_reloads_their_progress() {
        let (mut app, dir) = app_with(Some("ana"), vec![entry(0, "A", "ABEJA")]);
        app.start_flashcards(CardMode::Classic);
        app.flip();
        app.answer_card(AnswerRating::Correct, Instant::now());
        assert_eq!(app.user_data.progress.len(), 1);

        app.screen = Screen::ModeSelect;
        app.handle_mode_select_keys(KeyCode::Char('u'), Instant::now());
        type_into_menu(&mut app, "ben");
        assert_eq!(app.user.as_deref(), Some("ben"));
        assert!(app.user_data.progress.is_empty());
        assert_eq!(app.scheduler.queued(), 0);

        let saved = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(saved.user.as_deref(), Some("ben"));

        app.switch_user(" ana ");
        assert_eq!(app.user_data.progress.len(), 1);

        app.switch_user("   ");
        assert!(app.user.is_none());
        assert_eq!(app.user_label(), GUEST_REPORTER);
    }

    #[test]
    fn report_review_needs_the_admin_password() {
        let config = Config {
            admin_password_hash: Some(auth::hash_password("secreto")),
            ..Config::default()
        };
        let (mut app, _dir) = app_with_config(config, vec![entry(0, "A", "ABEJA")]);

        app.switch_user(ADMIN_USER);
        assert!(matches!(app.prompt, Some(Prompt::AdminPassword(_))));
        type_into_menu(&mut app, "nope");
        assert!(app.user.is_none());
        assert!(!app.admin_unlocked);
        assert_eq!(app.screen, Screen::ModeSelect);
        assert!(app.status_message.as_ref().is_some_and(|s| s.is_error));

        app.switch_user(ADMIN_USER);
        type_into_menu(&mut app, "secreto");
        assert!(app.admin_unlocked);
        assert_eq!(app.screen, Screen::Reports);
    }

    #[test]
    fn admin_without_configured_password_stays_locked() {
        let (mut app, _dir) = app_with(Some(ADMIN_USER), vec![entry(0, "A", "ABEJA")]);
        let reports = app.menu_entries().iter().position(|e| *e == MenuEntry::Reports);
        app.menu_state.select(reports);
        app.handle_mode_select_keys(KeyCode::Enter, Instant::now());
        assert!(matches!(app.prompt, Some(Prompt::AdminPassword(_))));

        type_into_menu(&mut app, "anything");
        assert_eq!(app.screen, Screen::ModeSelect);
        assert!(app.user.is_none());
    }

    #[test]
    fn reset_progress_draws_a_fresh_card() {
        let (mut app, _dir) = app_with(None, vec![entry(0, "A", "ABEJA"), entry(1, "B", "BARCO")]);
        app.start_flashcards(CardMode::Classic);
        app.flip();
        app.answer_card(AnswerRating::Correct, Instant::now());
        assert!(app.next_card_at.is_some());

        app.reset_progress();
        assert!(app.user_data.progress.is_empty());
        assert!(app.next_card_at.is_none());
        assert!(!app.flipped);
        assert!(app.current_card.is_some());
    }

    #[test]
    fn failed_config_save_is_shown() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let mut app = App::new(
            GameStorage::new(Box::new(MemoryDocumentStore::default())),
            Config::default(),
            blocker.join("config.toml"),
            vec![entry(0, "A", "ABEJA")],
        );

        app.cycle_theme();
        let status = app.status_message.as_ref().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("save config"));
    }
}
