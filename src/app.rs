//! Application state and logic for the TUI.
//!
//! This module contains the core [`App`] struct and related types:
//! - [`Screen`] - Which screen is currently displayed
//! - [`ScheduleState`] - Loading status of the day's schedule
//! - [`FilmKey`] - Identifier of the currently expanded film card
//! - [`AppMessage`] - Messages sent back from async loader tasks

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::api::ShowtimesClient;
use crate::models::{Film, Schedule};

/// User-facing message shown when the schedule fetch fails.
pub const SCHEDULE_ERROR: &str = "Impossible de charger les horaires";

/// Cinemas selected by default on first launch, until the user edits the
/// selection. Matches the curated Latin-Quarter-heavy list of the PWA.
pub const DEFAULT_CINEMAS: &[&str] = &[
    "Christine Cinéma Club",
    "Filmothèque du Quartier Latin",
    "La Cinémathèque",
    "Le Champo",
    "Le Grand Action",
    "Le Louxor",
    "MK2 Quai de Loire",
    "MK2 Quai de Seine",
    "Reflet Médicis",
    "Écoles Cinéma Club",
    "UGC Les Halles",
];

/// Which screen is currently displayed.
///
/// The date picker and the cinema selector are mutually exclusive by
/// construction; there is no pair of booleans that could both be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Venue sections with film rows for the selected date
    Main,
    /// 7-day date picker overlay
    DatePicker,
    /// Full-screen venue selection list
    CinemaSelector,
}

/// Loading status of the day's schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleState {
    /// No fetch issued yet
    Idle,
    /// A fetch is in flight; any previous schedule has been discarded
    Loading,
    /// The schedule for the currently selected date
    Loaded(Schedule),
    /// The fetch failed; holds the user-facing message
    Failed(String),
}

/// Identifier of the currently expanded film card: venue name plus index
/// within that venue's film list. Unique within one render pass since it
/// is scoped by venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmKey {
    pub cinema: String,
    pub index: usize,
}

/// Messages sent from spawned loader tasks back to the UI loop.
///
/// Showtime messages carry the date the fetch was issued for, so a late
/// response from a superseded date can be recognized and discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    /// Venue catalog fetch succeeded
    CinemasLoaded(Vec<String>),
    /// Venue catalog fetch failed (logged, not surfaced)
    CinemasFailed(String),
    /// Schedule fetch succeeded for the tagged date
    ShowtimesLoaded { date: NaiveDate, schedule: Schedule },
    /// Schedule fetch failed for the tagged date
    ShowtimesFailed { date: NaiveDate, message: String },
}

/// Main application state
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Currently selected calendar date
    pub selected_date: NaiveDate,
    /// Full venue catalog from the backend (empty until loaded)
    pub cinemas: Vec<String>,
    /// Selected subset of the catalog, in selection order
    pub selected_cinemas: Vec<String>,
    /// Loading status of the schedule for `selected_date`
    pub schedule: ScheduleState,
    /// Currently expanded film card, if any (at most one globally)
    pub expanded_film: Option<FilmKey>,
    /// Cursor in the 7-day date picker
    pub date_index: usize,
    /// Cursor in the cinema selector
    pub cinema_index: usize,
    /// Cursor over visible film rows on the main screen
    pub film_cursor: usize,
    /// Vertical scroll offset of the main film list
    pub scroll: u16,
    /// Maximum scroll value (calculated during render, used for clamping)
    pub max_scroll: u16,
    /// Flag to track if the app should quit
    pub should_quit: bool,
    /// True when the UI must be redrawn
    pub needs_redraw: bool,
    /// Receiver for loader messages (taken by the event loop)
    pub message_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
    /// Sender for loader messages (clone this to pass to async tasks)
    pub message_tx: mpsc::UnboundedSender<AppMessage>,
    /// Backend API client (shared across async tasks)
    pub client: Arc<ShowtimesClient>,
}

impl App {
    /// Create the application state with today selected and the default
    /// cinema subset.
    pub fn new(client: Arc<ShowtimesClient>) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            screen: Screen::Main,
            selected_date: Local::now().date_naive(),
            cinemas: Vec::new(),
            selected_cinemas: DEFAULT_CINEMAS.iter().map(|s| s.to_string()).collect(),
            schedule: ScheduleState::Idle,
            expanded_film: None,
            date_index: 0,
            cinema_index: 0,
            film_cursor: 0,
            scroll: 0,
            max_scroll: 0,
            should_quit: false,
            needs_redraw: true,
            message_rx: Some(message_rx),
            message_tx,
            client,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// The 7 pickable dates: today plus the next six days.
    pub fn pickable_dates(&self) -> Vec<NaiveDate> {
        upcoming_days(Local::now().date_naive())
    }

    // ------------------------------------------------------------------
    // Loaders
    // ------------------------------------------------------------------

    /// Fetch the venue catalog once, in the background.
    ///
    /// A failure is logged and leaves the catalog empty; the cinema
    /// selector simply renders no rows.
    pub fn load_cinemas(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.fetch_cinemas().await {
                Ok(cinemas) => {
                    let _ = tx.send(AppMessage::CinemasLoaded(cinemas));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::CinemasFailed(e.to_string()));
                }
            }
        });
    }

    /// Fetch the schedule for the selected date, in the background.
    ///
    /// The previous schedule is discarded immediately, and every pointer
    /// into it (expanded card, cursor, scroll) is reset. The spawned task
    /// tags its result with the date it was issued for.
    pub fn load_showtimes(&mut self) {
        self.schedule = ScheduleState::Loading;
        self.expanded_film = None;
        self.film_cursor = 0;
        self.scroll = 0;
        self.mark_dirty();

        let date = self.selected_date;
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            match client.fetch_showtimes(date).await {
                Ok(schedule) => {
                    let _ = tx.send(AppMessage::ShowtimesLoaded { date, schedule });
                }
                Err(e) => {
                    tracing::error!("failed to load showtimes for {}: {}", date, e);
                    let _ = tx.send(AppMessage::ShowtimesFailed {
                        date,
                        message: SCHEDULE_ERROR.to_string(),
                    });
                }
            }
        });
    }

    /// Re-issue the schedule fetch for the current date after a failure.
    pub fn retry(&mut self) {
        if matches!(self.schedule, ScheduleState::Failed(_)) {
            self.load_showtimes();
        }
    }

    /// Apply a loader message to the state.
    ///
    /// Showtime messages tagged with a date that no longer matches the
    /// current selection are stale and are dropped.
    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::CinemasLoaded(cinemas) => {
                self.cinemas = cinemas;
                self.mark_dirty();
            }
            AppMessage::CinemasFailed(err) => {
                tracing::error!("failed to load cinema catalog: {}", err);
            }
            AppMessage::ShowtimesLoaded { date, schedule } => {
                if date != self.selected_date {
                    tracing::debug!("discarding stale schedule for {}", date);
                    return;
                }
                self.schedule = ScheduleState::Loaded(schedule);
                self.mark_dirty();
            }
            AppMessage::ShowtimesFailed { date, message } => {
                if date != self.selected_date {
                    tracing::debug!("discarding stale schedule error for {}", date);
                    return;
                }
                self.schedule = ScheduleState::Failed(message);
                self.mark_dirty();
            }
        }
    }

    // ------------------------------------------------------------------
    // View-state transitions
    // ------------------------------------------------------------------

    pub fn open_date_picker(&mut self) {
        self.date_index = self
            .pickable_dates()
            .iter()
            .position(|d| *d == self.selected_date)
            .unwrap_or(0);
        self.screen = Screen::DatePicker;
        self.mark_dirty();
    }

    pub fn open_cinema_selector(&mut self) {
        self.cinema_index = 0;
        self.screen = Screen::CinemaSelector;
        self.mark_dirty();
    }

    pub fn close_overlay(&mut self) {
        self.screen = Screen::Main;
        self.mark_dirty();
    }

    /// Select the date under the picker cursor, close the picker and
    /// refetch. The fetch is issued even when the same day is re-picked,
    /// matching the original refetch-on-select behavior.
    pub fn select_date_at_cursor(&mut self) {
        let dates = self.pickable_dates();
        if let Some(date) = dates.get(self.date_index) {
            self.selected_date = *date;
        }
        self.screen = Screen::Main;
        self.load_showtimes();
    }

    /// Add or remove a cinema from the selected subset.
    pub fn toggle_cinema(&mut self, name: &str) {
        if let Some(pos) = self.selected_cinemas.iter().position(|c| c == name) {
            self.selected_cinemas.remove(pos);
        } else {
            self.selected_cinemas.push(name.to_string());
        }
        self.mark_dirty();
    }

    fn toggle_cinema_at_cursor(&mut self) {
        if let Some(name) = self.cinemas.get(self.cinema_index).cloned() {
            self.toggle_cinema(&name);
        }
    }

    /// Toggle expansion of the film row under the cursor. Expanding a film
    /// implicitly collapses any other.
    pub fn toggle_expansion(&mut self) {
        if let Some(key) = self.visible_films().into_iter().nth(self.film_cursor) {
            if self.expanded_film.as_ref() == Some(&key) {
                self.expanded_film = None;
            } else {
                self.expanded_film = Some(key);
            }
            self.mark_dirty();
        }
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Selected venues with at least one film for the current date, in
    /// selection order. Venues with zero films are silently omitted even
    /// if selected.
    pub fn visible_cinemas(&self) -> Vec<&str> {
        let ScheduleState::Loaded(schedule) = &self.schedule else {
            return Vec::new();
        };
        self.selected_cinemas
            .iter()
            .filter(|name| schedule.get(*name).is_some_and(|films| !films.is_empty()))
            .map(|name| name.as_str())
            .collect()
    }

    /// All visible film rows, flattened in render order.
    pub fn visible_films(&self) -> Vec<FilmKey> {
        let ScheduleState::Loaded(schedule) = &self.schedule else {
            return Vec::new();
        };
        self.visible_cinemas()
            .into_iter()
            .flat_map(|cinema| {
                (0..schedule[cinema].len()).map(move |index| FilmKey {
                    cinema: cinema.to_string(),
                    index,
                })
            })
            .collect()
    }

    /// Look up the film a key points at in the current schedule.
    pub fn film_at(&self, key: &FilmKey) -> Option<&Film> {
        let ScheduleState::Loaded(schedule) = &self.schedule else {
            return None;
        };
        schedule.get(&key.cinema)?.get(key.index)
    }

    // ------------------------------------------------------------------
    // Input handling
    // ------------------------------------------------------------------

    /// Dispatch a key press to the current screen.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.mark_dirty();

        // Global keybinds
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit();
                return;
            }
            KeyCode::Char('q') => {
                self.quit();
                return;
            }
            _ => {}
        }

        match self.screen {
            Screen::Main => self.handle_main_key(key),
            Screen::DatePicker => self.handle_date_picker_key(key),
            Screen::CinemaSelector => self.handle_cinema_selector_key(key),
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('d') => self.open_date_picker(),
            KeyCode::Char('c') => self.open_cinema_selector(),
            KeyCode::Char('r') => self.retry(),
            KeyCode::Up | KeyCode::Char('k') => self.move_film_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_film_cursor(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_expansion(),
            KeyCode::PageUp => self.scroll_up(5),
            KeyCode::PageDown => self.scroll_down(5),
            _ => {}
        }
    }

    fn handle_date_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('d') => self.close_overlay(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.date_index = self.date_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.date_index + 1 < self.pickable_dates().len() {
                    self.date_index += 1;
                }
            }
            KeyCode::Enter => self.select_date_at_cursor(),
            _ => {}
        }
    }

    fn handle_cinema_selector_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') => self.close_overlay(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.cinema_index = self.cinema_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cinema_index + 1 < self.cinemas.len() {
                    self.cinema_index += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_cinema_at_cursor(),
            _ => {}
        }
    }

    fn move_film_cursor(&mut self, delta: i32) {
        let count = self.visible_films().len();
        if count == 0 {
            self.film_cursor = 0;
            return;
        }
        let max = count - 1;
        self.film_cursor = if delta < 0 {
            self.film_cursor.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.film_cursor + delta as usize).min(max)
        };
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.mark_dirty();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        self.mark_dirty();
    }
}

/// The 7-day window starting at `today`, in picker order.
pub fn upcoming_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| today + Days::new(i)).collect()
}
