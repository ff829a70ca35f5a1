//! Application state and logic.

use crate::autosave::Debouncer;
use crate::celebrate::{Celebration, CelebrationTracker};
use crate::config::Config;
use crate::dates;
use crate::models::{DailyEntry, DayRecord, EntryDraft, WellnessStats, DEFAULT_SLEEP_HOURS};
use crate::stats::{self, WEEK_LEN};
use crate::storage::{EntryPersistence, SqliteStore};
use crate::store::{EntryStore, StoreError, UpsertOutcome};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

/// Upper bound of the sleep slider, in hours.
pub const SLEEP_MAX: f64 = 12.0;
/// Sleep slider increment.
pub const SLEEP_STEP: f64 = 0.5;
/// Upper bound of the movement slider, in minutes.
pub const MOVEMENT_MAX: f64 = 120.0;
/// Movement slider increment.
pub const MOVEMENT_STEP: f64 = 5.0;
/// Quick movement values, cycled with `p`.
pub const MOVEMENT_PRESETS: [f64; 4] = [15.0, 30.0, 45.0, 60.0];

const CELEBRATION_TIMEOUT: Duration = Duration::from_secs(4);

/// Application state.
pub struct App<P: EntryPersistence> {
    /// Entry store.
    pub store: EntryStore<P>,
    /// Configuration.
    pub config: Config,
    /// Current tab.
    pub tab: Tab,
    /// Calendar day the log form belongs to.
    pub today: NaiveDate,
    /// Log form values.
    pub form: EntryDraft,
    /// Form values as last saved, `None` when today has no entry.
    pub saved_form: Option<EntryDraft>,
    /// Selected form field index.
    pub field_index: usize,
    /// Whether in editing mode.
    pub editing: bool,
    /// Input buffer for editing.
    pub input_buffer: String,
    /// Stats from the last refresh.
    pub stats: WellnessStats,
    /// Weekly chart from the last refresh.
    pub week: [DayRecord; WEEK_LEN],
    /// Selected history row.
    pub history_index: usize,
    /// First history entry shown.
    pub history_scroll: usize,
    /// Rows available to the history list, set when drawn.
    pub history_height: usize,
    /// History row showing details.
    pub expanded: Option<NaiveDate>,
    /// Autosave timer.
    pub autosave: Debouncer,
    /// Celebration trigger state.
    pub celebrations: CelebrationTracker,
    /// Celebration being shown.
    pub celebration: Option<Celebration>,
    celebration_since: Option<Instant>,
    /// Message to display.
    pub message: Option<(String, MessageType)>,
    /// Show help popup.
    pub show_help: bool,
    /// Confirmation dialog.
    pub confirm_dialog: Option<ConfirmDialog>,
}

/// Current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Today's log form.
    Log,
    /// Streaks and statistics.
    Progress,
    /// Past entries.
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Log, Tab::Progress, Tab::History];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Log => "Log",
            Self::Progress => "Progress",
            Self::History => "History",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Log form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Sleep,
    Gratitude(usize),
    Movement,
    Reflection,
}

impl FormField {
    pub fn label(&self) -> String {
        match self {
            Self::Sleep => "Sleep".to_string(),
            Self::Gratitude(i) => format!("Gratitude {}", i + 1),
            Self::Movement => "Movement".to_string(),
            Self::Reflection => "Reflection".to_string(),
        }
    }

}

/// Form fields in display order.
pub const FORM_FIELDS: [FormField; 6] = [
    FormField::Sleep,
    FormField::Gratitude(0),
    FormField::Gratitude(1),
    FormField::Gratitude(2),
    FormField::Movement,
    FormField::Reflection,
];

/// Message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

/// Confirmation dialog.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

/// Confirm action type.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteEntry(NaiveDate),
}

impl App<SqliteStore> {
    /// Open the configured database.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let db_path = config.db_path();
        let store = EntryStore::open(SqliteStore::open(&db_path)?);
        tracing::info!(path = %db_path.display(), "Opened wellness database");
        Ok(Self::with_store(store, config, dates::today()))
    }
}

impl<P: EntryPersistence> App<P> {
    /// Create application over an existing store.
    pub fn with_store(store: EntryStore<P>, config: Config, today: NaiveDate) -> Self {
        let stats = stats::compute(store.entries(), today);
        let week = stats::weekly_view(store.entries(), today);
        let has_entry_today = store.today_entry(today).is_some();

        let mut app = Self {
            autosave: Debouncer::new(config.autosave.delay()),
            celebrations: CelebrationTracker::new(stats.current_streak, has_entry_today),
            store,
            config,
            tab: Tab::Log,
            today,
            form: EntryDraft::new(today),
            saved_form: None,
            field_index: 0,
            editing: false,
            input_buffer: String::new(),
            stats,
            week,
            history_index: 0,
            history_scroll: 0,
            history_height: 0,
            expanded: None,
            celebration: None,
            celebration_since: None,
            message: None,
            show_help: false,
            confirm_dialog: None,
        };

        app.load_form();
        app
    }

    /// Recompute derived views and check for a celebration.
    pub fn refresh(&mut self) {
        self.stats = stats::compute(self.store.entries(), self.today);
        self.week = stats::weekly_view(self.store.entries(), self.today);

        let len = self.store.len();
        if self.history_index >= len {
            self.history_index = len.saturating_sub(1);
        }
        self.ensure_history_visible();

        let has_entry_today = self.has_entry_today();
        if let Some(celebration) = self
            .celebrations
            .observe(self.stats.current_streak, has_entry_today)
        {
            tracing::info!(streak = celebration.streak, "Streak celebration");
            self.celebration = Some(celebration);
            self.celebration_since = None;
        }
    }

    /// Fill the form from today's entry, or the defaults.
    fn load_form(&mut self) {
        match self.store.today_entry(self.today) {
            Some(entry) => {
                self.form = entry.to_draft();
                self.saved_form = Some(self.form.clone());
            }
            None => {
                self.form = EntryDraft::new(self.today);
                self.saved_form = None;
            }
        }
        self.autosave.cancel();
    }

    /// Advance timers: day rollover, autosave and celebration timeout.
    pub fn tick(&mut self, now: Instant, today: NaiveDate) {
        if today != self.today {
            self.start_day(today);
        }

        if self.autosave.fire(now) && self.has_unsaved_changes() {
            self.save_form();
        }

        if self.celebration.is_some() {
            let since = *self.celebration_since.get_or_insert(now);
            if now.saturating_duration_since(since) >= CELEBRATION_TIMEOUT {
                self.celebration = None;
                self.celebration_since = None;
            }
        }
    }

    fn start_day(&mut self, today: NaiveDate) {
        if self.has_unsaved_changes() {
            self.save_form();
        }

        tracing::info!(%today, "Calendar day changed");
        self.today = today;
        self.load_form();
        self.refresh();
        self.celebrations
            .start_new_day(self.stats.current_streak, self.has_entry_today());
    }

    /// Save unsaved edits before exit.
    pub fn flush(&mut self) {
        if self.has_unsaved_changes() {
            self.save_form();
        }
    }

    /// How long the event loop may block before the next timer is due.
    pub fn poll_timeout(&self, now: Instant, max: Duration) -> Duration {
        self.autosave
            .remaining(now)
            .map_or(max, |left| left.min(max))
    }

    /// Check if in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn has_entry_today(&self) -> bool {
        self.store.today_entry(self.today).is_some()
    }

    /// Whether the form differs from what is stored for today.
    pub fn has_unsaved_changes(&self) -> bool {
        match &self.saved_form {
            Some(saved) => *saved != self.form,
            None => self.form.has_content(),
        }
    }

    /// Get selected form field.
    pub fn selected_field(&self) -> FormField {
        FORM_FIELDS[self.field_index.min(FORM_FIELDS.len() - 1)]
    }

    /// Get selected history entry.
    pub fn selected_entry(&self) -> Option<&DailyEntry> {
        self.store.entries().get(self.history_index)
    }

    /// Handle key input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Any key dismisses a celebration
        if self.celebration.is_some() {
            self.celebration = None;
            self.celebration_since = None;
            return;
        }

        // Handle confirmation dialog
        if let Some(dialog) = self.confirm_dialog.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_dialog = None;
                    self.execute_confirm(dialog.action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_dialog = None;
                }
                _ => {}
            }
            return;
        }

        // Handle help popup
        if self.show_help {
            self.show_help = false;
            return;
        }

        // Clear message on any key
        self.message = None;

        // Handle editing mode
        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('1') => self.tab = Tab::Log,
            KeyCode::Char('2') => self.tab = Tab::Progress,
            KeyCode::Char('3') => self.tab = Tab::History,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.prev(),
            KeyCode::Char('s') => self.save_form(),
            KeyCode::Char('?') => self.show_help = true,
            _ => match self.tab {
                Tab::Log => self.handle_log_key(key),
                Tab::History => self.handle_history_key(key),
                Tab::Progress => {}
            },
        }
    }

    fn handle_log_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_field(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_field(-1),
            KeyCode::Char('h') | KeyCode::Left => self.adjust_selected(-1.0),
            KeyCode::Char('l') | KeyCode::Right => self.adjust_selected(1.0),
            KeyCode::Char('p') => self.cycle_movement_preset(),
            KeyCode::Char('x') | KeyCode::Delete => self.clear_selected(),
            KeyCode::Enter | KeyCode::Char('e') => self.start_editing(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_history(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_history(-1),
            KeyCode::Char('g') => {
                self.history_index = 0;
                self.ensure_history_visible();
            }
            KeyCode::Char('G') => {
                self.history_index = self.store.len().saturating_sub(1);
                self.ensure_history_visible();
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_expanded(),
            KeyCode::Char('d') => self.confirm_delete_entry(),
            _ => {}
        }
    }

    /// Handle editing keys.
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                self.input_buffer.clear();
            }
            KeyCode::Enter => self.finish_editing(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    fn move_field(&mut self, delta: i32) {
        let last = FORM_FIELDS.len() as i32 - 1;
        self.field_index = (self.field_index as i32 + delta).clamp(0, last) as usize;
    }

    fn move_history(&mut self, delta: i32) {
        if self.store.is_empty() {
            return;
        }
        let last = self.store.len() as i32 - 1;
        self.history_index = (self.history_index as i32 + delta).clamp(0, last) as usize;
        self.ensure_history_visible();
    }

    /// Lines a history entry takes, including its details when expanded.
    pub fn history_row_height(&self, entry: &DailyEntry) -> usize {
        if self.expanded != Some(entry.date) {
            return 1;
        }
        1 + entry.gratitude_count().max(1) + usize::from(entry.reflection_text().is_some())
    }

    /// Scroll the history list so the selected entry fits on screen.
    pub fn ensure_history_visible(&mut self) {
        if self.history_index < self.history_scroll {
            self.history_scroll = self.history_index;
        }
        // Height is unknown until the list has been drawn once.
        if self.history_height == 0 {
            return;
        }

        let entries = self.store.entries();
        let last = self.history_index.min(entries.len().saturating_sub(1));
        while self.history_scroll < last {
            let rows: usize = entries[self.history_scroll..=last]
                .iter()
                .map(|e| self.history_row_height(e))
                .sum();
            if rows <= self.history_height {
                break;
            }
            self.history_scroll += 1;
        }
    }

    /// Step the selected numeric field up or down.
    fn adjust_selected(&mut self, direction: f64) {
        match self.selected_field() {
            FormField::Sleep => {
                self.form.sleep = clamp_sleep(self.form.sleep + direction * SLEEP_STEP);
            }
            FormField::Movement => {
                self.form.movement =
                    clamp_movement(self.form.movement + direction * MOVEMENT_STEP);
            }
            _ => return,
        }
        self.form_changed();
    }

    fn cycle_movement_preset(&mut self) {
        let current = self.form.movement;
        self.form.movement = MOVEMENT_PRESETS
            .iter()
            .copied()
            .find(|&p| p > current)
            .unwrap_or(MOVEMENT_PRESETS[0]);
        self.form_changed();
    }

    fn clear_selected(&mut self) {
        match self.selected_field() {
            FormField::Sleep => self.form.sleep = DEFAULT_SLEEP_HOURS,
            FormField::Gratitude(i) => self.form.gratitude[i].clear(),
            FormField::Movement => self.form.movement = 0.0,
            FormField::Reflection => self.form.reflection = None,
        }
        self.form_changed();
    }

    fn start_editing(&mut self) {
        self.input_buffer = match self.selected_field() {
            FormField::Sleep => self.form.sleep.to_string(),
            FormField::Gratitude(i) => self.form.gratitude[i].clone(),
            FormField::Movement => self.form.movement.to_string(),
            FormField::Reflection => self.form.reflection.clone().unwrap_or_default(),
        };
        self.editing = true;
    }

    /// Finish editing and apply to the form.
    fn finish_editing(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        self.editing = false;

        match self.selected_field() {
            FormField::Sleep => match parse_number(&input) {
                Some(hours) => self.form.sleep = clamp_sleep(hours),
                None => {
                    self.message = Some((
                        "Sleep must be a number of hours".to_string(),
                        MessageType::Warning,
                    ));
                    return;
                }
            },
            FormField::Movement => match parse_number(&input) {
                Some(minutes) => self.form.movement = clamp_movement(minutes),
                None => {
                    self.message = Some((
                        "Movement must be a number of minutes".to_string(),
                        MessageType::Warning,
                    ));
                    return;
                }
            },
            FormField::Gratitude(i) => self.form.gratitude[i] = input,
            FormField::Reflection => {
                self.form.reflection = Some(input.trim().to_string()).filter(|r| !r.is_empty());
            }
        }

        self.form_changed();
    }

    /// Restart the autosave timer, or cancel it if the form matches storage.
    fn form_changed(&mut self) {
        if !self.has_unsaved_changes() {
            self.autosave.cancel();
        } else if self.config.autosave.enabled {
            self.autosave.touch(Instant::now());
        }
    }

    /// Save the form as today's entry.
    pub fn save_form(&mut self) {
        let draft = self.form.clone().normalized();
        self.autosave.cancel();

        match self.store.upsert(draft.clone()) {
            Ok(outcome) => {
                tracing::debug!(date = %draft.date, ?outcome, "Saved log form");
                self.message = Some(match outcome {
                    UpsertOutcome::Created => ("Entry saved!".to_string(), MessageType::Success),
                    UpsertOutcome::Updated => ("Entry updated".to_string(), MessageType::Info),
                });
                self.form = draft.clone();
                self.saved_form = Some(draft);
            }
            Err(StoreError::Storage(e)) => {
                // The store kept the change in memory.
                self.message = Some((
                    format!("Could not write to disk: {}", e),
                    MessageType::Error,
                ));
                self.form = draft.clone();
                self.saved_form = Some(draft);
            }
            Err(e) => {
                self.message = Some((e.to_string(), MessageType::Error));
            }
        }

        self.refresh();
    }

    fn toggle_expanded(&mut self) {
        if let Some(date) = self.selected_entry().map(|e| e.date) {
            self.expanded = if self.expanded == Some(date) {
                None
            } else {
                Some(date)
            };
            self.ensure_history_visible();
        }
    }

    /// Confirm delete entry.
    fn confirm_delete_entry(&mut self) {
        if let Some(entry) = self.selected_entry() {
            self.confirm_dialog = Some(ConfirmDialog {
                title: "Delete Entry".to_string(),
                message: format!(
                    "Delete the entry for {}? This cannot be undone. (y/n)",
                    dates::relative_label(entry.date, self.today)
                ),
                action: ConfirmAction::DeleteEntry(entry.date),
            });
        }
    }

    /// Execute confirmed action.
    fn execute_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteEntry(date) => {
                match self.store.remove_by_date(date) {
                    Ok(_) => {
                        self.message = Some(("Entry deleted".to_string(), MessageType::Success));
                    }
                    Err(e) => {
                        self.message = Some((
                            format!("Could not write to disk: {}", e),
                            MessageType::Error,
                        ));
                    }
                }

                if self.expanded == Some(date) {
                    self.expanded = None;
                }
                // The form keeps its values but no longer matches a stored entry.
                if date == self.today && !self.has_entry_today() {
                    self.saved_form = None;
                    self.autosave.cancel();
                }
                self.refresh();
            }
        }
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Round to the slider step and keep within 0–12 hours.
pub fn clamp_sleep(hours: f64) -> f64 {
    ((hours / SLEEP_STEP).round() * SLEEP_STEP).clamp(0.0, SLEEP_MAX)
}

/// Round to the slider step and keep within 0–120 minutes.
pub fn clamp_movement(minutes: f64) -> f64 {
    ((minutes / MOVEMENT_STEP).round() * MOVEMENT_STEP).clamp(0.0, MOVEMENT_MAX)
}
