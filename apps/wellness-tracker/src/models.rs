//! Data models for the daily wellness log.

use crate::dates;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unique entry identifier.
pub type EntryId = Uuid;

/// Number of gratitude notes per day.
pub const GRATITUDE_SLOTS: usize = 3;

/// Sleep value a fresh log form starts at.
pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;

/// One day's log. The store keeps at most one per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    /// Unique identifier, fixed at creation.
    pub id: EntryId,
    /// Calendar day this entry belongs to.
    #[serde(deserialize_with = "day_key_field")]
    pub date: NaiveDate,
    /// Hours slept.
    pub sleep: f64,
    /// Three gratitude notes; any may be empty.
    #[serde(deserialize_with = "gratitude_slots")]
    pub gratitude: [String; GRATITUDE_SLOTS],
    /// Minutes of movement.
    pub movement: f64,
    /// Optional free-text reflection.
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reflection: Option<String>,
    /// When this date was first logged.
    pub created_at: DateTime<Utc>,
    /// Last time this date was saved.
    pub updated_at: DateTime<Utc>,
}

impl DailyEntry {
    /// Create a new entry from a draft, stamping both timestamps with `now`.
    pub fn new(draft: EntryDraft, now: DateTime<Utc>) -> Self {
        let draft = draft.normalized();
        Self {
            id: Uuid::new_v4(),
            date: draft.date,
            sleep: draft.sleep,
            gratitude: draft.gratitude,
            movement: draft.movement,
            reflection: draft.reflection,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the logged values, keeping `id` and `created_at`.
    pub fn apply(&mut self, draft: EntryDraft, now: DateTime<Utc>) {
        let draft = draft.normalized();
        self.sleep = draft.sleep;
        self.gratitude = draft.gratitude;
        self.movement = draft.movement;
        self.reflection = draft.reflection;
        self.updated_at = now;
    }

    /// Number of gratitude notes with non-whitespace text.
    pub fn gratitude_count(&self) -> usize {
        filled_count(&self.gratitude)
    }

    /// Non-empty gratitude notes, in slot order.
    pub fn filled_gratitude(&self) -> impl Iterator<Item = &str> {
        self.gratitude
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
    }

    /// Reflection text, if any was written.
    pub fn reflection_text(&self) -> Option<&str> {
        self.reflection
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// How many of the three daily goals this entry meets.
    pub fn goals_met(&self, goals: &Goals) -> u8 {
        let mut score = 0;
        if self.sleep >= goals.sleep_hours {
            score += 1;
        }
        if self.gratitude_count() >= goals.gratitude_items {
            score += 1;
        }
        if self.movement >= goals.movement_minutes {
            score += 1;
        }
        score
    }

    /// Draft carrying this entry's current values.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            date: self.date,
            sleep: self.sleep,
            gratitude: self.gratitude.clone(),
            movement: self.movement,
            reflection: self.reflection.clone(),
        }
    }
}

/// Field values for a create-or-update of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub sleep: f64,
    pub gratitude: [String; GRATITUDE_SLOTS],
    pub movement: f64,
    pub reflection: Option<String>,
}

impl EntryDraft {
    /// Draft for `date` with the form defaults.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep: DEFAULT_SLEEP_HOURS,
            gratitude: Default::default(),
            movement: 0.0,
            reflection: None,
        }
    }

    #[cfg(test)]
    pub fn with_sleep(mut self, hours: f64) -> Self {
        self.sleep = hours;
        self
    }

    #[cfg(test)]
    pub fn with_movement(mut self, minutes: f64) -> Self {
        self.movement = minutes;
        self
    }

    /// Set the gratitude note in `slot`; out-of-range slots are ignored.
    #[cfg(test)]
    pub fn with_gratitude(mut self, slot: usize, text: impl Into<String>) -> Self {
        if let Some(g) = self.gratitude.get_mut(slot) {
            *g = text.into();
        }
        self
    }

    #[cfg(test)]
    pub fn with_reflection(mut self, text: impl Into<String>) -> Self {
        self.reflection = Some(text.into());
        self
    }

    /// Trim the reflection; blank ones become `None`.
    pub fn normalized(mut self) -> Self {
        self.reflection = self
            .reflection
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self
    }

    /// Whether the draft differs from an untouched form.
    pub fn has_content(&self) -> bool {
        filled_count(&self.gratitude) > 0
            || self.movement > 0.0
            || self
                .reflection
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty())
            || self.sleep != DEFAULT_SLEEP_HOURS
    }

    /// Number of gratitude notes with non-whitespace text.
    pub fn gratitude_count(&self) -> usize {
        filled_count(&self.gratitude)
    }
}

fn filled_count(items: &[String]) -> usize {
    items.iter().filter(|g| !g.trim().is_empty()).count()
}

/// Accept gratitude arrays of any length, padding or truncating to three.
fn gratitude_slots<'de, D>(deserializer: D) -> Result<[String; GRATITUDE_SLOTS], D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Option<String>>::deserialize(deserializer)?;
    let mut slots: [String; GRATITUDE_SLOTS] = Default::default();
    for (slot, item) in slots.iter_mut().zip(items) {
        *slot = item.unwrap_or_default();
    }
    Ok(slots)
}

/// Day keys are `YYYY-MM-DD`, tolerating surrounding whitespace.
fn day_key_field<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    dates::parse_day_key(&raw).map_err(serde::de::Error::custom)
}

/// Treat a stored empty reflection the same as a missing one.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|t| !t.trim().is_empty()))
}

/// Daily targets used for the per-entry goals score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Goals {
    /// Hours of sleep.
    pub sleep_hours: f64,
    /// Filled gratitude notes.
    pub gratitude_items: usize,
    /// Minutes of movement.
    pub movement_minutes: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            sleep_hours: 7.0,
            gratitude_items: GRATITUDE_SLOTS,
            movement_minutes: 30.0,
        }
    }
}

/// Rough sleep classification shown next to the sleep slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepQuality {
    Low,
    Fair,
    Optimal,
    Oversleep,
}

impl SleepQuality {
    pub fn from_hours(hours: f64) -> Self {
        if (7.0..=9.0).contains(&hours) {
            Self::Optimal
        } else if (6.0..7.0).contains(&hours) {
            Self::Fair
        } else if hours > 9.0 {
            Self::Oversleep
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Fair => "Fair",
            Self::Optimal => "Optimal",
            Self::Oversleep => "Oversleep",
        }
    }
}

/// Progress towards the daily movement target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementStatus {
    NotYet,
    KeepGoing,
    GoodStart,
    GoalMet,
}

impl MovementStatus {
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes >= 30.0 {
            Self::GoalMet
        } else if minutes >= 15.0 {
            Self::GoodStart
        } else if minutes > 0.0 {
            Self::KeepGoing
        } else {
            Self::NotYet
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotYet => "Not Yet",
            Self::KeepGoing => "Keep Going",
            Self::GoodStart => "Good Start",
            Self::GoalMet => "Goal Met!",
        }
    }
}

/// Engagement statistics derived from the full entry collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_entries: usize,
    pub average_sleep: f64,
    pub average_movement: f64,
    pub total_gratitude_items: usize,
}

impl WellnessStats {
    /// Average filled gratitude notes per logged day.
    pub fn gratitude_per_entry(&self) -> f64 {
        if self.total_entries == 0 {
            return 0.0;
        }
        self.total_gratitude_items as f64 / self.total_entries as f64
    }
}

/// One day of the weekly chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Abbreviated weekday name.
    pub day_name: String,
    pub sleep: f64,
    pub movement: f64,
    pub gratitude_count: usize,
    pub has_entry: bool,
}
