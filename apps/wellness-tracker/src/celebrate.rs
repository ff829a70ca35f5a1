//! Streak celebrations.
//!
//! The tracker watches successive stats reads within one session and fires
//! when the current streak grows or when today gets its first entry.

/// Streak lengths that get the milestone treatment.
pub const MILESTONES: [u32; 6] = [7, 14, 21, 30, 50, 100];

/// Message pools by minimum streak length, highest first.
const MESSAGE_TIERS: &[(u32, &[&str])] = &[
    (
        30,
        &[
            "A month or more. This is a lifestyle now.",
            "30+ days of showing up. Legendary.",
            "Your routine runs itself at this point.",
        ],
    ),
    (
        21,
        &[
            "Three weeks in. That's a real habit.",
            "21 days of consistency. Keep it rolling.",
            "You're proving what steady effort does.",
        ],
    ),
    (
        14,
        &[
            "Two weeks strong!",
            "14 days. This is becoming second nature.",
            "Half a month of looking after yourself.",
        ],
    ),
    (
        7,
        &[
            "A full week! You're crushing it.",
            "Seven days of self-care. Be proud.",
            "One week down. Future you says thanks.",
        ],
    ),
    (
        4,
        &[
            "Almost a week. Unstoppable!",
            "Your dedication shows.",
            "Look at that momentum.",
        ],
    ),
    (
        2,
        &[
            "Building momentum. Keep going!",
            "Consistency is key and you've got it.",
            "Back again. A habit is forming.",
        ],
    ),
    (
        1,
        &[
            "Day one done. Every journey starts here.",
            "You showed up for yourself today.",
            "The first step is the hardest one.",
        ],
    ),
];

/// A celebration to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celebration {
    pub streak: u32,
    pub message: &'static str,
    pub badge: &'static str,
    pub milestone: bool,
}

impl Celebration {
    pub fn new(streak: u32) -> Self {
        Self {
            streak,
            message: message_for(streak),
            badge: badge_for(streak),
            milestone: MILESTONES.contains(&streak),
        }
    }
}

/// Encouragement for a streak of `streak` days.
pub fn message_for(streak: u32) -> &'static str {
    MESSAGE_TIERS
        .iter()
        .find(|(min, _)| streak >= *min)
        .map(|(_, messages)| messages[streak as usize % messages.len()])
        .unwrap_or("Amazing work! Keep it up!")
}

/// Badge shown next to the streak count.
pub fn badge_for(streak: u32) -> &'static str {
    match streak {
        30.. => "👑",
        21.. => "🌟",
        14.. => "⭐",
        7.. => "🏆",
        3.. => "🔥",
        _ => "✨",
    }
}

/// Remembers what the previous stats read showed.
#[derive(Debug, Clone)]
pub struct CelebrationTracker {
    last_streak: u32,
    had_entry_today: bool,
}

impl CelebrationTracker {
    /// Start from the state seen when the session opened.
    pub fn new(current_streak: u32, has_entry_today: bool) -> Self {
        Self {
            last_streak: current_streak,
            had_entry_today: has_entry_today,
        }
    }

    /// Record a fresh read, returning a celebration when one is due.
    pub fn observe(&mut self, current_streak: u32, has_entry_today: bool) -> Option<Celebration> {
        let streak_grew = current_streak > self.last_streak;
        let first_entry_today = !self.had_entry_today && has_entry_today;
        self.last_streak = current_streak;

        if streak_grew || first_entry_today {
            self.had_entry_today = true;
            Some(Celebration::new(current_streak))
        } else {
            None
        }
    }

    /// Forget today's state after the calendar day changes.
    pub fn start_new_day(&mut self, current_streak: u32, has_entry_today: bool) {
        self.last_streak = current_streak;
        self.had_entry_today = has_entry_today;
    }
}
