use std::ops::Range;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, SubsecRound};

/// A date expression found inside a piece of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// Resolved local wall-clock time. Midnight when no time of day was given.
    pub value: NaiveDateTime,
    /// Byte offsets of the expression in the parsed text.
    pub start: usize,
    pub end: usize,
    /// The exact substring that was recognised.
    pub text: String,
    pub has_time: bool,
}

impl DateMatch {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Natural-language date grammar.
///
/// Implementations return at most one match: the leftmost expression in
/// `text`, resolved against `now`. Finding nothing is not an error.
pub trait DateExpressionParser {
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<DateMatch>;
}

/// Source of "now" for the store.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        // Stored timestamps keep millisecond precision.
        Local::now().trunc_subsecs(3)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Short label for a due date: `Oct 19` for all-day dates, `Oct 19, 4:00 PM`
/// otherwise.
pub fn format_due_label(due: NaiveDateTime) -> String {
    if due.time() == NaiveTime::MIN {
        due.format("%b %-d").to_string()
    } else {
        due.format("%b %-d, %-I:%M %p").to_string()
    }
}
