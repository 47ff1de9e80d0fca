pub mod calendar;
pub mod flashcards;
pub mod resources;
pub mod timer;

use chrono::{Datelike, NaiveDate};

use crate::types::MOTIVATION_QUOTES;

pub use calendar::MonthGrid;
pub use flashcards::FlashcardDeck;
pub use resources::{ResourceLink, resource_links};
pub use timer::{Countdown, TimerOutcome};

/// Quote of the day, rotating through the fixed list.
pub fn motivation_for(date: NaiveDate) -> &'static str {
    MOTIVATION_QUOTES[date.ordinal0() as usize % MOTIVATION_QUOTES.len()]
}
