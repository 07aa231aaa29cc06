// Day classification: which category each day of the horizon falls into

use super::index::DayIndex;
use crate::domain::DayCategory;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Decides the category of every day in the horizon
pub trait DayClassifier {
    fn classify(&self, day: DayIndex) -> DayCategory;
}

impl<F> DayClassifier for F
where
    F: Fn(DayIndex) -> DayCategory,
{
    fn classify(&self, day: DayIndex) -> DayCategory {
        self(day)
    }
}

/// Treats every day as a weekday
#[derive(Debug, Clone, Copy, Default)]
pub struct AllWeekdays;

impl DayClassifier for AllWeekdays {
    fn classify(&self, _day: DayIndex) -> DayCategory {
        DayCategory::Weekday
    }
}

/// Calendar-backed classifier: day 0 is `start`, Saturdays, Sundays and
/// listed holidays are weekend-or-holiday days.
#[derive(Debug, Clone)]
pub struct CalendarClassifier {
    start: NaiveDate,
    holidays: BTreeSet<NaiveDate>,
}

impl CalendarClassifier {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            start,
            holidays: BTreeSet::new(),
        }
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Calendar date of a day index, `None` past chrono's representable range
    pub fn date_of(&self, day: DayIndex) -> Option<NaiveDate> {
        self.start.checked_add_days(Days::new(day.get() as u64))
    }
}

impl DayClassifier for CalendarClassifier {
    fn classify(&self, day: DayIndex) -> DayCategory {
        match self.date_of(day) {
            Some(date)
                if matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
                    || self.holidays.contains(&date) =>
            {
                DayCategory::WeekendOrHoliday
            }
            _ => DayCategory::Weekday,
        }
    }
}
