// Domain inputs of a roster: people, leave and off-duty preferences

use super::error::{Result, RosterError};
use super::index::{DayIndex, PersonIndex};
use std::collections::BTreeSet;

/// A participant to be scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Person whose id is its display name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }
}

/// Hard unavailability of a person on a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeaveRecord {
    pub person: PersonIndex,
    pub day: DayIndex,
}

/// Soft request of a person to be off on a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreferenceRecord {
    pub person: PersonIndex,
    pub day: DayIndex,
}

/// Anything keyed by a (person, day) pair
pub trait PersonDay {
    fn person(&self) -> PersonIndex;
    fn day(&self) -> DayIndex;
}

impl PersonDay for LeaveRecord {
    fn person(&self) -> PersonIndex {
        self.person
    }

    fn day(&self) -> DayIndex {
        self.day
    }
}

impl PersonDay for PreferenceRecord {
    fn person(&self) -> PersonIndex {
        self.person
    }

    fn day(&self) -> DayIndex {
        self.day
    }
}

/// Deduplicate records and reject any whose person or day is outside the roster
pub fn checked_pairs<R: PersonDay>(
    records: &[R],
    num_people: usize,
    num_days: usize,
    kind: &str,
) -> Result<BTreeSet<(PersonIndex, DayIndex)>> {
    let mut pairs = BTreeSet::new();
    for record in records {
        let (person, day) = (record.person(), record.day());
        if person.get() >= num_people {
            return Err(RosterError::InvalidConfiguration(format!(
                "{} record references person {} but only {} people are rostered",
                kind,
                person.get(),
                num_people
            )));
        }
        if day.get() >= num_days {
            return Err(RosterError::InvalidConfiguration(format!(
                "{} record for person {} references day {} outside [0, {})",
                kind,
                person.get(),
                day.get(),
                num_days
            )));
        }
        pairs.insert((person, day));
    }
    Ok(pairs)
}
