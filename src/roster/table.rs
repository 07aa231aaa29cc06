// Roster model: one boolean decision variable per valid
// (person, day, shift) triple, registered in four lookup indices.

use super::calendar::DayClassifier;
use super::error::{Result, RosterError};
use super::index::{DayIndex, PersonIndex};
use super::records::Person;
use crate::domain::{CpModel, DayCategory, Literal, ShiftType};
use std::collections::HashMap;

#[inline(always)]
fn flatten_index(num_days: usize, person: PersonIndex, day: DayIndex) -> usize {
    person.get() * num_days + day.get()
}

/// A decision variable together with the triple it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftCell {
    pub person: PersonIndex,
    pub day: DayIndex,
    pub shift: ShiftType,
    pub literal: Literal,
}

#[derive(Debug, Clone)]
pub struct RosterModel {
    persons: Vec<Person>,
    num_days: usize,
    categories: Vec<DayCategory>,
    cells: Vec<ShiftCell>,
    by_day: Vec<Vec<Literal>>,
    by_person: Vec<Vec<Literal>>,
    by_day_shift: HashMap<(DayIndex, ShiftType), Vec<Literal>>,
    by_person_day: Vec<Vec<Literal>>,
    slots_per_shift: HashMap<ShiftType, usize>,
    total_shift_slots: usize,
}

impl RosterModel {
    /// Allocate the decision variables in `model`.
    ///
    /// Days are visited in order; for every shift type valid on a day one
    /// variable is created per person, so creation order and labels are
    /// deterministic for identical inputs.
    pub fn build(
        persons: Vec<Person>,
        num_days: usize,
        classifier: &dyn DayClassifier,
        model: &mut CpModel,
    ) -> Result<Self> {
        if persons.is_empty() {
            return Err(RosterError::InvalidConfiguration(
                "at least one person must be rostered".to_string(),
            ));
        }
        if num_days == 0 {
            return Err(RosterError::InvalidConfiguration(
                "the roster horizon must span at least one day".to_string(),
            ));
        }

        let num_persons = persons.len();
        let mut roster = Self {
            num_days,
            categories: Vec::with_capacity(num_days),
            cells: Vec::new(),
            by_day: vec![Vec::new(); num_days],
            by_person: vec![Vec::new(); num_persons],
            by_day_shift: HashMap::new(),
            by_person_day: vec![Vec::new(); num_persons * num_days],
            slots_per_shift: HashMap::new(),
            total_shift_slots: 0,
            persons,
        };

        for d in 0..num_days {
            let day = DayIndex::new(d);
            let category = classifier.classify(day);
            roster.categories.push(category);

            for &shift in category.shift_types() {
                roster.total_shift_slots += 1;
                *roster.slots_per_shift.entry(shift).or_insert(0) += 1;

                for p in 0..num_persons {
                    let person = PersonIndex::new(p);
                    let label = format!(
                        "day={} person={} shift={}",
                        d, roster.persons[p].name, shift
                    );
                    let literal = model.new_bool(label);
                    roster.register(ShiftCell {
                        person,
                        day,
                        shift,
                        literal,
                    });
                }
            }
        }

        log::debug!(
            "roster model: {} people, {} days, {} shift slots, {} variables",
            num_persons,
            num_days,
            roster.total_shift_slots,
            roster.cells.len()
        );
        Ok(roster)
    }

    fn register(&mut self, cell: ShiftCell) {
        let num_days = self.num_days();
        self.by_day[cell.day.get()].push(cell.literal);
        self.by_person[cell.person.get()].push(cell.literal);
        self.by_day_shift
            .entry((cell.day, cell.shift))
            .or_default()
            .push(cell.literal);
        self.by_person_day[flatten_index(num_days, cell.person, cell.day)].push(cell.literal);
        self.cells.push(cell);
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn num_persons(&self) -> usize {
        self.persons.len()
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn person_indices(&self) -> impl Iterator<Item = PersonIndex> {
        (0..self.num_persons()).map(PersonIndex::new)
    }

    pub fn days(&self) -> impl Iterator<Item = DayIndex> {
        (0..self.num_days()).map(DayIndex::new)
    }

    /// Category of `day`, `None` outside the horizon
    pub fn category(&self, day: DayIndex) -> Option<DayCategory> {
        self.categories.get(day.get()).copied()
    }

    /// Shift types valid on `day`; empty outside the horizon
    pub fn shift_types(&self, day: DayIndex) -> &'static [ShiftType] {
        self.category(day)
            .map(|c| c.shift_types())
            .unwrap_or_default()
    }

    pub fn weekdays(&self) -> impl Iterator<Item = DayIndex> + '_ {
        self.days_in(DayCategory::Weekday)
    }

    pub fn weekend_days(&self) -> impl Iterator<Item = DayIndex> + '_ {
        self.days_in(DayCategory::WeekendOrHoliday)
    }

    fn days_in(&self, category: DayCategory) -> impl Iterator<Item = DayIndex> + '_ {
        self.days()
            .filter(move |&d| self.categories[d.get()] == category)
    }

    /// Every variable of a day, any shift and person
    pub fn variables_for_day(&self, day: DayIndex) -> &[Literal] {
        self.by_day
            .get(day.get())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Union of the variables of the given shift types on a day
    pub fn variables_for_day_shifts(&self, day: DayIndex, shifts: &[ShiftType]) -> Vec<Literal> {
        shifts
            .iter()
            .filter_map(|&shift| self.by_day_shift.get(&(day, shift)))
            .flatten()
            .copied()
            .collect()
    }

    /// Every variable of a person, any day and shift
    pub fn variables_for_person(&self, person: PersonIndex) -> &[Literal] {
        self.by_person
            .get(person.get())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// A person's variables on one day, any shift
    pub fn variables_for_person_day(&self, person: PersonIndex, day: DayIndex) -> &[Literal] {
        if person.get() >= self.num_persons() || day.get() >= self.num_days() {
            return &[];
        }
        &self.by_person_day[flatten_index(self.num_days(), person, day)]
    }

    /// The variable of an exact triple, `None` when the shift is not valid that day
    pub fn variable_for(
        &self,
        person: PersonIndex,
        day: DayIndex,
        shift: ShiftType,
    ) -> Option<Literal> {
        // one variable per person, in person order
        self.by_day_shift
            .get(&(day, shift))
            .and_then(|slot| slot.get(person.get()))
            .copied()
    }

    /// A person's variables tagged with their shift type
    pub fn shifts_for_person(
        &self,
        person: PersonIndex,
    ) -> impl Iterator<Item = (ShiftType, Literal)> + '_ {
        self.days().flat_map(move |day| {
            self.shift_types(day)
                .iter()
                .filter_map(move |&shift| self.variable_for(person, day, shift).map(|l| (shift, l)))
        })
    }

    pub fn cells(&self) -> &[ShiftCell] {
        &self.cells
    }

    pub fn total_variables(&self) -> usize {
        self.cells.len()
    }

    /// Number of (day, shift) slots to fill over the horizon
    pub fn total_shift_slots(&self) -> usize {
        self.total_shift_slots
    }

    pub fn shift_slot_count(&self, shift: ShiftType) -> usize {
        self.slots_per_shift.get(&shift).copied().unwrap_or(0)
    }
}
