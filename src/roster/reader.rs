// Result reader: turns a solved assignment back into a per-day roster and
// per-person metrics.

use super::generator::{GeneratedModel, HourTarget, LoadBounds};
use super::index::{DayIndex, PersonIndex};
use super::table::RosterModel;
use crate::domain::{DayCategory, ShiftType, SolutionStatus, SolutionView, SolverStatistics};

/// One person on duty for one shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub person: PersonIndex,
    pub shift: ShiftType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRoster {
    pub day: DayIndex,
    pub category: DayCategory,
    /// Ordered by shift type, then person
    pub assignments: Vec<Assignment>,
}

/// Derived metrics of one person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSummary {
    pub person: PersonIndex,
    pub name: String,
    pub shifts: i64,
    pub hours: i64,
    /// Weighted hours minus the per-person target
    pub hour_delta: i64,
    pub satisfied_requests: usize,
}

/// A materialized roster
#[derive(Debug, Clone)]
pub struct Roster {
    pub status: SolutionStatus,
    pub days: Vec<DayRoster>,
    /// Satisfied off-duty requests, `None` when preferences were disabled
    pub max_requests: Option<i64>,
    pub people: Vec<PersonSummary>,
    pub load_bounds: LoadBounds,
    pub hour_target: HourTarget,
    pub objective_value: Option<f64>,
    pub statistics: SolverStatistics,
}

impl Roster {
    pub fn assignments_on(&self, day: DayIndex) -> &[Assignment] {
        self.days
            .get(day.get())
            .map(|d| d.assignments.as_slice())
            .unwrap_or_default()
    }

    pub fn is_on_duty(&self, person: PersonIndex, day: DayIndex) -> bool {
        self.assignments_on(day).iter().any(|a| a.person == person)
    }

    /// Every (day, shift) a person works, in day order
    pub fn shifts_of(&self, person: PersonIndex) -> Vec<(DayIndex, ShiftType)> {
        self.days
            .iter()
            .flat_map(|d| {
                d.assignments
                    .iter()
                    .filter(move |a| a.person == person)
                    .map(move |a| (d.day, a.shift))
            })
            .collect()
    }

    pub fn total_requests(&self) -> usize {
        self.people.iter().map(|p| p.satisfied_requests).sum()
    }
}

pub struct ResultReader<'a> {
    roster: &'a RosterModel,
    generated: &'a GeneratedModel,
}

impl<'a> ResultReader<'a> {
    pub fn new(roster: &'a RosterModel, generated: &'a GeneratedModel) -> Self {
        Self { roster, generated }
    }

    /// Read the roster out of an assignment.
    ///
    /// Metrics are recomputed from the shift variables; `max_requests` is
    /// taken from its model variable so a disagreement with the recomputed
    /// count is visible to callers.
    pub fn read(&self, view: &SolutionView<'_>) -> Roster {
        let days = self
            .roster
            .days()
            .map(|day| DayRoster {
                day,
                category: self.roster.category(day).unwrap_or(DayCategory::Weekday),
                assignments: self
                    .roster
                    .shift_types(day)
                    .iter()
                    .flat_map(|&shift| {
                        self.roster.person_indices().filter_map(move |person| {
                            self.roster
                                .variable_for(person, day, shift)
                                .filter(|&lit| view.literal(lit))
                                .map(|_| Assignment { person, shift })
                        })
                    })
                    .collect(),
            })
            .collect();

        let people = self
            .roster
            .person_indices()
            .map(|person| self.summarize(view, person))
            .collect();

        let max_requests = self.generated.max_requests.map(|var| view.value(var));
        if let Some(reported) = max_requests {
            log::debug!("max requests: {}", reported);
        }

        Roster {
            status: view.status,
            days,
            max_requests,
            people,
            load_bounds: self.generated.load_bounds,
            hour_target: self.generated.hour_target,
            objective_value: None,
            statistics: SolverStatistics::default(),
        }
    }

    fn summarize(&self, view: &SolutionView<'_>, person: PersonIndex) -> PersonSummary {
        let (shifts, hours) = self
            .roster
            .shifts_for_person(person)
            .filter(|&(_, lit)| view.literal(lit))
            .fold((0, 0), |(count, hours), (shift, _)| {
                (count + 1, hours + shift.hours())
            });

        let satisfied_requests = self
            .generated
            .preferences
            .iter()
            .filter(|&&(p, day)| {
                p == person
                    && !self
                        .roster
                        .variables_for_person_day(person, day)
                        .iter()
                        .any(|&lit| view.literal(lit))
            })
            .count();

        PersonSummary {
            person,
            name: self.roster.persons()[person.get()].name.clone(),
            shifts,
            hours,
            hour_delta: hours - self.generated.hour_target.per_person,
            satisfied_requests,
        }
    }
}
