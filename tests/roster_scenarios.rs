#![cfg(any(feature = "highs", feature = "coin_cbc"))]

use chrono::NaiveDate;
use rosteropt::roster::{AllWeekdays, LeaveRecord};
use rosteropt::{
    CalendarClassifier, DayIndex, Person, PersonIndex, Roster, RosterError, RosterRequest,
    RosterService, SolutionStatus, SolverConfig, SolverFactory,
};

fn people(n: usize) -> Vec<Person> {
    (0..n).map(|i| Person::named(format!("intern{}", i))).collect()
}

fn july_2024() -> Box<CalendarClassifier> {
    Box::new(CalendarClassifier::new(
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    ))
}

fn days(range: std::ops::RangeInclusive<usize>) -> impl Iterator<Item = DayIndex> {
    range.map(DayIndex::new)
}

fn service() -> RosterService {
    RosterService::new(SolverFactory::default_solver().unwrap())
}

/// Check every hard rule against the materialized roster
fn assert_hard_constraints(request: &RosterRequest, roster: &Roster) {
    let compiled = RosterService::compile(request).unwrap();
    let model = &compiled.roster;

    for day in &roster.days {
        // one person per valid slot, no other shift types
        let mut shifts: Vec<_> = day.assignments.iter().map(|a| a.shift).collect();
        shifts.sort();
        let mut expected = model.shift_types(day.day).to_vec();
        expected.sort();
        assert_eq!(shifts, expected, "coverage on day {}", day.day);

        // no double booking
        let mut persons: Vec<_> = day.assignments.iter().map(|a| a.person).collect();
        persons.sort();
        persons.dedup();
        assert_eq!(persons.len(), day.assignments.len(), "double booking on day {}", day.day);
    }

    for person in model.person_indices() {
        for day in model.days().take(model.num_days() - 1) {
            assert!(
                !(roster.is_on_duty(person, day) && roster.is_on_duty(person, day.next())),
                "{} works days {} and {}",
                person,
                day,
                day.next()
            );
        }
    }

    for &LeaveRecord { person, day } in &request.leave {
        assert!(!roster.is_on_duty(person, day), "{} on leave on day {}", person, day);
    }

    if request.config.load_balancing {
        for summary in &roster.people {
            assert!(
                (roster.load_bounds.min_per_person..=roster.load_bounds.max_per_person)
                    .contains(&summary.shifts),
                "{} has {} shifts",
                summary.name,
                summary.shifts
            );
        }
    }

    if let Some(max_requests) = roster.max_requests {
        assert_eq!(max_requests, roster.total_requests() as i64);
    }
}

#[test]
fn weekday_only_week_spreads_seven_slots() {
    let request = RosterRequest::new(people(4), 7, Box::new(AllWeekdays));
    let roster = service().schedule(&request).unwrap();

    assert_eq!(roster.status, SolutionStatus::Optimal);
    assert_eq!(roster.load_bounds.min_per_person, 1);
    assert_eq!(roster.load_bounds.max_per_person, 2);
    assert_eq!(roster.people.iter().map(|p| p.shifts).sum::<i64>(), 7);
    assert_hard_constraints(&request, &roster);
}

#[test]
fn seven_days_of_july_satisfy_four_requests() {
    let request = RosterRequest::new(people(4), 7, july_2024())
        .with_preferences(PersonIndex::new(0), days(0..=4));
    let roster = service().schedule(&request).unwrap();

    assert_eq!(roster.status, SolutionStatus::Optimal);
    assert_eq!(roster.max_requests, Some(4));
    assert_eq!(roster.people[0].satisfied_requests, 4);
    assert_hard_constraints(&request, &roster);
}

#[test]
fn eight_days_of_july_satisfy_every_request() {
    let request = RosterRequest::new(people(4), 8, july_2024())
        .with_preferences(PersonIndex::new(0), days(0..=4));
    let roster = service().schedule(&request).unwrap();

    assert_eq!(roster.status, SolutionStatus::Optimal);
    assert_eq!(roster.max_requests, Some(5));
    for day in days(0..=4) {
        assert!(!roster.is_on_duty(PersonIndex::new(0), day));
    }
    assert_hard_constraints(&request, &roster);
}

#[test]
fn july_with_two_weeks_of_leave() {
    let request = RosterRequest::new(people(7), 31, july_2024())
        .with_leave(PersonIndex::new(0), days(0..=14));
    let roster = service().schedule(&request).unwrap();

    assert_eq!(roster.status, SolutionStatus::Optimal);
    assert!(roster
        .shifts_of(PersonIndex::new(0))
        .iter()
        .all(|(day, _)| day.get() >= 15));
    assert_eq!(roster.load_bounds.min_per_person, 5);
    assert_eq!(roster.load_bounds.max_per_person, 6);
    assert_hard_constraints(&request, &roster);
}

#[test]
fn uncovered_day_is_infeasible() {
    let request = RosterRequest::new(people(2), 3, Box::new(AllWeekdays))
        .with_leave(PersonIndex::new(0), days(1..=1))
        .with_leave(PersonIndex::new(1), days(1..=1));

    assert!(matches!(
        service().schedule(&request),
        Err(RosterError::InfeasibleModel)
    ));
}

#[test]
fn single_person_cannot_work_consecutive_days() {
    let request = RosterRequest::new(people(1), 2, Box::new(AllWeekdays));
    assert!(matches!(
        service().schedule(&request),
        Err(RosterError::InfeasibleModel)
    ));
}

#[test]
fn time_limited_solve_returns_a_roster_or_gives_up_cleanly() {
    let request = RosterRequest::new(people(9), 62, july_2024())
        .with_leave(PersonIndex::new(3), days(10..=20))
        .with_preferences(PersonIndex::new(0), days(0..=30))
        .with_preferences(PersonIndex::new(5), days(25..=50));
    let service = service().with_config(SolverConfig::default().with_time_limit(0.5));

    match service.schedule(&request) {
        Ok(roster) => {
            assert_eq!(roster.status, SolutionStatus::Optimal);
            assert_hard_constraints(&request, &roster);
        }
        Err(RosterError::IndeterminateResult { status, best }) => {
            assert_ne!(status, SolutionStatus::Optimal);
            assert_ne!(status, SolutionStatus::Infeasible);
            if let Some(best) = best {
                assert_eq!(best.status, SolutionStatus::Feasible);
                assert_hard_constraints(&request, &best);
            }
        }
        Err(e) => panic!("unexpected error under a time limit: {}", e),
    }
}

#[test]
fn progress_callback_sees_the_final_roster() {
    let request = RosterRequest::new(people(4), 7, july_2024());
    let mut seen = Vec::new();
    let roster = service()
        .schedule_with_progress(&request, &mut |r| seen.push(r.status))
        .unwrap();

    assert_eq!(seen, vec![SolutionStatus::Optimal]);
    assert_hard_constraints(&request, &roster);
}

#[test]
fn rebuilding_yields_the_same_model() {
    let build = || {
        RosterRequest::new(people(5), 14, july_2024())
            .with_leave(PersonIndex::new(2), days(3..=4))
            .with_preferences(PersonIndex::new(1), days(6..=8))
    };
    let first = RosterService::compile(&build()).unwrap();
    let second = RosterService::compile(&build()).unwrap();

    assert_eq!(first.model.num_variables(), second.model.num_variables());
    assert_eq!(first.model.num_constraints(), second.model.num_constraints());
    let labels = |c: &rosteropt::application::CompiledRoster| {
        c.model
            .variables()
            .iter()
            .map(|v| v.name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(&first), labels(&second));
}
