// Constraint generator: translates the roster rules into constraint model
// primitives and composes the objective.

use super::error::Result;
use super::index::{DayIndex, PersonIndex};
use super::records::{checked_pairs, LeaveRecord, PreferenceRecord};
use super::table::RosterModel;
use crate::domain::{CpModel, LinearExpr, ShiftType, VarId};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Optional constraint and objective groups.
///
/// Coverage, no-double-booking and no-back-to-back duty are always emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub leave: bool,
    pub load_balancing: bool,
    pub hour_tracking: bool,
    pub preferences: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            leave: true,
            load_balancing: true,
            hour_tracking: true,
            preferences: true,
        }
    }
}

/// Per-person bounds on the number of shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBounds {
    pub min_per_person: i64,
    pub max_per_person: i64,
}

impl LoadBounds {
    pub fn new(total_slots: usize, num_people: usize) -> Self {
        let total = total_slots as i64;
        let n = num_people as i64;
        let min_per_person = total / n;
        let max_per_person = if total % n == 0 {
            min_per_person
        } else {
            min_per_person + 1
        };
        Self {
            min_per_person,
            max_per_person,
        }
    }
}

/// Weighted-hour target every person is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourTarget {
    pub total_hours: i64,
    pub per_person: i64,
}

impl HourTarget {
    pub fn new(roster: &RosterModel) -> Self {
        let total_hours = ShiftType::ALL
            .iter()
            .map(|&shift| roster.shift_slot_count(shift) as i64 * shift.hours())
            .sum::<i64>();
        Self {
            total_hours,
            per_person: total_hours / roster.num_persons() as i64,
        }
    }
}

/// Number of constraints emitted per group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub coverage: usize,
    pub double_booking: usize,
    pub consecutive: usize,
    pub leave: usize,
    pub load_balancing: usize,
    pub hour_tracking: usize,
    pub preferences: usize,
}

impl GenerationSummary {
    pub fn total(&self) -> usize {
        self.coverage
            + self.double_booking
            + self.consecutive
            + self.leave
            + self.load_balancing
            + self.hour_tracking
            + self.preferences
    }
}

/// Handles to the auxiliary variables and derived bounds of a generated model
#[derive(Debug, Clone)]
pub struct GeneratedModel {
    pub load_bounds: LoadBounds,
    pub hour_target: HourTarget,
    /// Minimum shift count across people, maximized as a tie-breaker
    pub min_shifts_per_person: Option<VarId>,
    /// Weighted hours minus the target, one per person
    pub hour_deltas: Vec<VarId>,
    /// Number of satisfied off-duty requests
    pub max_requests: Option<VarId>,
    pub leave: BTreeSet<(PersonIndex, DayIndex)>,
    pub preferences: BTreeSet<(PersonIndex, DayIndex)>,
    pub summary: GenerationSummary,
}

pub struct ConstraintGenerator<'a> {
    roster: &'a RosterModel,
    model: &'a mut CpModel,
    config: RosterConfig,
    summary: GenerationSummary,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(roster: &'a RosterModel, model: &'a mut CpModel, config: RosterConfig) -> Self {
        Self {
            roster,
            model,
            config,
            summary: GenerationSummary::default(),
        }
    }

    /// Emit every enabled constraint group and the objective.
    ///
    /// Leave and preference records are checked against the roster before
    /// anything is written to the model.
    pub fn generate(
        mut self,
        leave: &[LeaveRecord],
        preferences: &[PreferenceRecord],
    ) -> Result<GeneratedModel> {
        let num_people = self.roster.num_persons();
        let num_days = self.roster.num_days();
        let leave = checked_pairs(leave, num_people, num_days, "leave")?;
        let preferences = checked_pairs(preferences, num_people, num_days, "preference")?;

        self.add_slot_coverage();
        self.add_no_double_booking();
        self.prohibit_consecutive_shifts();

        if self.config.leave {
            self.add_leave(&leave);
        }

        let load_bounds = LoadBounds::new(self.roster.total_shift_slots(), num_people);
        let min_shifts_per_person = self
            .config
            .load_balancing
            .then(|| self.distribute_shifts(load_bounds));

        let hour_target = HourTarget::new(self.roster);
        let hour_deltas = if self.config.hour_tracking {
            self.add_hour_tracking(hour_target)
        } else {
            Vec::new()
        };

        let max_requests = self
            .config
            .preferences
            .then(|| self.add_requests(&preferences));

        self.set_objective(load_bounds, min_shifts_per_person, max_requests);

        log::info!(
            "generated {} constraints (coverage {}, double booking {}, consecutive {}, leave {}, load {}, hours {}, requests {})",
            self.summary.total(),
            self.summary.coverage,
            self.summary.double_booking,
            self.summary.consecutive,
            self.summary.leave,
            self.summary.load_balancing,
            self.summary.hour_tracking,
            self.summary.preferences
        );

        Ok(GeneratedModel {
            load_bounds,
            hour_target,
            min_shifts_per_person,
            hour_deltas,
            max_requests,
            leave,
            preferences,
            summary: self.summary,
        })
    }

    /// Exactly one person per (day, shift) slot
    fn add_slot_coverage(&mut self) {
        for day in self.roster.days() {
            for &shift in self.roster.shift_types(day) {
                let slot = self.roster.variables_for_day_shifts(day, &[shift]);
                self.model.add_exactly_one(&slot);
                self.summary.coverage += 1;
            }
        }
    }

    /// At most one shift per person per day
    fn add_no_double_booking(&mut self) {
        for person in self.roster.person_indices() {
            for day in self.roster.days() {
                let shifts = self.roster.variables_for_person_day(person, day);
                // single-shift days cannot be double booked
                if shifts.len() > 1 {
                    self.model.add_at_most_one(shifts);
                    self.summary.double_booking += 1;
                }
            }
        }
    }

    /// Working today forbids every shift tomorrow
    fn prohibit_consecutive_shifts(&mut self) {
        for day in self.roster.days().take(self.roster.num_days() - 1) {
            for person in self.roster.person_indices() {
                let tomorrow = self.roster.variables_for_person_day(person, day.next());
                for &today_shift in self.roster.variables_for_person_day(person, day) {
                    for &tomorrow_shift in tomorrow {
                        self.model.add_implication(today_shift, !tomorrow_shift);
                        self.summary.consecutive += 1;
                    }
                }
            }
        }
    }

    fn add_leave(&mut self, leave: &BTreeSet<(PersonIndex, DayIndex)>) {
        for &(person, day) in leave {
            let shifts = self.roster.variables_for_person_day(person, day);
            log::debug!(
                "leave for {} on day {} ({} variables)",
                self.roster.persons()[person.get()].name,
                day,
                shifts.len()
            );
            self.model.add_linear_equality(LinearExpr::sum(shifts), 0);
            self.summary.leave += 1;
        }
    }

    // Keep every count within [min, max]; maximizing the smallest count
    // pushes the worst-off person towards the upper bound.
    fn distribute_shifts(&mut self, bounds: LoadBounds) -> VarId {
        log::debug!(
            "shifts per person: min = {}, max = {}",
            bounds.min_per_person,
            bounds.max_per_person
        );

        let counts: Vec<LinearExpr> = self
            .roster
            .person_indices()
            .map(|person| LinearExpr::sum(self.roster.variables_for_person(person)))
            .collect();

        for count in &counts {
            self.model
                .add_linear_range(count.clone(), bounds.min_per_person, bounds.max_per_person);
            self.summary.load_balancing += 1;
        }

        let min_shifts = self
            .model
            .new_int(0, bounds.max_per_person, "minShiftsPerPerson");
        self.model.add_min_equality(min_shifts, counts);
        self.summary.load_balancing += 1;
        min_shifts
    }

    fn add_hour_tracking(&mut self, target: HourTarget) -> Vec<VarId> {
        log::debug!(
            "total hours {}, hours per person {}",
            target.total_hours,
            target.per_person
        );

        let mut deltas = Vec::with_capacity(self.roster.num_persons());
        for person in self.roster.person_indices() {
            let weighted: Vec<_> = self
                .roster
                .shifts_for_person(person)
                .map(|(shift, lit)| (lit, shift.hours()))
                .collect();
            let max_hours: i64 = weighted.iter().map(|(_, hours)| hours).sum();
            let hours = LinearExpr::weighted_sum(weighted.iter().map(|(lit, h)| (lit, *h)));

            let name = &self.roster.persons()[person.get()].name;
            let delta = self.model.new_int(
                -target.per_person,
                max_hours - target.per_person,
                format!("{}:{} hours", person.get(), name),
            );
            // delta == hours - target
            let expr = LinearExpr::from(delta) - hours + LinearExpr::constant(target.per_person);
            self.model.add_linear_equality(expr, 0);
            self.summary.hour_tracking += 1;
            deltas.push(delta);
        }
        deltas
    }

    // dailyOff(p, d) = 1 - Σ shifts(p, d), summed over registered requests only
    fn add_requests(&mut self, preferences: &BTreeSet<(PersonIndex, DayIndex)>) -> VarId {
        let mut satisfied = LinearExpr::new();
        for &(person, day) in preferences {
            log::debug!(
                "off request for {}:{} on day {}",
                person.get(),
                self.roster.persons()[person.get()].name,
                day
            );
            let daily_off =
                LinearExpr::constant(1) - LinearExpr::sum(self.roster.variables_for_person_day(person, day));
            satisfied = satisfied + daily_off;
        }

        let max_requests = self
            .model
            .new_int(0, preferences.len() as i64, "max requests");
        self.model
            .add_linear_equality(LinearExpr::from(max_requests) - satisfied, 0);
        self.summary.preferences += 1;
        max_requests
    }

    // Single maximization: satisfied requests dominate, the fairness term
    // only breaks ties since it never exceeds max_per_person.
    fn set_objective(
        &mut self,
        bounds: LoadBounds,
        min_shifts: Option<VarId>,
        max_requests: Option<VarId>,
    ) {
        let mut objective = LinearExpr::new();
        if let Some(min_shifts) = min_shifts {
            objective.add_term(min_shifts, 1);
        }
        if let Some(max_requests) = max_requests {
            let weight = if min_shifts.is_some() {
                bounds.max_per_person + 1
            } else {
                1
            };
            objective.add_term(max_requests, weight);
        }
        if objective.is_constant() {
            log::debug!("no objective terms; solving for feasibility");
            return;
        }
        self.model.maximize(objective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LinearProgram, ModelConstraint, OptimizationType};
    use crate::roster::calendar::{AllWeekdays, CalendarClassifier};
    use crate::roster::records::Person;
    use crate::roster::RosterError;
    use chrono::NaiveDate;

    fn people(n: usize) -> Vec<Person> {
        (0..n).map(|i| Person::named(format!("intern{}", i))).collect()
    }

    fn july_2024() -> CalendarClassifier {
        CalendarClassifier::new(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
    }

    fn build(
        n: usize,
        days: usize,
        config: RosterConfig,
        leave: &[LeaveRecord],
        prefs: &[PreferenceRecord],
    ) -> (RosterModel, CpModel, GeneratedModel) {
        let mut model = CpModel::new("roster");
        let roster = RosterModel::build(people(n), days, &july_2024(), &mut model).unwrap();
        let generated = ConstraintGenerator::new(&roster, &mut model, config)
            .generate(leave, prefs)
            .unwrap();
        (roster, model, generated)
    }

    fn pref(person: usize, day: usize) -> PreferenceRecord {
        PreferenceRecord {
            person: PersonIndex::new(person),
            day: DayIndex::new(day),
        }
    }

    fn leave(person: usize, day: usize) -> LeaveRecord {
        LeaveRecord {
            person: PersonIndex::new(person),
            day: DayIndex::new(day),
        }
    }

    /// Assignment over the roster variables only, auxiliaries set afterwards
    fn assignment(
        roster: &RosterModel,
        model: &CpModel,
        on_duty: &[(usize, usize, ShiftType)],
    ) -> Vec<i64> {
        let mut values = vec![0; model.num_variables()];
        for &(p, d, s) in on_duty {
            let lit = roster
                .variable_for(PersonIndex::new(p), DayIndex::new(d), s)
                .unwrap();
            values[lit.var().index()] = 1;
        }
        values
    }

    #[test]
    fn load_bounds() {
        assert_eq!(
            LoadBounds::new(7, 4),
            LoadBounds {
                min_per_person: 1,
                max_per_person: 2
            }
        );
        assert_eq!(
            LoadBounds::new(8, 4),
            LoadBounds {
                min_per_person: 2,
                max_per_person: 2
            }
        );
    }

    #[test]
    fn all_weekday_horizon_bounds() {
        let mut model = CpModel::new("roster");
        let roster = RosterModel::build(people(4), 7, &AllWeekdays, &mut model).unwrap();
        let generated = ConstraintGenerator::new(&roster, &mut model, RosterConfig::default())
            .generate(&[], &[])
            .unwrap();

        assert_eq!(roster.total_shift_slots(), 7);
        assert_eq!(generated.load_bounds.min_per_person, 1);
        assert_eq!(generated.load_bounds.max_per_person, 2);
        // no weekend days, so no person-day has two shifts
        assert_eq!(generated.summary.double_booking, 0);
        assert_eq!(generated.summary.coverage, 7);
    }

    #[test]
    fn constraint_counts_per_group() {
        let (_, _, generated) = build(
            4,
            7,
            RosterConfig::default(),
            &[leave(1, 2)],
            &[pref(0, 0), pref(0, 1)],
        );
        let summary = generated.summary;

        // 5 weekday slots + 2 × 2 weekend slots
        assert_eq!(summary.coverage, 9);
        // 4 people × 2 weekend days
        assert_eq!(summary.double_booking, 8);
        // per person: days 0..4 → 1×1 each (4), day 4→5 1×2, day 5→6 2×2
        assert_eq!(summary.consecutive, 4 * (4 + 2 + 4));
        assert_eq!(summary.leave, 1);
        assert_eq!(summary.load_balancing, 5);
        assert_eq!(summary.hour_tracking, 4);
        assert_eq!(summary.preferences, 1);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let prefs = [pref(0, 0), pref(0, 3)];
        let (_, first, _) = build(4, 8, RosterConfig::default(), &[leave(2, 1)], &prefs);
        let (_, second, _) = build(4, 8, RosterConfig::default(), &[leave(2, 1)], &prefs);

        assert_eq!(first.num_variables(), second.num_variables());
        assert_eq!(first.num_constraints(), second.num_constraints());
        let first = first.seal();
        let second = second.seal();
        let names = |m: &crate::domain::SealedModel| {
            m.variables().iter().map(|v| v.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn objective_weights_requests_above_fairness() {
        let (_, model, generated) = build(4, 7, RosterConfig::default(), &[], &[pref(0, 0)]);
        let sealed = model.seal();
        let objective = sealed.objective().unwrap();

        assert_eq!(objective.optimization_type, OptimizationType::Maximize);
        let min_shifts = generated.min_shifts_per_person.unwrap();
        let max_requests = generated.max_requests.unwrap();
        // 9 slots over 4 people: max 3 per person
        assert_eq!(objective.expr.terms(), &[(min_shifts, 1), (max_requests, 4)]);
    }

    #[test]
    fn disabled_groups_emit_nothing() {
        let config = RosterConfig {
            leave: false,
            load_balancing: false,
            hour_tracking: false,
            preferences: false,
        };
        let (_, model, generated) = build(3, 7, config, &[leave(0, 0)], &[pref(1, 1)]);

        assert_eq!(generated.summary.leave, 0);
        assert_eq!(generated.summary.load_balancing, 0);
        assert!(generated.max_requests.is_none());
        assert!(generated.hour_deltas.is_empty());
        assert!(model.seal().objective().is_none());
    }

    #[test]
    fn out_of_range_records_fail_before_any_constraint() {
        let mut model = CpModel::new("roster");
        let roster = RosterModel::build(people(2), 5, &july_2024(), &mut model).unwrap();
        let err = ConstraintGenerator::new(&roster, &mut model, RosterConfig::default())
            .generate(&[leave(0, 5)], &[])
            .unwrap_err();

        assert!(matches!(err, RosterError::InvalidConfiguration(_)));
        assert_eq!(model.num_constraints(), 0);
    }

    #[test]
    fn valid_roster_satisfies_every_row() {
        // July 2024, 4 people, 7 days: 9 slots, 2..=3 shifts each.
        // Person 0 works days 0 and 5 only and asked for days 1..=4 off.
        let prefs = [pref(0, 1), pref(0, 2), pref(0, 3), pref(0, 4)];
        let (roster, model, generated) =
            build(4, 7, RosterConfig::default(), &[leave(3, 0)], &prefs);

        let on_duty = [
            (0, 0, ShiftType::WeekDay),
            (1, 1, ShiftType::WeekDay),
            (2, 2, ShiftType::WeekDay),
            (3, 3, ShiftType::WeekDay),
            (1, 4, ShiftType::WeekDay),
            (0, 5, ShiftType::Weekend),
            (3, 5, ShiftType::WeekendShortcall),
            (2, 6, ShiftType::Weekend),
            (1, 6, ShiftType::WeekendShortcall),
        ];
        let mut values = assignment(&roster, &model, &on_duty);

        let counts = [2, 3, 2, 2];
        values[generated.min_shifts_per_person.unwrap().index()] = 2;
        values[generated.max_requests.unwrap().index()] = 4;
        let target = generated.hour_target.per_person;
        let hours = [16 + 24, 16 * 2 + 6, 16 + 24, 16 + 6];
        for (p, delta) in generated.hour_deltas.iter().enumerate() {
            values[delta.index()] = hours[p] - target;
        }
        assert_eq!(counts.iter().sum::<i64>(), 9);

        let sealed = model.seal();
        let lp = LinearProgram::lower(&sealed);
        let mut columns: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        // selectors of the min equality: person 0 attains the minimum
        let selectors = lp.columns.len() - columns.len();
        assert_eq!(selectors, 4);
        columns.extend([1.0, 0.0, 0.0, 0.0]);

        assert!(
            lp.is_feasible(&columns),
            "max violation {}",
            lp.max_constraint_violation(&columns)
        );
    }

    #[test]
    fn back_to_back_duty_violates_the_model() {
        let (roster, model, _) = build(
            2,
            3,
            RosterConfig {
                load_balancing: false,
                hour_tracking: false,
                preferences: false,
                leave: false,
            },
            &[],
            &[],
        );
        let values = assignment(
            &roster,
            &model,
            &[
                (0, 0, ShiftType::WeekDay),
                (0, 1, ShiftType::WeekDay),
                (1, 2, ShiftType::WeekDay),
            ],
        );
        let lp = LinearProgram::lower(&model.seal());
        let columns: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        assert!(!lp.is_feasible(&columns));
    }

    #[test]
    fn leave_forces_both_weekend_shifts_off() {
        let (roster, model, _) = build(2, 7, RosterConfig::default(), &[leave(1, 5)], &[]);
        let sealed = model.seal();
        let shifts = roster.variables_for_person_day(PersonIndex::new(1), DayIndex::new(5));

        let leave_row = sealed.constraints().iter().find_map(|c| match c {
            ModelConstraint::LinearEquality { expr, value } if expr.terms().len() == 2 => {
                Some((expr.clone(), *value))
            }
            _ => None,
        });
        let (expr, value) = leave_row.unwrap();
        assert_eq!(value, 0);
        let vars: Vec<_> = expr.terms().iter().map(|(v, _)| *v).collect();
        assert_eq!(vars, shifts.iter().map(|l| l.var()).collect::<Vec<_>>());
    }
}
