// Example: one week of July 2024 with off-duty requests
//
// Four interns cover 5 weekday slots (16 h) and, on Saturday and Sunday, a
// full weekend slot (24 h) plus a short call (6 h). Nobody may work two days
// in a row. Intern 0 asks to be off Monday to Friday.
//
// Intern 0 needs at least two shifts and Saturday/Sunday are consecutive,
// so at most four of the five requests can be granted.

use chrono::NaiveDate;
use rosteropt::{
    CalendarClassifier, DayIndex, Person, PersonIndex, RosterRequest, RosterService,
    SolverFactory,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 7, 1).ok_or("invalid start date")?;
    let persons = ["Ada", "Ben", "Cleo", "Dan"].map(Person::named).to_vec();

    let request = RosterRequest::new(persons, 7, Box::new(CalendarClassifier::new(start)))
        .with_preferences(PersonIndex::new(0), (0..5).map(DayIndex::new));

    let service = RosterService::new(SolverFactory::default_solver()?);
    println!("=== One week of on-call duty ({}) ===\n", service.solver_name());

    let roster = service.schedule(&request)?;
    for day in &roster.days {
        let names: Vec<String> = day
            .assignments
            .iter()
            .map(|a| format!("{} {}", a.shift, roster.people[a.person.get()].name))
            .collect();
        println!("Day {}: {}", day.day, names.join(", "));
    }

    println!("\nGranted requests: {:?}", roster.max_requests);
    for person in &roster.people {
        println!(
            "  {:<5} {} shifts, {} h ({:+} h vs target)",
            person.name, person.shifts, person.hours, person.hour_delta
        );
    }
    Ok(())
}
