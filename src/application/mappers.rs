// Mappers: convert the JSON roster request into domain inputs
// Keeps serde representations out of the roster and domain layers

use super::roster_service::RosterRequest;
use crate::domain::SolverConfig;
use crate::roster::{CalendarClassifier, DayIndex, Person, PersonIndex, RosterConfig};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed roster request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown person '{0}'")]
    UnknownPerson(String),

    #[error("Person id '{0}' is listed more than once")]
    DuplicatePerson(String),
}

pub type Result<T> = std::result::Result<T, MappingError>;

/// A person given either as a bare name or as `{ "id", "name" }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersonDto {
    Name(String),
    Full { id: String, name: String },
}

/// A person referenced by position in `people` or by id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersonRef {
    Index(usize),
    Id(String),
}

#[derive(Debug, Deserialize)]
struct PersonDaysDto {
    person: PersonRef,
    days: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct RosterRequestDto {
    people: Vec<PersonDto>,
    start_date: NaiveDate,
    num_days: usize,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
    #[serde(default)]
    leave: Vec<PersonDaysDto>,
    #[serde(default)]
    preferences: Vec<PersonDaysDto>,
    #[serde(default)]
    solver: SolverConfig,
    #[serde(default)]
    roster: RosterConfig,
}

/// Domain inputs plus the solver settings read from the same file
pub struct MappedRequest {
    pub request: RosterRequest,
    pub solver: SolverConfig,
}

pub fn load_request(path: impl AsRef<Path>) -> Result<MappedRequest> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded roster request from {}", path.display());
    parse_request(&text)
}

pub fn parse_request(text: &str) -> Result<MappedRequest> {
    let dto: RosterRequestDto = serde_json::from_str(text)?;
    dto_to_domain_request(dto)
}

fn dto_to_domain_person(dto: PersonDto) -> Person {
    match dto {
        PersonDto::Name(name) => Person::named(name),
        PersonDto::Full { id, name } => Person::new(id, name),
    }
}

fn dto_to_domain_request(dto: RosterRequestDto) -> Result<MappedRequest> {
    let persons: Vec<Person> = dto.people.into_iter().map(dto_to_domain_person).collect();

    let mut ids = HashMap::with_capacity(persons.len());
    for (i, person) in persons.iter().enumerate() {
        if ids.insert(person.id.clone(), PersonIndex::new(i)).is_some() {
            return Err(MappingError::DuplicatePerson(person.id.clone()));
        }
    }
    let resolve = |person: PersonRef| match person {
        PersonRef::Index(i) => Ok(PersonIndex::new(i)),
        PersonRef::Id(id) => ids
            .get(&id)
            .copied()
            .ok_or(MappingError::UnknownPerson(id)),
    };

    let classifier = CalendarClassifier::new(dto.start_date).with_holidays(dto.holidays);
    let mut request = RosterRequest::new(persons, dto.num_days, Box::new(classifier))
        .with_config(dto.roster);

    for entry in dto.leave {
        let person = resolve(entry.person)?;
        request = request.with_leave(person, entry.days.into_iter().map(DayIndex::new));
    }
    for entry in dto.preferences {
        let person = resolve(entry.person)?;
        request = request.with_preferences(person, entry.days.into_iter().map(DayIndex::new));
    }

    Ok(MappedRequest {
        request,
        solver: dto.solver,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayCategory, SolverBackend};
    use std::io::Write;

    const REQUEST: &str = r#"{
        "people": ["Ada", {"id": "b", "name": "Ben"}],
        "start_date": "2024-07-01",
        "num_days": 31,
        "holidays": ["2024-07-04"],
        "leave": [{"person": 0, "days": [0, 1]}],
        "preferences": [{"person": "b", "days": [3]}],
        "solver": {"backend": "coin_cbc", "time_limit": 30.0},
        "roster": {"preferences": false}
    }"#;

    #[test]
    fn parses_a_full_request() {
        let mapped = parse_request(REQUEST).unwrap();
        let request = &mapped.request;

        assert_eq!(request.persons[0], Person::named("Ada"));
        assert_eq!(request.persons[1], Person::new("b", "Ben"));
        assert_eq!(request.num_days, 31);
        assert_eq!(request.leave.len(), 2);
        assert_eq!(request.preferences[0].person, PersonIndex::new(1));
        assert_eq!(request.preferences[0].day, DayIndex::new(3));
        assert!(!request.config.preferences);
        assert!(request.config.leave);
        assert_eq!(mapped.solver.backend, SolverBackend::CoinCbc);
        assert_eq!(mapped.solver.time_limit, Some(30.0));
        assert_eq!(
            request.classifier.classify(DayIndex::new(3)),
            DayCategory::WeekendOrHoliday
        );
    }

    #[test]
    fn optional_sections_default() {
        let mapped =
            parse_request(r#"{"people": ["Ada"], "start_date": "2024-02-01", "num_days": 7}"#)
                .unwrap();
        assert!(mapped.request.leave.is_empty());
        assert_eq!(mapped.request.config, RosterConfig::default());
        assert_eq!(mapped.solver.backend, SolverBackend::Auto);
    }

    #[test]
    fn unknown_person_id_is_rejected() {
        let err = parse_request(
            r#"{"people": ["Ada"], "start_date": "2024-07-01", "num_days": 7,
                "leave": [{"person": "Zed", "days": [1]}]}"#,
        )
        .err()
        .unwrap();
        assert!(matches!(err, MappingError::UnknownPerson(id) if id == "Zed"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = parse_request(r#"{"people": ["Ada", "Ada"], "start_date": "2024-07-01", "num_days": 7}"#)
            .err()
            .unwrap();
        assert!(matches!(err, MappingError::DuplicatePerson(_)));
    }

    #[test]
    fn invalid_date_is_a_json_error() {
        let err = parse_request(r#"{"people": ["Ada"], "start_date": "2024-02-30", "num_days": 7}"#)
            .err()
            .unwrap();
        assert!(matches!(err, MappingError::Json(_)));
    }

    #[test]
    fn loads_request_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REQUEST.as_bytes()).unwrap();

        let mapped = load_request(file.path()).unwrap();
        assert_eq!(mapped.request.persons.len(), 2);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_request(&path).err().unwrap();
        assert!(matches!(err, MappingError::Io { path: p, .. } if p == path));
    }
}
