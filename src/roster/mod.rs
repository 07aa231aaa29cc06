// Roster layer: variable universe, constraint generation and result reading

pub mod calendar;
pub mod error;
pub mod generator;
pub mod index;
pub mod reader;
pub mod records;
pub mod table;

pub use calendar::{AllWeekdays, CalendarClassifier, DayClassifier};
pub use error::{Result, RosterError};
pub use generator::{
    ConstraintGenerator, GeneratedModel, GenerationSummary, HourTarget, LoadBounds, RosterConfig,
};
pub use index::{DayIndex, PersonIndex};
pub use reader::{Assignment, DayRoster, PersonSummary, ResultReader, Roster};
pub use records::{LeaveRecord, Person, PreferenceRecord};
pub use table::{RosterModel, ShiftCell};
