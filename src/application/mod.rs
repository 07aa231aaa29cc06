// Application layer: roster use case and request mapping

pub mod mappers;
pub mod roster_service;

pub use mappers::{load_request, parse_request, MappedRequest, MappingError};
pub use roster_service::{CompiledRoster, RosterRequest, RosterService};
