// Domain layer: constraint model, solver contract and value objects
pub mod domain;

// Roster layer: variable universe, constraint generation and result reading
pub mod roster;

// Application layer: Use cases and request mapping
pub mod application;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Infrastructure layer: External concerns (CLI)
#[cfg(feature = "cli")]
pub mod infrastructure;

// Re-export commonly used types
pub use domain::{
    CpModel, DayCategory, LinearExpr, Literal, SealedModel, ShiftType, Solution, SolutionStatus,
    SolverBackend, SolverConfig, SolverError, SolverService, VarId,
};

pub use roster::{
    CalendarClassifier, DayClassifier, DayIndex, Person, PersonIndex, Roster, RosterConfig,
    RosterError,
};

pub use application::{RosterRequest, RosterService};

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
pub use solver::SolverFactory;
