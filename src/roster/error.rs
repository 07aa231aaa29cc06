use crate::domain::{SolutionStatus, SolverError};
use thiserror::Error;

use super::reader::Roster;

#[derive(Error, Debug)]
pub enum RosterError {
    /// Inputs rejected before any constraint is emitted
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No roster satisfies the hard constraints")]
    InfeasibleModel,

    /// The solver stopped without proving optimality; `best` holds the
    /// incumbent when one was found.
    #[error("Solver returned {status} without proving optimality")]
    IndeterminateResult {
        status: SolutionStatus,
        best: Option<Box<Roster>>,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, RosterError>;
