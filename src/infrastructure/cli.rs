// Infrastructure: command-line front end
// Reads a JSON roster request, solves it and prints the roster

use crate::application::{load_request, RosterService};
use crate::domain::{SolverBackend, SolverConfig};
use crate::roster::{Roster, RosterError};
use crate::solver::SolverFactory;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fmt::{self, Write as _};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rosteropt")]
#[command(about = "Generate on-call duty rosters with a MIP solver")]
pub struct Cli {
    /// JSON roster request
    #[arg(value_name = "REQUEST")]
    pub request: PathBuf,

    /// Solver backend, overriding the request file
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Time limit in seconds
    #[arg(long, value_name = "SECONDS")]
    pub time_limit: Option<f64>,

    /// Solver worker threads (default: number of CPU cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Ignore off-duty requests
    #[arg(long)]
    pub no_preferences: bool,

    /// Debug logging and solver output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    Auto,
    Highs,
    CoinCbc,
}

impl From<BackendArg> for SolverBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => SolverBackend::Auto,
            BackendArg::Highs => SolverBackend::Highs,
            BackendArg::CoinCbc => SolverBackend::CoinCbc,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the file's solver settings
    pub fn solver_config(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if let Some(seconds) = self.time_limit {
            config.time_limit = Some(seconds);
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        config.verbose |= self.verbose;
        config
    }
}

/// Roster printed, solver proved optimality
pub const EXIT_OPTIMAL: u8 = 0;
/// No roster satisfies the hard constraints
pub const EXIT_INFEASIBLE: u8 = 1;
/// Best roster found before the solver stopped
pub const EXIT_BEST_FOUND: u8 = 2;
/// Solver stopped without any roster
pub const EXIT_NO_ROSTER: u8 = 3;

/// Run the CLI; returns the process exit code
pub fn run(cli: &Cli) -> Result<u8> {
    let mapped = load_request(&cli.request)
        .with_context(|| format!("cannot load roster request {}", cli.request.display()))?;
    let mut request = mapped.request;
    if cli.no_preferences {
        request.config.preferences = false;
    }
    let solver_config = cli.solver_config(mapped.solver);

    let solver = SolverFactory::create_solver(&solver_config)?;
    let service = RosterService::new(solver).with_config(solver_config);
    log::info!("using solver: {}", service.solver_name());

    let outcome = service.schedule(&request);
    let printable = match &outcome {
        Ok(roster) => Some(roster),
        Err(RosterError::IndeterminateResult {
            best: Some(best), ..
        }) => Some(best.as_ref()),
        Err(_) => None,
    };
    if let Some(roster) = printable {
        print!("{}", render(roster)?);
    }
    exit_code(outcome)
}

fn exit_code(outcome: std::result::Result<Roster, RosterError>) -> Result<u8> {
    match outcome {
        Ok(_) => Ok(EXIT_OPTIMAL),
        Err(RosterError::IndeterminateResult {
            status,
            best: Some(_),
        }) => {
            log::warn!("solver stopped with status {}; printed the best roster found", status);
            Ok(EXIT_BEST_FOUND)
        }
        Err(RosterError::IndeterminateResult { status, best: None }) => {
            eprintln!("Solver stopped with status {} before finding a roster", status);
            Ok(EXIT_NO_ROSTER)
        }
        Err(RosterError::InfeasibleModel) => {
            eprintln!("No roster satisfies the hard constraints");
            Ok(EXIT_INFEASIBLE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Roster table followed by per-person metrics
pub fn render(roster: &Roster) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    render_into(&mut out, roster)?;
    Ok(out)
}

fn render_into(out: &mut String, roster: &Roster) -> fmt::Result {
    writeln!(out, "{:<5} {:<18} Assignments", "Day", "Category")?;
    for day in &roster.days {
        let assignments = day
            .assignments
            .iter()
            .map(|a| format!("{}: {}", a.shift, name_of(roster, a.person.get())))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "{:<5} {:<18} {}",
            day.day.get(),
            format!("{:?}", day.category),
            assignments
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<16} {:>6} {:>6} {:>7} {:>8}",
        "Person", "Shifts", "Hours", "Delta", "Requests"
    )?;
    for person in &roster.people {
        writeln!(
            out,
            "{:<16} {:>6} {:>6} {:>+7} {:>8}",
            person.name, person.shifts, person.hours, person.hour_delta, person.satisfied_requests
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Shifts per person: {}..={}, target hours: {}",
        roster.load_bounds.min_per_person,
        roster.load_bounds.max_per_person,
        roster.hour_target.per_person
    )?;
    if let Some(max_requests) = roster.max_requests {
        writeln!(out, "Max requests: {}", max_requests)?;
    }
    writeln!(
        out,
        "Status: {} ({:.1} ms)",
        roster.status, roster.statistics.solve_time_ms
    )
}

fn name_of(roster: &Roster, person: usize) -> &str {
    roster
        .people
        .get(person)
        .map(|p| p.name.as_str())
        .unwrap_or("?")
}
