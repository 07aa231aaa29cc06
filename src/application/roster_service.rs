// Roster use case: inputs -> roster model -> constraints -> seal -> solve -> roster

use crate::domain::{CpModel, SealedModel, Solution, SolutionStatus, SolverConfig, SolverService};
use crate::roster::{
    ConstraintGenerator, DayClassifier, DayIndex, GeneratedModel, LeaveRecord, Person,
    PersonIndex, PreferenceRecord, Result, ResultReader, Roster, RosterConfig, RosterError,
    RosterModel,
};
use std::sync::Arc;

/// Everything needed to compile one roster model
pub struct RosterRequest {
    pub persons: Vec<Person>,
    pub num_days: usize,
    pub classifier: Box<dyn DayClassifier + Send + Sync>,
    pub leave: Vec<LeaveRecord>,
    pub preferences: Vec<PreferenceRecord>,
    pub config: RosterConfig,
}

impl RosterRequest {
    pub fn new(
        persons: Vec<Person>,
        num_days: usize,
        classifier: Box<dyn DayClassifier + Send + Sync>,
    ) -> Self {
        Self {
            persons,
            num_days,
            classifier,
            leave: Vec::new(),
            preferences: Vec::new(),
            config: RosterConfig::default(),
        }
    }

    pub fn with_leave(
        mut self,
        person: PersonIndex,
        days: impl IntoIterator<Item = DayIndex>,
    ) -> Self {
        self.leave
            .extend(days.into_iter().map(|day| LeaveRecord { person, day }));
        self
    }

    /// Off-duty requests of one person
    pub fn with_preferences(
        mut self,
        person: PersonIndex,
        days: impl IntoIterator<Item = DayIndex>,
    ) -> Self {
        self.preferences
            .extend(days.into_iter().map(|day| PreferenceRecord { person, day }));
        self
    }

    pub fn with_config(mut self, config: RosterConfig) -> Self {
        self.config = config;
        self
    }
}

/// A sealed model together with the handles needed to read its solution
pub struct CompiledRoster {
    pub roster: RosterModel,
    pub generated: GeneratedModel,
    pub model: SealedModel,
}

impl CompiledRoster {
    pub fn reader(&self) -> ResultReader<'_> {
        ResultReader::new(&self.roster, &self.generated)
    }
}

pub struct RosterService {
    solver: Arc<dyn SolverService>,
    solver_config: SolverConfig,
}

impl RosterService {
    pub fn new(solver: Arc<dyn SolverService>) -> Self {
        Self {
            solver,
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_config(mut self, solver_config: SolverConfig) -> Self {
        self.solver_config = solver_config;
        self
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Build and seal the model without solving it
    pub fn compile(request: &RosterRequest) -> Result<CompiledRoster> {
        let mut model = CpModel::new("roster");
        let roster = RosterModel::build(
            request.persons.clone(),
            request.num_days,
            request.classifier.as_ref(),
            &mut model,
        )?;
        let generated = ConstraintGenerator::new(&roster, &mut model, request.config)
            .generate(&request.leave, &request.preferences)?;

        Ok(CompiledRoster {
            roster,
            generated,
            model: model.seal(),
        })
    }

    pub fn schedule(&self, request: &RosterRequest) -> Result<Roster> {
        self.schedule_with_progress(request, &mut |_| {})
    }

    /// Solve and hand every incumbent roster the backend reports to `on_roster`
    pub fn schedule_with_progress(
        &self,
        request: &RosterRequest,
        on_roster: &mut dyn FnMut(&Roster),
    ) -> Result<Roster> {
        let compiled = Self::compile(request)?;
        log::info!(
            "solving roster for {} people over {} days with {} ({} variables, {} constraints)",
            compiled.roster.num_persons(),
            compiled.roster.num_days(),
            self.solver.name(),
            compiled.model.num_variables(),
            compiled.model.num_constraints()
        );

        let reader = compiled.reader();
        let solution = self.solver.solve_with_callback(
            &compiled.model,
            &self.solver_config,
            &mut |view| on_roster(&reader.read(view)),
        )?;
        log::info!("status: {} ({})", solution.status, solution.message);

        into_result(&reader, solution)
    }
}

fn into_result(reader: &ResultReader<'_>, solution: Solution) -> Result<Roster> {
    let read = |solution: &Solution| {
        let mut roster = reader.read(&solution.view());
        roster.objective_value = solution.objective_value;
        roster.statistics = solution.statistics.clone();
        roster
    };

    match solution.status {
        SolutionStatus::Optimal => Ok(read(&solution)),
        SolutionStatus::Infeasible => Err(RosterError::InfeasibleModel),
        SolutionStatus::Feasible => Err(RosterError::IndeterminateResult {
            status: solution.status,
            best: Some(Box::new(read(&solution))),
        }),
        SolutionStatus::Unknown => Err(RosterError::IndeterminateResult {
            status: solution.status,
            best: None,
        }),
    }
}
