//! CalculateIndividualHandler - priorities and consistency for one matrix.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ahp::{
    ComparisonMatrix, GapPolicy, PairwiseJudgment, PriorityMethod, PriorityResult, PrioritySolver,
};
use crate::domain::foundation::DomainError;
use crate::ports::{MatrixFingerprint, PriorityCache};

/// How the matrix entries are supplied.
#[derive(Debug, Clone)]
pub enum MatrixInput {
    /// One judgment per pair; reciprocals are implied.
    Judgments(Vec<PairwiseJudgment>),
    /// Full grid rows aligned with the element list; `None` is unanswered.
    Rows(Vec<Vec<Option<f64>>>),
}

/// Command to solve one comparison matrix.
#[derive(Debug, Clone)]
pub struct CalculateIndividualCommand {
    pub elements: Vec<String>,
    pub matrix: MatrixInput,
    /// Falls back to the configured default.
    pub method: Option<PriorityMethod>,
    /// Estimate unanswered pairs transitively instead of refusing.
    pub fill_gaps: bool,
}

/// Handler for single-matrix priority calculation.
///
/// Results are memoized by matrix content, so re-solving unchanged
/// judgments costs a lookup.
pub struct CalculateIndividualHandler {
    solver: PrioritySolver,
    default_method: PriorityMethod,
    cache: Arc<dyn PriorityCache>,
}

impl CalculateIndividualHandler {
    pub fn new(
        solver: PrioritySolver,
        default_method: PriorityMethod,
        cache: Arc<dyn PriorityCache>,
    ) -> Self {
        Self {
            solver,
            default_method,
            cache,
        }
    }

    pub fn solver(&self) -> &PrioritySolver {
        &self.solver
    }

    pub fn default_method(&self) -> PriorityMethod {
        self.default_method
    }

    pub fn handle(&self, cmd: CalculateIndividualCommand) -> Result<PriorityResult, DomainError> {
        let matrix = match &cmd.matrix {
            MatrixInput::Judgments(judgments) => ComparisonMatrix::build(&cmd.elements, judgments)?,
            MatrixInput::Rows(rows) => ComparisonMatrix::from_rows(&cmd.elements, rows)?,
        };
        let method = cmd.method.unwrap_or(self.default_method);
        self.solve_matrix(&matrix, method, cmd.fill_gaps)
    }

    /// Solves an already built matrix through the cache.
    pub fn solve_matrix(
        &self,
        matrix: &ComparisonMatrix,
        method: PriorityMethod,
        fill_gaps: bool,
    ) -> Result<PriorityResult, DomainError> {
        let solver = self.solver_for(fill_gaps);
        let key = MatrixFingerprint::compute(matrix, method, &solver);
        let result = self
            .cache
            .get_or_compute(&key, &|| solver.solve(matrix, method))?;

        debug!(
            elements = result.element_ids.len(),
            method = ?result.method,
            consistency_ratio = result.consistency_ratio,
            acceptable = result.is_consistent(),
            "priorities calculated"
        );
        Ok(result)
    }

    /// Solver honoring an explicit gap-filling request.
    pub fn solver_for(&self, fill_gaps: bool) -> PrioritySolver {
        if fill_gaps {
            self.solver.clone().with_gap_policy(GapPolicy::TransitiveEstimate)
        } else {
            self.solver.clone()
        }
    }
}
