use log::debug;

use crate::model::{Assignment, ConstraintStore, SolveStatus};

/// Default iteration budget for [`run_lazy_cut_loop`].
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Terminal status of a lazy-cut run.
///
/// Every variant is distinct and none is ever coerced into another; in
/// particular [`MaxIterations`](CutLoopStatus::MaxIterations) is neither a
/// success nor a proof of infeasibility, only a report that the cutting
/// procedure did not converge within its budget.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CutLoopStatus {
    /// The verifier accepted a concrete solution.
    Feasible,
    /// The accumulated model admits no assignment.
    Infeasible,
    /// The backend failed before reaching an answer.
    Unknown,
    /// The iteration budget ran out before the verifier accepted.
    MaxIterations,
}

/// Outcome of [`run_lazy_cut_loop`].
pub struct CutLoopResult {
    /// Terminal status.
    pub status: CutLoopStatus,
    /// Solve iterations performed.
    pub iterations: usize,
    /// The verified assignment, present exactly when `status` is
    /// [`CutLoopStatus::Feasible`].
    pub assignment: Option<Assignment>,
}

/// Solve by iterated refinement, for invariants with no polynomial static
/// encoding.
///
/// `build_initial_model` populates a fresh store, typically leaving the
/// topological invariant out entirely. Each iteration then solves, hands the
/// concrete [`Assignment`] to `verify_and_cut`, and stops once the verifier
/// appends zero cuts. A cut must hold in every valid solution while failing
/// under the assignment that provoked it; the store only grows, so every cut
/// permanently narrows the feasible region and an accepted assignment is one
/// the verifier has actually passed.
///
/// Termination inside the budget is empirical, not proven; a run that
/// exhausts `max_iterations` reports exactly that.
pub fn run_lazy_cut_loop<B, V>(
    build_initial_model: B,
    mut verify_and_cut: V,
    max_iterations: usize,
) -> CutLoopResult
where
    B: FnOnce(&mut ConstraintStore),
    V: FnMut(&mut ConstraintStore, &Assignment) -> usize,
{
    let mut store = ConstraintStore::new();
    build_initial_model(&mut store);

    for iteration in 1..=max_iterations {
        match store.solve() {
            SolveStatus::Infeasible => {
                debug!("lazy cut: infeasible at iteration {iteration}");
                return CutLoopResult {
                    status: CutLoopStatus::Infeasible,
                    iterations: iteration,
                    assignment: None,
                };
            }
            SolveStatus::Unknown => {
                debug!("lazy cut: backend gave up at iteration {iteration}");
                return CutLoopResult {
                    status: CutLoopStatus::Unknown,
                    iterations: iteration,
                    assignment: None,
                };
            }
            SolveStatus::Feasible(assignment) => {
                let cuts = verify_and_cut(&mut store, &assignment);
                if cuts == 0 {
                    debug!("lazy cut: verified clean after {iteration} iteration(s)");
                    return CutLoopResult {
                        status: CutLoopStatus::Feasible,
                        iterations: iteration,
                        assignment: Some(assignment),
                    };
                }
                debug!("lazy cut: iteration {iteration} appended {cuts} cut(s)");
            }
        }
    }

    CutLoopResult {
        status: CutLoopStatus::MaxIterations,
        iterations: max_iterations,
        assignment: None,
    }
}
