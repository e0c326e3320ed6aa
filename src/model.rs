use itertools::Itertools;
use log::trace;
use varisat::{ExtendFormula, Lit, Solver, Var};

use crate::logic::{at_most_one, exactly_one};

/// The persistent constraint model behind every encoding in this crate.
///
/// A store wraps an incremental SAT backend and only ever grows: variables and
/// clauses are appended across [`solve`](ConstraintStore::solve) calls and
/// never removed, so repeated re-solves see a monotonically shrinking feasible
/// region. One store serves one solve; nothing is shared between independent
/// solves.
///
/// On top of raw clauses the store offers the primitives the topology encoders
/// consume: conditionally enforced clauses, bounded integers in order
/// encoding, element-wise maximum, and a circuit constraint over directed
/// arcs.
pub struct ConstraintStore {
    solver: Solver<'static>,
    num_vars: usize,
    num_clauses: usize,
    truth: Var,
}

/// Terminal status of a single backend solve. No variant is ever coerced into
/// another; callers distinguishing "no solution exists" from "the backend gave
/// up" rely on that.
pub enum SolveStatus {
    /// A satisfying assignment was found.
    Feasible(Assignment),
    /// The accumulated constraints admit no assignment.
    Infeasible,
    /// The backend failed before reaching an answer.
    Unknown,
}

impl ConstraintStore {
    /// A fresh store holding only the pinned constant variable.
    pub fn new() -> Self {
        let mut solver = Solver::new();
        let truth = Var::from_index(0);
        solver.add_clause(&[truth.positive()]);
        Self {
            solver,
            num_vars: 1,
            num_clauses: 1,
            truth,
        }
    }

    /// A literal that always holds.
    pub fn lit_true(&self) -> Lit {
        self.truth.positive()
    }

    /// A literal that never holds.
    pub fn lit_false(&self) -> Lit {
        self.truth.negative()
    }

    /// A fresh boolean decision variable.
    pub fn new_bool(&mut self) -> Var {
        let var = Var::from_index(self.num_vars);
        self.num_vars += 1;
        var
    }

    /// The number of variables created so far.
    pub fn var_count(&self) -> usize {
        self.num_vars
    }

    /// The number of clauses appended so far. Never decreases.
    pub fn clause_count(&self) -> usize {
        self.num_clauses
    }

    /// Append a clause: at least one of `lits` holds.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.solver.add_clause(lits);
        self.num_clauses += 1;
    }

    /// Append a clause enforced only when every literal in `conditions` holds.
    ///
    /// Constant literals are folded away: a condition that never holds drops
    /// the clause entirely, a clause member that always holds makes it
    /// vacuous.
    pub fn add_clause_if(&mut self, conditions: &[Lit], clause: &[Lit]) {
        let mut lits = Vec::with_capacity(conditions.len() + clause.len());
        for &condition in conditions {
            if condition == self.lit_true() {
                continue;
            }
            if condition == self.lit_false() {
                return;
            }
            lits.push(!condition);
        }
        for &lit in clause {
            if lit == self.lit_true() {
                return;
            }
            if lit == self.lit_false() {
                continue;
            }
            lits.push(lit);
        }
        self.add_clause(&lits);
    }

    /// Append clauses asserting exactly one of `lits` holds.
    pub fn add_exactly_one(&mut self, lits: &[Lit]) {
        for clause in exactly_one(lits) {
            self.add_clause(&clause);
        }
    }

    /// Append clauses asserting at most one of `lits` holds.
    pub fn add_at_most_one(&mut self, lits: &[Lit]) {
        for clause in at_most_one(lits) {
            self.add_clause(&clause);
        }
    }

    /// A fresh bounded integer over `lb..=ub` in order encoding: one literal
    /// per threshold `value <= c`, chained so the thresholds are monotone.
    pub fn new_int(&mut self, lb: i32, ub: i32) -> IntVar {
        assert!(lb <= ub, "empty integer domain {lb}..={ub}");
        let thresholds = (lb..ub).map(|_| self.new_bool()).collect_vec();
        for pair in thresholds.windows(2) {
            // (value <= c) implies (value <= c + 1)
            self.add_clause(&[pair[0].negative(), pair[1].positive()]);
        }
        IntVar { lb, ub, thresholds }
    }

    /// The literal for `x <= c`, constant outside the domain.
    pub fn int_le_lit(&self, x: &IntVar, c: i32) -> Lit {
        if c < x.lb {
            self.lit_false()
        } else if c >= x.ub {
            self.lit_true()
        } else {
            x.thresholds[(c - x.lb) as usize].positive()
        }
    }

    /// Enforce `x <= c` whenever every literal in `under` holds.
    pub fn int_le(&mut self, x: &IntVar, c: i32, under: &[Lit]) {
        let le = self.int_le_lit(x, c);
        self.add_clause_if(under, &[le]);
    }

    /// Enforce `x >= c` whenever every literal in `under` holds.
    pub fn int_ge(&mut self, x: &IntVar, c: i32, under: &[Lit]) {
        let lt = self.int_le_lit(x, c - 1);
        self.add_clause_if(under, &[!lt]);
    }

    /// Enforce `x == c` whenever every literal in `under` holds.
    pub fn int_eq(&mut self, x: &IntVar, c: i32, under: &[Lit]) {
        self.int_le(x, c, under);
        self.int_ge(x, c, under);
    }

    /// Enforce `x == y + 1` whenever every literal in `under` holds.
    pub fn int_succ(&mut self, x: &IntVar, y: &IntVar, under: &[Lit]) {
        let lo = x.lb.min(y.lb + 1) - 1;
        let hi = x.ub.max(y.ub + 1);
        for c in lo..=hi {
            // x <= c exactly when y <= c - 1
            let x_le = self.int_le_lit(x, c);
            let y_le = self.int_le_lit(y, c - 1);
            self.add_clause_if(under, &[!x_le, y_le]);
            self.add_clause_if(under, &[x_le, !y_le]);
        }
    }

    /// Enforce `x >= y + 1` whenever every literal in `under` holds.
    pub fn int_gt(&mut self, x: &IntVar, y: &IntVar, under: &[Lit]) {
        for c in y.lb..=y.ub {
            // (y >= c) implies (x >= c + 1)
            let y_lt = self.int_le_lit(y, c - 1);
            let x_le = self.int_le_lit(x, c);
            self.add_clause_if(under, &[y_lt, !x_le]);
        }
    }

    /// A fresh integer constrained to the element-wise maximum of `xs`.
    pub fn int_max(&mut self, xs: &[IntVar]) -> IntVar {
        assert!(!xs.is_empty(), "maximum of no variables");
        let lb = xs.iter().map(|x| x.lb).max().unwrap();
        let ub = xs.iter().map(|x| x.ub).max().unwrap();
        let max = self.new_int(lb, ub);
        for c in (lb - 1)..=ub {
            let max_le = self.int_le_lit(&max, c);
            // the maximum is <= c exactly when every operand is
            for x in xs {
                let x_le = self.int_le_lit(x, c);
                self.add_clause_if(&[], &[!max_le, x_le]);
            }
            let mut clause = xs.iter().map(|x| !self.int_le_lit(x, c)).collect_vec();
            clause.push(max_le);
            self.add_clause_if(&[], &clause);
        }
        max
    }

    /// Constrain the arcs to form exactly one cycle.
    ///
    /// Every node in `0..node_count` takes exactly one outgoing and one
    /// incoming arc; a self-loop arc stands for a node excluded from the
    /// cycle. Among non-self-loop arcs at most one closed walk can exist: the
    /// first node in index order carrying a real arc is the anchor every
    /// surviving cycle must pass through, enforced by a visiting order that
    /// strictly increases along selected arcs except into the anchor.
    ///
    /// Arcs naming a node outside `0..node_count` are ignored. A node with no
    /// arcs at all makes the constraint unsatisfiable, matching the usual
    /// circuit-constraint contract.
    pub fn add_circuit(&mut self, node_count: usize, arcs: &[(usize, usize, Lit)]) {
        if node_count == 0 {
            return;
        }

        let mut outgoing = vec![Vec::new(); node_count];
        let mut incoming = vec![Vec::new(); node_count];
        let mut real_outgoing: Vec<Vec<Lit>> = vec![Vec::new(); node_count];
        for &(from, to, lit) in arcs {
            if from >= node_count || to >= node_count {
                continue;
            }
            outgoing[from].push(lit);
            incoming[to].push(lit);
            if from != to {
                real_outgoing[from].push(lit);
            }
        }

        for node in 0..node_count {
            self.add_exactly_one(&outgoing[node]);
            self.add_exactly_one(&incoming[node]);
        }

        // on_cycle[n] <=> some real outgoing arc of n is selected
        let mut on_cycle = Vec::with_capacity(node_count);
        for lits in &real_outgoing {
            if lits.is_empty() {
                on_cycle.push(self.lit_false());
                continue;
            }
            let var = self.new_bool();
            let mut clause = vec![var.negative()];
            clause.extend_from_slice(lits);
            self.add_clause(&clause);
            for &lit in lits {
                self.add_clause(&[!lit, var.positive()]);
            }
            on_cycle.push(var.positive());
        }

        // the anchor is the first node in index order with a real arc out;
        // prefix_idle[n] tracks "every earlier node has none"
        let mut anchor = Vec::with_capacity(node_count);
        let mut prefix_idle = self.lit_true();
        for node in 0..node_count {
            let is_anchor = self.new_bool();
            self.add_clause_if(&[is_anchor.positive()], &[on_cycle[node]]);
            self.add_clause_if(&[is_anchor.positive()], &[prefix_idle]);
            self.add_clause_if(&[on_cycle[node], prefix_idle], &[is_anchor.positive()]);
            anchor.push(is_anchor);
            if node + 1 < node_count {
                let next = self.new_bool();
                self.add_clause_if(&[next.positive()], &[prefix_idle]);
                self.add_clause_if(&[next.positive()], &[!on_cycle[node]]);
                self.add_clause_if(&[prefix_idle, !on_cycle[node]], &[next.positive()]);
                prefix_idle = next.positive();
            }
        }

        // a cycle avoiding the anchor would need its visiting order to
        // increase all the way around, so it cannot close
        let order = (0..node_count).map(|_| self.new_int(0, node_count as i32 - 1)).collect_vec();
        for &(from, to, lit) in arcs {
            if from >= node_count || to >= node_count || from == to {
                continue;
            }
            self.int_gt(&order[to], &order[from], &[lit, anchor[to].negative()]);
        }

        trace!(
            "circuit over {} nodes and {} arcs: {} vars, {} clauses so far",
            node_count,
            arcs.len(),
            self.num_vars,
            self.num_clauses,
        );
    }

    /// Run the backend over everything appended so far.
    ///
    /// May be called repeatedly; constraints appended between calls narrow the
    /// model incrementally.
    pub fn solve(&mut self) -> SolveStatus {
        trace!("solving over {} vars, {} clauses", self.num_vars, self.num_clauses);
        match self.solver.solve() {
            Err(_) => SolveStatus::Unknown,
            Ok(false) => SolveStatus::Infeasible,
            Ok(true) => {
                let mut values = vec![false; self.num_vars];
                for lit in self.solver.model().unwrap() {
                    if lit.var().index() < self.num_vars {
                        values[lit.var().index()] = lit.is_positive();
                    }
                }
                SolveStatus::Feasible(Assignment { values })
            }
        }
    }
}

impl Default for ConstraintStore {
    fn default() -> Self {
        Self::new()
    }
}

/// A bounded integer variable in order encoding.
///
/// Holds one backend literal per threshold `value <= c`; arithmetic over it
/// goes through the [`ConstraintStore`] methods, decoding through
/// [`Assignment::int_value`].
#[derive(Clone, Debug)]
pub struct IntVar {
    lb: i32,
    ub: i32,
    // thresholds[k] <=> (value <= lb + k); (value <= ub) is implicit truth
    thresholds: Vec<Var>,
}

impl IntVar {
    /// The inclusive lower bound of the domain.
    pub fn lb(&self) -> i32 {
        self.lb
    }

    /// The inclusive upper bound of the domain.
    pub fn ub(&self) -> i32 {
        self.ub
    }
}

/// A concrete value per variable, cloned out of the backend after a feasible
/// solve.
#[derive(Clone, Debug)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// The value of a boolean variable. Variables the backend never saw
    /// decode as `false`.
    pub fn value(&self, var: Var) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Whether a literal holds under this assignment.
    pub fn lit_value(&self, lit: Lit) -> bool {
        self.value(lit.var()) == lit.is_positive()
    }

    /// The value of an order-encoded integer: the smallest threshold that
    /// holds, or the upper bound when none does.
    pub fn int_value(&self, x: &IntVar) -> i32 {
        x.thresholds.iter()
            .position(|threshold| self.value(*threshold))
            .map(|offset| x.lb + offset as i32)
            .unwrap_or(x.ub)
    }
}
