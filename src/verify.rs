//! Polynomial verifiers over concrete solutions, and the cuts they emit.
//!
//! These are the two verifier families the lazy-cut driver is instantiated
//! with: one restores "the selected cells form a single region" after the
//! initial model dropped it, the other rejects selections whose diagonal
//! rings or field-spanning chains seal part of the unselected field off.
//! Each violation becomes one clause that holds in every valid solution but
//! fails under the assignment that exposed it.

use std::cmp::Reverse;
use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use ndarray::Array2;
use petgraph::unionfind::UnionFind;
use strum::VariantArray;
use varisat::Var;

use crate::location::Location;
use crate::model::{Assignment, ConstraintStore};
use crate::shape::SquareStep;

/// A maximal blob of like-valued cells found in one concrete solution,
/// together with the cells fencing it in.
///
/// Rebuilt from the solver's values on every driver iteration and discarded
/// once its cut is emitted; never part of the persistent model.
pub struct Component {
    /// Member cells, sorted.
    pub cells: Vec<Location>,
    /// Cells orthogonally adjacent to a member but not members themselves,
    /// sorted and deduplicated.
    pub boundary: Vec<Location>,
}

/// The 4-connected components of the `true` cells of `field`, each with its
/// boundary of `false` cells. Components arrive sorted by their first cell.
pub fn shaded_components(field: &Array2<bool>) -> Vec<Component> {
    let (rows, cols) = field.dim();
    let dims = (cols, rows);
    let flat = |location: Location| location.1 * cols + location.0;

    let mut sets: UnionFind<usize> = UnionFind::new(rows * cols);
    for ((row, col), &value) in field.indexed_iter() {
        if !value {
            continue;
        }
        let here = Location(col, row);
        for step in [SquareStep::Right, SquareStep::Down] {
            let there = step.attempt_from(here);
            if there.in_bounds(dims) && field[there.as_index()] {
                sets.union(flat(here), flat(there));
            }
        }
    }

    let mut by_representative: HashMap<usize, Component> = HashMap::new();
    for ((row, col), &value) in field.indexed_iter() {
        if !value {
            continue;
        }
        let here = Location(col, row);
        let component = by_representative.entry(sets.find(flat(here))).or_insert_with(|| Component {
            cells: Vec::new(),
            boundary: Vec::new(),
        });
        component.cells.push(here);
        for step in SquareStep::VARIANTS {
            let there = step.attempt_from(here);
            if there.in_bounds(dims) && !field[there.as_index()] {
                component.boundary.push(there);
            }
        }
    }

    let mut components = by_representative.into_values().collect_vec();
    for component in &mut components {
        component.cells.sort();
        component.boundary.sort();
        component.boundary.dedup();
    }
    components.sort_by_key(|component| component.cells[0]);
    components
}

/// Verifier and cut source for "the selected cells form one region".
///
/// Decodes `cells` under `assignment`, flood-fills the selected cells, and
/// appends one cut per component beyond the largest: the stray's first cell
/// and the main component's first cell cannot both stay selected unless
/// something on the stray's boundary joins them up. Any selected path between
/// the two must cross that boundary, so the clause holds in every connected
/// solution while the current one fails it.
///
/// Returns the number of cuts appended; zero means the assignment stands.
pub fn connected_region_cuts(
    store: &mut ConstraintStore,
    cells: &Array2<Var>,
    assignment: &Assignment,
) -> usize {
    let field = cells.map(|&var| assignment.value(var));
    let mut components = shaded_components(&field);
    if components.len() <= 1 {
        return 0;
    }

    components.sort_by_key(|component| (Reverse(component.cells.len()), component.cells[0]));
    let anchor = components[0].cells[0];
    let mut cuts = 0;
    for stray in &components[1..] {
        let mut clause = vec![
            cells[anchor.as_index()].negative(),
            cells[stray.cells[0].as_index()].negative(),
        ];
        clause.extend(stray.boundary.iter().map(|cell| cells[cell.as_index()].positive()));
        store.add_clause(&clause);
        cuts += 1;
    }
    debug!("region verifier: {cuts} stray component(s) cut");
    cuts
}

/// Verifier and cut source for "the selected cells leave the unselected field
/// in one piece".
///
/// A ring of selected cells closed under diagonal adjacency seals a pocket of
/// the field off, and a selected chain spanning the board splits it; both
/// surface here as more than one component among the unselected cells. Each
/// pocket beyond the largest gets one cut over its fence, the selected cells
/// it is walled in by: the pocket's first cell and the main field's first
/// cell cannot both stay unselected unless some fence cell opens. Any
/// unselected path out of the pocket must step onto the fence first, so the
/// clause holds in every unbroken solution while the current one fails it.
///
/// Returns the number of cuts appended; zero means the assignment stands.
pub fn unbroken_field_cuts(
    store: &mut ConstraintStore,
    cells: &Array2<Var>,
    assignment: &Assignment,
) -> usize {
    let field = cells.map(|&var| !assignment.value(var));
    let mut pockets = shaded_components(&field);
    if pockets.len() <= 1 {
        return 0;
    }

    pockets.sort_by_key(|pocket| (Reverse(pocket.cells.len()), pocket.cells[0]));
    let anchor = pockets[0].cells[0];
    let mut cuts = 0;
    for pocket in &pockets[1..] {
        let mut clause = vec![
            cells[anchor.as_index()].positive(),
            cells[pocket.cells[0].as_index()].positive(),
        ];
        clause.extend(pocket.boundary.iter().map(|cell| cells[cell.as_index()].negative()));
        store.add_clause(&clause);
        cuts += 1;
    }
    debug!("field verifier: {cuts} sealed pocket(s) cut");
    cuts
}
