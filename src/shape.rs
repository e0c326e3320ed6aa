//! Square-lattice stepping and the neighbor structure derived from it.
//!
//! The encoders in this crate are shape-agnostic; this module supplies the one
//! concrete shape every current caller uses.

use std::collections::HashMap;

use itertools::Itertools;
use strum::VariantArray;

use crate::location::Location;

/// A single orthogonal step between lattice cells.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Towards smaller `y`.
    Up,
    /// Towards larger `y`.
    Down,
    /// Towards smaller `x`.
    Left,
    /// Towards larger `x`.
    Right,
}

impl SquareStep {
    /// The location one step in this direction, which may land out of bounds.
    pub fn attempt_from(&self, location: Location) -> Location {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }
}

/// Every location of a `dims` `(width, height)` lattice, in row-major order.
pub fn grid_nodes(dims: (usize, usize)) -> Vec<Location> {
    (0..dims.1).cartesian_product(0..dims.0).map(|(y, x)| Location(x, y)).collect_vec()
}

/// The orthogonal neighbors of every location of a `dims` lattice.
pub fn grid_neighbors(dims: (usize, usize)) -> HashMap<Location, Vec<Location>> {
    grid_nodes(dims).into_iter()
        .map(|location| {
            let neighbors = SquareStep::VARIANTS.iter()
                .map(|step| step.attempt_from(location))
                .filter(|neighbor| neighbor.in_bounds(dims))
                .collect_vec();
            (location, neighbors)
        })
        .collect()
}

/// The undirected orthogonal edges of a `dims` lattice, each listed once.
pub fn grid_edges(dims: (usize, usize)) -> Vec<(Location, Location)> {
    let mut edges = Vec::with_capacity(2 * dims.0 * dims.1);
    for location in grid_nodes(dims) {
        // emit down and to the right only, so every edge appears once
        for step in [SquareStep::Right, SquareStep::Down] {
            let neighbor = step.attempt_from(location);
            if neighbor.in_bounds(dims) {
                edges.push((location, neighbor));
            }
        }
    }
    edges
}
