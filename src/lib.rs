#![warn(missing_docs)]

//! # `tourmaline`
//!
//! Boolean-constraint encodings of the topology rules shared by loop-drawing and region-shading grid puzzles.
//! Puzzle encoders own their cell and edge decision variables and their rule-specific constraints; this crate contributes the part that is actually hard to encode, the global shape of a solution:
//!
//! 1. "These edges must close into exactly one tour": [`build_circuit`] reduces the requirement to a circuit constraint over directed arcs, with per-node self-loops standing in for cells left off the tour, and hands back one activity variable per node.
//! 2. "These cells must form one connected blob": [`build_tree_connectivity`] embeds a spanning out-tree with strictly increasing ranks, while [`build_height_flow_connectivity`] propagates a strictly decreasing height from a canonical root; the two accept identical activations and [`ConnectivityStrategy`] switches between them.
//! 3. Invariants with no polynomial static encoding at all: [`run_lazy_cut_loop`] alternates solving with a polynomial verifier that inspects the concrete solution and appends a cut per violation, until a solution survives verification. The [`verify`] module carries the two verifier families used by the shading puzzles.
//!
//! Everything is registered into one [`ConstraintStore`], an append-only model over an incremental SAT backend; the store hands out concrete [`Assignment`]s to decode solutions from.
//! Node identifiers are any `Copy + Ord + Hash` type; the [`shape`] module supplies the square lattice every current caller uses.

pub use circuit::build_circuit;
pub use connectivity::{build_height_flow_connectivity, build_tree_connectivity, ConnectivityStrategy, ConnectivityVars};
pub use edges::EdgeVars;
pub use lazycut::{run_lazy_cut_loop, CutLoopResult, CutLoopStatus, DEFAULT_MAX_ITERATIONS};
pub use location::Location;
pub use model::{Assignment, ConstraintStore, IntVar, SolveStatus};

pub(crate) mod circuit;
pub(crate) mod connectivity;
pub(crate) mod edges;
pub(crate) mod lazycut;
pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod model;
pub mod shape;
pub mod verify;
