use std::collections::HashMap;

use petgraph::graphmap::{NodeTrait, UnGraphMap};
use unordered_pair::UnorderedPair;
use varisat::Var;

use crate::model::ConstraintStore;

/// The per-edge decision variables of an encoding, keyed by unordered
/// endpoint pair: `{a, b}` and `{b, a}` name the same variable.
///
/// Owned by the calling encoder; the topology encoders borrow it read-only.
pub struct EdgeVars<N: NodeTrait> {
    vars: HashMap<UnorderedPair<N>, Var>,
}

impl<N: NodeTrait> EdgeVars<N> {
    /// An empty store.
    pub fn new() -> Self {
        Self { vars: HashMap::new() }
    }

    /// One decision variable per edge of `graph`.
    pub fn from_graph<E>(store: &mut ConstraintStore, graph: &UnGraphMap<N, E>) -> Self {
        let mut edges = Self::new();
        for (a, b, _) in graph.all_edges() {
            edges.add(store, a, b);
        }
        edges
    }

    /// The variable for edge `{a, b}`, created on first sight.
    pub fn add(&mut self, store: &mut ConstraintStore, a: N, b: N) -> Var {
        *self.vars.entry(UnorderedPair(a, b)).or_insert_with(|| store.new_bool())
    }

    /// The variable for edge `{a, b}`, if one exists.
    pub fn var(&self, a: N, b: N) -> Option<Var> {
        self.vars.get(&UnorderedPair(a, b)).copied()
    }

    /// Every known edge with its variable, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&UnorderedPair<N>, &Var)> {
        self.vars.iter()
    }

    /// The number of known edges.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no edges are known.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<N: NodeTrait> Default for EdgeVars<N> {
    fn default() -> Self {
        Self::new()
    }
}
