//! Two interchangeable encodings of "the active nodes form one connected
//! blob", for rules a tour reduction cannot express.
//!
//! Both accept exactly the activations whose active-induced subgraph is
//! connected, the empty activation included. They differ in auxiliary shape:
//! the spanning-tree encoding selects an explicit parent edge per active node
//! under a solver-chosen root, the height-flow encoding propagates a
//! decreasing height from a canonical root and needs no per-edge selection.

use std::collections::HashMap;

use itertools::Itertools;
use log::trace;
use petgraph::graphmap::NodeTrait;
use varisat::Var;

use crate::model::{ConstraintStore, IntVar};

/// Derived variables proving an activation connected.
///
/// `order` holds the encoding's per-node certificate integer (tree rank or
/// flow height) and `is_root` its root indicator. Neither carries meaning
/// outside the encoding that created it; they exist to be decoded in tests
/// and diagnostics, not to hang further puzzle rules on.
pub struct ConnectivityVars<N: NodeTrait> {
    /// Certificate integer per node.
    pub order: HashMap<N, IntVar>,
    /// Root indicator per node.
    pub is_root: HashMap<N, Var>,
}

impl<N: NodeTrait> ConnectivityVars<N> {
    fn empty() -> Self {
        Self {
            order: HashMap::new(),
            is_root: HashMap::new(),
        }
    }
}

/// Which connectivity encoding to apply.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConnectivityStrategy {
    /// Spanning out-tree: solver-chosen root, explicit parent selection.
    SpanningTree,
    /// Monotone height flow from the lexicographically-first active node.
    HeightFlow,
}

impl ConnectivityStrategy {
    /// Apply the chosen encoding. The two are drop-in replacements.
    pub fn encode<N: NodeTrait>(
        &self,
        store: &mut ConstraintStore,
        active: &HashMap<N, Var>,
        neighbors: &HashMap<N, Vec<N>>,
    ) -> ConnectivityVars<N> {
        match self {
            Self::SpanningTree => build_tree_connectivity(store, active, neighbors),
            Self::HeightFlow => build_height_flow_connectivity(store, active, neighbors),
        }
    }
}

/// Constrain the active nodes to one connected component by embedding a
/// spanning out-tree.
///
/// Every active non-root node selects exactly one active neighbor as parent
/// and sits one rank below it; ranks strictly increase away from the single
/// rank-0 root, so parent links cannot cycle and every active node owns a
/// parent path to the root. Neighbors absent from `active` are skipped.
pub fn build_tree_connectivity<N: NodeTrait>(
    store: &mut ConstraintStore,
    active: &HashMap<N, Var>,
    neighbors: &HashMap<N, Vec<N>>,
) -> ConnectivityVars<N> {
    let nodes = active.keys().copied().sorted().collect_vec();
    let count = nodes.len();
    if count == 0 {
        return ConnectivityVars::empty();
    }

    let rank: HashMap<N, IntVar> = nodes.iter()
        .map(|&node| (node, store.new_int(0, count as i32 - 1)))
        .collect();
    let is_root: HashMap<N, Var> = nodes.iter().map(|&node| (node, store.new_bool())).collect();

    // a lone shared root; if anything is active, the rank chain below forces
    // one to exist, while the empty activation stays feasible
    store.add_at_most_one(&nodes.iter().map(|node| is_root[node].positive()).collect_vec());

    for &node in &nodes {
        let act = active[&node];
        let root = is_root[&node];
        store.add_clause(&[root.negative(), act.positive()]);
        store.int_eq(&rank[&node], 0, &[root.positive()]);
        store.int_eq(&rank[&node], 0, &[act.negative()]);
        store.int_ge(&rank[&node], 1, &[act.positive(), root.negative()]);

        let mut parent_lits = Vec::new();
        for &other in neighbors.get(&node).map(Vec::as_slice).unwrap_or(&[]) {
            let Some(&other_act) = active.get(&other) else {
                continue;
            };
            let link = store.new_bool();
            store.add_clause(&[link.negative(), act.positive()]);
            store.add_clause(&[link.negative(), other_act.positive()]);
            store.add_clause(&[link.negative(), root.negative()]);
            // hanging below `other` pins this node one rank deeper
            store.int_succ(&rank[&node], &rank[&other], &[link.positive()]);
            parent_lits.push(link.positive());
        }
        store.add_at_most_one(&parent_lits);

        // active non-roots hang somewhere
        let mut clause = vec![act.negative(), root.positive()];
        clause.extend_from_slice(&parent_lits);
        store.add_clause(&clause);
    }

    trace!("spanning-tree connectivity over {count} nodes");
    ConnectivityVars { order: rank, is_root }
}

/// Constrain the active nodes to one connected component by propagating a
/// strictly decreasing height from a canonical root.
///
/// Nodes are taken in their `Ord` order; the root is pinned to the first
/// active one, which removes every root-choice symmetry from the search. The
/// root's height is the node count, every other active node sits exactly one
/// below its tallest neighbor, and every active node must keep a positive
/// height, which only a strictly descending chain from the root can deliver.
/// The node order here is the same order a decoder iterating sorted nodes
/// sees; that agreement is load-bearing.
///
/// With one node or none there is nothing to prove and no variables are
/// created.
pub fn build_height_flow_connectivity<N: NodeTrait>(
    store: &mut ConstraintStore,
    active: &HashMap<N, Var>,
    neighbors: &HashMap<N, Vec<N>>,
) -> ConnectivityVars<N> {
    let nodes = active.keys().copied().sorted().collect_vec();
    let count = nodes.len();
    if count <= 1 {
        return ConnectivityVars::empty();
    }
    let ceiling = count as i32;

    let height: HashMap<N, IntVar> = nodes.iter()
        .map(|&node| (node, store.new_int(0, ceiling)))
        .collect();

    // prefix_idle tracks "every earlier node is inactive"; the root is the
    // first node where that still holds and the node itself is active
    let mut is_root = HashMap::with_capacity(count);
    let mut prefix_idle = store.lit_true();
    for (position, &node) in nodes.iter().enumerate() {
        let act = active[&node];
        let root = store.new_bool();
        store.add_clause_if(&[root.positive()], &[act.positive()]);
        store.add_clause_if(&[root.positive()], &[prefix_idle]);
        store.add_clause_if(&[act.positive(), prefix_idle], &[root.positive()]);
        is_root.insert(node, root);
        if position + 1 < count {
            let next = store.new_bool();
            store.add_clause_if(&[next.positive()], &[prefix_idle]);
            store.add_clause_if(&[next.positive()], &[act.negative()]);
            store.add_clause_if(&[prefix_idle, act.negative()], &[next.positive()]);
            prefix_idle = next.positive();
        }
    }

    for &node in &nodes {
        let act = active[&node];
        let root = is_root[&node];
        store.int_eq(&height[&node], 0, &[act.negative()]);
        store.int_eq(&height[&node], ceiling, &[root.positive()]);
        store.int_ge(&height[&node], 1, &[act.positive()]);

        let neighbor_heights = neighbors.get(&node).map(Vec::as_slice).unwrap_or(&[]).iter()
            .filter(|other| active.contains_key(*other))
            .map(|other| height[other].clone())
            .collect_vec();
        if neighbor_heights.is_empty() {
            // nothing can flow in; active means root here
            store.add_clause(&[act.negative(), root.positive()]);
            continue;
        }
        let tallest = store.int_max(&neighbor_heights);
        // one below the tallest neighbor, unless this is the root itself
        store.int_succ(&tallest, &height[&node], &[act.positive(), root.negative()]);
    }

    trace!("height-flow connectivity over {count} nodes");
    ConnectivityVars { order: height, is_root }
}
