use std::collections::HashMap;

use itertools::Itertools;
use log::trace;
use petgraph::graphmap::NodeTrait;
use varisat::Var;

use crate::edges::EdgeVars;
use crate::model::ConstraintStore;

/// Reduce a single-closed-tour requirement over `nodes` to the store's
/// circuit constraint, returning a fresh activity variable per node.
///
/// A feasible assignment selects edges forming exactly one simple cycle whose
/// vertices are exactly the nodes decoding as active, or selects no edge at
/// all with every node inactive. A node is active exactly when one of its
/// incident edges is selected.
///
/// Edges in `edges` with an endpoint outside `nodes` take no part in the tour
/// and are skipped; callers assembling graphs from partial grids rely on
/// that.
pub fn build_circuit<N: NodeTrait>(
    store: &mut ConstraintStore,
    nodes: &[N],
    edges: &EdgeVars<N>,
) -> HashMap<N, Var> {
    let index_of: HashMap<N, usize> = nodes.iter().enumerate().map(|(index, &node)| (node, index)).collect();
    let active = nodes.iter().map(|_| store.new_bool()).collect_vec();

    // a node off the tour takes its self-loop instead of a real arc
    let mut arcs = active.iter().enumerate()
        .map(|(index, var)| (index, index, var.negative()))
        .collect_vec();

    for (endpoints, &edge) in edges.iter() {
        let (Some(&u), Some(&v)) = (index_of.get(&endpoints.0), index_of.get(&endpoints.1)) else {
            continue;
        };
        let forward = store.new_bool();
        let backward = store.new_bool();
        for arc in [forward, backward] {
            // taking a direction selects the edge and puts both ends on the tour
            store.add_clause(&[arc.negative(), edge.positive()]);
            store.add_clause(&[arc.negative(), active[u].positive()]);
            store.add_clause(&[arc.negative(), active[v].positive()]);
        }
        // a selected edge is walked in exactly one direction
        store.add_clause(&[edge.negative(), forward.positive(), backward.positive()]);
        store.add_clause(&[forward.negative(), backward.negative()]);
        arcs.push((u, v, forward.positive()));
        arcs.push((v, u, backward.positive()));
    }

    store.add_circuit(nodes.len(), &arcs);
    trace!("tour reduction: {} nodes, {} candidate edges", nodes.len(), edges.len());

    nodes.iter().copied().zip(active).collect()
}
