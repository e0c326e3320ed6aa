use std::ops::Index;

use itertools::Itertools;
use varisat::Lit;

pub(crate) fn exactly_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    let mut clauses = at_most_one(lits);
    // at least one holds; A + B + C + ...
    clauses.push(lits.to_vec());
    clauses
}

pub(crate) fn at_most_one(lits: &[Lit]) -> Vec<Vec<Lit>> {
    // no two hold together; (!A + !B) * (!A + !C) * ...
    lits.iter()
        .combinations(2)
        .map(|pair| vec![!**pair.index(0), !**pair.index(1)])
        .collect_vec()
}
