//! Strategies for ordering the candidate values of a branching variable.

use crate::solver::domain::Domain;

/// Determines the order in which a variable's candidate values are tried.
pub trait ValueOrderingHeuristic {
    fn order_values(&self, domain: &Domain) -> Vec<i64>;
}

/// Tries values in increasing order.
pub struct AscendingValueHeuristic;

impl ValueOrderingHeuristic for AscendingValueHeuristic {
    fn order_values(&self, domain: &Domain) -> Vec<i64> {
        domain.iter().collect()
    }
}

/// Tries values in decreasing order. Pairs naturally with maximisation.
pub struct DescendingValueHeuristic;

impl ValueOrderingHeuristic for DescendingValueHeuristic {
    fn order_values(&self, domain: &Domain) -> Vec<i64> {
        let mut values: Vec<i64> = domain.iter().collect();
        values.reverse();
        values
    }
}
