//! Strategies for selecting which variable to branch on next.

use std::cell::RefCell;

use rand::seq::IteratorRandom;
use rand_core::RngCore;

use crate::solver::{store::DomainStore, variable::VariableId};

/// A variable-selection heuristic.
///
/// Implementors must return `Some` whenever the store holds at least one
/// unfixed variable; the search treats `None` as "nothing left to branch on".
pub trait VariableSelectionHeuristic {
    fn select_variable(&self, store: &DomainStore) -> Option<VariableId>;
}

/// Selects the unfixed variable with the lowest id.
///
/// A basic, deterministic baseline.
pub struct SelectFirstHeuristic;

impl VariableSelectionHeuristic for SelectFirstHeuristic {
    fn select_variable(&self, store: &DomainStore) -> Option<VariableId> {
        store.unfixed().map(|(var, _)| var).min()
    }
}

/// Selects the variable with the Minimum Remaining Values in its domain.
///
/// A "fail-first" strategy: branching on the most constrained variable keeps
/// the tree's branching factor small near the root. Ties go to the lower
/// variable id, keeping the search deterministic.
pub struct MinimumRemainingValuesHeuristic;

impl VariableSelectionHeuristic for MinimumRemainingValuesHeuristic {
    fn select_variable(&self, store: &DomainStore) -> Option<VariableId> {
        store
            .unfixed()
            .min_by_key(|(var, domain)| (domain.len(), *var))
            .map(|(var, _)| var)
    }
}

/// Selects an unfixed variable at random.
///
/// The generator is injected so runs can be reproduced from a seed.
pub struct RandomVariableHeuristic<R: RngCore> {
    rng: RefCell<R>,
}

impl<R: RngCore> RandomVariableHeuristic<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: RefCell::new(rng),
        }
    }
}

impl<R: RngCore> VariableSelectionHeuristic for RandomVariableHeuristic<R> {
    fn select_variable(&self, store: &DomainStore) -> Option<VariableId> {
        let mut rng = self.rng.borrow_mut();
        store.unfixed().map(|(var, _)| var).choose(&mut *rng)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{
        MinimumRemainingValuesHeuristic, RandomVariableHeuristic, SelectFirstHeuristic,
        VariableSelectionHeuristic,
    };
    use crate::solver::{domain::Domain, store::DomainStore};

    fn store(domains: &[(u32, Domain)]) -> DomainStore {
        DomainStore::new(domains.iter().cloned().collect())
    }

    #[test]
    fn mrv_prefers_the_smallest_domain_then_the_lowest_id() {
        let heuristic = MinimumRemainingValuesHeuristic;
        let store = store(&[
            (0, Domain::range(1, 4)),
            (1, Domain::range(1, 2)),
            (2, Domain::range(1, 2)),
            (3, Domain::singleton(1)),
        ]);
        assert_eq!(heuristic.select_variable(&store), Some(1));
    }

    #[test]
    fn select_first_ignores_domain_sizes() {
        let heuristic = SelectFirstHeuristic;
        let store = store(&[
            (0, Domain::range(1, 9)),
            (1, Domain::range(1, 2)),
            (2, Domain::singleton(5)),
        ]);
        assert_eq!(heuristic.select_variable(&store), Some(0));
    }

    #[test]
    fn heuristics_report_exhaustion_on_fully_fixed_stores() {
        let store = store(&[(0, Domain::singleton(1)), (1, Domain::singleton(2))]);
        assert_eq!(MinimumRemainingValuesHeuristic.select_variable(&store), None);
        assert_eq!(SelectFirstHeuristic.select_variable(&store), None);
    }

    #[test]
    fn seeded_random_selection_picks_an_unfixed_variable() {
        let heuristic = RandomVariableHeuristic::new(ChaCha8Rng::seed_from_u64(7));
        let store = store(&[
            (0, Domain::singleton(1)),
            (1, Domain::range(1, 2)),
            (2, Domain::range(1, 3)),
        ]);
        for _ in 0..10 {
            let picked = heuristic.select_variable(&store).unwrap();
            assert!(picked == 1 || picked == 2);
        }
    }
}
