use im::HashMap;

use crate::solver::{domain::Domain, solution::Solution, variable::VariableId};

pub type Domains = HashMap<VariableId, Domain>;

/// One state in the search space: the current domain of every variable.
///
/// The store is persistent. [`DomainStore::update`] produces a new store
/// sharing structure with the old one, so the search keeps whole-store
/// snapshots on its decision stack and restores them on backtrack instead of
/// replaying an undo log.
#[derive(Debug, Clone)]
pub struct DomainStore {
    domains: Domains,
}

impl DomainStore {
    pub fn new(domains: Domains) -> Self {
        Self { domains }
    }

    /// The current domain of `var`.
    ///
    /// # Panics
    ///
    /// Panics for variables that are not part of the model; constraint scopes
    /// are validated against the model before a search ever runs.
    pub fn domain(&self, var: VariableId) -> &Domain {
        self.domains
            .get(&var)
            .unwrap_or_else(|| panic!("unknown variable ?{var}"))
    }

    pub fn update(&self, var: VariableId, domain: Domain) -> Self {
        Self {
            domains: self.domains.update(var, domain),
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// `true` iff every variable's domain is a singleton.
    pub fn is_complete(&self) -> bool {
        self.domains.values().all(Domain::is_fixed)
    }

    pub fn has_empty_domain(&self) -> bool {
        self.domains.values().any(Domain::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &Domain)> + '_ {
        self.domains.iter().map(|(var, domain)| (*var, domain))
    }

    /// The variables that still have more than one candidate value.
    pub fn unfixed(&self) -> impl Iterator<Item = (VariableId, &Domain)> + '_ {
        self.iter().filter(|(_, domain)| domain.len() > 1)
    }

    /// Snapshot of all fixed values.
    pub fn to_solution(&self) -> Solution {
        Solution::new(
            self.domains
                .iter()
                .filter_map(|(var, domain)| domain.value().map(|value| (*var, value)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::DomainStore;
    use crate::solver::domain::Domain;

    #[test]
    fn update_leaves_the_original_store_intact() {
        let store = DomainStore::new(im::hashmap! {
            0 => Domain::range(1, 3),
            1 => Domain::singleton(2),
        });
        let narrowed = store.update(0, Domain::singleton(1));

        assert_eq!(store.domain(0).len(), 3);
        assert_eq!(narrowed.domain(0).value(), Some(1));
        assert!(!store.is_complete());
        assert!(narrowed.is_complete());
    }

    #[test]
    fn unfixed_skips_singletons_and_empties() {
        let store = DomainStore::new(im::hashmap! {
            0 => Domain::range(1, 3),
            1 => Domain::singleton(2),
            2 => Domain::empty(),
        });
        let unfixed: Vec<_> = store.unfixed().map(|(var, _)| var).collect();
        assert_eq!(unfixed, vec![0]);
        assert!(store.has_empty_domain());
    }

    #[test]
    fn to_solution_captures_fixed_values() {
        let store = DomainStore::new(im::hashmap! {
            0 => Domain::singleton(4),
            1 => Domain::singleton(-1),
        });
        let solution = store.to_solution();
        assert_eq!(solution.value(0), 4);
        assert_eq!(solution.value(1), -1);
    }
}
