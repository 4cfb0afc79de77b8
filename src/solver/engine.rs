use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintId},
        stats::SearchStats,
        store::DomainStore,
        variable::VariableId,
        work_list::WorkList,
    },
};

/// Runs a set of constraints to a propagation fixpoint.
///
/// The engine keeps a worklist of dirty constraints, initially all of them.
/// Each popped constraint gets one `propagate` step; whenever a step shrinks
/// a domain, every other constraint sharing one of the shrunk variables is
/// re-enqueued. Domains are finite and only ever shrink, so the loop
/// terminates: either the worklist drains (fixpoint) or some domain is wiped
/// out (the current branch is contradictory).
pub struct PropagationEngine {
    dependents: HashMap<VariableId, Vec<ConstraintId>>,
}

impl PropagationEngine {
    pub fn new(constraints: &[Box<dyn Constraint>]) -> Self {
        let mut dependents: HashMap<VariableId, Vec<ConstraintId>> = HashMap::new();
        for (constraint_id, constraint) in constraints.iter().enumerate() {
            for &var in constraint.scope() {
                let entry = dependents.entry(var).or_default();
                if !entry.contains(&constraint_id) {
                    entry.push(constraint_id);
                }
            }
        }
        Self { dependents }
    }

    /// Makes the engine aware of a constraint added after construction.
    pub fn register(&mut self, constraint_id: ConstraintId, scope: &[VariableId]) {
        for &var in scope {
            let entry = self.dependents.entry(var).or_default();
            if !entry.contains(&constraint_id) {
                entry.push(constraint_id);
            }
        }
    }

    /// Propagates until nothing changes. `Ok(None)` means a domain was wiped
    /// out and the current branch is dead.
    pub fn fixpoint(
        &self,
        constraints: &[Box<dyn Constraint>],
        store: DomainStore,
        stats: &mut SearchStats,
    ) -> Result<Option<DomainStore>> {
        let mut store = store;
        let mut worklist = WorkList::new();
        for constraint_id in 0..constraints.len() {
            worklist.push_back(constraint_id);
        }

        while let Some(constraint_id) = worklist.pop_front() {
            let constraint = &constraints[constraint_id];
            let constraint_stats = stats.constraint_stats.entry(constraint_id).or_default();
            constraint_stats.revisions += 1;

            let start = std::time::Instant::now();
            let outcome = constraint.propagate(&store)?;
            constraint_stats.time_spent_micros += start.elapsed().as_micros() as u64;

            let Some(narrowed) = outcome else {
                continue;
            };

            let mut shrunk = Vec::new();
            for &var in constraint.scope() {
                let after = narrowed.domain(var);
                if after.len() < store.domain(var).len() {
                    if after.is_empty() {
                        debug!(constraint = constraint_id, variable = var, "domain wiped out");
                        return Ok(None);
                    }
                    shrunk.push(var);
                }
            }
            if shrunk.is_empty() {
                continue;
            }

            constraint_stats.prunings += 1;
            store = narrowed;
            for var in shrunk {
                if let Some(dependent_constraints) = self.dependents.get(&var) {
                    for &dependent in dependent_constraints {
                        if dependent != constraint_id {
                            worklist.push_back(dependent);
                        }
                    }
                }
            }
        }

        debug!("propagation reached fixpoint");
        Ok(Some(store))
    }
}
