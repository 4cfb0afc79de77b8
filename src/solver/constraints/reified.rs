//! Links a 0/1 condition variable to an inner constraint:
//! `condition = 1` exactly when the inner constraint holds.
//!
//! Propagation runs both directions in one step. The inner constraint's
//! conservative entailment verdict fixes the condition; a fixed condition
//! enforces the inner constraint (or its negation). Conjunctions and
//! disjunctions over 0/1 variables compose from reified sums, so no clause
//! machinery exists anywhere else.

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor},
        store::DomainStore,
        variable::VariableId,
    },
};

#[derive(Debug)]
pub struct ReifiedConstraint {
    condition: VariableId,
    inner: Box<dyn Constraint>,
    vars: Vec<VariableId>,
}

impl ReifiedConstraint {
    pub fn new(condition: VariableId, inner: Box<dyn Constraint>) -> Self {
        let mut vars = vec![condition];
        vars.extend_from_slice(inner.scope());
        Self {
            condition,
            inner,
            vars,
        }
    }
}

impl Constraint for ReifiedConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        ConstraintDescriptor {
            name: "Reified".to_string(),
            description: format!(
                "?{} <=> ({})",
                self.condition,
                self.inner.descriptor().description
            ),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let mut next = store.clone();
        let mut changed = false;

        // Inner verdict fixes the condition. A condition already fixed the
        // other way empties here, which is exactly the failure signal.
        if let Some(holds) = self.inner.entailment(&next) {
            let want = i64::from(holds);
            let domain = next.domain(self.condition);
            let narrowed = domain.retain(|v| v == want);
            if narrowed.len() < domain.len() {
                next = next.update(self.condition, narrowed);
                changed = true;
            }
            if next.domain(self.condition).is_empty() {
                return Ok(Some(next));
            }
        }

        // A fixed condition enforces the inner constraint or its negation.
        match next.domain(self.condition).value() {
            Some(1) => {
                if let Some(narrowed) = self.inner.propagate(&next)? {
                    next = narrowed;
                    changed = true;
                }
            }
            Some(_) => {
                if let Some(narrowed) = self.inner.propagate_negation(&next)? {
                    next = narrowed;
                    changed = true;
                }
            }
            None => {}
        }

        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let condition = store.domain(self.condition).value()?;
        let holds = self.inner.entailment(store)?;
        Some((condition == 1) == holds)
    }
}
