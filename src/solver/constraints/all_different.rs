use std::collections::HashSet;

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor},
        store::DomainStore,
        variable::VariableId,
    },
};

/// Requires every variable in the scope to take a distinct value.
///
/// Propagation waits for a variable to become fixed and then removes its
/// value from every other domain in the scope. More advanced filtering
/// algorithms exist, but this one is simple and effective, and two variables
/// fixed to the same value wipe each other's domains out immediately.
#[derive(Debug, Clone)]
pub struct AllDifferentConstraint {
    vars: Vec<VariableId>,
}

impl AllDifferentConstraint {
    pub fn new(vars: Vec<VariableId>) -> Self {
        Self { vars }
    }
}

impl Constraint for AllDifferentConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let vars_str = self
            .vars
            .iter()
            .map(|v| format!("?{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        ConstraintDescriptor {
            name: "AllDifferent".to_string(),
            description: format!("AllDifferent({vars_str})"),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let fixed: Vec<(VariableId, i64)> = self
            .vars
            .iter()
            .filter_map(|var| store.domain(*var).value().map(|value| (*var, value)))
            .collect();
        if fixed.is_empty() {
            return Ok(None);
        }

        let mut next = store.clone();
        let mut changed = false;
        for &var in &self.vars {
            let domain = store.domain(var);
            let mut narrowed = domain.clone();
            for &(other, value) in &fixed {
                if other != var && narrowed.contains(value) {
                    narrowed = narrowed.remove(value);
                }
            }
            if narrowed.len() < domain.len() {
                next = next.update(var, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let mut seen = HashSet::new();
        let mut all_fixed = true;
        for &var in &self.vars {
            match store.domain(var).value() {
                Some(value) => {
                    if !seen.insert(value) {
                        return Some(false);
                    }
                }
                None => all_fixed = false,
            }
        }
        all_fixed.then_some(true)
    }
}
