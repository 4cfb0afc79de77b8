//! Occurrence-counting global cardinality: `counts[i]` equals the number of
//! variables in `vars` that take the value `values[i]`.
//!
//! Propagation is symmetric. Counter domains are clamped to
//! `[#already-fixed-to-v, #still-able-to-take-v]`; once those bounds pinch,
//! the value is either forced into every remaining candidate or forbidden
//! everywhere. Values outside `values` are unconstrained.

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor},
        store::DomainStore,
        variable::VariableId,
    },
};

#[derive(Debug, Clone)]
pub struct CardinalityConstraint {
    vars: Vec<VariableId>,
    values: Vec<i64>,
    counts: Vec<VariableId>,
    all_vars: Vec<VariableId>,
}

impl CardinalityConstraint {
    pub fn new(vars: Vec<VariableId>, values: Vec<i64>, counts: Vec<VariableId>) -> Self {
        let all_vars = vars.iter().chain(counts.iter()).copied().collect();
        Self {
            vars,
            values,
            counts,
            all_vars,
        }
    }

    /// `(#vars fixed to value, #vars whose domain still contains value)`.
    fn occurrence_bounds(&self, store: &DomainStore, value: i64) -> (i64, i64) {
        let mut assigned = 0i64;
        let mut possible = 0i64;
        for &var in &self.vars {
            let domain = store.domain(var);
            if domain.contains(value) {
                possible += 1;
                if domain.is_fixed() {
                    assigned += 1;
                }
            }
        }
        (assigned, possible)
    }
}

impl Constraint for CardinalityConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let pairs = self
            .values
            .iter()
            .zip(self.counts.iter())
            .map(|(value, count)| format!("#{value} = ?{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        ConstraintDescriptor {
            name: "Cardinality".to_string(),
            description: format!("Cardinality({pairs})"),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let mut next = store.clone();
        let mut changed = false;

        for (value, &count_var) in self.values.iter().copied().zip(self.counts.iter()) {
            let (assigned, possible) = self.occurrence_bounds(&next, value);

            let count_dom = next.domain(count_var).clone();
            let narrowed_count = count_dom.restrict(assigned, possible);
            if narrowed_count.len() < count_dom.len() {
                next = next.update(count_var, narrowed_count.clone());
                changed = true;
            }
            let (Some(count_lo), Some(count_hi)) = (narrowed_count.min(), narrowed_count.max())
            else {
                // Counter wiped out; report the change and let the engine abort.
                return Ok(Some(next));
            };

            if possible == count_lo && possible > assigned {
                // Every candidate has to take the value.
                for &var in &self.vars {
                    let domain = next.domain(var);
                    if domain.contains(value) && !domain.is_fixed() {
                        let narrowed = domain.retain(|v| v == value);
                        next = next.update(var, narrowed);
                        changed = true;
                    }
                }
            } else if assigned == count_hi {
                // The value is used up; no further variable may take it.
                for &var in &self.vars {
                    let domain = next.domain(var);
                    if domain.contains(value) && !domain.is_fixed() {
                        let narrowed = domain.remove(value);
                        next = next.update(var, narrowed);
                        changed = true;
                    }
                }
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let mut all_fixed = self.vars.iter().all(|var| store.domain(*var).is_fixed());
        for (value, &count_var) in self.values.iter().copied().zip(self.counts.iter()) {
            let (assigned, possible) = self.occurrence_bounds(store, value);
            let count_dom = store.domain(count_var);
            let (count_lo, count_hi) = (count_dom.min()?, count_dom.max()?);
            if assigned > count_hi || possible < count_lo {
                return Some(false);
            }
            if !count_dom.is_fixed() {
                all_fixed = false;
            }
        }
        all_fixed.then_some(true)
    }
}
