//! A constraint relating the sum of a set of variables to a total variable:
//! `terms[0] + terms[1] + ... (=|<=|>=) total`.

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor, Relation},
        store::DomainStore,
        variable::VariableId,
    },
};

#[derive(Debug, Clone)]
pub struct SumConstraint {
    terms: Vec<VariableId>,
    relation: Relation,
    total: VariableId,
    all_vars: Vec<VariableId>,
}

impl SumConstraint {
    pub fn new(terms: Vec<VariableId>, relation: Relation, total: VariableId) -> Self {
        let mut all_vars = terms.clone();
        all_vars.push(total);
        Self {
            terms,
            relation,
            total,
            all_vars,
        }
    }

    /// `(Σ min, Σ max)` over the term domains; `None` if any is empty.
    fn term_bounds(&self, store: &DomainStore) -> Option<(i64, i64)> {
        let mut lo = 0i64;
        let mut hi = 0i64;
        for &term in &self.terms {
            let domain = store.domain(term);
            lo += domain.min()?;
            hi += domain.max()?;
        }
        Some((lo, hi))
    }
}

impl Constraint for SumConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.all_vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let terms_str = self
            .terms
            .iter()
            .map(|v| format!("?{v}"))
            .collect::<Vec<_>>()
            .join(" + ");
        ConstraintDescriptor {
            name: "Sum".to_string(),
            description: format!("{terms_str} {} ?{}", self.relation.symbol(), self.total),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let Some((sum_min, sum_max)) = self.term_bounds(store) else {
            return Ok(None);
        };
        let total_dom = store.domain(self.total);
        let (Some(total_min), Some(total_max)) = (total_dom.min(), total_dom.max()) else {
            return Ok(None);
        };

        let mut next = store.clone();
        let mut changed = false;

        let narrowed_total = match self.relation {
            Relation::Equal => total_dom.restrict(sum_min, sum_max),
            Relation::LessOrEqual => total_dom.restrict(sum_min, i64::MAX),
            Relation::GreaterOrEqual => total_dom.restrict(i64::MIN, sum_max),
        };
        if narrowed_total.len() < total_dom.len() {
            next = next.update(self.total, narrowed_total);
            changed = true;
        }

        for &term in &self.terms {
            let domain = store.domain(term);
            let (Some(term_min), Some(term_max)) = (domain.min(), domain.max()) else {
                return Ok(None);
            };
            // Bounds of the other terms, obtained by subtracting this term's
            // own contribution from the full sum.
            let others_min = sum_min - term_min;
            let others_max = sum_max - term_max;
            let narrowed = match self.relation {
                Relation::Equal => domain.restrict(total_min - others_max, total_max - others_min),
                Relation::LessOrEqual => domain.restrict(i64::MIN, total_max - others_min),
                Relation::GreaterOrEqual => domain.restrict(total_min - others_max, i64::MAX),
            };
            if narrowed.len() < domain.len() {
                next = next.update(term, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let (sum_min, sum_max) = self.term_bounds(store)?;
        let total_dom = store.domain(self.total);
        let (total_min, total_max) = (total_dom.min()?, total_dom.max()?);
        match self.relation {
            Relation::Equal => {
                if sum_min == sum_max && total_min == total_max && sum_min == total_min {
                    Some(true)
                } else if sum_max < total_min || sum_min > total_max {
                    Some(false)
                } else {
                    None
                }
            }
            Relation::LessOrEqual => {
                if sum_max <= total_min {
                    Some(true)
                } else if sum_min > total_max {
                    Some(false)
                } else {
                    None
                }
            }
            Relation::GreaterOrEqual => {
                if sum_min >= total_max {
                    Some(true)
                } else if sum_max < total_min {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    fn propagate_negation(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        match self.relation {
            // Σ != total: once all participants but one are fixed, the last
            // one cannot take the completing value.
            Relation::Equal => {
                let mut unfixed: Option<VariableId> = None;
                for &var in &self.all_vars {
                    if !store.domain(var).is_fixed() && unfixed.replace(var).is_some() {
                        return Ok(None);
                    }
                }
                let Some(var) = unfixed else {
                    // Fully fixed; the entailment check handles contradiction.
                    return Ok(None);
                };
                let forbidden = if var == self.total {
                    let mut sum = 0i64;
                    for &term in &self.terms {
                        let Some(value) = store.domain(term).value() else {
                            return Ok(None);
                        };
                        sum += value;
                    }
                    sum
                } else {
                    let Some(total_value) = store.domain(self.total).value() else {
                        return Ok(None);
                    };
                    let mut others = 0i64;
                    for &term in &self.terms {
                        if term == var {
                            continue;
                        }
                        let Some(value) = store.domain(term).value() else {
                            return Ok(None);
                        };
                        others += value;
                    }
                    total_value - others
                };
                let domain = store.domain(var);
                if domain.contains(forbidden) {
                    Ok(Some(store.update(var, domain.remove(forbidden))))
                } else {
                    Ok(None)
                }
            }
            // Σ > total.
            Relation::LessOrEqual => self.propagate_strict(store, true),
            // Σ < total.
            Relation::GreaterOrEqual => self.propagate_strict(store, false),
        }
    }
}

impl SumConstraint {
    /// Bounds propagation for `Σ > total` (`greater = true`) or `Σ < total`.
    fn propagate_strict(&self, store: &DomainStore, greater: bool) -> Result<Option<DomainStore>> {
        let Some((sum_min, sum_max)) = self.term_bounds(store) else {
            return Ok(None);
        };
        let total_dom = store.domain(self.total);
        let (Some(total_min), Some(total_max)) = (total_dom.min(), total_dom.max()) else {
            return Ok(None);
        };

        let mut next = store.clone();
        let mut changed = false;

        let narrowed_total = if greater {
            total_dom.restrict(i64::MIN, sum_max.saturating_sub(1))
        } else {
            total_dom.restrict(sum_min.saturating_add(1), i64::MAX)
        };
        if narrowed_total.len() < total_dom.len() {
            next = next.update(self.total, narrowed_total);
            changed = true;
        }

        for &term in &self.terms {
            let domain = store.domain(term);
            let (Some(term_min), Some(term_max)) = (domain.min(), domain.max()) else {
                return Ok(None);
            };
            let others_min = sum_min - term_min;
            let others_max = sum_max - term_max;
            let narrowed = if greater {
                domain.restrict(total_min + 1 - others_max, i64::MAX)
            } else {
                domain.restrict(i64::MIN, total_max - 1 - others_min)
            };
            if narrowed.len() < domain.len() {
                next = next.update(term, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }
}
