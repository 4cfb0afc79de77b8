//! A linear equality over weighted variables: `Σ cᵢ·xᵢ = k`.

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor},
        store::DomainStore,
        variable::VariableId,
    },
};

#[derive(Debug, Clone)]
pub struct LinearEqualityConstraint {
    terms: Vec<(i64, VariableId)>,
    constant: i64,
    vars: Vec<VariableId>,
}

impl LinearEqualityConstraint {
    pub fn new(terms: Vec<(i64, VariableId)>, constant: i64) -> Self {
        let vars = terms.iter().map(|(_, var)| *var).collect();
        Self {
            terms,
            constant,
            vars,
        }
    }

    /// Interval of `coefficient · x` over the variable's current domain.
    fn contributions(&self, store: &DomainStore) -> Option<Vec<(i64, i64)>> {
        self.terms
            .iter()
            .map(|(coefficient, var)| {
                let domain = store.domain(*var);
                let (min, max) = (domain.min()?, domain.max()?);
                if *coefficient >= 0 {
                    Some((coefficient * min, coefficient * max))
                } else {
                    Some((coefficient * max, coefficient * min))
                }
            })
            .collect()
    }
}

fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) == (b < 0) {
        q + 1
    } else {
        q
    }
}

impl Constraint for LinearEqualityConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let terms_str = self
            .terms
            .iter()
            .map(|(coefficient, var)| format!("{coefficient}·?{var}"))
            .collect::<Vec<_>>()
            .join(" + ");
        ConstraintDescriptor {
            name: "LinearEquality".to_string(),
            description: format!("{terms_str} = {}", self.constant),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let Some(contributions) = self.contributions(store) else {
            return Ok(None);
        };
        let lo: i64 = contributions.iter().map(|(lo, _)| lo).sum();
        let hi: i64 = contributions.iter().map(|(_, hi)| hi).sum();

        let mut next = store.clone();
        let mut changed = false;
        for (index, &(coefficient, var)) in self.terms.iter().enumerate() {
            let (own_lo, own_hi) = contributions[index];
            // What `coefficient · x` must lie in, given the other terms.
            let residual_lo = self.constant - (hi - own_hi);
            let residual_hi = self.constant - (lo - own_lo);
            let domain = store.domain(var);
            let narrowed = if coefficient > 0 {
                domain.restrict(
                    div_ceil(residual_lo, coefficient),
                    div_floor(residual_hi, coefficient),
                )
            } else {
                domain.restrict(
                    div_ceil(residual_hi, coefficient),
                    div_floor(residual_lo, coefficient),
                )
            };
            if narrowed.len() < domain.len() {
                next = next.update(var, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let contributions = self.contributions(store)?;
        let lo: i64 = contributions.iter().map(|(lo, _)| lo).sum();
        let hi: i64 = contributions.iter().map(|(_, hi)| hi).sum();
        if lo == hi {
            Some(lo == self.constant)
        } else if self.constant < lo || self.constant > hi {
            Some(false)
        } else {
            None
        }
    }

    fn propagate_negation(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        // Σ cᵢ·xᵢ != k: with one variable left open, the completing value is
        // forbidden (when it exists at all).
        let mut unfixed: Option<(i64, VariableId)> = None;
        let mut fixed_part = 0i64;
        for &(coefficient, var) in &self.terms {
            match store.domain(var).value() {
                Some(value) => fixed_part += coefficient * value,
                None => {
                    if unfixed.replace((coefficient, var)).is_some() {
                        return Ok(None);
                    }
                }
            }
        }
        let Some((coefficient, var)) = unfixed else {
            return Ok(None);
        };
        let residual = self.constant - fixed_part;
        if residual % coefficient != 0 {
            return Ok(None);
        }
        let forbidden = residual / coefficient;
        let domain = store.domain(var);
        if domain.contains(forbidden) {
            Ok(Some(store.update(var, domain.remove(forbidden))))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{div_ceil, div_floor, LinearEqualityConstraint};
    use crate::solver::{constraint::Constraint, domain::Domain, store::DomainStore};

    fn store(domains: &[(u32, Domain)]) -> DomainStore {
        DomainStore::new(domains.iter().cloned().collect())
    }

    #[test]
    fn signed_division_rounds_towards_the_interval() {
        assert_eq!(div_floor(7, 2), 3);
        assert_eq!(div_floor(-7, 2), -4);
        assert_eq!(div_ceil(7, 2), 4);
        assert_eq!(div_ceil(-7, 2), -3);
        assert_eq!(div_floor(7, -2), -4);
        assert_eq!(div_ceil(7, -2), -3);
    }

    #[test]
    fn residual_bounds_tighten_each_variable() {
        // x + y = 5 with x in 0..9, y in 2..3.
        let constraint = LinearEqualityConstraint::new(vec![(1, 0), (1, 1)], 5);
        let store = store(&[(0, Domain::range(0, 9)), (1, Domain::range(2, 3))]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(0).min(), Some(2));
        assert_eq!(next.domain(0).max(), Some(3));
    }

    #[test]
    fn negative_coefficients_flip_the_interval() {
        // x - y = -2, i.e. y = x + 2, with x in 0..3 and y in 0..9.
        let constraint = LinearEqualityConstraint::new(vec![(1, 0), (-1, 1)], -2);
        let store = store(&[(0, Domain::range(0, 3)), (1, Domain::range(0, 9))]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(1).min(), Some(2));
        assert_eq!(next.domain(1).max(), Some(5));
    }

    #[test]
    fn coefficients_respect_divisibility() {
        // 2x = 5 has no integer solution.
        let constraint = LinearEqualityConstraint::new(vec![(2, 0)], 5);
        let store = store(&[(0, Domain::range(0, 9))]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert!(next.domain(0).is_empty());
    }

    #[test]
    fn entailment_decides_once_bounds_pin_the_sum() {
        let constraint = LinearEqualityConstraint::new(vec![(1, 0), (2, 1)], 7);

        let holds = store(&[(0, Domain::singleton(1)), (1, Domain::singleton(3))]);
        assert_eq!(constraint.entailment(&holds), Some(true));

        let violated = store(&[(0, Domain::range(0, 1)), (1, Domain::range(0, 1))]);
        assert_eq!(constraint.entailment(&violated), Some(false));

        let open = store(&[(0, Domain::range(0, 9)), (1, Domain::range(0, 9))]);
        assert_eq!(constraint.entailment(&open), None);
    }

    #[test]
    fn negation_removes_the_completing_value() {
        // x + 2y != 7 with y fixed to 2: x cannot be 3.
        let constraint = LinearEqualityConstraint::new(vec![(1, 0), (2, 1)], 7);
        let store = store(&[(0, Domain::range(0, 9)), (1, Domain::singleton(2))]);

        let next = constraint.propagate_negation(&store).unwrap().unwrap();
        assert!(!next.domain(0).contains(3));
        assert_eq!(next.domain(0).len(), 9);
    }
}
