//! Bounds-consistent `result = min(inputs)` and `result = max(inputs)`.
//!
//! Both propagators derive the result's bounds componentwise from the input
//! bounds and push the result's bounds back onto every input. On top of that,
//! when only a single input can still reach the extremum, that input is the
//! supporter and inherits the result's bound.

use crate::{
    error::Result,
    solver::{
        constraint::{Constraint, ConstraintDescriptor},
        store::DomainStore,
        variable::VariableId,
    },
};

#[derive(Debug, Clone)]
pub struct MinConstraint {
    result: VariableId,
    inputs: Vec<VariableId>,
    vars: Vec<VariableId>,
}

impl MinConstraint {
    pub fn new(result: VariableId, inputs: Vec<VariableId>) -> Self {
        let mut vars = vec![result];
        vars.extend_from_slice(&inputs);
        Self {
            result,
            inputs,
            vars,
        }
    }
}

impl Constraint for MinConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let inputs_str = self
            .inputs
            .iter()
            .map(|v| format!("?{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        ConstraintDescriptor {
            name: "Min".to_string(),
            description: format!("?{} = min({inputs_str})", self.result),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let mut bounds = Vec::with_capacity(self.inputs.len());
        for &input in &self.inputs {
            let domain = store.domain(input);
            let (Some(min), Some(max)) = (domain.min(), domain.max()) else {
                return Ok(None);
            };
            bounds.push((min, max));
        }
        let lo = bounds.iter().map(|(min, _)| *min).min().unwrap_or(0);
        let hi = bounds.iter().map(|(_, max)| *max).min().unwrap_or(0);

        let mut next = store.clone();
        let mut changed = false;

        let result_dom = store.domain(self.result);
        let narrowed_result = result_dom.restrict(lo, hi);
        if narrowed_result.len() < result_dom.len() {
            next = next.update(self.result, narrowed_result.clone());
            changed = true;
        }
        let (Some(result_lo), Some(result_hi)) = (narrowed_result.min(), narrowed_result.max())
        else {
            return Ok(Some(next));
        };

        // Every input sits at or above the minimum.
        for &input in &self.inputs {
            let domain = next.domain(input);
            let narrowed = domain.restrict(result_lo, i64::MAX);
            if narrowed.len() < domain.len() {
                next = next.update(input, narrowed);
                changed = true;
            }
        }

        // Some input has to realise the minimum; with a single candidate left
        // it inherits the result's upper bound.
        let supporters: Vec<VariableId> = self
            .inputs
            .iter()
            .copied()
            .filter(|input| next.domain(*input).min().is_some_and(|min| min <= result_hi))
            .collect();
        if let [supporter] = supporters[..] {
            let domain = next.domain(supporter);
            let narrowed = domain.restrict(i64::MIN, result_hi);
            if narrowed.len() < domain.len() {
                next = next.update(supporter, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let mut lo = i64::MAX;
        let mut hi = i64::MAX;
        let mut values = Vec::with_capacity(self.inputs.len());
        for &input in &self.inputs {
            let domain = store.domain(input);
            lo = lo.min(domain.min()?);
            hi = hi.min(domain.max()?);
            values.push(domain.value());
        }
        let result_dom = store.domain(self.result);
        let (result_lo, result_hi) = (result_dom.min()?, result_dom.max()?);
        if result_hi < lo || result_lo > hi {
            return Some(false);
        }
        let result = result_dom.value()?;
        let fixed: Option<Vec<i64>> = values.into_iter().collect();
        fixed.map(|values| values.into_iter().min() == Some(result))
    }
}

#[derive(Debug, Clone)]
pub struct MaxConstraint {
    result: VariableId,
    inputs: Vec<VariableId>,
    vars: Vec<VariableId>,
}

impl MaxConstraint {
    pub fn new(result: VariableId, inputs: Vec<VariableId>) -> Self {
        let mut vars = vec![result];
        vars.extend_from_slice(&inputs);
        Self {
            result,
            inputs,
            vars,
        }
    }
}

impl Constraint for MaxConstraint {
    fn scope(&self) -> &[VariableId] {
        &self.vars
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let inputs_str = self
            .inputs
            .iter()
            .map(|v| format!("?{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        ConstraintDescriptor {
            name: "Max".to_string(),
            description: format!("?{} = max({inputs_str})", self.result),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let mut bounds = Vec::with_capacity(self.inputs.len());
        for &input in &self.inputs {
            let domain = store.domain(input);
            let (Some(min), Some(max)) = (domain.min(), domain.max()) else {
                return Ok(None);
            };
            bounds.push((min, max));
        }
        let lo = bounds.iter().map(|(min, _)| *min).max().unwrap_or(0);
        let hi = bounds.iter().map(|(_, max)| *max).max().unwrap_or(0);

        let mut next = store.clone();
        let mut changed = false;

        let result_dom = store.domain(self.result);
        let narrowed_result = result_dom.restrict(lo, hi);
        if narrowed_result.len() < result_dom.len() {
            next = next.update(self.result, narrowed_result.clone());
            changed = true;
        }
        let (Some(result_lo), Some(result_hi)) = (narrowed_result.min(), narrowed_result.max())
        else {
            return Ok(Some(next));
        };

        // Every input sits at or below the maximum.
        for &input in &self.inputs {
            let domain = next.domain(input);
            let narrowed = domain.restrict(i64::MIN, result_hi);
            if narrowed.len() < domain.len() {
                next = next.update(input, narrowed);
                changed = true;
            }
        }

        let supporters: Vec<VariableId> = self
            .inputs
            .iter()
            .copied()
            .filter(|input| next.domain(*input).max().is_some_and(|max| max >= result_lo))
            .collect();
        if let [supporter] = supporters[..] {
            let domain = next.domain(supporter);
            let narrowed = domain.restrict(result_lo, i64::MAX);
            if narrowed.len() < domain.len() {
                next = next.update(supporter, narrowed);
                changed = true;
            }
        }
        Ok(changed.then_some(next))
    }

    fn entailment(&self, store: &DomainStore) -> Option<bool> {
        let mut lo = i64::MIN;
        let mut hi = i64::MIN;
        let mut values = Vec::with_capacity(self.inputs.len());
        for &input in &self.inputs {
            let domain = store.domain(input);
            lo = lo.max(domain.min()?);
            hi = hi.max(domain.max()?);
            values.push(domain.value());
        }
        let result_dom = store.domain(self.result);
        let (result_lo, result_hi) = (result_dom.min()?, result_dom.max()?);
        if result_hi < lo || result_lo > hi {
            return Some(false);
        }
        let result = result_dom.value()?;
        let fixed: Option<Vec<i64>> = values.into_iter().collect();
        fixed.map(|values| values.into_iter().max() == Some(result))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{MaxConstraint, MinConstraint};
    use crate::solver::{constraint::Constraint, domain::Domain, store::DomainStore};

    fn store(domains: &[(u32, Domain)]) -> DomainStore {
        DomainStore::new(domains.iter().cloned().collect())
    }

    #[test]
    fn min_narrows_result_to_the_componentwise_window() {
        let constraint = MinConstraint::new(0, vec![1, 2]);
        let store = store(&[
            (0, Domain::range(0, 9)),
            (1, Domain::range(2, 6)),
            (2, Domain::range(3, 5)),
        ]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(0).min(), Some(2));
        assert_eq!(next.domain(0).max(), Some(5));
    }

    #[test]
    fn min_raises_input_floors_to_the_result_floor() {
        let constraint = MinConstraint::new(0, vec![1, 2]);
        let store = store(&[
            (0, Domain::range(4, 5)),
            (1, Domain::range(0, 9)),
            (2, Domain::range(4, 9)),
        ]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(1).min(), Some(4));
    }

    #[test]
    fn min_single_supporter_inherits_the_upper_bound() {
        // Only ?1 can reach down to the result's window.
        let constraint = MinConstraint::new(0, vec![1, 2]);
        let store = store(&[
            (0, Domain::range(1, 2)),
            (1, Domain::range(1, 9)),
            (2, Domain::range(5, 9)),
        ]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(1).max(), Some(2));
    }

    #[test]
    fn max_mirrors_the_min_rules() {
        let constraint = MaxConstraint::new(0, vec![1, 2]);
        let store = store(&[
            (0, Domain::range(0, 9)),
            (1, Domain::range(2, 6)),
            (2, Domain::range(3, 5)),
        ]);

        let next = constraint.propagate(&store).unwrap().unwrap();
        assert_eq!(next.domain(0).min(), Some(3));
        assert_eq!(next.domain(0).max(), Some(6));
    }

    #[test]
    fn max_entailment_spots_an_unreachable_result() {
        let constraint = MaxConstraint::new(0, vec![1, 2]);
        let store = store(&[
            (0, Domain::range(7, 9)),
            (1, Domain::range(0, 3)),
            (2, Domain::range(0, 4)),
        ]);
        assert_eq!(constraint.entailment(&store), Some(false));
    }

    #[test]
    fn min_entailment_needs_fixed_values_for_a_positive_verdict() {
        let constraint = MinConstraint::new(0, vec![1, 2]);
        let fixed = store(&[
            (0, Domain::singleton(2)),
            (1, Domain::singleton(2)),
            (2, Domain::singleton(5)),
        ]);
        assert_eq!(constraint.entailment(&fixed), Some(true));

        let open = store(&[
            (0, Domain::singleton(2)),
            (1, Domain::range(2, 3)),
            (2, Domain::singleton(5)),
        ]);
        assert_eq!(constraint.entailment(&open), None);
    }
}
