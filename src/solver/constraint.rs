use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    solver::{
        constraints::{
            all_different::AllDifferentConstraint,
            cardinality::CardinalityConstraint,
            linear::LinearEqualityConstraint,
            min_max::{MaxConstraint, MinConstraint},
            reified::ReifiedConstraint,
            sum::SumConstraint,
        },
        solution::Solution,
        store::DomainStore,
        variable::VariableId,
    },
};

pub type ConstraintId = usize;

#[derive(Debug, Clone)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub description: String,
}

/// A propagator: the executable form of one constraint.
///
/// `propagate` returns `Ok(None)` when no domain could be narrowed and
/// `Ok(Some(store))` with the narrowed store otherwise. An emptied domain in
/// the returned store is the failure signal that aborts the current branch;
/// the engine checks for it after every step.
///
/// `entailment` and `propagate_negation` exist for reification:
/// `entailment` gives a conservative three-valued verdict (provably holds /
/// provably violated / unknown), and `propagate_negation` prunes for the
/// negated constraint. Kinds without a useful negated form keep the default
/// no-op.
pub trait Constraint: std::fmt::Debug {
    fn scope(&self) -> &[VariableId];

    fn descriptor(&self) -> ConstraintDescriptor;

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>>;

    fn entailment(&self, _store: &DomainStore) -> Option<bool> {
        None
    }

    fn propagate_negation(&self, _store: &DomainStore) -> Result<Option<DomainStore>> {
        Ok(None)
    }
}

/// Comparison between a sum of variables and its total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Relation {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "=",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        }
    }

    pub(crate) fn compare(self, left: i64, right: i64) -> bool {
        match self {
            Relation::Equal => left == right,
            Relation::LessOrEqual => left <= right,
            Relation::GreaterOrEqual => left >= right,
        }
    }
}

/// Declarative constraint records.
///
/// A model stores these immutable descriptions; [`ConstraintKind::build`]
/// compiles each one into a boxed [`Constraint`] propagator when a search is
/// created. Records are validated when posted, so building cannot fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Every variable takes a distinct value.
    AllDifferent { vars: Vec<VariableId> },
    /// `Σ coefficient·variable = constant`.
    LinearEquality {
        terms: Vec<(i64, VariableId)>,
        constant: i64,
    },
    /// Occurrence counting: `counts[i]` equals the number of `vars` that take
    /// the value `values[i]`.
    Cardinality {
        vars: Vec<VariableId>,
        values: Vec<i64>,
        counts: Vec<VariableId>,
    },
    /// `result = min(inputs)`.
    Min {
        result: VariableId,
        inputs: Vec<VariableId>,
    },
    /// `result = max(inputs)`.
    Max {
        result: VariableId,
        inputs: Vec<VariableId>,
    },
    /// `Σ terms (relation) total`.
    Sum {
        terms: Vec<VariableId>,
        relation: Relation,
        total: VariableId,
    },
    /// `condition = 1` exactly when the inner constraint holds. The condition
    /// must be a 0/1 variable.
    Reified {
        condition: VariableId,
        inner: Box<ConstraintKind>,
    },
}

impl ConstraintKind {
    /// Every variable the record mentions, in scope order.
    pub fn variables(&self) -> Vec<VariableId> {
        match self {
            ConstraintKind::AllDifferent { vars } => vars.clone(),
            ConstraintKind::LinearEquality { terms, .. } => {
                terms.iter().map(|(_, var)| *var).collect()
            }
            ConstraintKind::Cardinality { vars, counts, .. } => {
                vars.iter().chain(counts.iter()).copied().collect()
            }
            ConstraintKind::Min { result, inputs } | ConstraintKind::Max { result, inputs } => {
                std::iter::once(*result).chain(inputs.iter().copied()).collect()
            }
            ConstraintKind::Sum { terms, total, .. } => {
                terms.iter().copied().chain(std::iter::once(*total)).collect()
            }
            ConstraintKind::Reified { condition, inner } => {
                std::iter::once(*condition).chain(inner.variables()).collect()
            }
        }
    }

    /// Compiles the record into its propagator.
    pub fn build(&self) -> Box<dyn Constraint> {
        match self {
            ConstraintKind::AllDifferent { vars } => {
                Box::new(AllDifferentConstraint::new(vars.clone()))
            }
            ConstraintKind::LinearEquality { terms, constant } => {
                Box::new(LinearEqualityConstraint::new(terms.clone(), *constant))
            }
            ConstraintKind::Cardinality {
                vars,
                values,
                counts,
            } => Box::new(CardinalityConstraint::new(
                vars.clone(),
                values.clone(),
                counts.clone(),
            )),
            ConstraintKind::Min { result, inputs } => {
                Box::new(MinConstraint::new(*result, inputs.clone()))
            }
            ConstraintKind::Max { result, inputs } => {
                Box::new(MaxConstraint::new(*result, inputs.clone()))
            }
            ConstraintKind::Sum {
                terms,
                relation,
                total,
            } => Box::new(SumConstraint::new(terms.clone(), *relation, *total)),
            ConstraintKind::Reified { condition, inner } => {
                Box::new(ReifiedConstraint::new(*condition, inner.build()))
            }
        }
    }

    /// Evaluates the record under a total assignment. Any variable missing
    /// from the solution counts as a violation.
    pub fn holds(&self, solution: &Solution) -> bool {
        match self {
            ConstraintKind::AllDifferent { vars } => {
                let mut seen = std::collections::HashSet::new();
                vars.iter().all(|var| match solution.get(*var) {
                    Some(value) => seen.insert(value),
                    None => false,
                })
            }
            ConstraintKind::LinearEquality { terms, constant } => {
                let mut sum = 0i64;
                for (coefficient, var) in terms {
                    match solution.get(*var) {
                        Some(value) => sum += coefficient * value,
                        None => return false,
                    }
                }
                sum == *constant
            }
            ConstraintKind::Cardinality {
                vars,
                values,
                counts,
            } => values.iter().zip(counts.iter()).all(|(value, count_var)| {
                let occurrences = vars
                    .iter()
                    .filter(|var| solution.get(**var) == Some(*value))
                    .count() as i64;
                solution.get(*count_var) == Some(occurrences)
            }),
            ConstraintKind::Min { result, inputs } => {
                let smallest = inputs.iter().filter_map(|var| solution.get(*var)).min();
                !inputs.is_empty()
                    && inputs.iter().all(|var| solution.get(*var).is_some())
                    && solution.get(*result) == smallest
            }
            ConstraintKind::Max { result, inputs } => {
                let largest = inputs.iter().filter_map(|var| solution.get(*var)).max();
                !inputs.is_empty()
                    && inputs.iter().all(|var| solution.get(*var).is_some())
                    && solution.get(*result) == largest
            }
            ConstraintKind::Sum {
                terms,
                relation,
                total,
            } => {
                let mut sum = 0i64;
                for var in terms {
                    match solution.get(*var) {
                        Some(value) => sum += value,
                        None => return false,
                    }
                }
                match solution.get(*total) {
                    Some(total_value) => relation.compare(sum, total_value),
                    None => false,
                }
            }
            ConstraintKind::Reified { condition, inner } => match solution.get(*condition) {
                Some(flag) => (flag == 1) == inner.holds(solution),
                None => false,
            },
        }
    }
}
