//! The user-facing assembly of variables, constraints and an objective.
//!
//! A [`Model`] is built once: variables first, then constraint records, then
//! optionally an objective. Posting validates each record immediately, so a
//! malformed constraint is reported at build time and can never reach a
//! search. Solving never mutates the model — every call to
//! [`Model::solver`] (or the `solve`/`solve_all`/`optimize` shorthands)
//! creates a fresh [`Search`] with its own copy of the initial domains.

use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    solver::{
        constraint::{Constraint, ConstraintId, ConstraintKind},
        domain::Domain,
        search::{Direction, Objective, Optimum, Search},
        solution::Solution,
        store::{DomainStore, Domains},
        variable::{Variable, VariableId},
    },
};

pub struct Model {
    name: String,
    variables: Vec<Variable>,
    domains: Domains,
    constraints: Vec<ConstraintKind>,
    objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            domains: Domains::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ConstraintKind] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<Objective> {
        self.objective
    }

    fn add_variable(&mut self, name: impl Into<String>, domain: Domain) -> VariableId {
        let id = self.variables.len() as VariableId;
        self.variables.push(Variable {
            id,
            name: name.into(),
        });
        self.domains.insert(id, domain);
        id
    }

    /// A variable ranging over `lower..=upper`. The domain is empty when
    /// `lower > upper`, making the model trivially unsatisfiable.
    pub fn int_var(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> VariableId {
        self.add_variable(name, Domain::range(lower, upper))
    }

    /// A variable fixed to `value` — the uniform representation of a
    /// constant.
    pub fn fixed_var(&mut self, name: impl Into<String>, value: i64) -> VariableId {
        self.add_variable(name, Domain::singleton(value))
    }

    /// A 0/1 variable, as used by reified constraints.
    pub fn bool_var(&mut self, name: impl Into<String>) -> VariableId {
        self.add_variable(name, Domain::range(0, 1))
    }

    /// A variable over an explicit value set.
    pub fn int_var_from(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = i64>,
    ) -> VariableId {
        self.add_variable(name, Domain::from_values(values))
    }

    /// `n` variables named `prefix[0]` through `prefix[n-1]`, each ranging
    /// over `lower..=upper`.
    pub fn int_var_array(
        &mut self,
        prefix: &str,
        n: usize,
        lower: i64,
        upper: i64,
    ) -> Vec<VariableId> {
        (0..n)
            .map(|i| self.int_var(format!("{prefix}[{i}]"), lower, upper))
            .collect()
    }

    /// Validates and records a constraint.
    ///
    /// All structural problems — unknown variables, empty scopes, mismatched
    /// cardinality lists, a non-boolean reification condition — are reported
    /// here and never reach a search.
    pub fn post(&mut self, kind: ConstraintKind) -> Result<ConstraintId> {
        self.validate(&kind)?;
        let id = self.constraints.len();
        self.constraints.push(kind);
        Ok(id)
    }

    pub fn minimize(&mut self, variable: VariableId) -> Result<()> {
        self.check_var(variable)?;
        self.objective = Some(Objective {
            variable,
            direction: Direction::Minimize,
        });
        Ok(())
    }

    pub fn maximize(&mut self, variable: VariableId) -> Result<()> {
        self.check_var(variable)?;
        self.objective = Some(Objective {
            variable,
            direction: Direction::Maximize,
        });
        Ok(())
    }

    /// A fresh search over this model, with default heuristics and no
    /// budget. The search owns its own domains; the model stays untouched.
    pub fn solver(&self) -> Search {
        let constraints: Vec<Box<dyn Constraint>> =
            self.constraints.iter().map(ConstraintKind::build).collect();
        Search::new(
            constraints,
            DomainStore::new(self.domains.clone()),
            self.objective,
        )
    }

    /// First solution, or `None` when the model is unsatisfiable.
    pub fn solve(&self) -> Result<Option<Solution>> {
        self.solver().next_solution()
    }

    /// Lazy enumeration of every solution. Each call starts a fresh search.
    pub fn solve_all(&self) -> Search {
        self.solver()
    }

    /// Branch-and-bound over the objective, run to exhaustion.
    pub fn optimize(&self) -> Result<Optimum> {
        self.solver().optimize()
    }

    /// Checks a complete assignment against the declared domains and every
    /// posted constraint.
    pub fn satisfies(&self, solution: &Solution) -> bool {
        self.variables.iter().all(|variable| {
            solution
                .get(variable.id)
                .and_then(|value| self.domains.get(&variable.id).map(|d| d.contains(value)))
                .unwrap_or(false)
        }) && self.constraints.iter().all(|kind| kind.holds(solution))
    }

    fn check_var(&self, var: VariableId) -> Result<()> {
        if (var as usize) < self.variables.len() {
            Ok(())
        } else {
            Err(Error::UnknownVariable(var))
        }
    }

    fn check_vars(&self, vars: impl IntoIterator<Item = VariableId>) -> Result<()> {
        for var in vars {
            self.check_var(var)?;
        }
        Ok(())
    }

    fn validate(&self, kind: &ConstraintKind) -> Result<()> {
        match kind {
            ConstraintKind::AllDifferent { vars } => {
                if vars.is_empty() {
                    return Err(Error::invalid("all-different needs at least one variable"));
                }
                self.check_vars(vars.iter().copied())
            }
            ConstraintKind::LinearEquality { terms, .. } => {
                if terms.is_empty() {
                    return Err(Error::invalid("linear equality needs at least one term"));
                }
                if terms.iter().any(|(coefficient, _)| *coefficient == 0) {
                    return Err(Error::invalid("linear equality has a zero coefficient"));
                }
                self.check_vars(terms.iter().map(|(_, var)| *var))
            }
            ConstraintKind::Cardinality {
                vars,
                values,
                counts,
            } => {
                if vars.is_empty() {
                    return Err(Error::invalid("cardinality needs at least one variable"));
                }
                if values.is_empty() {
                    return Err(Error::invalid("cardinality needs at least one value"));
                }
                if values.len() != counts.len() {
                    return Err(Error::invalid("cardinality needs one counter per value"));
                }
                if values.iter().collect::<HashSet<_>>().len() != values.len() {
                    return Err(Error::invalid("cardinality values must be distinct"));
                }
                self.check_vars(vars.iter().chain(counts.iter()).copied())
            }
            ConstraintKind::Min { result, inputs } | ConstraintKind::Max { result, inputs } => {
                if inputs.is_empty() {
                    return Err(Error::invalid("min/max needs at least one input"));
                }
                self.check_vars(std::iter::once(*result).chain(inputs.iter().copied()))
            }
            ConstraintKind::Sum { terms, total, .. } => {
                if terms.is_empty() {
                    return Err(Error::invalid("sum needs at least one term"));
                }
                self.check_vars(terms.iter().copied().chain(std::iter::once(*total)))
            }
            ConstraintKind::Reified { condition, inner } => {
                self.check_var(*condition)?;
                let condition_domain = self
                    .domains
                    .get(condition)
                    .ok_or(Error::UnknownVariable(*condition))?;
                if condition_domain.iter().any(|v| v != 0 && v != 1) {
                    return Err(Error::invalid(
                        "reified condition must be a boolean (0/1) variable",
                    ));
                }
                self.validate(inner)
            }
        }
    }
}
