//! Backtracking depth-first search over variable assignments.
//!
//! The search is an iterative state machine over an explicit decision stack.
//! Each frame records the variable branched on, the values not yet tried and
//! a snapshot of all domains taken before the decision; restoring a snapshot
//! is how a decision is undone. `next_solution` is resumable, which is what
//! makes lazy solution enumeration and branch-and-bound optimisation work on
//! top of the same loop.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    solver::{
        constraint::{Constraint, ConstraintDescriptor, ConstraintId},
        domain::Domain,
        engine::PropagationEngine,
        heuristics::{
            value::{AscendingValueHeuristic, ValueOrderingHeuristic},
            variable::{MinimumRemainingValuesHeuristic, VariableSelectionHeuristic},
        },
        solution::Solution,
        stats::SearchStats,
        store::DomainStore,
        variable::VariableId,
    },
};

/// Which way the objective variable is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// The variable the search optimises, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub variable: VariableId,
    pub direction: Direction,
}

/// Caller-supplied limits, checked between search transitions.
///
/// A step is one branching decision. An expired budget finishes the search
/// with [`SearchStatus::Cancelled`]; whatever was found up to that point
/// remains valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget {
    pub max_steps: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..Self::default()
        }
    }

    pub fn time(time_limit: Duration) -> Self {
        Self {
            time_limit: Some(time_limit),
            ..Self::default()
        }
    }
}

/// How a finished search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchStatus {
    /// Every branch was explored.
    Exhausted,
    /// The budget expired first.
    Cancelled,
}

/// Result of an optimisation run.
///
/// `best` is proven optimal only when `status` is
/// [`SearchStatus::Exhausted`]; under [`SearchStatus::Cancelled`] it is the
/// best solution found before the budget ran out. `trail` holds the
/// objective value of every successive solution, strictly improving by
/// construction.
#[derive(Debug, Clone, Serialize)]
pub struct Optimum {
    pub best: Option<Solution>,
    pub trail: Vec<i64>,
    pub status: SearchStatus,
    pub stats: SearchStats,
}

#[derive(Debug)]
struct Frame {
    variable: VariableId,
    candidates: VecDeque<i64>,
    saved: DomainStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The current store is consistent: emit a solution or open a decision.
    Exploring,
    /// Take the next untried alternative from the decision stack, popping
    /// exhausted frames along the way.
    Backtracking,
    Finished,
}

/// One run over a model's search tree.
///
/// Created via [`Model::solver`](crate::model::Model::solver) (or its
/// `solve`/`solve_all`/`optimize` shorthands). The search owns its own
/// domain store; the model it came from is never touched. It implements
/// `Iterator`, yielding every solution of the model on demand.
pub struct Search {
    constraints: Vec<Box<dyn Constraint>>,
    engine: PropagationEngine,
    variable_heuristic: Box<dyn VariableSelectionHeuristic>,
    value_heuristic: Box<dyn ValueOrderingHeuristic>,
    store: DomainStore,
    stack: Vec<Frame>,
    phase: Phase,
    rooted: bool,
    objective: Option<Objective>,
    cut: Option<ConstraintId>,
    budget: Budget,
    started: Instant,
    steps: u64,
    stats: SearchStats,
    status: Option<SearchStatus>,
}

impl Search {
    pub(crate) fn new(
        constraints: Vec<Box<dyn Constraint>>,
        store: DomainStore,
        objective: Option<Objective>,
    ) -> Self {
        let engine = PropagationEngine::new(&constraints);
        Self {
            constraints,
            engine,
            variable_heuristic: Box::new(MinimumRemainingValuesHeuristic),
            value_heuristic: Box::new(AscendingValueHeuristic),
            store,
            stack: Vec::new(),
            phase: Phase::Exploring,
            rooted: false,
            objective,
            cut: None,
            budget: Budget::unlimited(),
            started: Instant::now(),
            steps: 0,
            stats: SearchStats::default(),
            status: None,
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_variable_heuristic(
        mut self,
        heuristic: Box<dyn VariableSelectionHeuristic>,
    ) -> Self {
        self.variable_heuristic = heuristic;
        self
    }

    pub fn with_value_heuristic(mut self, heuristic: Box<dyn ValueOrderingHeuristic>) -> Self {
        self.value_heuristic = heuristic;
        self
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// `None` while the search can still produce solutions.
    pub fn status(&self) -> Option<SearchStatus> {
        self.status
    }

    fn finish(&mut self, status: SearchStatus) {
        self.phase = Phase::Finished;
        self.status = Some(status);
    }

    fn out_of_budget(&self) -> bool {
        if let Some(max_steps) = self.budget.max_steps {
            if self.steps >= max_steps {
                return true;
            }
        }
        if let Some(time_limit) = self.budget.time_limit {
            if self.started.elapsed() >= time_limit {
                return true;
            }
        }
        false
    }

    /// Resumes the search and returns the next solution, if any.
    ///
    /// Returns `Ok(None)` once the tree is exhausted or the budget expires;
    /// [`Search::status`] tells the two apart.
    pub fn next_solution(&mut self) -> Result<Option<Solution>> {
        if self.phase == Phase::Finished {
            return Ok(None);
        }
        if self.out_of_budget() {
            self.finish(SearchStatus::Cancelled);
            return Ok(None);
        }

        if !self.rooted {
            self.rooted = true;
            if self.store.has_empty_domain() {
                self.finish(SearchStatus::Exhausted);
                return Ok(None);
            }
            match self
                .engine
                .fixpoint(&self.constraints, self.store.clone(), &mut self.stats)?
            {
                Some(narrowed) => self.store = narrowed,
                None => {
                    self.finish(SearchStatus::Exhausted);
                    return Ok(None);
                }
            }
        }

        loop {
            if self.out_of_budget() {
                self.finish(SearchStatus::Cancelled);
                return Ok(None);
            }
            match self.phase {
                Phase::Exploring => {
                    if self.store.is_complete() {
                        self.stats.solutions += 1;
                        self.phase = Phase::Backtracking;
                        return Ok(Some(self.store.to_solution()));
                    }
                    let Some(variable) = self.variable_heuristic.select_variable(&self.store)
                    else {
                        // No branchable variable although the store is not
                        // complete: some domain can never be fixed.
                        self.finish(SearchStatus::Exhausted);
                        return Ok(None);
                    };
                    let candidates: VecDeque<i64> = self
                        .value_heuristic
                        .order_values(self.store.domain(variable))
                        .into();
                    debug!(variable, width = candidates.len(), "branching");
                    self.stack.push(Frame {
                        variable,
                        candidates,
                        saved: self.store.clone(),
                    });
                    self.phase = Phase::Backtracking;
                }
                Phase::Backtracking => {
                    let Some(frame) = self.stack.last_mut() else {
                        self.finish(SearchStatus::Exhausted);
                        return Ok(None);
                    };
                    match frame.candidates.pop_front() {
                        None => {
                            self.stack.pop();
                        }
                        Some(value) => {
                            self.steps += 1;
                            self.stats.nodes_visited += 1;
                            let variable = frame.variable;
                            let trial = frame.saved.update(variable, Domain::singleton(value));
                            match self.engine.fixpoint(
                                &self.constraints,
                                trial,
                                &mut self.stats,
                            )? {
                                Some(narrowed) => {
                                    self.store = narrowed;
                                    self.phase = Phase::Exploring;
                                }
                                None => {
                                    self.stats.backtracks += 1;
                                }
                            }
                        }
                    }
                }
                Phase::Finished => return Ok(None),
            }
        }
    }

    /// Runs branch-and-bound to completion and returns the best solution.
    ///
    /// After every solution a strengthening bound is posted on the objective
    /// variable, so each further solution strictly improves on the last.
    pub fn optimize(mut self) -> Result<Optimum> {
        let Some(objective) = self.objective else {
            return Err(Error::NoObjective);
        };

        let mut best = None;
        let mut trail = Vec::new();
        while let Some(solution) = self.next_solution()? {
            let value = solution.value(objective.variable);
            debug!(value, "improving solution");
            trail.push(value);
            best = Some(solution);
            self.strengthen(objective, value);
        }

        Ok(Optimum {
            best,
            trail,
            status: self.status.unwrap_or(SearchStatus::Exhausted),
            stats: self.stats,
        })
    }

    /// Posts (or tightens) the bound that future solutions must beat.
    fn strengthen(&mut self, objective: Objective, incumbent: i64) {
        let cut = BoundCut {
            variable: [objective.variable],
            direction: objective.direction,
            incumbent,
        };
        match self.cut {
            Some(constraint_id) => self.constraints[constraint_id] = Box::new(cut),
            None => {
                let constraint_id = self.constraints.len();
                self.engine.register(constraint_id, &[objective.variable]);
                self.constraints.push(Box::new(cut));
                self.cut = Some(constraint_id);
            }
        }
    }
}

impl Iterator for Search {
    type Item = Result<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_solution().transpose()
    }
}

/// The strengthening bound branch-and-bound posts on the objective variable
/// after each incumbent: `objective < incumbent` when minimising,
/// `objective > incumbent` when maximising.
#[derive(Debug, Clone)]
struct BoundCut {
    variable: [VariableId; 1],
    direction: Direction,
    incumbent: i64,
}

impl Constraint for BoundCut {
    fn scope(&self) -> &[VariableId] {
        &self.variable
    }

    fn descriptor(&self) -> ConstraintDescriptor {
        let op = match self.direction {
            Direction::Minimize => "<",
            Direction::Maximize => ">",
        };
        ConstraintDescriptor {
            name: "BoundCut".to_string(),
            description: format!("?{} {op} {}", self.variable[0], self.incumbent),
        }
    }

    fn propagate(&self, store: &DomainStore) -> Result<Option<DomainStore>> {
        let domain = store.domain(self.variable[0]);
        let narrowed = match self.direction {
            Direction::Minimize => domain.restrict(i64::MIN, self.incumbent.saturating_sub(1)),
            Direction::Maximize => domain.restrict(self.incumbent.saturating_add(1), i64::MAX),
        };
        if narrowed.len() < domain.len() {
            Ok(Some(store.update(self.variable[0], narrowed)))
        } else {
            Ok(None)
        }
    }
}
