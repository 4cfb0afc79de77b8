//! Necto is a finite-domain constraint satisfaction and optimisation solver.
//!
//! A problem is assembled as a [`Model`]: integer variables over finite
//! domains, constraints chosen from a fixed set of [`ConstraintKind`]
//! records, and optionally an objective variable to minimise or maximise.
//! Solving interleaves constraint propagation to a fixpoint with
//! backtracking depth-first search; optimisation is plain branch-and-bound,
//! posting a strengthening bound after every solution.
//!
//! # Core Concepts
//!
//! - **[`Model`]**: the container you declare variables and constraints in,
//!   and the entry point to `solve`, `solve_all` and `optimize`.
//! - **[`ConstraintKind`]**: immutable constraint records (`AllDifferent`,
//!   `Sum`, `Cardinality`, ...), validated when posted and compiled into
//!   propagators when a search starts.
//! - **[`Search`]**: one resumable run over the search tree; an `Iterator`
//!   over solutions with an optional step/time [`Budget`].
//!
//! # Example: a two-variable problem
//!
//! `?a` may be 1 or 2, `?b` is fixed to 1, and the two must differ; the
//! solver deduces `?a = 2`.
//!
//! ```
//! use necto::model::Model;
//! use necto::solver::constraint::ConstraintKind;
//!
//! let mut model = Model::new("intro");
//! let a = model.int_var("a", 1, 2);
//! let b = model.fixed_var("b", 1);
//! model.post(ConstraintKind::AllDifferent { vars: vec![a, b] })?;
//!
//! let solution = model.solve()?.expect("satisfiable");
//! assert_eq!(solution.value(a), 2);
//! assert_eq!(solution.value(b), 1);
//! # Ok::<(), necto::error::Error>(())
//! ```
//!
//! [`Model`]: crate::model::Model
//! [`ConstraintKind`]: crate::solver::constraint::ConstraintKind
//! [`Search`]: crate::solver::search::Search
//! [`Budget`]: crate::solver::search::Budget

pub mod error;
pub mod model;
pub mod solver;
