use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::solver::variable::VariableId;

/// A complete assignment of one concrete value per variable.
///
/// Solutions are independent snapshots: they stay valid while the search
/// that produced them keeps backtracking or is dropped altogether.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    values: HashMap<VariableId, i64>,
}

impl Solution {
    pub(crate) fn new(values: HashMap<VariableId, i64>) -> Self {
        Self { values }
    }

    pub fn get(&self, var: VariableId) -> Option<i64> {
        self.values.get(&var).copied()
    }

    /// The assigned value of `var`.
    ///
    /// # Panics
    ///
    /// Panics when `var` is not part of the model this solution came from.
    pub fn value(&self, var: VariableId) -> i64 {
        match self.values.get(&var) {
            Some(value) => *value,
            None => panic!("variable ?{var} is not part of this solution"),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, i64)> + '_ {
        self.values.iter().map(|(var, value)| (*var, *value))
    }
}
