use serde::{Deserialize, Serialize};

/// Identifies a variable within one model.
pub type VariableId = u32;

/// A named integer variable.
///
/// The id is the identity; the name exists purely for diagnostics and
/// descriptors. A constant is an ordinary variable whose initial domain is a
/// singleton — there is no separate fixed-variable type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
}
