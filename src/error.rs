use crate::solver::variable::VariableId;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported while assembling a model.
///
/// Nothing that happens during solving is an error: a wiped-out domain
/// triggers backtracking, and exhausting the whole search tree is reported
/// as an absent solution rather than a failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid constraint: {reason}")]
    InvalidConstraint { reason: String },

    #[error("unknown variable ?{0}")]
    UnknownVariable(VariableId),

    #[error("model has no objective; call minimize() or maximize() before optimizing")]
    NoObjective,
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidConstraint {
            reason: reason.into(),
        }
    }
}
