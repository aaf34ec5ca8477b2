use roomcat_core::error::CoreError;
use roomcat_core::rfc::PassPhase;

/// Failure of a reconciliation pass. Any variant aborts the whole pass and
/// rolls back its transaction.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Malformed feature data on a changed room unit.
    #[error(transparent)]
    Validation(CoreError),

    /// A storage-layer failure, tagged with the phase it happened in.
    #[error("Persistence failure during {phase}")]
    Persistence {
        phase: PassPhase,
        #[source]
        source: sqlx::Error,
    },

    /// Any other domain failure, propagated unchanged.
    #[error(transparent)]
    Core(CoreError),
}

impl ReconcileError {
    /// The phase a persistence failure happened in, if any.
    pub fn phase(&self) -> Option<PassPhase> {
        match self {
            Self::Persistence { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

impl From<CoreError> for ReconcileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(_) => Self::Validation(err),
            other => Self::Core(other),
        }
    }
}

/// `map_err` adapter wrapping a storage error with the current phase.
pub(crate) fn persistence(phase: PassPhase) -> impl FnOnce(sqlx::Error) -> ReconcileError {
    move |source| ReconcileError::Persistence { phase, source }
}
