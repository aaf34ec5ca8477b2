use serde::Serialize;

/// States of a reconciliation pass.
///
/// `Idle -> Loading -> Grouping -> Reconciling -> Mapping -> Aggregating ->
/// Notifying -> Idle`. A failure in any state aborts the whole pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPhase {
    Idle,
    Loading,
    Grouping,
    Reconciling,
    Mapping,
    Aggregating,
    Notifying,
}

impl PassPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Grouping => "grouping",
            Self::Reconciling => "reconciling",
            Self::Mapping => "mapping",
            Self::Aggregating => "aggregating",
            Self::Notifying => "notifying",
        }
    }

    /// The state that follows this one in a successful pass.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Loading,
            Self::Loading => Self::Grouping,
            Self::Grouping => Self::Reconciling,
            Self::Reconciling => Self::Mapping,
            Self::Mapping => Self::Aggregating,
            Self::Aggregating => Self::Notifying,
            Self::Notifying => Self::Idle,
        }
    }
}

impl std::fmt::Display for PassPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
