//! Top-level error boundary.

use crate::models::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Drop everything and start over at the current path.
    Reload,
    /// Clear the error and try the failed view again.
    Retry,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryAction::Reload => "Refresh Page",
            RecoveryAction::Retry => "Try Again",
        }
    }
}

/// Replaces the whole interactive surface with a recovery panel once a
/// view fails. Stays tripped until the user picks a recovery action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorBoundary {
    #[default]
    Clear,
    Tripped {
        view: ViewId,
        message: String,
    },
}

impl ErrorBoundary {
    /// Record a failure. The first failure wins until cleared.
    pub fn trip(&mut self, view: ViewId, message: impl Into<String>) {
        if matches!(self, ErrorBoundary::Clear) {
            *self = ErrorBoundary::Tripped {
                view,
                message: message.into(),
            };
        }
    }

    pub fn clear(&mut self) {
        *self = ErrorBoundary::Clear;
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self, ErrorBoundary::Tripped { .. })
    }

    pub fn failed_view(&self) -> Option<ViewId> {
        match self {
            ErrorBoundary::Tripped { view, .. } => Some(*view),
            ErrorBoundary::Clear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_wins() {
        let mut boundary = ErrorBoundary::default();
        boundary.trip(ViewId::Poc, "load failed");
        boundary.trip(ViewId::Contact, "later failure");
        assert_eq!(boundary.failed_view(), Some(ViewId::Poc));

        boundary.clear();
        assert!(!boundary.is_tripped());
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(RecoveryAction::Reload.label(), "Refresh Page");
        assert_eq!(RecoveryAction::Retry.label(), "Try Again");
    }
}
