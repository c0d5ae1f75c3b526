//! Page orchestrator.
//!
//! Maps the current path to a view, loads the view's content on demand,
//! tracks per-view readiness, choreographs transitions, and keeps the
//! navigation highlight in sync with the scroll position.

pub mod boundary;
pub mod loader;
pub mod page;
pub mod readiness;
pub mod router;
pub mod scroll_spy;
pub mod source;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use boundary::{ErrorBoundary, RecoveryAction};
pub use loader::{LoadResult, ViewLoader};
pub use page::{PageOrchestrator, Surface};
pub use readiness::{Connectivity, ReadinessSignal, ReadinessState, ReadinessTracker, ViewReadiness};
pub use router::{normalize, Resolution, RouteTable};
pub use scroll_spy::{compute_active, ScrollSpy, ScrollState, SectionBounds};
pub use source::{BundledSource, ContentSource, LoadError, RemoteSource, ViewSource};
pub use transition::{Choreographer, CubicBezier, TransitionEvent, TransitionFrame};
