//! Slide/fade choreography between views.
//!
//! The outgoing view exits first; the incoming view enters once the exit
//! finishes. A navigation during a transition restarts the sequence from
//! whatever view is currently on screen.

use std::time::Duration;

use tokio::time::Instant;

use crate::models::ViewId;

/// Scale applied at the start of an enter and the end of an exit.
const MIN_SCALE: f32 = 0.98;

/// Cubic-bezier timing curve with fixed end points (0,0) and (1,1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl CubicBezier {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Curve used for view transitions.
    pub const PAGE: CubicBezier = CubicBezier::new(0.25, 0.46, 0.45, 0.94);

    /// Standard ease-in-out, used for smooth scrolling.
    pub const EASE_IN_OUT: CubicBezier = CubicBezier::new(0.42, 0.0, 0.58, 1.0);

    fn sample(a1: f32, a2: f32, t: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * t * a1 + 3.0 * u * t * t * a2 + t * t * t
    }

    fn slope(a1: f32, a2: f32, t: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * a1 + 6.0 * u * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    /// Eased value for linear progress `x` in `[0, 1]`.
    pub fn ease(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }

        // Newton-Raphson, falling back to bisection when the slope is flat.
        let mut t = x;
        for _ in 0..8 {
            let err = Self::sample(self.x1, self.x2, t) - x;
            if err.abs() < 1e-5 {
                return Self::sample(self.y1, self.y2, t);
            }
            let d = Self::slope(self.x1, self.x2, t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        t = x;
        for _ in 0..32 {
            let v = Self::sample(self.x1, self.x2, t);
            if (v - x).abs() < 1e-5 {
                break;
            }
            if v < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        Self::sample(self.y1, self.y2, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Exiting { to: ViewId, started: Instant },
    Entering { started: Instant },
}

/// Where and how to draw the view on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub view: ViewId,
    /// Horizontal offset as a fraction of the content width; negative is
    /// left of the resting position.
    pub offset: f32,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The outgoing view is gone and `to` is now on screen.
    ExitComplete { to: ViewId },
    EnterComplete(ViewId),
}

#[derive(Debug, Clone)]
pub struct Choreographer {
    displayed: ViewId,
    phase: Phase,
    duration: Duration,
}

impl Choreographer {
    pub fn new(initial: ViewId, duration: Duration) -> Self {
        Self {
            displayed: initial,
            phase: Phase::Idle,
            duration,
        }
    }

    /// View currently on screen.
    pub fn displayed(&self) -> ViewId {
        self.displayed
    }

    /// The view accepting input, if any. Nothing is interactive while a
    /// view is exiting.
    pub fn interactive(&self) -> Option<ViewId> {
        match self.phase {
            Phase::Exiting { .. } => None,
            _ => Some(self.displayed),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Start a transition to `to`.
    pub fn start(&mut self, to: ViewId, now: Instant) {
        if to == self.displayed && self.phase == Phase::Idle {
            return;
        }
        self.phase = Phase::Exiting { to, started: now };
    }

    /// Jump straight to `view` with no animation.
    pub fn reset(&mut self, view: ViewId) {
        self.displayed = view;
        self.phase = Phase::Idle;
    }

    fn progress(&self, started: Instant, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Advance phases. At most one phase boundary is crossed per call.
    pub fn tick(&mut self, now: Instant) -> Option<TransitionEvent> {
        match self.phase {
            Phase::Idle => None,
            Phase::Exiting { to, started } => {
                if self.progress(started, now) < 1.0 {
                    return None;
                }
                self.displayed = to;
                self.phase = Phase::Entering { started: now };
                Some(TransitionEvent::ExitComplete { to })
            }
            Phase::Entering { started } => {
                if self.progress(started, now) < 1.0 {
                    return None;
                }
                self.phase = Phase::Idle;
                Some(TransitionEvent::EnterComplete(self.displayed))
            }
        }
    }

    pub fn frame(&self, now: Instant) -> TransitionFrame {
        let rest = TransitionFrame {
            view: self.displayed,
            offset: 0.0,
            opacity: 1.0,
            scale: 1.0,
        };
        match self.phase {
            Phase::Idle => rest,
            Phase::Exiting { started, .. } => {
                let p = CubicBezier::PAGE.ease(self.progress(started, now));
                TransitionFrame {
                    offset: -p,
                    opacity: 1.0 - p,
                    scale: 1.0 - (1.0 - MIN_SCALE) * p,
                    ..rest
                }
            }
            Phase::Entering { started } => {
                let p = CubicBezier::PAGE.ease(self.progress(started, now));
                TransitionFrame {
                    offset: 1.0 - p,
                    opacity: p,
                    scale: MIN_SCALE + (1.0 - MIN_SCALE) * p,
                    ..rest
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_easing_endpoints_and_monotonic() {
        let curve = CubicBezier::PAGE;
        assert_eq!(curve.ease(0.0), 0.0);
        assert_eq!(curve.ease(1.0), 1.0);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = curve.ease(i as f32 / 20.0);
            assert!(v >= last);
            last = v;
        }
        // Ease-out shape: ahead of linear at the midpoint.
        assert!(curve.ease(0.5) > 0.5);
        assert!(approx(CubicBezier::EASE_IN_OUT.ease(0.5), 0.5));
    }

    #[test]
    fn test_exit_then_enter() {
        let t0 = Instant::now();
        let mut c = Choreographer::new(ViewId::Home, 800 * MS);
        c.start(ViewId::Project, t0);
        assert_eq!(c.interactive(), None);
        assert_eq!(c.frame(t0).view, ViewId::Home);

        assert_eq!(c.tick(t0 + 799 * MS), None);
        let mid = c.frame(t0 + 400 * MS);
        assert!(mid.offset < 0.0 && mid.offset > -1.0);
        assert!(mid.scale < 1.0 && mid.scale > MIN_SCALE);

        assert_eq!(
            c.tick(t0 + 800 * MS),
            Some(TransitionEvent::ExitComplete { to: ViewId::Project })
        );
        assert_eq!(c.displayed(), ViewId::Project);
        assert_eq!(c.interactive(), Some(ViewId::Project));
        let entering = c.frame(t0 + 800 * MS);
        assert!(approx(entering.offset, 1.0));
        assert!(approx(entering.scale, MIN_SCALE));
        assert!(approx(entering.opacity, 0.0));

        assert_eq!(
            c.tick(t0 + 1600 * MS),
            Some(TransitionEvent::EnterComplete(ViewId::Project))
        );
        assert!(!c.is_animating());
        assert_eq!(c.frame(t0 + 1600 * MS).offset, 0.0);
    }

    #[test]
    fn test_new_navigation_restarts_sequence() {
        let t0 = Instant::now();
        let mut c = Choreographer::new(ViewId::Home, 800 * MS);
        c.start(ViewId::Project, t0);
        c.start(ViewId::Contact, t0 + 500 * MS);

        assert_eq!(c.tick(t0 + 900 * MS), None);
        assert_eq!(
            c.tick(t0 + 1300 * MS),
            Some(TransitionEvent::ExitComplete { to: ViewId::Contact })
        );
    }

    #[test]
    fn test_same_view_is_noop() {
        let t0 = Instant::now();
        let mut c = Choreographer::new(ViewId::Poc, 800 * MS);
        c.start(ViewId::Poc, t0);
        assert!(!c.is_animating());
    }
}
