//! Scroll position tracking and the home view's scroll-spy.
//!
//! Offsets and section geometry are in terminal rows.

use std::time::Duration;

use tokio::time::Instant;

use super::transition::CubicBezier;
use crate::models::SectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub section: SectionId,
    pub top: usize,
    pub height: usize,
}

impl SectionBounds {
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }
}

/// The last section, in document order, that starts at or before
/// `offset + margin` and ends after `offset - margin`. Falls back to the
/// first section; `None` only when there are no sections.
pub fn compute_active(sections: &[SectionBounds], offset: usize, margin: usize) -> Option<SectionId> {
    sections
        .iter()
        .rev()
        .find(|s| s.top.saturating_sub(margin) <= offset && s.bottom() + margin > offset)
        .or_else(|| sections.first())
        .map(|s| s.section)
}

/// Highlights the section being read. Scroll notifications are coalesced
/// and evaluated at most once per frame.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    sections: Vec<SectionBounds>,
    margin: usize,
    frame: Duration,
    active: SectionId,
    pending: Option<usize>,
    last_eval: Option<Instant>,
}

impl ScrollSpy {
    pub fn new(margin: usize, frame: Duration) -> Self {
        Self {
            sections: Vec::new(),
            margin,
            frame,
            active: SectionId::ALL[0],
            pending: None,
            last_eval: None,
        }
    }

    pub fn active(&self) -> SectionId {
        self.active
    }

    pub fn sections(&self) -> &[SectionBounds] {
        &self.sections
    }

    /// Replace the section geometry, e.g. after a resize.
    pub fn set_layout(&mut self, sections: Vec<SectionBounds>) {
        self.sections = sections;
    }

    /// Back to the first section with no pending work.
    pub fn reset(&mut self) {
        self.active = self
            .sections
            .first()
            .map(|s| s.section)
            .unwrap_or(SectionId::ALL[0]);
        self.pending = None;
    }

    /// Record a scroll; only the latest offset per frame is evaluated.
    pub fn on_scroll(&mut self, offset: usize) {
        self.pending = Some(offset);
    }

    /// Evaluate the pending scroll if a frame has passed since the last
    /// evaluation. Returns the new active section if it changed.
    pub fn tick(&mut self, now: Instant) -> Option<SectionId> {
        let offset = self.pending?;
        if let Some(last) = self.last_eval {
            if now.saturating_duration_since(last) < self.frame {
                return None;
            }
        }
        self.pending = None;
        self.last_eval = Some(now);

        let active = compute_active(&self.sections, offset, self.margin)?;
        if active == self.active {
            return None;
        }
        self.active = active;
        Some(active)
    }

    /// Highlight `section` at once and return the offset to scroll to.
    pub fn select(&mut self, section: SectionId) -> Option<usize> {
        self.active = section;
        self.sections
            .iter()
            .find(|s| s.section == section)
            .map(|s| s.top)
    }
}

#[derive(Debug, Clone, Copy)]
struct SmoothScroll {
    from: usize,
    to: usize,
    started: Instant,
    duration: Duration,
}

/// Scroll offset of the displayed view, clamped to its content.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    offset: usize,
    content_height: usize,
    viewport_height: usize,
    animation: Option<SmoothScroll>,
}

impl ScrollState {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_extent(&mut self, content_height: usize, viewport_height: usize) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Jump to `offset`, cancelling any smooth scroll.
    pub fn scroll_to(&mut self, offset: usize) -> usize {
        self.animation = None;
        self.offset = offset.min(self.max_offset());
        self.offset
    }

    pub fn scroll_by(&mut self, delta: isize) -> usize {
        let target = self.offset.saturating_add_signed(delta);
        self.scroll_to(target)
    }

    pub fn smooth_to(&mut self, target: usize, now: Instant, duration: Duration) {
        let to = target.min(self.max_offset());
        if to == self.offset {
            self.animation = None;
            return;
        }
        self.animation = Some(SmoothScroll {
            from: self.offset,
            to,
            started: now,
            duration,
        });
    }

    /// Advance a smooth scroll. Returns the new offset if it moved.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let anim = self.animation?;
        let elapsed = now.saturating_duration_since(anim.started);
        let progress = if anim.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / anim.duration.as_secs_f32()).min(1.0)
        };
        if progress >= 1.0 {
            self.animation = None;
        }

        let eased = CubicBezier::EASE_IN_OUT.ease(progress);
        let span = anim.to as f32 - anim.from as f32;
        let next = (anim.from as f32 + span * eased).round().max(0.0) as usize;
        let next = next.min(self.max_offset());
        if next == self.offset {
            return None;
        }
        self.offset = next;
        Some(next)
    }

    pub fn reset(&mut self) {
        self.animation = None;
        self.offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Five sections: About 10..30, Education 30..45, Skills 45..70,
    /// Certificate 70..80, Experience 80..120.
    fn layout() -> Vec<SectionBounds> {
        [(10, 20), (30, 15), (45, 25), (70, 10), (80, 40)]
            .into_iter()
            .zip(SectionId::ALL)
            .map(|((top, height), section)| SectionBounds { section, top, height })
            .collect()
    }

    #[test]
    fn test_active_section_from_offset() {
        let sections = layout();
        assert_eq!(compute_active(&sections, 50, 3), Some(SectionId::Skills));
        // Lookahead: three rows before Skills starts already counts.
        assert_eq!(compute_active(&sections, 42, 3), Some(SectionId::Skills));
        assert_eq!(compute_active(&sections, 41, 3), Some(SectionId::Education));
        // Above the first section.
        assert_eq!(compute_active(&sections, 0, 3), Some(SectionId::About));
        // Past the end falls back to the first section.
        assert_eq!(compute_active(&sections, 500, 3), Some(SectionId::About));
        assert_eq!(compute_active(&[], 10, 3), None);
    }

    #[test]
    fn test_spy_throttles_to_frame() {
        let t0 = Instant::now();
        let frame = Duration::from_millis(16);
        let mut spy = ScrollSpy::new(3, frame);
        spy.set_layout(layout());

        spy.on_scroll(50);
        assert_eq!(spy.tick(t0), Some(SectionId::Skills));

        spy.on_scroll(72);
        spy.on_scroll(85);
        assert_eq!(spy.tick(t0 + Duration::from_millis(5)), None);
        assert_eq!(spy.active(), SectionId::Skills);
        // Only the latest offset is evaluated.
        assert_eq!(spy.tick(t0 + frame), Some(SectionId::Experience));
        assert_eq!(spy.tick(t0 + frame * 3), None);
    }

    #[test]
    fn test_select_is_optimistic() {
        let mut spy = ScrollSpy::new(3, Duration::from_millis(16));
        spy.set_layout(layout());
        assert_eq!(spy.select(SectionId::Certificate), Some(70));
        assert_eq!(spy.active(), SectionId::Certificate);
    }

    #[test]
    fn test_scroll_state_clamps() {
        let mut scroll = ScrollState::default();
        scroll.set_extent(120, 20);
        assert_eq!(scroll.scroll_by(-5), 0);
        assert_eq!(scroll.scroll_by(30), 30);
        assert_eq!(scroll.scroll_to(500), 100);
        scroll.set_extent(50, 20);
        assert_eq!(scroll.offset(), 30);
    }

    #[test]
    fn test_smooth_scroll_reaches_target() {
        let t0 = Instant::now();
        let duration = Duration::from_millis(300);
        let mut scroll = ScrollState::default();
        scroll.set_extent(120, 20);
        scroll.smooth_to(70, t0, duration);

        let mid = scroll.tick(t0 + Duration::from_millis(150)).expect("moved");
        assert!(mid > 0 && mid < 70);
        assert_eq!(scroll.tick(t0 + duration), Some(70));
        assert!(!scroll.is_animating());
        assert_eq!(scroll.tick(t0 + duration * 2), None);
    }
}
