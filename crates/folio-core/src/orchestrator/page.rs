//! The page orchestrator: routing, lazy content, readiness, transitions,
//! scroll-spy and the error boundary behind one state object owned by the
//! UI loop.

use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::boundary::{ErrorBoundary, RecoveryAction};
use super::loader::ViewLoader;
use super::readiness::{Connectivity, ReadinessSignal, ReadinessState, ReadinessTracker};
use super::router::{Resolution, RouteTable};
use super::scroll_spy::{ScrollSpy, ScrollState, SectionBounds};
use super::source::ViewSource;
use super::transition::{Choreographer, TransitionEvent, TransitionFrame};
use crate::config::OrchestratorConfig;
use crate::models::{SectionId, ViewContent, ViewId};

/// What the main area should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface<'a> {
    /// The error boundary tripped.
    Recovery { view: ViewId, message: &'a str },
    /// The view's content has not arrived yet.
    LoadingIndicator(ViewId),
    /// Content is here but the view is not ready.
    Skeleton(ViewId),
    Ready(ViewId, &'a ViewContent),
}

pub struct PageOrchestrator<S> {
    config: OrchestratorConfig,
    routes: RouteTable,
    loader: ViewLoader<S>,
    connectivity: Connectivity,
    route: Resolution,
    /// Bumped on every navigation that changes the routed view.
    generation: u64,
    /// Readiness of each mounted view: the routed one, plus the outgoing
    /// one until its exit animation finishes.
    mounted: HashMap<ViewId, ReadinessTracker>,
    choreographer: Choreographer,
    scroll: ScrollState,
    spy: ScrollSpy,
    boundary: ErrorBoundary,
    menu_open: bool,
}

impl<S: ViewSource> PageOrchestrator<S> {
    /// Create the orchestrator and start loading the default view. Must be
    /// called inside a tokio runtime.
    pub fn new(
        source: S,
        routes: RouteTable,
        config: OrchestratorConfig,
        connectivity: Connectivity,
    ) -> Self {
        let default_view = routes.default_view();
        let mut loader = ViewLoader::new(source);
        loader.request(default_view, 0);

        Self {
            choreographer: Choreographer::new(default_view, config.transition_duration()),
            spy: ScrollSpy::new(config.scroll_margin, config.frame_interval()),
            route: Resolution {
                view: default_view,
                path: default_view.path(),
                redirected: false,
            },
            config,
            routes,
            loader,
            connectivity,
            generation: 0,
            mounted: HashMap::new(),
            scroll: ScrollState::default(),
            boundary: ErrorBoundary::default(),
            menu_open: false,
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to `path`. The first navigation shows its view at once;
    /// later ones animate.
    pub fn navigate(&mut self, path: &str, now: Instant) -> &Resolution {
        let resolution = self.routes.resolve(path);
        self.menu_open = false;
        if resolution.redirected {
            debug!(requested = path, to = %resolution.path, "Redirecting");
        }

        if self.generation > 0 && resolution.view == self.route.view {
            self.route = resolution;
            return &self.route;
        }
        let animate = self.generation > 0;
        self.enter(resolution, now, animate);
        &self.route
    }

    pub fn navigate_view(&mut self, view: ViewId, now: Instant) -> &Resolution {
        self.navigate(&view.path(), now)
    }

    fn enter(&mut self, resolution: Resolution, now: Instant, animate: bool) {
        self.generation += 1;
        let view = resolution.view;
        self.route = resolution;

        if animate {
            let displayed = self.choreographer.displayed();
            self.mounted.retain(|v, _| *v == displayed);
            self.choreographer.start(view, now);
        } else {
            self.mounted.clear();
            self.choreographer.reset(view);
            self.reset_scroll();
        }

        if self.loader.is_loaded(view) {
            self.mount(view);
        } else {
            self.loader.request(view, self.generation);
        }
        info!(path = %self.route.path, %view, generation = self.generation, "Navigated");
    }

    fn mount(&mut self, view: ViewId) {
        let delay = self.config.readiness_delay(view);
        self.mounted
            .insert(view, ReadinessTracker::spawn(view, delay, &self.connectivity));
    }

    fn reset_scroll(&mut self) {
        self.scroll.reset();
        self.spy.reset();
    }

    // ========================================================================
    // Per-frame work
    // ========================================================================

    /// Advance animations and the throttled scroll-spy.
    pub fn tick(&mut self, now: Instant) -> Option<TransitionEvent> {
        let event = self.choreographer.tick(now);
        if let Some(TransitionEvent::ExitComplete { to }) = event {
            self.mounted.retain(|v, _| *v == to);
            self.reset_scroll();
        }

        if let Some(offset) = self.scroll.tick(now) {
            self.spy.on_scroll(offset);
        }
        if self.spy_enabled() {
            if let Some(section) = self.spy.tick(now) {
                debug!(?section, "Active section changed");
            }
        }
        event
    }

    /// Apply finished content loads. Returns how many were applied.
    pub fn poll_loads(&mut self) -> usize {
        let mut applied = 0;
        for load in self.loader.poll() {
            let current = load.generation == self.generation && load.view == self.route.view;
            match load.result {
                Ok(content) if current => {
                    self.loader.accept(load.view, content);
                    self.mount(load.view);
                    applied += 1;
                }
                // The default view is loaded eagerly, so keep it even when
                // the route has moved on.
                Ok(content) if load.view == self.routes.default_view() => {
                    self.loader.accept(load.view, content);
                }
                Err(e) if current => {
                    warn!(view = %load.view, error = %e, "View failed to load");
                    self.boundary.trip(load.view, e.to_string());
                    applied += 1;
                }
                _ => {
                    debug!(view = %load.view, generation = load.generation, "Discarding superseded load");
                }
            }
        }
        applied
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    /// Geometry of the displayed view: total rows, visible rows, and the
    /// home view's section bounds.
    pub fn set_layout(&mut self, content_height: usize, viewport_height: usize, sections: Vec<SectionBounds>) {
        self.scroll.set_extent(content_height, viewport_height);
        self.spy.set_layout(sections);
    }

    pub fn scroll_by(&mut self, delta: isize) -> usize {
        if self.choreographer.interactive().is_none() {
            return self.scroll.offset();
        }
        let offset = self.scroll.scroll_by(delta);
        self.spy.on_scroll(offset);
        offset
    }

    /// A scroll reported by the host, e.g. a scrollbar drag.
    pub fn on_scroll(&mut self, offset: usize) {
        let offset = self.scroll.scroll_to(offset);
        self.spy.on_scroll(offset);
    }

    /// Highlight `section` immediately and smooth-scroll to it.
    pub fn select_section(&mut self, section: SectionId, now: Instant) -> bool {
        self.menu_open = false;
        if !self.spy_enabled() || self.choreographer.interactive().is_none() {
            return false;
        }
        match self.spy.select(section) {
            Some(top) => {
                self.scroll
                    .smooth_to(top, now, self.config.smooth_scroll_duration());
                true
            }
            None => false,
        }
    }

    fn spy_enabled(&self) -> bool {
        self.choreographer.displayed() == self.routes.default_view()
    }

    // ========================================================================
    // Signals and recovery
    // ========================================================================

    /// Deliver a readiness signal. Connectivity signals update the shared
    /// connectivity flag; others go to the routed view.
    pub fn signal(&mut self, signal: ReadinessSignal) {
        match signal {
            ReadinessSignal::Online => {
                self.connectivity.set_online(true);
            }
            ReadinessSignal::Offline => {
                self.connectivity.set_online(false);
            }
            other => {
                if let Some(tracker) = self.mounted.get(&self.route.view) {
                    tracker.signal(other);
                }
            }
        }
    }

    pub fn recover(&mut self, action: RecoveryAction, now: Instant) {
        let failed = self.boundary.failed_view();
        self.boundary.clear();
        match action {
            RecoveryAction::Retry => {
                if let Some(view) = failed {
                    info!(%view, "Retrying view");
                    self.loader.forget(view);
                    if view == self.route.view {
                        self.loader.request(view, self.generation);
                    }
                }
            }
            RecoveryAction::Reload => {
                info!(path = %self.route.path, "Reloading");
                self.loader.clear();
                let resolution = self.routes.resolve(&self.route.path);
                self.enter(resolution, now, false);
            }
        }
    }

    // ========================================================================
    // Menu
    // ========================================================================

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn surface(&self) -> Surface<'_> {
        if let ErrorBoundary::Tripped { view, message } = &self.boundary {
            return Surface::Recovery {
                view: *view,
                message,
            };
        }

        let view = self.choreographer.displayed();
        let Some(content) = self.loader.content(view) else {
            return Surface::LoadingIndicator(view);
        };
        match self.mounted.get(&view) {
            Some(tracker) if tracker.is_ready() => Surface::Ready(view, content),
            _ => Surface::Skeleton(view),
        }
    }

    pub fn route(&self) -> &Resolution {
        &self.route
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn displayed_view(&self) -> ViewId {
        self.choreographer.displayed()
    }

    pub fn content(&self, view: ViewId) -> Option<&ViewContent> {
        self.loader.content(view)
    }

    pub fn is_interactive(&self) -> bool {
        self.choreographer.interactive().is_some() && !self.boundary.is_tripped()
    }

    pub fn transition_frame(&self, now: Instant) -> TransitionFrame {
        self.choreographer.frame(now)
    }

    /// Highlighted section, only while the home view is on screen.
    pub fn active_section(&self) -> Option<SectionId> {
        self.spy_enabled().then(|| self.spy.active())
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll.offset()
    }

    pub fn readiness(&self, view: ViewId) -> Option<ReadinessState> {
        self.mounted.get(&view).map(|t| t.state())
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
