//! Application state for folio.
//!
//! `App` owns the page orchestrator, the offline cache worker handle, the
//! contact form, and the channel that background tasks report through.

use std::time::Duration;

use anyhow::Result;
use folio_core::config::Config;
use folio_core::contact::{
    self, ContactField, ContactForm, EmailJsRelay, SubmitStatus, MSG_FAILED, MSG_MISSING_FIELDS,
};
use folio_core::models::{ViewContent, ViewId};
use folio_core::offline::{CacheStatus, Request, WorkerHandle};
use folio_core::orchestrator::{
    BundledSource, Connectivity, ContentSource, PageOrchestrator, ReadinessSignal, RecoveryAction,
    RemoteSource, RouteTable, Surface,
};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::network;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Background work is a handful of one-off tasks; 16 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: isize = 10;

/// Rows per mouse wheel notch.
pub const WHEEL_SCROLL_SIZE: isize = 3;

/// One full skeleton pulse, dim to bright and back.
const PULSE_PERIOD: Duration = Duration::from_secs(2);

/// Maximum length for single-line contact form fields.
const MAX_FIELD_LENGTH: usize = 120;

/// Maximum length for the contact message.
const MAX_MESSAGE_LENGTH: usize = 2000;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Focus within the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Field(ContactField),
    Send,
}

impl FormFocus {
    pub fn next(&self) -> Self {
        match self {
            FormFocus::Field(ContactField::Message) => FormFocus::Send,
            FormFocus::Field(field) => FormFocus::Field(field.next()),
            FormFocus::Send => FormFocus::Field(ContactField::Name),
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormFocus::Field(ContactField::Name) => FormFocus::Send,
            FormFocus::Field(field) => FormFocus::Field(field.prev()),
            FormFocus::Send => FormFocus::Field(ContactField::Message),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks.
enum BackgroundResult {
    /// Offline cache installed and activated
    Registered(CacheStatus),
    /// Registration failed; the previous cache generation stays in use
    RegistrationFailed(String),
    /// Fresh cache status for the status bar
    CacheStatus(CacheStatus),
    /// The profile image for the given navigation generation finished loading
    ImageLoaded(u64),
    /// Contact form send finished
    Submitted(SubmitStatus),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub orchestrator: PageOrchestrator<ContentSource>,
    pub connectivity: Connectivity,
    worker: Option<WorkerHandle>,
    origin: Option<Url>,
    relay: Option<EmailJsRelay>,

    // UI state
    pub state: AppState,
    pub status_message: Option<String>,
    pub cache_status: Option<CacheStatus>,
    /// Current skeleton brightness, 0.0 to 1.0, advanced every tick.
    pub skeleton_pulse: f32,
    started: Instant,

    // Contact form state
    pub form: ContactForm,
    pub form_focus: FormFocus,
    pub editing_form: bool,
    pub submit_status: SubmitStatus,

    /// Navigation generation the profile image was last requested for.
    image_generation: Option<u64>,

    // Background task channel
    tx: mpsc::Sender<BackgroundResult>,
    rx: mpsc::Receiver<BackgroundResult>,
}

impl App {
    /// Create the application and open `start_path`. Must run inside the
    /// tokio runtime.
    pub fn new(config: Config, start_path: Option<&str>) -> Result<Self> {
        let connectivity = Connectivity::new(true);
        let origin = network::origin(&config)?;

        let (worker, source) = match &origin {
            Some(origin) => {
                let worker = network::start_worker(&config, origin.clone(), connectivity.clone())?;
                info!(%origin, "Loading content through the offline cache");
                let source = ContentSource::Remote(RemoteSource::new(worker.clone(), origin.clone()));
                (Some(worker), source)
            }
            None => {
                info!("No origin configured, using bundled content");
                (None, ContentSource::Bundled(BundledSource))
            }
        };

        let relay = match EmailJsRelay::new(config.relay.clone()) {
            Ok(relay) => Some(relay),
            Err(e) => {
                warn!(error = %e, "Mail relay unavailable");
                None
            }
        };

        let mut orchestrator = PageOrchestrator::new(
            source,
            RouteTable::portfolio(),
            config.orchestrator.clone(),
            connectivity.clone(),
        );
        orchestrator.navigate(start_path.unwrap_or("/"), Instant::now());

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let app = Self {
            config,
            orchestrator,
            connectivity,
            worker,
            origin,
            relay,

            state: AppState::Normal,
            status_message: None,
            cache_status: None,
            skeleton_pulse: 0.0,
            started: Instant::now(),

            form: ContactForm::default(),
            form_focus: FormFocus::Field(ContactField::Name),
            editing_form: false,
            submit_status: SubmitStatus::Idle,

            image_generation: None,

            tx,
            rx,
        };
        app.request_page(start_path.unwrap_or("/"));
        Ok(app)
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Install and activate the offline cache in the background.
    pub fn register_offline_cache(&mut self) {
        let Some(worker) = self.worker.clone() else {
            return;
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match worker.register().await {
                Ok(()) => match worker.status().await {
                    Ok(status) => BackgroundResult::Registered(status),
                    Err(e) => BackgroundResult::RegistrationFailed(e.to_string()),
                },
                Err(e) => BackgroundResult::RegistrationFailed(e.to_string()),
            };
            Self::send_result(&tx, result).await;
        });
        self.status_message = Some("Preparing offline cache...".to_string());
    }

    fn refresh_cache_status(&self) {
        let Some(worker) = self.worker.clone() else {
            return;
        };
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match worker.status().await {
                Ok(status) => Self::send_result(&tx, BackgroundResult::CacheStatus(status)).await,
                Err(e) => warn!(error = %e, "Failed to read cache status"),
            }
        });
    }

    // ========================================================================
    // Per-frame work
    // ========================================================================

    /// Advance animations, apply finished loads, and drain background results.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.orchestrator.poll_loads() > 0 {
            self.refresh_cache_status();
        }
        self.orchestrator.tick(now);
        self.skeleton_pulse = pulse_level(now.duration_since(self.started));
        self.request_profile_image();
        self.check_background_tasks();
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Registered(status) => {
                self.status_message = Some("Offline cache ready".to_string());
                self.cache_status = Some(status);
                self.prefetch_pages();
            }
            BackgroundResult::RegistrationFailed(message) => {
                warn!(error = %message, "Offline cache registration failed");
                self.status_message = Some(format!("Offline cache unavailable: {}", message));
                self.refresh_cache_status();
            }
            BackgroundResult::CacheStatus(status) => {
                self.cache_status = Some(status);
            }
            BackgroundResult::ImageLoaded(generation) => {
                if generation == self.orchestrator.generation() {
                    self.orchestrator.signal(ReadinessSignal::ImageLoaded);
                }
            }
            BackgroundResult::Submitted(status) => {
                if status == SubmitStatus::Sent {
                    self.form.clear();
                    self.form_focus = FormFocus::Field(ContactField::Name);
                    self.editing_form = false;
                }
                self.submit_status = status;
            }
        }
    }

    /// Fetch the home view's profile image once per activation. Its arrival
    /// counts as a readiness signal.
    fn request_profile_image(&mut self) {
        let generation = self.orchestrator.generation();
        if self.orchestrator.route().view != ViewId::Home || self.image_generation == Some(generation) {
            return;
        }
        let Some(ViewContent::Home(profile)) = self.orchestrator.content(ViewId::Home) else {
            return;
        };
        let (Some(worker), Some(origin), Some(path)) =
            (self.worker.clone(), self.origin.as_ref(), profile.image_path.as_deref())
        else {
            return;
        };
        let url = match origin.join(path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path, error = %e, "Invalid profile image path");
                return;
            }
        };

        self.image_generation = Some(generation);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match worker.fetch(Request::get(url)).await {
                Ok(served) if served.response.is_ok() => {
                    Self::send_result(&tx, BackgroundResult::ImageLoaded(generation)).await;
                }
                Ok(served) => debug!(status = served.response.status, "Profile image unavailable"),
                Err(e) => debug!(error = %e, "Profile image fetch failed"),
            }
        });
    }

    /// Request a page through the worker as a navigation, which keeps the
    /// cached copy of the route fresh in the background.
    fn request_page(&self, path: &str) {
        let (Some(worker), Some(origin)) = (self.worker.clone(), self.origin.as_ref()) else {
            return;
        };
        let url = match origin.join(path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path, error = %e, "Invalid page path");
                return;
            }
        };
        tokio::spawn(async move {
            match worker.fetch(Request::navigate(url.clone())).await {
                Ok(served) => debug!(url = %url, from = ?served.from, "Page served"),
                Err(e) => debug!(url = %url, error = %e, "Page request failed"),
            }
        });
    }

    /// Warm the cache with every view except the one on screen.
    fn prefetch_pages(&self) {
        let current = self.orchestrator.route().view;
        for view in ViewId::ALL.into_iter().filter(|v| *v != current) {
            self.request_page(&view.path());
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn navigate_to(&mut self, view: ViewId) {
        self.editing_form = false;
        self.status_message = None;
        let path = self.orchestrator.navigate_view(view, Instant::now()).path.clone();
        self.request_page(&path);
    }

    pub fn next_view(&mut self) {
        let view = self.orchestrator.route().view.next();
        self.navigate_to(view);
    }

    pub fn prev_view(&mut self) {
        let view = self.orchestrator.route().view.prev();
        self.navigate_to(view);
    }

    pub fn scroll(&mut self, delta: isize) {
        self.orchestrator.scroll_by(delta);
    }

    /// Jump to the section after the highlighted one.
    pub fn next_section(&mut self) {
        if let Some(active) = self.orchestrator.active_section() {
            self.orchestrator.select_section(active.next(), Instant::now());
        }
    }

    pub fn toggle_menu(&mut self) {
        self.orchestrator.toggle_menu();
    }

    /// Simulate losing or regaining connectivity.
    pub fn toggle_connectivity(&mut self) {
        let online = !self.connectivity.is_online();
        self.orchestrator.signal(if online {
            ReadinessSignal::Online
        } else {
            ReadinessSignal::Offline
        });
        info!(online, "Connectivity toggled");
        self.status_message = Some(if online { "Back online" } else { "Offline" }.to_string());
    }

    pub fn recover(&mut self, action: RecoveryAction) {
        self.editing_form = false;
        self.status_message = None;
        self.orchestrator.recover(action, Instant::now());
        let path = self.orchestrator.route().path.clone();
        self.request_page(&path);
    }

    // ========================================================================
    // Contact form
    // ========================================================================

    /// The contact form accepts input only once the contact view is ready.
    pub fn can_edit_form(&self) -> bool {
        self.orchestrator.is_interactive()
            && matches!(self.orchestrator.surface(), Surface::Ready(ViewId::Contact, _))
    }

    pub fn start_editing(&mut self) {
        if self.can_edit_form() {
            self.editing_form = true;
            self.form_focus = FormFocus::Field(ContactField::Name);
        }
    }

    pub fn stop_editing(&mut self) {
        self.editing_form = false;
    }

    pub fn form_input(&mut self, c: char) {
        let FormFocus::Field(field) = self.form_focus else {
            return;
        };
        let max = if field == ContactField::Message {
            MAX_MESSAGE_LENGTH
        } else {
            MAX_FIELD_LENGTH
        };
        if can_add_char(self.form.field(field).chars().count(), max, c) {
            self.form.field_mut(field).push(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let FormFocus::Field(field) = self.form_focus {
            self.form.field_mut(field).pop();
        }
    }

    /// Validate and hand the form to the mail relay in the background.
    pub fn submit_form(&mut self) {
        if self.submit_status == SubmitStatus::Sending {
            return;
        }
        if self.form.validate().is_err() {
            self.submit_status = SubmitStatus::Failed(MSG_MISSING_FIELDS.to_string());
            return;
        }
        let Some(relay) = self.relay.clone() else {
            self.submit_status = SubmitStatus::Failed(MSG_FAILED.to_string());
            return;
        };

        self.submit_status = SubmitStatus::Sending;
        let mut form = self.form.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let status = contact::submit(&relay, &mut form).await;
            Self::send_result(&tx, BackgroundResult::Submitted(status)).await;
        });
    }
}

/// Triangle wave over `PULSE_PERIOD`: 0.0 at the start of a cycle, 1.0
/// half way through.
pub fn pulse_level(elapsed: Duration) -> f32 {
    let period = PULSE_PERIOD.as_secs_f32();
    let t = (elapsed.as_secs_f32() % period) / period;
    1.0 - (2.0 * t - 1.0).abs()
}

/// Check if a character should be accepted into a form field
pub fn can_add_char(current_len: usize, max: usize, c: char) -> bool {
    current_len < max && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::styles;
    use folio_core::offline::ServedFrom;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app() -> App {
        App::new(Config::default(), None).expect("app")
    }

    fn remote_config(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.origin = Some(server.uri());
        config.offline.persist = false;
        config
    }

    /// Tick the app until `done` holds, giving up after about two seconds.
    async fn wait_until(app: &mut App, mut done: impl FnMut(&App) -> bool) {
        for _ in 0..200 {
            app.tick();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    async fn requested_paths(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }

    async fn settle(app: &mut App) {
        for _ in 0..5 {
            tokio::task::yield_now().await;
            app.tick();
        }
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, 10, 'a'));
        assert!(!can_add_char(10, 10, 'a'));
        assert!(!can_add_char(0, 10, '\n'));
    }

    #[test]
    fn test_pulse_level_is_triangle_wave() {
        assert_eq!(pulse_level(Duration::ZERO), 0.0);
        assert_eq!(pulse_level(Duration::from_millis(1000)), 1.0);
        assert_eq!(pulse_level(Duration::from_millis(500)), 0.5);
        assert_eq!(pulse_level(Duration::from_millis(1500)), 0.5);
        assert_eq!(pulse_level(Duration::from_secs(2)), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skeleton_pulses_with_ticks() {
        let mut app = app();
        app.tick();
        let dim = app.skeleton_pulse;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        app.tick();
        assert!(app.skeleton_pulse > dim + 0.9);
        assert_ne!(
            styles::skeleton_style(dim).fg,
            styles::skeleton_style(app.skeleton_pulse).fg
        );
    }

    #[test]
    fn test_form_focus_cycle() {
        let mut focus = FormFocus::Field(ContactField::Name);
        for _ in 0..5 {
            focus = focus.next();
        }
        assert_eq!(focus, FormFocus::Field(ContactField::Name));
        assert_eq!(FormFocus::Field(ContactField::Name).prev(), FormFocus::Send);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bundled_app_starts_at_home() {
        let mut app = app();
        assert!(!app.has_worker());
        assert_eq!(app.orchestrator.route().view, ViewId::Home);
        settle(&mut app).await;
        assert_eq!(app.orchestrator.surface(), Surface::Skeleton(ViewId::Home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_contact_form_requires_ready_view() {
        let mut app = App::new(Config::default(), Some("/contact")).expect("app");
        settle(&mut app).await;
        app.start_editing();
        assert!(!app.editing_form);

        tokio::time::sleep(Duration::from_millis(1300)).await;
        app.start_editing();
        assert!(app.editing_form);

        app.form_input('A');
        app.submit_form();
        assert_eq!(
            app.submit_status.message(),
            Some(folio_core::contact::MSG_MISSING_FIELDS)
        );
        assert_eq!(app.form.name, "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_connectivity() {
        let mut app = app();
        app.toggle_connectivity();
        assert!(!app.connectivity.is_online());
        app.toggle_connectivity();
        assert!(app.connectivity.is_online());
    }

    #[tokio::test]
    async fn test_route_entry_goes_through_worker_as_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/project"))
            .respond_with(ResponseTemplate::new(200).set_body_string("project shell"))
            .mount(&server)
            .await;
        let mut app = App::new(remote_config(&server), Some("/project")).expect("app");
        let worker = app.worker.clone().expect("worker");

        let runtime = app.config.offline.runtime_name.clone();
        for _ in 0..200 {
            app.tick();
            let status = worker.status().await.expect("status");
            if status.caches.iter().any(|c| c.name == runtime && c.entries > 0) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(requested_paths(&server).await.contains(&"/project".to_string()));

        let url = Url::parse(&format!("{}/project", server.uri())).expect("url");
        let served = worker.fetch(Request::navigate(url)).await.expect("cached page");
        assert_eq!(served.from, ServedFrom::Cache);
        assert_eq!(served.response.text(), "project shell");
        assert!(served.revalidation.is_some());

        app.navigate_to(ViewId::Poc);
        for _ in 0..200 {
            if requested_paths(&server).await.contains(&"/poc".to_string()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("navigation to /poc never reached the network");
    }

    #[tokio::test]
    async fn test_registration_prefetches_other_views() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        let mut app = App::new(remote_config(&server), None).expect("app");
        app.register_offline_cache();
        wait_until(&mut app, |app| {
            app.status_message.as_deref() == Some("Offline cache ready")
        })
        .await;

        let expected = ["/project", "/poc", "/contact"];
        for _ in 0..200 {
            let paths = requested_paths(&server).await;
            if expected.iter().all(|p| paths.iter().any(|seen| seen == p)) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("views were not prefetched");
    }
}
