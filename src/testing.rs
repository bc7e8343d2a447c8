//! Recording collaborators shared by the unit tests.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ContextKey;
use crate::protocol::VisitAction;
use crate::session::{Headers, ProgressIndicator, SessionAdapter, SessionCore, SessionOptions};
use crate::transport::BrowserSurface;
use crate::transport::assets::RUNTIME_PROBE_SCRIPT;

// ============================================================================
// Logging
// ============================================================================

/// Installs a test log subscriber honouring `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// RecordingSurface
// ============================================================================

/// A call made on [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceCall {
    Load { location: String, headers: Headers },
    Evaluate(String),
    InjectBridge,
    ClearHistory,
    RebindContext(ContextKey),
    SetCookie { base_url: String, cookie: String },
    SetUserAgent(String),
}

/// Surface that records successful calls and answers the bridge probe.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    fail: AtomicBool,
    fail_probe: AtomicBool,
    bridge_present: AtomicBool,
    user_agent: Mutex<Option<String>>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Scripts passed to `evaluate_javascript`, in order.
    pub(crate) fn scripts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Evaluate(script) => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    /// Locations passed to `load_url`, in order.
    pub(crate) fn loads(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Load { location, .. } => Some(location.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn injected(&self) -> bool {
        self.calls.lock().contains(&SurfaceCall::InjectBridge)
    }

    /// Makes every fallible call fail with a transport error.
    pub(crate) fn fail_all(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_probe(&self, fail: bool) {
        self.fail_probe.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_bridge_present(&self, present: bool) {
        self.bridge_present.store(present, Ordering::SeqCst);
    }

    pub(crate) fn set_user_agent_value(&self, user_agent: &str) {
        *self.user_agent.lock() = Some(user_agent.to_string());
    }

    fn record(&self, call: SurfaceCall) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::transport("surface torn down"));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

#[async_trait]
impl BrowserSurface for RecordingSurface {
    fn load_url(&self, location: &str, headers: &Headers) -> Result<()> {
        self.record(SurfaceCall::Load {
            location: location.to_string(),
            headers: headers.clone(),
        })
    }

    fn evaluate_javascript(&self, script: &str) -> Result<()> {
        self.record(SurfaceCall::Evaluate(script.to_string()))
    }

    async fn evaluate_for_result(&self, script: &str) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) || self.fail_probe.load(Ordering::SeqCst) {
            return Err(Error::transport("evaluation failed"));
        }
        if script == RUNTIME_PROBE_SCRIPT {
            let missing = !self.bridge_present.load(Ordering::SeqCst);
            return Ok(missing.to_string());
        }
        Ok("null".to_string())
    }

    fn inject_bridge(&self) -> Result<()> {
        self.record(SurfaceCall::InjectBridge)
    }

    fn clear_history(&self) {
        let _ = self.record(SurfaceCall::ClearHistory);
    }

    fn rebind_context(&self, context: &ContextKey) {
        let _ = self.record(SurfaceCall::RebindContext(context.clone()));
    }

    fn set_cookie(&self, base_url: &Url, cookie: &str) -> Result<()> {
        self.record(SurfaceCall::SetCookie {
            base_url: base_url.to_string(),
            cookie: cookie.to_string(),
        })
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.lock().clone()
    }

    fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.record(SurfaceCall::SetUserAgent(user_agent.to_string()))?;
        *self.user_agent.lock() = Some(user_agent.to_string());
        Ok(())
    }
}

// ============================================================================
// RecordingAdapter
// ============================================================================

/// A callback received by [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdapterEvent {
    PageFinished,
    PageSupportsTurbolinks(bool),
    ReceivedError(i32),
    RequestFailed(i32),
    PageInvalidated,
    VisitCompleted,
    CompletedByFallback(String),
    VisitProposed(String, VisitAction),
    ReloadTriggeredByPullToRefresh,
    BridgeInjectionFailed,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingAdapter {
    events: Mutex<Vec<AdapterEvent>>,
}

impl RecordingAdapter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<AdapterEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: AdapterEvent) {
        self.events.lock().push(event);
    }
}

impl SessionAdapter for RecordingAdapter {
    fn on_page_finished(&self) {
        self.push(AdapterEvent::PageFinished);
    }

    fn on_page_supports_turbolinks(&self, supported: bool) {
        self.push(AdapterEvent::PageSupportsTurbolinks(supported));
    }

    fn on_received_error(&self, error_code: i32) {
        self.push(AdapterEvent::ReceivedError(error_code));
    }

    fn request_failed_with_status_code(&self, status_code: i32) {
        self.push(AdapterEvent::RequestFailed(status_code));
    }

    fn page_invalidated(&self) {
        self.push(AdapterEvent::PageInvalidated);
    }

    fn visit_completed(&self) {
        self.push(AdapterEvent::VisitCompleted);
    }

    fn completed_by_fallback(&self, location: &str) {
        self.push(AdapterEvent::CompletedByFallback(location.to_string()));
    }

    fn visit_proposed_to_location_with_action(&self, location: &str, action: VisitAction) {
        self.push(AdapterEvent::VisitProposed(location.to_string(), action));
    }

    fn reload_triggered_by_pull_to_refresh(&self) {
        self.push(AdapterEvent::ReloadTriggeredByPullToRefresh);
    }

    fn bridge_injection_failed(&self) {
        self.push(AdapterEvent::BridgeInjectionFailed);
    }
}

// ============================================================================
// RecordingProgress
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressEvent {
    HideProgress,
    StopRefreshing,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ProgressIndicator for RecordingProgress {
    fn hide_progress(&self) {
        self.events.lock().push(ProgressEvent::HideProgress);
    }

    fn stop_refreshing(&self) {
        self.events.lock().push(ProgressEvent::StopRefreshing);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub(crate) type Fixture = (
    SessionCore,
    Arc<RecordingSurface>,
    Arc<RecordingAdapter>,
    Arc<RecordingProgress>,
);

/// A cold session with every collaborator bound and nothing recorded yet.
pub(crate) fn bound_core(options: SessionOptions) -> Fixture {
    init_tracing();

    let surface = RecordingSurface::new();
    let adapter = RecordingAdapter::new();
    let progress = RecordingProgress::new();

    let mut core = SessionCore::with_options(options).expect("valid options");
    core.bind_surface(surface.clone());
    core.bind_adapter(adapter.clone());
    core.bind_progress(progress.clone());
    surface.clear();

    (core, surface, adapter, progress)
}

/// A session that completed a cold boot of `https://x/start`.
pub(crate) fn ready_core() -> Fixture {
    let (mut core, surface, adapter, progress) = bound_core(SessionOptions::new());

    core.visit("https://x/start").expect("cold boot visit");
    core.on_document_started("https://x/start");
    core.on_document_finished("https://x/start", false);
    core.on_script_runtime_ready(true);

    surface.clear();
    adapter.clear();
    progress.clear();

    (core, surface, adapter, progress)
}
