//! Session event loop and its cloneable handle.
//!
//! The loop owns the [`SessionCore`] and applies one command at a time, so
//! every entry point (host calls, bridge messages, surface notifications,
//! probe results and the visit timer) is serialized without locks.
//!
//! ```text
//! host ─────────┐
//! bridge glue ──┼──► mpsc ──► event loop ──► SessionCore ──► surface / adapter
//! surface ──────┘               ▲    │
//!                               │    └── probe task (is_bridge_present)
//!                     visit timer / probe result
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant as Deadline};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{ContextKey, SessionId};
use crate::protocol::BridgeMessage;
use crate::transport::BrowserSurface;

use super::adapter::{ProgressIndicator, SessionAdapter};
use super::core::{SessionCore, SessionSnapshot};
use super::lifecycle::NavigationDecision;
use super::options::Headers;
use super::visit::VisitRequest;

// ============================================================================
// Types
// ============================================================================

/// Closure applied to the core on the event loop.
type CoreTask = Box<dyn FnOnce(&mut SessionCore) + Send>;

/// Visit timer: the dispatch generation it was armed for, and its deadline.
type VisitTimer = Option<(u64, Deadline)>;

// ============================================================================
// SessionCommand
// ============================================================================

/// Internal commands for the event loop.
enum SessionCommand {
    /// Start a visit and report precondition failures.
    Visit {
        request: VisitRequest,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Replace the current page.
    ReplaceExistingPage {
        location: String,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Script → native entry point.
    Bridge(BridgeMessage),
    /// A document started loading.
    DocumentStarted { location: String },
    /// A document finished loading; the bridge probe has not run yet.
    DocumentFinished { location: String },
    /// Result of the bridge probe for a finished document. `None` when the
    /// probe itself failed.
    DocumentProbed {
        location: String,
        generation: u64,
        bridge_present: Option<bool>,
    },
    /// The surface reported a load error.
    ReceivedError { error_code: i32 },
    /// The surface reported an HTTP error status.
    ReceivedHttpError {
        status_code: i32,
        for_main_frame: bool,
    },
    /// The page tried to navigate.
    InterceptNavigation {
        location: String,
        at: Instant,
        reply: oneshot::Sender<NavigationDecision>,
    },
    /// Pull-to-refresh gesture.
    RefreshTriggered,
    /// Arbitrary core mutation or query.
    Apply(CoreTask),
    /// Tear the session down to its initial state.
    Reset,
    /// Stop the event loop.
    Shutdown,
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Visit { .. } => "visit",
            Self::ReplaceExistingPage { .. } => "replace_existing_page",
            Self::Bridge(_) => "bridge",
            Self::DocumentStarted { .. } => "document_started",
            Self::DocumentFinished { .. } => "document_finished",
            Self::DocumentProbed { .. } => "document_probed",
            Self::ReceivedError { .. } => "received_error",
            Self::ReceivedHttpError { .. } => "received_http_error",
            Self::InterceptNavigation { .. } => "intercept_navigation",
            Self::RefreshTriggered => "refresh_triggered",
            Self::Apply(_) => "apply",
            Self::Reset => "reset",
            Self::Shutdown => "shutdown",
        }
    }
}

// ============================================================================
// SessionHandle
// ============================================================================

/// Cloneable handle to a running session.
///
/// All clones talk to the same event loop. Dropping every clone stops it;
/// [`SessionHandle::shutdown`] stops it immediately.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// SessionHandle - Lifecycle
// ============================================================================

impl SessionHandle {
    /// Starts the event loop for `core`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(core: SessionCore) -> Self {
        let id = core.id();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_event_loop(core, command_rx, command_tx.downgrade()));

        debug!(session_id = %id, "Session event loop spawned");
        Self { id, command_tx }
    }

    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Tears the session down to its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn reset(&self) -> Result<()> {
        self.post(SessionCommand::Reset)
    }

    /// Stops the event loop. Later calls on any clone fail with an error for
    /// which [`Error::is_closed`] holds.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown);
    }

    fn post(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::SessionClosed)
    }

    async fn request<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut SessionCore) -> T + Send + 'static,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.post(SessionCommand::Apply(Box::new(move |core: &mut SessionCore| {
            let _ = tx.send(f(core));
        })))?;
        Ok(rx.await?)
    }

    fn apply(&self, f: impl FnOnce(&mut SessionCore) + Send + 'static) -> Result<()> {
        self.post(SessionCommand::Apply(Box::new(f)))
    }
}

// ============================================================================
// SessionHandle - Visits
// ============================================================================

impl SessionHandle {
    /// Visits a location.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if a required binding is missing
    /// - [`Error::SessionClosed`] if the event loop stopped
    pub async fn visit(&self, request: impl Into<VisitRequest>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::Visit {
            request: request.into(),
            reply,
        })?;
        rx.await?
    }

    /// Visits a location with `replace`, dropping the surface's history.
    ///
    /// # Errors
    ///
    /// Same as [`Self::visit`].
    pub async fn replace_existing_page(&self, location: impl Into<String>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::ReplaceExistingPage {
            location: location.into(),
            reply,
        })?;
        rx.await?
    }

    /// Requests that the next visit restore from a cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn restore_with_cached_snapshot(&self, restore: bool) -> Result<()> {
        self.apply(move |core| core.restore_with_cached_snapshot(restore))
    }

    /// Reports a pull-to-refresh gesture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn refresh_triggered(&self) -> Result<()> {
        self.post(SessionCommand::RefreshTriggered)
    }
}

// ============================================================================
// SessionHandle - Bridge & Surface Events
// ============================================================================

impl SessionHandle {
    /// Delivers a script → native entry-point invocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn bridge_message(&self, message: BridgeMessage) -> Result<()> {
        self.post(SessionCommand::Bridge(message))
    }

    /// Decodes and delivers a JSON entry-point envelope.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] or [`Error::Json`] if the envelope is malformed;
    ///   the session is left untouched
    /// - [`Error::SessionClosed`] if the event loop stopped
    pub fn dispatch_json(&self, text: &str) -> Result<()> {
        let message = BridgeMessage::from_json(text).inspect_err(|e| {
            warn!(session_id = %self.id, error = %e, "Rejected bridge message");
        })?;
        self.bridge_message(message)
    }

    /// A document started loading in the surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn document_started(&self, location: impl Into<String>) -> Result<()> {
        self.post(SessionCommand::DocumentStarted {
            location: location.into(),
        })
    }

    /// A document finished loading in the surface.
    ///
    /// The session probes the document for the bridge before deciding
    /// whether to inject it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn document_finished(&self, location: impl Into<String>) -> Result<()> {
        self.post(SessionCommand::DocumentFinished {
            location: location.into(),
        })
    }

    /// The surface reported a load error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn received_error(&self, error_code: i32) -> Result<()> {
        self.post(SessionCommand::ReceivedError { error_code })
    }

    /// The surface reported an HTTP error status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn received_http_error(&self, status_code: i32, for_main_frame: bool) -> Result<()> {
        self.post(SessionCommand::ReceivedHttpError {
            status_code,
            for_main_frame,
        })
    }

    /// Asks whether the surface should load `location` itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub async fn intercept_navigation(
        &self,
        location: impl Into<String>,
    ) -> Result<NavigationDecision> {
        let (reply, rx) = oneshot::channel();
        self.post(SessionCommand::InterceptNavigation {
            location: location.into(),
            at: Instant::now(),
            reply,
        })?;
        Ok(rx.await?)
    }
}

// ============================================================================
// SessionHandle - Bindings & Configuration
// ============================================================================

impl SessionHandle {
    /// Binds the browser surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn bind_surface(&self, surface: Arc<dyn BrowserSurface>) -> Result<()> {
        self.apply(move |core| core.bind_surface(surface))
    }

    /// Binds the host adapter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn bind_adapter(&self, adapter: Arc<dyn SessionAdapter>) -> Result<()> {
        self.apply(move |core| core.bind_adapter(adapter))
    }

    /// Binds the progress indicator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn bind_progress(&self, progress: Arc<dyn ProgressIndicator>) -> Result<()> {
        self.apply(move |core| core.bind_progress(progress))
    }

    /// Binds a host navigation context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn bind_context(&self, context: impl Into<ContextKey>) -> Result<()> {
        let context = context.into();
        self.apply(move |core| core.bind_context(context))
    }

    /// Replaces all custom headers. An empty map is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn set_headers(&self, headers: Headers) -> Result<()> {
        self.apply(move |core| core.set_headers(headers))
    }

    /// Adds a custom header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn add_header(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (key, value) = (key.into(), value.into());
        self.apply(move |core| core.add_header(key, value))
    }

    /// Removes a custom header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn remove_header(&self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        self.apply(move |core| core.remove_header(&key))
    }

    /// Removes all custom headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub fn clear_headers(&self) -> Result<()> {
        self.apply(SessionCore::clear_headers)
    }

    /// Stores a cookie for `base_url` on the bound surface.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `base_url` is not a valid URL
    /// - [`Error::SessionClosed`] if the event loop stopped
    pub async fn set_cookie(
        &self,
        base_url: impl Into<String>,
        cookie: impl Into<String>,
    ) -> Result<bool> {
        let (base_url, cookie) = (base_url.into(), cookie.into());
        self.request(move |core| core.set_cookie(&base_url, &cookie))
            .await?
    }

    /// Replaces or extends the surface's user agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub async fn adjust_user_agent(&self, user_agent: impl Into<String>, append: bool) -> Result<bool> {
        let user_agent = user_agent.into();
        self.request(move |core| core.adjust_user_agent(&user_agent, append))
            .await
    }

    /// Captures the current session state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the event loop stopped.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|core| core.snapshot()).await
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Drains commands until shutdown or until every handle is dropped.
async fn run_event_loop(
    mut core: SessionCore,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    command_tx: mpsc::WeakUnboundedSender<SessionCommand>,
) {
    let session_id = core.id();
    let mut timer: VisitTimer = None;

    loop {
        let deadline = timer.map(|(_, deadline)| deadline);

        tokio::select! {
            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Shutdown) => {
                        debug!(session_id = %session_id, "Shutdown command received");
                        break;
                    }

                    Some(command) => {
                        trace!(session_id = %session_id, command = command.name(), "Command");
                        handle_command(&mut core, command, &command_tx);
                    }

                    None => {
                        debug!(session_id = %session_id, "All handles dropped");
                        break;
                    }
                }
            }

            () = wait_until(deadline) => {
                core.on_visit_timeout();
            }
        }

        timer = next_timer(&core, timer);
    }

    debug!(session_id = %session_id, "Event loop terminated");
}

fn handle_command(
    core: &mut SessionCore,
    command: SessionCommand,
    command_tx: &mpsc::WeakUnboundedSender<SessionCommand>,
) {
    match command {
        SessionCommand::Visit { request, reply } => {
            let _ = reply.send(core.visit(request));
        }
        SessionCommand::ReplaceExistingPage { location, reply } => {
            let _ = reply.send(core.replace_existing_page(location));
        }
        SessionCommand::Bridge(message) => core.handle_bridge_message(message),
        SessionCommand::DocumentStarted { location } => core.on_document_started(&location),
        SessionCommand::DocumentFinished { location } => {
            probe_document(core, location, command_tx);
        }
        SessionCommand::DocumentProbed {
            location,
            generation,
            bridge_present,
        } => {
            if generation != core.document_generation() {
                debug!(location = %location, "Discarding probe for superseded document");
                return;
            }
            match bridge_present {
                Some(present) => core.on_document_finished(&location, present),
                None => core.on_document_probe_failed(&location),
            }
        }
        SessionCommand::ReceivedError { error_code } => core.on_received_error(error_code),
        SessionCommand::ReceivedHttpError {
            status_code,
            for_main_frame,
        } => core.on_received_http_error(status_code, for_main_frame),
        SessionCommand::InterceptNavigation { location, at, reply } => {
            let _ = reply.send(core.intercept_navigation(&location, at));
        }
        SessionCommand::RefreshTriggered => core.refresh_triggered(),
        SessionCommand::Apply(task) => task(core),
        SessionCommand::Reset => core.reset(),
        SessionCommand::Shutdown => {}
    }
}

/// Probes the finished document off-loop and posts the result back.
///
/// A failed probe is posted as `None` so the session falls back to cold boot.
fn probe_document(
    core: &mut SessionCore,
    location: String,
    command_tx: &mpsc::WeakUnboundedSender<SessionCommand>,
) {
    let Some(surface) = core.surface() else {
        core.on_document_finished(&location, true);
        return;
    };
    let Some(command_tx) = command_tx.upgrade() else {
        return;
    };
    let generation = core.document_generation();

    tokio::spawn(async move {
        let bridge_present = surface
            .is_bridge_present()
            .await
            .inspect_err(|e| warn!(location = %location, error = %e, "Bridge probe failed"))
            .ok();

        let _ = command_tx.send(SessionCommand::DocumentProbed {
            location,
            generation,
            bridge_present,
        });
    });
}

/// Re-arms the visit timer whenever a new visit was dispatched.
fn next_timer(core: &SessionCore, timer: VisitTimer) -> VisitTimer {
    let timeout = core.options().visit_timeout?;
    if !core.visit_in_flight() {
        return None;
    }

    let generation = core.dispatch_generation();
    match timer {
        Some((armed, deadline)) if armed == generation => Some((armed, deadline)),
        _ => Some((generation, Deadline::now() + timeout)),
    }
}

async fn wait_until(deadline: Option<Deadline>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio_test::{assert_err, assert_ok};

    use crate::identifiers::{RestorationId, VisitId};
    use crate::session::{Session, SessionOptions, SessionState};
    use crate::testing::{
        AdapterEvent, RecordingAdapter, RecordingProgress, RecordingSurface, init_tracing,
    };

    fn spawn_session(
        options: SessionOptions,
    ) -> (SessionHandle, Arc<RecordingSurface>, Arc<RecordingAdapter>) {
        init_tracing();
        let surface = RecordingSurface::new();
        let adapter = RecordingAdapter::new();
        let handle = Session::builder()
            .options(options)
            .surface(surface.clone())
            .adapter(adapter.clone())
            .progress(RecordingProgress::new())
            .context("screen")
            .spawn()
            .expect("spawn");
        (handle, surface, adapter)
    }

    /// Lets spawned probe tasks post their results.
    async fn settle(handle: &SessionHandle) -> SessionSnapshot {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        handle.snapshot().await.expect("snapshot")
    }

    #[tokio::test]
    async fn test_visit_precondition_surfaces_to_caller() {
        let handle = Session::builder().spawn().expect("spawn");
        let err = handle.visit("https://x/a").await.expect_err("no bindings");
        assert!(err.is_precondition());
    }

    #[tokio::test]
    async fn test_cold_boot_through_handle() -> anyhow::Result<()> {
        let (handle, surface, adapter) = spawn_session(SessionOptions::new());
        surface.set_bridge_present(false);

        handle.visit("https://x/a").await?;
        handle.document_started("https://x/a")?;
        handle.document_finished("https://x/a")?;

        let snapshot = settle(&handle).await;
        assert_eq!(snapshot.state, SessionState::Injecting);
        assert!(surface.injected());

        handle.bridge_message(BridgeMessage::ScriptRuntimeReady { is_ready: true })?;
        let snapshot = settle(&handle).await;
        assert_eq!(snapshot.state, SessionState::Ready);
        assert!(adapter.events().contains(&AdapterEvent::PageFinished));
        assert!(adapter.events().contains(&AdapterEvent::PageSupportsTurbolinks(true)));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_bridge_check_skips_injection() {
        let (handle, surface, adapter) = spawn_session(SessionOptions::new());
        surface.fail_probe(true);

        assert_ok!(handle.document_started("https://x/a"));
        assert_ok!(handle.document_finished("https://x/a"));

        let snapshot = settle(&handle).await;
        assert!(!surface.injected());
        assert_eq!(snapshot.state, SessionState::ColdBootPending);
        assert!(!snapshot.cold_boot_in_progress);
        assert_eq!(adapter.events(), vec![AdapterEvent::PageFinished]);
    }

    #[tokio::test]
    async fn test_visit_after_failed_bridge_check_cold_boots() -> anyhow::Result<()> {
        let (handle, surface, _adapter) =
            spawn_session(SessionOptions::new().without_visit_timeout());
        surface.fail_probe(true);

        handle.document_started("https://x/a")?;
        handle.document_finished("https://x/a")?;
        settle(&handle).await;
        surface.clear();

        handle.visit("https://x/b").await?;
        handle.visit("https://x/c").await?;

        let snapshot = handle.snapshot().await?;
        assert_eq!(surface.loads(), vec!["https://x/b".to_string()]);
        assert!(snapshot.cold_boot_in_progress);
        assert_eq!(snapshot.location.as_deref(), Some("https://x/c"));
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_json_rejects_malformed_message() {
        let (handle, _surface, _adapter) = spawn_session(SessionOptions::new());

        let err = assert_err!(handle.dispatch_json(r#"{"method":"visitStarted","args":[]}"#));
        assert!(err.is_recoverable());
        assert_err!(handle.dispatch_json("not json"));

        let snapshot = handle.snapshot().await.expect("snapshot");
        assert!(snapshot.current_visit_id.is_none());
    }

    #[tokio::test]
    async fn test_full_visit_caches_restoration_id() -> anyhow::Result<()> {
        let (handle, _surface, adapter) = spawn_session(SessionOptions::new());

        handle.visit("https://x/a").await?;
        handle.bridge_message(BridgeMessage::ScriptRuntimeReady { is_ready: true })?;
        handle.dispatch_json(r#"{"method":"visitStarted","args":["v1",false]}"#)?;
        handle.dispatch_json(r#"{"method":"visitRequestCompleted","args":["v1"]}"#)?;
        handle.dispatch_json(r#"{"method":"visitRendered","args":["v1"]}"#)?;
        handle.dispatch_json(r#"{"method":"visitCompleted","args":["v1","r1"]}"#)?;

        let snapshot = handle.snapshot().await?;
        assert_eq!(snapshot.current_visit_id, Some(VisitId::new("v1")));
        assert_eq!(snapshot.restoration_id, Some(RestorationId::new("r1")));
        assert!(!snapshot.visit_in_flight);
        assert!(adapter.events().contains(&AdapterEvent::VisitCompleted));
        Ok(())
    }

    #[tokio::test]
    async fn test_intercept_navigation_through_handle() -> anyhow::Result<()> {
        let (handle, _surface, adapter) = spawn_session(SessionOptions::new());

        let decision = handle.intercept_navigation("https://x/f").await?;

        assert_eq!(decision, NavigationDecision::Proceed);
        assert_eq!(
            adapter.events(),
            vec![AdapterEvent::CompletedByFallback("https://x/f".to_string())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_configuration_through_handle() -> anyhow::Result<()> {
        let (handle, surface, _adapter) = spawn_session(SessionOptions::new());
        surface.set_user_agent_value("Base");

        handle.add_header("X-A", "1")?;
        assert!(handle.set_cookie("https://x", "a=b").await?);
        assert!(handle.set_cookie("::", "a=b").await.is_err());
        assert!(handle.adjust_user_agent(" Native", true).await?);
        handle.clear_headers()?;

        handle.visit("https://x/a").await?;
        assert_eq!(surface.loads(), vec!["https://x/a".to_string()]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_visit_timeout_synthesizes_408() -> anyhow::Result<()> {
        let options = SessionOptions::new().with_visit_timeout(Duration::from_secs(5));
        let (handle, _surface, adapter) = spawn_session(options);

        handle.visit("https://x/slow").await?;
        time::sleep(Duration::from_secs(6)).await;

        let snapshot = handle.snapshot().await?;
        assert_eq!(snapshot.state, SessionState::ColdBootPending);
        assert!(!snapshot.cold_boot_in_progress);
        assert!(!snapshot.visit_in_flight);
        assert_eq!(adapter.events(), vec![AdapterEvent::RequestFailed(408)]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_visit_disarms_timer() -> anyhow::Result<()> {
        let options = SessionOptions::new().with_visit_timeout(Duration::from_secs(5));
        let (handle, _surface, adapter) = spawn_session(options);

        handle.visit("https://x/a").await?;
        handle.bridge_message(BridgeMessage::ScriptRuntimeReady { is_ready: true })?;
        handle.dispatch_json(r#"{"method":"visitStarted","args":["v1",false]}"#)?;
        handle.dispatch_json(r#"{"method":"visitCompleted","args":["v1","r1"]}"#)?;
        time::sleep(Duration::from_secs(10)).await;

        assert!(!adapter.events().contains(&AdapterEvent::RequestFailed(408)));
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_closes_all_clones() {
        let (handle, _surface, _adapter) = spawn_session(SessionOptions::new());
        let clone = handle.clone();

        handle.shutdown();
        let err = clone.snapshot().await.expect_err("closed");
        assert!(err.is_closed());
        assert!(clone.is_closed());
    }

    #[tokio::test]
    async fn test_reset_through_handle() -> anyhow::Result<()> {
        let (handle, _surface, _adapter) = spawn_session(SessionOptions::new());
        handle.visit("https://x/a").await?;
        handle.reset()?;

        let snapshot = handle.snapshot().await?;
        assert!(snapshot.location.is_none());
        assert!(handle.visit("https://x/a").await.is_err());
        Ok(())
    }
}
