//! Core session struct, bindings and accessors.
//!
//! [`SessionCore`] is the visit lifecycle state machine. It is a plain
//! `&mut self` value: whoever owns it serializes all mutation. In production
//! that owner is the event loop behind a
//! [`SessionHandle`](super::SessionHandle); tests drive it directly.
//!
//! The remaining behaviour lives next door:
//!
//! | Module | Operations |
//! |--------|------------|
//! | `visit` | `visit`, `replace_existing_page`, `refresh_triggered` |
//! | `events` | Script → native entry points, visit timeout |
//! | `lifecycle` | Document start/finish, load errors, navigation interception |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::{ContextKey, RestorationId, SessionId, VisitId};
use crate::protocol::{BridgeCall, VisitAction};
use crate::transport::{Bridge, BrowserSurface};

use super::adapter::{ProgressIndicator, SessionAdapter};
use super::options::{Headers, SessionOptions};
use super::registry::VisitRegistry;
use super::restoration::RestorationCache;
use super::state::{SessionFlags, SessionState};

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Point-in-time view of a session, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session id.
    pub session_id: SessionId,
    /// Derived protocol state.
    pub state: SessionState,
    /// A full document load is under way.
    pub cold_boot_in_progress: bool,
    /// Bridge injection awaits confirmation.
    pub bridge_injection_in_progress: bool,
    /// The next dispatched visit restores from a cached snapshot.
    pub restore_next_visit: bool,
    /// Last requested location.
    pub location: Option<String>,
    /// Live visit id.
    pub current_visit_id: Option<VisitId>,
    /// Bound navigation context.
    pub context: Option<ContextKey>,
    /// Cached restoration id for the bound context.
    pub restoration_id: Option<RestorationId>,
    /// A dispatched visit has neither completed nor failed yet.
    pub visit_in_flight: bool,
    /// Visit events dropped because they named a superseded visit.
    pub stale_events_discarded: u64,
}

// ============================================================================
// SessionCore
// ============================================================================

/// The visit lifecycle state machine.
pub struct SessionCore {
    pub(super) id: SessionId,
    pub(super) options: SessionOptions,
    pub(super) flags: SessionFlags,
    /// Last requested location; revisited once the runtime is ready.
    pub(super) location: Option<String>,
    /// Action to use when the pending location is revisited after a cold boot.
    pub(super) pending_action: VisitAction,
    /// One-shot: cleared at the end of every `visit()`.
    pub(super) restore_next_visit: bool,
    pub(super) registry: VisitRegistry,
    pub(super) restorations: RestorationCache,
    pub(super) context: Option<ContextKey>,
    pub(super) bridge: Option<Bridge>,
    pub(super) adapter: Option<Arc<dyn SessionAdapter>>,
    pub(super) progress: Option<Arc<dyn ProgressIndicator>>,
    pub(super) cookie: Option<String>,
    pub(super) last_interception: Option<Instant>,
    pub(super) visit_in_flight: bool,
    /// Bumped on every dispatch so the visit timer can tell visits apart.
    pub(super) dispatch_generation: u64,
    /// Bumped on every document start so late probe results can be dropped.
    pub(super) document_generation: u64,
}

impl fmt::Debug for SessionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCore")
            .field("id", &self.id)
            .field("state", &self.flags.state())
            .field("location", &self.location)
            .field("current_visit_id", &self.registry.current())
            .finish_non_exhaustive()
    }
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SessionCore - Constructors
// ============================================================================

impl SessionCore {
    /// Creates a session with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_options(SessionOptions::new())
    }

    /// Creates a session with custom options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options fail validation.
    pub fn with_options(options: SessionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::from_valid_options(options))
    }

    fn from_valid_options(options: SessionOptions) -> Self {
        let id = SessionId::next();
        debug!(session_id = %id, "Session created");

        Self {
            id,
            restorations: RestorationCache::new(options.restoration_capacity),
            options,
            flags: SessionFlags::new(),
            location: None,
            pending_action: VisitAction::Advance,
            restore_next_visit: false,
            registry: VisitRegistry::new(),
            context: None,
            bridge: None,
            adapter: None,
            progress: None,
            cookie: None,
            last_interception: None,
            visit_in_flight: false,
            dispatch_generation: 0,
            document_generation: 0,
        }
    }
}

// ============================================================================
// SessionCore - Bindings
// ============================================================================

impl SessionCore {
    /// Binds the browser surface.
    ///
    /// A different surface carries an unknown document, so the session
    /// falls back to a cold boot.
    pub fn bind_surface(&mut self, surface: Arc<dyn BrowserSurface>) {
        if let Some(user_agent) = self.options.user_agent.as_deref()
            && let Err(e) = surface.set_user_agent(user_agent)
        {
            warn!(error = %e, "Failed to apply user agent override");
        }

        if let Some(context) = self.context.as_ref() {
            surface.rebind_context(context);
        }

        self.bridge = Some(Bridge::new(surface));
        self.reset_to_cold_boot();
        debug!(session_id = %self.id, "Surface bound");
    }

    /// Binds the host adapter.
    pub fn bind_adapter(&mut self, adapter: Arc<dyn SessionAdapter>) {
        self.adapter = Some(adapter);
    }

    /// Binds the progress indicator.
    pub fn bind_progress(&mut self, progress: Arc<dyn ProgressIndicator>) {
        self.progress = Some(progress);
    }

    /// Binds a host navigation context.
    ///
    /// The surface is moved to the new context in place; restoration ids
    /// are read and written under this key from now on.
    pub fn bind_context(&mut self, context: ContextKey) {
        if let Some(bridge) = self.bridge.as_ref() {
            bridge.surface().rebind_context(&context);
        }
        debug!(session_id = %self.id, context = %context, "Context bound");
        self.context = Some(context);
    }

    /// Requests that the next visit restore from a cached snapshot.
    pub fn restore_with_cached_snapshot(&mut self, restore: bool) {
        self.restore_next_visit = restore;
    }

    /// Tears the session down to its initial state.
    ///
    /// Clears readiness, invalidates the live visit and drops every binding.
    /// The restoration cache and configuration survive.
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Session reset");
        self.reset_to_cold_boot();
        self.registry.clear();
        self.location = None;
        self.pending_action = VisitAction::Advance;
        self.restore_next_visit = false;
        self.bridge = None;
        self.adapter = None;
        self.progress = None;
        self.last_interception = None;
    }
}

// ============================================================================
// SessionCore - Configuration
// ============================================================================

impl SessionCore {
    /// Replaces all custom headers. An empty map is ignored.
    pub fn set_headers(&mut self, headers: Headers) {
        if headers.is_empty() {
            return;
        }
        self.options.headers = headers;
    }

    /// Adds a custom header.
    ///
    /// Empty keys or values are ignored. A `User-Agent` header is appended
    /// to the surface's user agent instead of being sent as a header.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        if key.is_empty() || value.is_empty() {
            return;
        }

        if key.eq_ignore_ascii_case("user-agent") {
            self.adjust_user_agent(&value, true);
            return;
        }

        self.options.headers.insert(key, value);
    }

    /// Removes a custom header.
    pub fn remove_header(&mut self, key: &str) {
        self.options.headers.shift_remove(key);
    }

    /// Removes all custom headers.
    pub fn clear_headers(&mut self) {
        self.options.headers.clear();
    }

    /// Stores a cookie for `base_url` on the bound surface.
    ///
    /// Returns `Ok(false)` when either argument is empty or no surface is
    /// bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not a valid URL.
    pub fn set_cookie(&mut self, base_url: &str, cookie: &str) -> Result<bool> {
        if base_url.is_empty() || cookie.is_empty() {
            return Ok(false);
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid cookie base URL {base_url}: {e}")))?;

        let Some(bridge) = self.bridge.as_ref() else {
            return Ok(false);
        };

        if let Err(e) = bridge.surface().set_cookie(&base_url, cookie) {
            warn!(error = %e, "Failed to set cookie");
            return Ok(false);
        }

        self.cookie = Some(cookie.to_string());
        Ok(true)
    }

    /// Replaces the surface's user agent.
    pub fn replace_user_agent(&mut self, user_agent: &str) -> bool {
        self.adjust_user_agent(user_agent, false)
    }

    /// Replaces or extends the surface's user agent.
    ///
    /// Returns `false` when no surface is bound or the surface refused.
    pub fn adjust_user_agent(&mut self, user_agent: &str, append: bool) -> bool {
        let Some(bridge) = self.bridge.as_ref() else {
            return false;
        };
        let surface = bridge.surface();

        let user_agent = if append {
            format!("{}{user_agent}", surface.user_agent().unwrap_or_default())
        } else {
            user_agent.to_string()
        };

        match surface.set_user_agent(&user_agent) {
            Ok(()) => {
                self.options.user_agent = Some(user_agent);
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to set user agent");
                false
            }
        }
    }
}

// ============================================================================
// SessionCore - Accessors
// ============================================================================

impl SessionCore {
    /// Returns the session id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the derived protocol state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.flags.state()
    }

    /// Returns the raw readiness flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// Returns `true` once the runtime confirmed it is ready.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.flags.ready()
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the custom headers.
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.options.headers
    }

    /// Returns the last cookie string stored through [`Self::set_cookie`].
    #[inline]
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Returns the last requested location.
    #[inline]
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the live visit id.
    #[inline]
    #[must_use]
    pub fn current_visit_id(&self) -> Option<&VisitId> {
        self.registry.current()
    }

    /// Returns the bound context.
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<&ContextKey> {
        self.context.as_ref()
    }

    /// Returns the cached restoration id for `context`.
    #[inline]
    #[must_use]
    pub fn restoration_for(&self, context: &ContextKey) -> Option<&RestorationId> {
        self.restorations.peek(context)
    }

    /// Returns the bound surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> Option<Arc<dyn BrowserSurface>> {
        self.bridge.as_ref().map(|bridge| Arc::clone(bridge.surface()))
    }

    /// Returns `true` while a dispatched visit awaits completion or failure.
    #[inline]
    #[must_use]
    pub fn visit_in_flight(&self) -> bool {
        self.visit_in_flight
    }

    /// Counter bumped on every visit dispatch.
    #[inline]
    #[must_use]
    pub fn dispatch_generation(&self) -> u64 {
        self.dispatch_generation
    }

    /// Counter bumped on every document start.
    #[inline]
    #[must_use]
    pub fn document_generation(&self) -> u64 {
        self.document_generation
    }

    /// Captures the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state: self.flags.state(),
            cold_boot_in_progress: self.flags.cold_boot_in_progress(),
            bridge_injection_in_progress: self.flags.bridge_injection_in_progress(),
            restore_next_visit: self.restore_next_visit,
            location: self.location.clone(),
            current_visit_id: self.registry.current().cloned(),
            context: self.context.clone(),
            restoration_id: self
                .context
                .as_ref()
                .and_then(|context| self.restorations.peek(context))
                .cloned(),
            visit_in_flight: self.visit_in_flight,
            stale_events_discarded: self.registry.stale_discarded(),
        }
    }
}

// ============================================================================
// SessionCore - Internal
// ============================================================================

impl SessionCore {
    /// Collapses to [`SessionState::ColdBootPending`] and stops the visit timer.
    pub(super) fn reset_to_cold_boot(&mut self) {
        self.flags.reset_to_cold_boot();
        self.visit_in_flight = false;
    }

    /// Sends a call if a surface is bound.
    pub(super) fn send(&self, call: &BridgeCall) {
        match self.bridge.as_ref() {
            Some(bridge) => {
                bridge.call(call);
            }
            None => debug!(function = %call.function, "No surface bound; bridge call dropped"),
        }
    }

    /// Marks a visit as dispatched and restarts the visit timer.
    pub(super) fn arm_visit(&mut self) {
        self.visit_in_flight = true;
        self.dispatch_generation = self.dispatch_generation.wrapping_add(1);
    }

    /// Marks the in-flight visit as finished.
    pub(super) fn settle_visit(&mut self) {
        self.visit_in_flight = false;
    }

    /// Runs `f` against the bound adapter.
    pub(super) fn notify(&self, f: impl FnOnce(&dyn SessionAdapter)) {
        match self.adapter.as_deref() {
            Some(adapter) => f(adapter),
            None => debug!(session_id = %self.id, "No adapter bound; callback dropped"),
        }
    }

    /// Runs `f` against the bound progress indicator.
    pub(super) fn with_progress(&self, f: impl FnOnce(&dyn ProgressIndicator)) {
        if let Some(progress) = self.progress.as_deref() {
            f(progress);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
