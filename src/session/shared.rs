//! Opt-in process-wide default session.
//!
//! Hosts that want one session for the whole process obtain it through
//! [`default_session`]; everyone else creates their own handles. The slot is
//! created lazily on first use and only cleared by [`reset_default`].

use parking_lot::{RwLock, const_rwlock};
use tracing::debug;

use crate::error::Result;

use super::handle::SessionHandle;

// ============================================================================
// Storage
// ============================================================================

static DEFAULT_SESSION: RwLock<Option<SessionHandle>> = const_rwlock(None);

// ============================================================================
// Functions
// ============================================================================

/// Returns the default session, creating it with `init` on first use.
///
/// Concurrent first calls run `init` at most once; every caller gets a clone
/// of the same handle.
///
/// # Errors
///
/// Propagates the error from `init`; the slot stays empty in that case.
pub fn default_session(init: impl FnOnce() -> Result<SessionHandle>) -> Result<SessionHandle> {
    if let Some(handle) = DEFAULT_SESSION.read().as_ref() {
        return Ok(handle.clone());
    }

    let mut slot = DEFAULT_SESSION.write();
    if let Some(handle) = slot.as_ref() {
        return Ok(handle.clone());
    }

    let handle = init()?;
    debug!(session_id = %handle.id(), "Default session created");
    *slot = Some(handle.clone());
    Ok(handle)
}

/// Clears the default session slot.
///
/// The evicted session is reset, so it loses readiness, its live visit and
/// its bindings. It is returned so the caller may shut it down.
pub fn reset_default() -> Option<SessionHandle> {
    let handle = DEFAULT_SESSION.write().take()?;
    debug!(session_id = %handle.id(), "Default session cleared");
    let _ = handle.reset();
    Some(handle)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use crate::error::Error;
    use crate::session::Session;

    const RACING_THREADS: usize = 8;

    // Single test: the slot is process-global.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_default_session_lifecycle() {
        reset_default();

        let err = default_session(|| Err(Error::config("boom"))).expect_err("init fails");
        assert!(matches!(err, Error::Config { .. }));

        let first = default_session(|| Session::builder().spawn()).expect("first");
        let second = default_session(|| panic!("init must not run twice")).expect("second");
        assert_eq!(first.id(), second.id());

        let evicted = reset_default().expect("evicted");
        assert_eq!(evicted.id(), first.id());
        assert!(reset_default().is_none());

        let fresh = default_session(|| Session::builder().spawn()).expect("fresh");
        assert_ne!(fresh.id(), first.id());

        evicted.shutdown();
        if let Some(handle) = reset_default() {
            handle.shutdown();
        }

        // Concurrent first calls construct exactly one session.
        let runtime = tokio::runtime::Handle::current();
        let barrier = Arc::new(Barrier::new(RACING_THREADS));
        let constructed = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..RACING_THREADS)
            .map(|_| {
                let runtime = runtime.clone();
                let barrier = Arc::clone(&barrier);
                let constructed = Arc::clone(&constructed);
                thread::spawn(move || {
                    let _guard = runtime.enter();
                    barrier.wait();
                    default_session(|| {
                        constructed.fetch_add(1, Ordering::SeqCst);
                        Session::builder().spawn()
                    })
                    .expect("default session")
                    .id()
                })
            })
            .collect();

        let ids: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().expect("worker"))
            .collect();

        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert!(ids.iter().all(|id| *id == ids[0]));

        if let Some(handle) = reset_default() {
            assert_eq!(handle.id(), ids[0]);
            handle.shutdown();
        }
    }
}
