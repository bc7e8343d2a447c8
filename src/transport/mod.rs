//! Bridge transport layer.
//!
//! This module handles everything that crosses into the browser surface:
//! document loads, bridge calls and bridge injection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   BridgeCall (script)    ┌──────────────────┐
//! │  SessionCore     │─────────────────────────►│  Browser surface │
//! │                  │   load_url / inject      │                  │
//! │  Bridge          │                          │  window.webView  │
//! │                  │◄─────────────────────────│  TurbolinksNative│
//! └──────────────────┘   BridgeMessage (glue)   └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `assets` | Bridge shim and probe scripts |
//! | `bridge` | Fire-and-forget call execution |
//! | `surface` | Browser surface trait |

// ============================================================================
// Submodules
// ============================================================================

/// Bridge shim and probe scripts.
pub mod assets;

/// Fire-and-forget call execution.
pub mod bridge;

/// Browser surface trait.
pub mod surface;

// ============================================================================
// Re-exports
// ============================================================================

pub use bridge::Bridge;
pub use surface::BrowserSurface;
