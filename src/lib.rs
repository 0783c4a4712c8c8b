//! # EventPro
//!
//! Content engine for an event-management company's website. The whole
//! editable site (hero carousel, about, testimonials, contact, footer,
//! gallery) is one JSON document that lives in up to three places:
//! built-in defaults, a local store and an optional hosted table.
//!
//! ## Features
//!
//! - **Total loads**: Reads never fail; remote, then local, then defaults
//! - **Legacy upgrades**: Older flat hero and gallery shapes are migrated on read
//! - **Deep merge**: Stored values overlay defaults, arrays replace wholesale
//! - **Best-effort saves**: Local then remote, with a report instead of errors
//! - **Real-time**: WebSocket notifications when the document changes
//! - **Admin API**: Password-gated editing and review moderation
//!
//! ## Modules
//!
//! - [`content`]: Document model, defaults, migration, merge, stores
//! - [`admin`]: Editing operations, review validation, images, sessions
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Change notifications
//! - [`config`]: TOML + environment configuration
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eventpro::content::{ContentStore, LocalStore, DEFAULT_QUOTA_BYTES};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = ContentStore::local_only(LocalStore::new("site_data", DEFAULT_QUOTA_BYTES));
//!
//!     // Always a complete document, even with nothing stored
//!     let mut document = store.load().await;
//!     document.contact.set_phone("+91 98765 43210");
//!
//!     let report = store.save(&document).await;
//!     if report.local.is_failed() {
//!         eprintln!("Local copy not written: {:?}", report.local);
//!     }
//! }
//! ```

pub mod admin;
pub mod api;
pub mod config;
pub mod content;
pub mod logging;
pub mod websocket;

// Re-export top-level types for convenience
pub use content::{
    deep_merge, default_document, migrate, reconcile, ContentDocument, ContentError,
    ContentResult, ContentStore, LoadOutcome, LoadSource, LocalStore, RemoteStore, SaveReport,
    StorePolicy,
};

pub use admin::{AdminGate, EditError, EditResult};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{websocket_handler, ClientMessage, ServerMessage};

pub use config::{Config, ConfigError, LoggingConfig};
