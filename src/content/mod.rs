//! Content Reconciliation Engine
//!
//! - **document**: Typed site document (camelCase on the wire)
//! - **defaults**: The baseline document
//! - **migrate**: Upgrades for legacy stored shapes
//! - **merge**: Deep merge of a stored value over the defaults
//! - **local**: File-backed key-value store
//! - **remote**: Hosted table client and the `RemoteStore` trait
//! - **engine**: `ContentStore`, the loader/saver over both stores
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use eventpro::content::{ContentStore, LocalStore, DEFAULT_QUOTA_BYTES};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = ContentStore::local_only(LocalStore::new("./data", DEFAULT_QUOTA_BYTES));
//!
//!     let mut doc = store.load().await;
//!     doc.contact.phone = "+91 73560 44637".to_string();
//!
//!     let report = store.save(&doc).await;
//!     println!("local: {:?}, remote: {:?}", report.local, report.remote);
//! }
//! ```

pub mod defaults;
pub mod document;
pub mod engine;
pub mod error;
pub mod local;
pub mod merge;
pub mod migrate;
pub mod remote;

pub use defaults::{default_document, default_gallery_images, default_value};
pub use document::{
    digits_only, About, Album, Certification, Contact, ContentDocument, Footer, Gallery,
    GalleryImage, Hero, HeroSlide, HeroStats, Testimonial, TestimonialStatus,
};
pub use engine::{
    reconcile, ChangeEvent, ChangeOrigin, ContentStore, LoadOutcome, LoadSource, RemoteStatus,
    SaveReport, StorePolicy, StoreStatus, WriteOutcome,
};
pub use error::{ContentError, ContentResult};
pub use local::{LocalStore, CONTENT_KEY, DEFAULT_QUOTA_BYTES, LEGACY_GALLERY_KEY};
pub use merge::deep_merge;
pub use migrate::{migrate, pending_steps, MigrationStep};
pub use remote::{
    HostedTableClient, MemoryRemote, RemoteConfig, RemoteError, RemoteStore, PLACEHOLDER_URL,
};
