//! Site administration
//!
//! - **ops**: Edits to the document (hero, sections, testimonials, gallery)
//! - **validation**: Checks on visitor-submitted reviews
//! - **media**: Image URLs and embedded image files
//! - **auth**: Password gate and session tokens
//! - **error**: Error types

pub mod auth;
pub mod error;
pub mod media;
pub mod ops;
pub mod validation;

pub use auth::{parse_bearer, AdminGate, Session, DEFAULT_ADMIN_PASSWORD};
pub use error::{EditError, EditResult};
pub use media::ImageSource;
pub use ops::{AboutUpdate, ContactUpdate, FooterUpdate, NewAlbum, NewTestimonial};
pub use validation::{sanitize_input, validate_review, ReviewInput};
