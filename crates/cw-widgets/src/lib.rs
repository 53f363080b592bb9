//! DOM-agnostic courseware widgets.
//!
//! Every widget talks to the page through the [`Node`] handle trait and to the
//! LMS through [`cw_client::CoursewareClient`]. The browser build supplies a
//! web-sys `Node`; tests use the in-memory one from `testing`.

pub mod bookmark;
pub mod certificate;
pub mod ecommerce;
pub mod error;
pub mod markup;
pub mod message;
pub mod node;

#[cfg(test)]
pub(crate) mod testing;

pub use bookmark::{BookmarkButton, BookmarkConfig, EndpointSource, KeyScheme, ToggleOutcome};
pub use certificate::{CertificateEditor, CertificateEditorView, CertificateError, CertificateEvent};
pub use ecommerce::{ExpiryCouponToggle, RegistrationCodePanel, ReportTrigger};
pub use error::WidgetError;
pub use message::{BannerState, MessageBanner};
pub use node::Node;
