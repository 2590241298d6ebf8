//! Themed error pages for actix-web sites.
//!
//! Error responses are rendered through the site's own handlebars theme,
//! with content configured per status code in YAML. Register
//! [`ErrorPages`] as app data and wrap the app with
//! [`ErrorPages::handlers`]; handlers that want an error page with their
//! own content call [`ErrorPages::custom_error`] and return the resulting
//! [`Terminate`] as their error.

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod middleware;
pub mod page;
pub mod render;
pub mod response;

pub use builder::ErrorResponseBuilder;
pub use config::ErrorPagesConfig;
pub use context::RequestContext;
pub use error::ErrorPageError;
pub use fields::{FieldSet, FieldValue};
pub use middleware::ErrorPages;
pub use render::PageRenderer;
pub use response::Terminate;
