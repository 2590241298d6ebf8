//! Errors raised while building themed error pages

use thiserror::Error;

/// Everything that can stop an error page from being built.
///
/// `Terminate` is deliberately not part of this enum: it is the normal
/// outcome of the builder, not a failure.
#[derive(Error, Debug)]
pub enum ErrorPageError {
    /// Neither an `e<code>` bucket nor a `default` bucket is configured
    #[error("no custom_fields bucket for e{code} and no default bucket")]
    ConfigurationMissing { code: u16 },

    #[error("invalid error page configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} is not a valid HTTP status code")]
    InvalidStatus(u16),

    #[error("none of the templates {0:?} are registered")]
    TemplateNotFound(Vec<String>),

    #[error("template render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("template syntax error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Reaches the client as a bare 500 when a handler propagates it with `?`
impl actix_web::ResponseError for ErrorPageError {}

pub type Result<T> = std::result::Result<T, ErrorPageError>;
