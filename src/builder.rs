//! Builds themed error responses.
//!
//! Field precedence, lowest first:
//! 1. built-ins (`Title` from the status reason phrase, `ErrorResponseCode`)
//! 2. `custom_fields.e<code>`, or `custom_fields.default` when there is none
//! 3. fields supplied by the caller
//!
//! A message passed to [`ErrorResponseBuilder::handle_framework_error`] is
//! only used when the code has no bucket of its own: internal error messages
//! are not necessarily fit for end users.

use actix_web::http::StatusCode;
use actix_web::HttpRequest;

use crate::config::ErrorPagesConfig;
use crate::context::RequestContext;
use crate::error::{ErrorPageError, Result};
use crate::fields::{FieldSet, FieldValue};
use crate::page::PlaceholderPage;
use crate::render::{PageRenderer, GENERIC_TEMPLATE};
use crate::response::Terminate;

pub struct ErrorResponseBuilder<'a> {
    config: &'a ErrorPagesConfig,
    renderer: &'a PageRenderer,
}

/// Validated status code
pub fn status_for(code: u16) -> Result<StatusCode> {
    StatusCode::from_u16(code).map_err(|_| ErrorPageError::InvalidStatus(code))
}

/// Reason phrase for the status, or `Error <code>` for unassigned codes
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("Error {}", status.as_u16()),
    }
}

impl<'a> ErrorResponseBuilder<'a> {
    pub fn new(config: &'a ErrorPagesConfig, renderer: &'a PageRenderer) -> ErrorResponseBuilder<'a> {
        ErrorResponseBuilder { config, renderer }
    }

    /// Hook for errors raised by the framework or by handlers.
    pub fn handle_framework_error(
        &self,
        code: u16,
        request: &RequestContext,
        message: Option<&str>,
    ) -> Result<Terminate> {
        let mut fields = FieldSet::new();
        if self.config.has_code_bucket(code) {
            if let Some(msg) = message {
                log::debug!("Discarding message for {} in favour of configured content: {}", code, msg);
            }
        } else {
            // the message, or its absence, replaces any default Content
            fields.insert("Content", message.unwrap_or(""));
        }
        self.build_error_response(request, code, fields, None, None)
    }

    /// Configured fields for the code, see [`ErrorPagesConfig::resolve_fields`]
    pub fn resolve_default_fields(&self, code: u16) -> Result<FieldSet> {
        self.config.resolve_fields(code)
    }

    /// Candidate templates in the order they are tried
    pub fn template_chain(&self, template: Option<&str>) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let candidates = template
            .into_iter()
            .chain(self.config.default_template.names())
            .chain(std::iter::once(GENERIC_TEMPLATE));
        for name in candidates {
            if !name.is_empty() && !chain.iter().any(|c| c == name) {
                chain.push(name.to_string());
            }
        }
        chain
    }

    pub fn build_error_response(
        &self,
        request: &RequestContext,
        code: u16,
        overrides: FieldSet,
        template: Option<&str>,
        controller_kind: Option<&str>,
    ) -> Result<Terminate> {
        let status = status_for(code)?;

        // AJAX and API clients get the status and a short message only
        if request.is_ajax {
            let message = overrides
                .get("Content")
                .map(FieldValue::to_plain_text)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status_text(status));
            return Ok(Terminate::minimal(status, message));
        }

        let controller_kind = controller_kind.unwrap_or(&self.config.default_controller);
        let chain = self.template_chain(template);

        let builtins = FieldSet::new()
            .with("Title", status_text(status))
            .with("ErrorResponseCode", i64::from(code));
        let fields = builtins
            .merge(self.resolve_default_fields(code)?)
            .merge(overrides);

        let page = PlaceholderPage::new(code, controller_kind, fields);
        // Fresh request state: no current page, empty session
        let context = self
            .renderer
            .context(&page.fields, Some(&page), &RequestContext::default());
        let body = self.renderer.render_first(&chain, &context)?;

        log::debug!("Built themed {} page as {}", code, page.kind);
        Ok(Terminate::themed(status, body))
    }

    /// Entry point for handlers that want an error page with their own content.
    pub fn custom_error(
        &self,
        req: &HttpRequest,
        code: u16,
        fields: FieldSet,
        template: Option<&str>,
        controller_kind: Option<&str>,
    ) -> Result<Terminate> {
        self.build_error_response(
            &RequestContext::from_request(req),
            code,
            fields,
            template,
            controller_kind,
        )
    }
}
