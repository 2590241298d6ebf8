//! Ambient request state the builder needs to know about

use actix_web::HttpRequest;
use serde_json::{Map, Value};

/// What the builder looks at from the incoming request.
///
/// Error pages never render `current_page` or `session`; they are carried
/// here so the host's ordinary pages and the error pages can be built from
/// the same context type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub is_ajax: bool,
    pub current_page: Option<String>,
    pub session: Map<String, Value>,
}

impl RequestContext {
    /// Context for a plain browser request
    pub fn page(path: &str) -> RequestContext {
        RequestContext {
            current_page: Some(path.to_string()),
            ..RequestContext::default()
        }
    }

    /// Context for an AJAX/API request
    pub fn ajax() -> RequestContext {
        RequestContext {
            is_ajax: true,
            ..RequestContext::default()
        }
    }

    pub fn from_request(req: &HttpRequest) -> RequestContext {
        RequestContext {
            is_ajax: is_ajax(req),
            current_page: Some(req.path().to_string()),
            session: Map::new(),
        }
    }

    pub fn with_session(mut self, session: Map<String, Value>) -> RequestContext {
        self.session = session;
        self
    }
}

/// A request counts as AJAX when it sends `X-Requested-With: XMLHttpRequest`
/// or has `ajax=1` in its query string.
pub fn is_ajax(req: &HttpRequest) -> bool {
    let header = req
        .headers()
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.eq_ignore_ascii_case("XMLHttpRequest"));
    let query = req
        .query_string()
        .split('&')
        .any(|pair| pair == "ajax=1");
    header || query
}
