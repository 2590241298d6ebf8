//! The outcome every successful error page build ends with

use std::fmt;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Response extension marking a response that has already been themed, so
/// the error handler middleware leaves it alone.
#[derive(Debug, Clone, Copy)]
pub struct Themed;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateBody {
    /// Rendered page
    Themed(String),
    /// Plain text for AJAX/API clients
    Minimal(String),
}

/// "Stop handling this request and send this response instead."
///
/// The builder returns this on success rather than a bare response so the
/// request-handling boundary has to emit it explicitly. Handlers can turn
/// it into an `actix_web::Error` with `?` or `.into()`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminate {
    pub status: StatusCode,
    pub body: TerminateBody,
}

impl Terminate {
    pub fn themed(status: StatusCode, html: String) -> Terminate {
        Terminate {
            status,
            body: TerminateBody::Themed(html),
        }
    }

    pub fn minimal(status: StatusCode, message: String) -> Terminate {
        Terminate {
            status,
            body: TerminateBody::Minimal(message),
        }
    }

    pub fn is_themed(&self) -> bool {
        matches!(self.body, TerminateBody::Themed(_))
    }

    pub fn into_response(self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status);
        let mut response = match self.body {
            TerminateBody::Themed(html) => builder.content_type(ContentType::html()).body(html),
            TerminateBody::Minimal(text) => {
                builder.content_type(ContentType::plaintext()).body(text)
            }
        };
        response.extensions_mut().insert(Themed);
        response
    }
}

impl fmt::Display for Terminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            TerminateBody::Themed(_) => write!(f, "{} (themed page)", self.status),
            TerminateBody::Minimal(text) => write!(f, "{}: {}", self.status, text),
        }
    }
}

impl ResponseError for Terminate {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        self.clone().into_response()
    }
}
