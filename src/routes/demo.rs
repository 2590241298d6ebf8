//! Routes showing both ways an error page gets produced

use actix_web::{error, get, web, HttpRequest, HttpResponse};
use themed_errors::{FieldSet, FieldValue};

use crate::routes::ApplicationState;

/// Error page with handler-supplied content and template
#[get("/teapot")]
pub async fn teapot(
    req: HttpRequest,
    data: web::Data<ApplicationState>,
) -> actix_web::Result<HttpResponse> {
    let fields = FieldSet::new()
        .with("Title", "Coffee is not available")
        .with(
            "Content",
            FieldValue::Html(String::from("<p>This server is <strong>short and stout</strong>.</p>")),
        );
    let terminate = data
        .pages
        .custom_error(&req, 418, fields, Some("TeapotPage"), None)?;
    Err(terminate.into())
}

/// Plain handler failure, themed on the way out by the middleware
#[get("/broken")]
pub async fn broken() -> actix_web::Result<HttpResponse> {
    Err(error::ErrorInternalServerError("upstream connection refused"))
}
