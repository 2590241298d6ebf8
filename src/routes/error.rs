//! Handler for error pages

use actix_web::{get, web, HttpRequest, HttpResponse};
use themed_errors::RequestContext;

use crate::routes::ApplicationState;
use crate::routes::ErrorQuery;

/// Returns the error page with appropriate error displayed
#[get("/error")]
pub async fn error_page(
    req: HttpRequest,
    data: web::Data<ApplicationState>,
    q: web::Query<ErrorQuery>,
) -> actix_web::Result<HttpResponse> {
    let ecode_unwrapped = q.error_code.unwrap_or(500);
    let terminate = data.pages.builder().handle_framework_error(
        ecode_unwrapped,
        &RequestContext::from_request(&req),
        None,
    )?;
    Err(terminate.into())
}
