//! Handler for the main page (index)

use actix_session::Session;
use actix_web::{get, http::header::ContentType, web, HttpRequest, HttpResponse};
use serde_json::{Map, Value};
use themed_errors::{FieldSet, RequestContext};

use crate::routes::ApplicationState;

/// Responder for site root
#[get("/")]
pub async fn root(
    req: HttpRequest,
    data: web::Data<ApplicationState>,
    session: Session,
) -> actix_web::Result<HttpResponse> {
    let visits = session.get::<i64>("visits")?.unwrap_or(0) + 1;
    session.insert("visits", visits)?;

    let mut session_data = Map::new();
    session_data.insert(String::from("visits"), Value::from(visits));
    let request = RequestContext::from_request(&req).with_session(session_data);

    let fields = FieldSet::new()
        .with("Title", data.site_name.as_str())
        .with(
            "Content",
            "Try /missing, /teapot, /broken or /error?error_code=403 to see the error pages.",
        );
    let renderer = data.pages.renderer();
    let body = renderer.render("Page", &renderer.context(&fields, None, &request))?;

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(body))
}
