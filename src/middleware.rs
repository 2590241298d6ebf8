//! Wiring into actix-web: shared state plus an `ErrorHandlers` hook that
//! themes every 4xx/5xx response on its way out.

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{web, HttpRequest};

use crate::builder::ErrorResponseBuilder;
use crate::config::ErrorPagesConfig;
use crate::context::RequestContext;
use crate::error::Result;
use crate::fields::FieldSet;
use crate::render::PageRenderer;
use crate::response::{Terminate, Themed};

/// Configuration and templates, shared across workers as `web::Data<ErrorPages>`
#[derive(Debug)]
pub struct ErrorPages {
    config: ErrorPagesConfig,
    renderer: PageRenderer,
}

impl ErrorPages {
    /// Fails if the configuration would break at request time
    pub fn new(config: ErrorPagesConfig, renderer: PageRenderer) -> Result<ErrorPages> {
        config.validate()?;
        Ok(ErrorPages { config, renderer })
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn builder(&self) -> ErrorResponseBuilder<'_> {
        ErrorResponseBuilder::new(&self.config, &self.renderer)
    }

    /// See [`ErrorResponseBuilder::custom_error`]
    pub fn custom_error(
        &self,
        req: &HttpRequest,
        code: u16,
        fields: FieldSet,
        template: Option<&str>,
        controller_kind: Option<&str>,
    ) -> Result<Terminate> {
        self.builder()
            .custom_error(req, code, fields, template, controller_kind)
    }

    /// Middleware to `.wrap()` the app with. Needs `web::Data<ErrorPages>`
    /// registered as app data.
    pub fn handlers<B: 'static>() -> ErrorHandlers<B> {
        ErrorHandlers::new().default_handler(theme_error_response)
    }
}

fn theme_error_response<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let already_themed = res.response().extensions().get::<Themed>().is_some();
    if already_themed {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let pages = match res.request().app_data::<web::Data<ErrorPages>>() {
        Some(pages) => pages.clone(),
        None => {
            log::warn!("ErrorPages middleware is active but no ErrorPages app data is registered");
            return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
        }
    };

    let code = res.status().as_u16();
    let message = res.response().error().map(|e| e.to_string());
    let request = RequestContext::from_request(res.request());

    match pages
        .builder()
        .handle_framework_error(code, &request, message.as_deref())
    {
        Ok(terminate) => {
            let (req, original) = res.into_parts();
            let mut response = terminate.into_response();
            // only the body is replaced, handler headers stay
            for (name, value) in original.headers() {
                if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
                    response.headers_mut().append(name.clone(), value.clone());
                }
            }
            let themed = ServiceResponse::new(req, response).map_into_right_body();
            Ok(ErrorHandlerResponse::Response(themed))
        }
        Err(e) => {
            log::error!("Failed to build themed {} page: {}", code, e);
            Ok(ErrorHandlerResponse::Response(res.map_into_left_body()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};
    use serde_json::Map;

    fn pages(yaml: &str) -> web::Data<ErrorPages> {
        let mut renderer = PageRenderer::new(Map::new());
        renderer
            .register_template("Page", "<title>{{Title}}</title><p>{{Content}}</p>")
            .unwrap();
        let config = ErrorPagesConfig::from_yaml_str(yaml).unwrap();
        web::Data::new(ErrorPages::new(config, renderer).unwrap())
    }

    async fn fails() -> actix_web::Result<HttpResponse> {
        Err(actix_web::error::ErrorInternalServerError("DB timeout"))
    }

    async fn teapot(req: HttpRequest, pages: web::Data<ErrorPages>) -> actix_web::Result<HttpResponse> {
        let fields = FieldSet::new().with("Content", "short and stout");
        Err(pages.custom_error(&req, 418, fields, None, None)?.into())
    }

    #[actix_web::test]
    async fn themes_unmatched_routes() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}}"))
                .wrap(ErrorPages::handlers()),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(res).await;
        assert_eq!(body, "<title>Not Found</title><p></p>");
    }

    #[actix_web::test]
    async fn handler_error_message_becomes_content() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}}"))
                .wrap(ErrorPages::handlers())
                .route("/fails", web::get().to(fails)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/fails").to_request()).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(res).await;
        assert_eq!(body, "<title>Internal Server Error</title><p>DB timeout</p>");
    }

    #[actix_web::test]
    async fn configured_content_hides_handler_message() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}, e500: {Content: Sorry}}"))
                .wrap(ErrorPages::handlers())
                .route("/fails", web::get().to(fails)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/fails").to_request()).await;
        let body = test::read_body(res).await;
        assert_eq!(body, "<title>Internal Server Error</title><p>Sorry</p>");
    }

    #[actix_web::test]
    async fn custom_error_is_not_themed_twice() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {Content: fallback}}"))
                .wrap(ErrorPages::handlers())
                .route("/teapot", web::get().to(teapot)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/teapot").to_request()).await;
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        let body = test::read_body(res).await;
        assert_eq!(body, "<title>I&#x27;m a teapot</title><p>short and stout</p>");
    }

    #[actix_web::test]
    async fn ajax_requests_get_plain_text() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}}"))
                .wrap(ErrorPages::handlers())
                .route(
                    "/forbidden",
                    web::get().to(|| async { HttpResponse::Forbidden().finish() }),
                ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/forbidden")
            .insert_header(("X-Requested-With", "XMLHttpRequest"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = test::read_body(res).await;
        assert_eq!(body, "Forbidden");
    }

    async fn needs_login() -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"members\""))
            .insert_header((header::RETRY_AFTER, "30"))
            .content_type("text/plain")
            .body("login required")
    }

    #[actix_web::test]
    async fn handler_headers_survive_theming() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}}"))
                .wrap(ErrorPages::handlers())
                .route("/members", web::get().to(needs_login)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/members").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"members\""
        );
        assert_eq!(res.headers().get(header::RETRY_AFTER).unwrap(), "30");
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let body = test::read_body(res).await;
        assert_eq!(body, "<title>Unauthorized</title><p></p>");
    }

    #[actix_web::test]
    async fn successful_responses_pass_through() {
        let app = test::init_service(
            App::new()
                .app_data(pages("custom_fields: {default: {}}"))
                .wrap(ErrorPages::handlers())
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("home") })),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "home");
    }
}
