// std
use std::env;
use std::fs::read_to_string;
use std::io;
// actix and serde
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware::Logger, web, App, HttpServer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
// crate
use themed_errors::{ErrorPages, ErrorPagesConfig, PageRenderer};

mod routes;

#[derive(Serialize, Deserialize, Clone)]
pub struct SiteConfig {
    site_name: String,
    server_address: String,
    server_port: u16,
    theme: String,
    #[serde(default = "default_cookie_name")]
    session_cookie_name: String,
    error_pages: ErrorPagesConfig,
}

fn default_cookie_name() -> String {
    String::from("themed-errors-session")
}

fn invalid_data<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    // starting the logger
    let logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message,
            ))
        })
        .level(log::LevelFilter::Info) // `Debug` shows template and bucket resolution
        .chain(std::io::stdout())
        .chain(fern::log_file("themed-errors.log")?)
        .apply();
    match logger {
        Ok(_) => log::info!("themed-errors starting"),
        Err(e) => println!("WARNING: Failed to start logger: {}", e),
    };

    // reading site config
    let config_path = env::var("THEMED_ERRORS_CONFIG").unwrap_or_else(|_| String::from("config.yaml"));
    let config: SiteConfig = serde_yaml::from_str(&read_to_string(&config_path)?).map_err(invalid_data)?;

    let mut globals = Map::new();
    globals.insert(String::from("SiteName"), Value::from(config.site_name.clone()));
    let renderer = PageRenderer::for_theme(&config.theme, globals).map_err(invalid_data)?;
    let error_pages =
        web::Data::new(ErrorPages::new(config.error_pages.clone(), renderer).map_err(invalid_data)?);

    let application_data = web::Data::new(routes::ApplicationState {
        pages: error_pages.clone(),
        site_name: config.site_name.clone(),
    });

    let session_key = Key::generate();
    let static_dir = format!("./themes/{}/static", config.theme);
    let cookie_name = config.session_cookie_name.clone();

    log::info!(
        "Listening on {}:{} with theme {}",
        config.server_address,
        config.server_port,
        config.theme
    );

    HttpServer::new(move || {
        App::new()
            .app_data(error_pages.clone())
            .app_data(application_data.clone())
            .wrap(ErrorPages::handlers())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name(cookie_name.clone())
                    .build(),
            )
            .wrap(Logger::default())
            .service(actix_files::Files::new("/static", static_dir.clone()))
            .service(routes::index::root)
            .service(routes::error::error_page)
            .service(routes::demo::teapot)
            .service(routes::demo::broken)
    })
    .bind((config.server_address.as_str(), config.server_port))?
    .run()
    .await
}
