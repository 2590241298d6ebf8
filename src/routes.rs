//! Module containing functions responsible for actual
//! handling of HTTP requests

// actix and serde
use actix_web::web;
use serde::Deserialize;
// crate
use themed_errors::ErrorPages;

pub mod demo;
pub mod error;
pub mod index;

/// Status code requested from the error page route
#[derive(Deserialize)]
pub struct ErrorQuery {
    error_code: Option<u16>,
}

/// Struct containing various components of the application
pub struct ApplicationState {
    pub pages: web::Data<ErrorPages>,
    pub site_name: String,
}
