use warp::{http::StatusCode, Reply, Rejection, reject};
use serde_json::json;
use std::convert::Infallible;
use thiserror::Error;
use log::{error, warn};
use crate::store::StoreError;
use crate::AHandlebars;

pub fn store_err(err: StoreError) -> Rejection {
    reject::custom(ServerError::StoreError(err))
}

pub fn template_err(err: handlebars::RenderError) -> Rejection {
    reject::custom(ServerError::TemplateError(err))
}

pub fn player_not_found(id: i32) -> Rejection {
    reject::custom(ServerError::PlayerNotFound(id))
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("error rendering template: {0}")]
    TemplateError(#[from] handlebars::RenderError),
    #[error("player {0} not found")]
    PlayerNotFound(i32),
}

impl warp::reject::Reject for ServerError {}

// ServerError must be checked before warp's own rejections, since sibling
// routes add a MethodNotAllowed to every failed request
fn classify(err: &Rejection) -> (StatusCode, String) {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Page not found".into())
    } else if let Some(e) = err.find::<ServerError>() {
        match e {
            ServerError::PlayerNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
            ServerError::StoreError(_) | ServerError::TemplateError(_) => {
                error!("ServerError: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong, please try again".into())
            },
        }
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request".into())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Form too large".into())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Form is missing its length".into())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".into())
    } else {
        warn!("unhandled rejection {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Unhandled rejection".into())
    }
}

pub async fn handle_rejection(err: Rejection, hb: AHandlebars) -> Result<impl Reply, Infallible> {
    let (code, message) = classify(&err);
    let html = hb.render("error", &json!({
        "title": "Error",
        "code": code.as_u16(),
        "message": message,
    })).unwrap_or_else(|render_err| {
        error!("couldn't render error page: {}", render_err);
        format!("<h1>{}</h1><p>{}</p>", code.as_u16(), message)
    });
    Ok(warp::reply::with_status(warp::reply::html(html), code))
}
