use std::convert::Infallible;
use warp::{Filter, Rejection};
use serde::de::DeserializeOwned;

const MAX_FORM_BYTES: u64 = 16 * 1024;

pub fn with<T>(item: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone where T: Clone + Send {
    warp::any().map(move || item.clone())
}

/// A url-encoded form body, size-limited.
pub fn form<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone where T: DeserializeOwned + Send + 'static {
    warp::body::content_length_limit(MAX_FORM_BYTES).and(warp::body::form())
}

/// A url-encoded form body as raw key/value pairs, for forms that repeat
/// fields or name them after players.
pub fn form_pairs() -> impl Filter<Extract = (Vec<(String, String)>,), Error = Rejection> + Clone {
    form::<Vec<(String, String)>>()
}
