mod health_check;
mod home;
mod submit;
mod submit_review;

pub use health_check::*;
pub use home::*;
pub use submit::*;
pub use submit_review::*;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::web::Bytes;
use actix_web::HttpRequest;
use serde::de::DeserializeOwned;

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

fn is_json(request: &HttpRequest) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Decodes a JSON request body. A body that is empty or not sent as
/// `application/json` reads as `{}`.
pub fn parse_json_body<T: DeserializeOwned>(
    request: &HttpRequest,
    body: &Bytes,
) -> Result<T, serde_json::Error> {
    if !is_json(request) || body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}")
    } else {
        serde_json::from_slice(body)
    }
}
