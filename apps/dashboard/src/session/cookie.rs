use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "qpr_session";

/// Reads the session id from the `Cookie` header, if present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// Adds `Set-Cookie` for a freshly created session. Browser-session lifetime
/// (no `Max-Age`) and no `Secure` flag: the dashboard is served over plain HTTP
/// for local use; put it behind TLS and add `Secure` before exposing it.
pub fn attach(response: &mut Response, id: Uuid) {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
