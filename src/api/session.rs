use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::AppState;

/// Where unauthenticated requests are sent
pub const LOGIN_PATH: &str = "/auth";

/// Value of the named cookie, if present in any `Cookie` header
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the session cookie and attach the [`Session`](crate::auth::Session)
/// to the request, or redirect to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match cookie_value(request.headers(), &state.cookie_name) {
        Some(token) => state.sessions.resolve(&token).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "No valid session, redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; bruss_session=abc123; lang=pl"),
        );
        assert_eq!(cookie_value(&headers, "bruss_session").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(&headers, "lang").as_deref(), Some("pl"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("bruss_session="));
        assert_eq!(cookie_value(&headers, "bruss_session"), None);
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("bruss_session=\"xyz\""));
        assert_eq!(cookie_value(&headers, "bruss_session").as_deref(), Some("xyz"));
    }
}
