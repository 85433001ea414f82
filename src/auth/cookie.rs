// Session cookie encoding and extraction

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the cookie carrying the session JWT
pub const SESSION_COOKIE: &str = "token";

/// `Set-Cookie` value that stores the session token for `max_age_seconds`
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session cookie immediately
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict", SESSION_COOKIE)
}

/// Header value form of [`clear_session_cookie`]
pub fn clear_session_header() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict")
}

/// Read the session token from the request's `Cookie` headers
///
/// Returns `None` when the cookie is absent or empty.
pub fn read_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.trim().to_string())
        })
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi", 86400, false);

        assert!(cookie.starts_with("token=abc.def.ghi;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));

        assert!(session_cookie("t", 1, true).ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(clear_session_header().to_str().unwrap(), cookie);
    }

    #[test]
    fn test_read_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; token=abc.def.ghi; lang=en");
        assert_eq!(read_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_or_empty_token_is_none() {
        assert_eq!(read_session_token(&HeaderMap::new()), None);
        assert_eq!(read_session_token(&headers_with_cookie("theme=dark")), None);
        assert_eq!(read_session_token(&headers_with_cookie("token=")), None);
        // Prefix match on the name must not count
        assert_eq!(read_session_token(&headers_with_cookie("mytoken=x")), None);
    }
}
