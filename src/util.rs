use lambda_http::{Body, Error, Request, Response};
use url::Url;

/// Absolute `http`/`https` URL with a host, written out with `scheme://` and
/// no surrounding whitespace.
pub fn valid_url(u: &str) -> bool {
    if !(u.starts_with("http://") || u.starts_with("https://")) {
        return false;
    }
    if let Ok(parsed) = Url::parse(u) {
        match parsed.scheme() {
            "http" | "https" => {}
            _ => return false,
        }
        return parsed.host().is_some();
    }
    false
}

pub fn epoch_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn body_bytes(req: &Request) -> Vec<u8> {
    match req.body() {
        Body::Text(s) => s.as_bytes().to_vec(),
        Body::Binary(b) => b.clone(),
        _ => Vec::new(),
    }
}

pub fn resp_text(status: u16, text: &str) -> Result<Response<Body>, Error> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Body::Text(text.to_string()))
        .map_err(|e| Error::from(format!("resp: {e}")))
}

pub fn resp_html(html: String) -> Result<Response<Body>, Error> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Cache-Control", "no-store")
        .body(Body::Text(html))
        .map_err(|e| Error::from(format!("resp: {e}")))
}

/// 303 so the browser re-fetches with GET instead of resubmitting the form.
pub fn see_other(location: &str) -> Result<Response<Body>, Error> {
    Response::builder()
        .status(303)
        .header("Location", location)
        .body(Body::Empty)
        .map_err(|e| Error::from(format!("resp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::valid_url;

    #[test]
    fn accepts_https() {
        assert!(valid_url("https://example.com"));
    }

    #[test]
    fn accepts_http_with_path() {
        assert!(valid_url("http://example.com/a/b?c=d"));
    }

    #[test]
    fn rejects_javascript_urls() {
        assert!(!valid_url("javascript:alert(1)"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(!valid_url("ftp://example.com/file"));
        assert!(!valid_url("mailto:someone@example.com"));
    }

    #[test]
    fn rejects_plain_text() {
        assert!(!valid_url("hello there"));
        assert!(!valid_url("example.com"));
    }

    #[test]
    fn rejects_lenient_spellings() {
        assert!(!valid_url(" https://example.com"));
        assert!(!valid_url("https:example.com"));
        assert!(!valid_url("HTTPS://example.com"));
        assert!(!valid_url("https://"));
    }

    #[test]
    fn rejects_empty() {
        assert!(!valid_url(""));
    }
}
