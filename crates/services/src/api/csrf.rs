//! Reading the CSRF token out of a `Cookie` header value.

/// Cookie carrying the CSRF token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Request header the token is echoed in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Look up `name` in a `k1=v1; k2=v2` cookie string and percent-decode its value.
#[must_use]
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| percent_decode(value))
        })
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |decoded| decoded.into_owned())
}
