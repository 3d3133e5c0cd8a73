/// Ambient cookie state, the equivalent of `document.cookie`.
pub trait CookieSource {
    fn cookie_string(&self) -> String;
}

impl CookieSource for String {
    fn cookie_string(&self) -> String {
        self.clone()
    }
}

impl CookieSource for &str {
    fn cookie_string(&self) -> String {
        self.to_string()
    }
}

/// Reads single cookies out of a [`CookieSource`].
#[derive(Debug, Clone)]
pub struct CookieReader<S> {
    source: S,
}

impl<S: CookieSource> CookieReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn read(&self, name: &str) -> Option<String> {
        read_cookie(&self.source.cookie_string(), name)
    }
}

/// Find `name` in a `;`-delimited cookie string and return its percent-decoded value.
///
/// Entries are trimmed before matching and only an exact `name=` prefix counts,
/// so `xcsrftoken=1` never matches `csrftoken`. The first match wins.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let prefix = format!("{}=", name);
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_csrf_token_between_other_cookies() {
        assert_eq!(
            read_cookie("a=1; csrftoken=XYZ; b=2", "csrftoken"),
            Some("XYZ".to_string())
        );
    }

    #[test]
    fn missing_cookie_is_absent() {
        assert_eq!(read_cookie("a=1; b=2", "csrftoken"), None);
        assert_eq!(read_cookie("", "csrftoken"), None);
    }

    #[test]
    fn prefix_must_be_exact() {
        assert_eq!(read_cookie("xcsrftoken=bad; csrftoken=good", "csrftoken"), Some("good".to_string()));
        assert_eq!(read_cookie("csrftokenx=bad", "csrftoken"), None);
    }

    #[test]
    fn first_match_wins_and_value_is_decoded() {
        let cookies = "sid=a%20b; sid=second";
        assert_eq!(read_cookie(cookies, "sid"), Some("a b".to_string()));
    }

    #[test]
    fn value_may_contain_equals_sign() {
        assert_eq!(read_cookie("t=abc==", "t"), Some("abc==".to_string()));
    }

    #[test]
    fn reader_uses_source() {
        let reader = CookieReader::new("csrftoken=tok".to_string());
        assert_eq!(reader.read("csrftoken"), Some("tok".to_string()));
        assert_eq!(reader.read("sessionid"), None);
    }
}
