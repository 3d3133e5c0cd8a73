use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const FEED_PAGE_SIZE: usize = 7;
pub const PROFILE_PAGE_SIZE: usize = 9;
pub const FEED_SCROLL_THRESHOLD: i64 = 10;
pub const PROFILE_SCROLL_THRESHOLD: i64 = 50;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const PLACEHOLDER_AVATAR: &str = "/static/app/img/empty_user.jpg";
pub const UNFOLLOW_MODAL_TARGET: &str = "#unfollowModal";

/// Parsed value of `key`; unset, unparsable, zero and negative values give `default`.
fn env_positive<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

pub fn base_url() -> String {
    std::env::var("GRAMM_BASE_URL")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn feed_page_size() -> usize {
    env_positive("GRAMM_FEED_PAGE_SIZE", FEED_PAGE_SIZE)
}

pub fn profile_page_size() -> usize {
    env_positive("GRAMM_PROFILE_PAGE_SIZE", PROFILE_PAGE_SIZE)
}

pub fn feed_scroll_threshold() -> i64 {
    env_positive("GRAMM_FEED_SCROLL_THRESHOLD", FEED_SCROLL_THRESHOLD)
}

pub fn profile_scroll_threshold() -> i64 {
    env_positive("GRAMM_PROFILE_SCROLL_THRESHOLD", PROFILE_SCROLL_THRESHOLD)
}

pub fn request_timeout() -> Duration {
    Duration::from_secs(env_positive("GRAMM_REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS))
}

pub fn csrf_cookie_name() -> String {
    std::env::var("GRAMM_CSRF_COOKIE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| CSRF_COOKIE_NAME.to_string())
}

/// Scroll behaviour of one paginated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub page_size: usize,
    pub scroll_threshold: i64,
}

impl PagingConfig {
    pub fn feed() -> Self {
        Self {
            page_size: feed_page_size(),
            scroll_threshold: feed_scroll_threshold(),
        }
    }

    pub fn profile() -> Self {
        Self {
            page_size: profile_page_size(),
            scroll_threshold: profile_scroll_threshold(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub csrf_cookie: String,
    pub timeout: Duration,
    pub feed: PagingConfig,
    pub profile: PagingConfig,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: base_url(),
            csrf_cookie: csrf_cookie_name(),
            timeout: request_timeout(),
            feed: PagingConfig::feed(),
            profile: PagingConfig::profile(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_cookie: CSRF_COOKIE_NAME.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            feed: PagingConfig {
                page_size: FEED_PAGE_SIZE,
                scroll_threshold: FEED_SCROLL_THRESHOLD,
            },
            profile: PagingConfig {
                page_size: PROFILE_PAGE_SIZE,
                scroll_threshold: PROFILE_SCROLL_THRESHOLD,
            },
        }
    }
}
