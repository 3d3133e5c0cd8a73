use std::sync::OnceLock;
use ammonia::Builder;
use chrono::{DateTime, Utc};
use html_escape::encode_double_quoted_attribute;
use regex::Regex;
use crate::models::models::{PostId, UserId};

pub fn profile_route(user_id: UserId) -> String {
    format!("/app/{}/profile", user_id)
}

pub fn post_route(post_id: PostId) -> String {
    format!("/app/p/{}", post_id)
}

/// `"1 like"`, `"2 likes"`, `"0 likes"`.
pub fn count_label(count: u64, singular: &str, plural: &str) -> String {
    format!("{} {}", count, noun_for(count, singular, plural))
}

pub fn noun_for<'a>(count: u64, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"https?://[^\s<]+").expect("Regex should compile"))
}

/// Caption text as safe HTML: markup stripped, bare URLs turned into links.
pub fn caption_html(caption: &str) -> String {
    let clean = Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(caption)
        .to_string();

    url_regex()
        .replace_all(&clean, |caps: &regex::Captures| {
            let url = &caps[0];
            // ammonia already entity-encoded the text
            let decoded = html_escape::decode_html_entities(url);
            let escaped_url = encode_double_quoted_attribute(&decoded);
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escaped_url, url
            )
        })
        .to_string()
}

/// Format a publication date the way the feed shows it.
///
/// RFC 3339 timestamps become relative ("5 MINUTES AGO", "MARCH 4, 2021");
/// anything else is assumed to be preformatted by the server and returned as is.
pub fn format_pub_date(raw: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(published) => relative_date(published, now),
        Err(_) => raw.to_string(),
    }
}

fn relative_date(published: DateTime<chrono::FixedOffset>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(published);
    // Timestamps slightly in the future are clock skew.
    let total_secs = diff.num_seconds().max(0);
    let days = total_secs / 86_400;
    let secs = total_secs % 86_400;

    let text = match days {
        0 if secs >= 3600 => {
            let hours = secs / 3600;
            format!("{} {} ago", hours, noun_for(hours as u64, "hour", "hours"))
        }
        0 if secs >= 60 => {
            let minutes = secs / 60;
            format!("{} {} ago", minutes, noun_for(minutes as u64, "minute", "minutes"))
        }
        0 if secs < 10 => "seconds ago".to_string(),
        0 => format!("{} seconds ago", secs),
        1..=6 => format!("{} {} ago", days, noun_for(days as u64, "day", "days")),
        7 => "1 week ago".to_string(),
        d if d < 365 => published.format("%B %-d").to_string(),
        _ => published.format("%B %-d, %Y").to_string(),
    };
    text.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn labels_switch_at_one() {
        assert_eq!(count_label(0, "like", "likes"), "0 likes");
        assert_eq!(count_label(1, "like", "likes"), "1 like");
        assert_eq!(count_label(2, "like", "likes"), "2 likes");
    }

    #[test]
    fn preformatted_dates_pass_through() {
        assert_eq!(format_pub_date("2 HOURS AGO", now()), "2 HOURS AGO");
    }

    #[test]
    fn recent_dates_are_relative() {
        assert_eq!(format_pub_date("2022-03-20T11:59:55Z", now()), "SECONDS AGO");
        assert_eq!(format_pub_date("2022-03-20T11:59:30Z", now()), "30 SECONDS AGO");
        assert_eq!(format_pub_date("2022-03-20T11:59:00Z", now()), "1 MINUTE AGO");
        assert_eq!(format_pub_date("2022-03-20T09:00:00Z", now()), "3 HOURS AGO");
        assert_eq!(format_pub_date("2022-03-19T12:00:00Z", now()), "1 DAY AGO");
        assert_eq!(format_pub_date("2022-03-13T12:00:00Z", now()), "1 WEEK AGO");
    }

    #[test]
    fn old_dates_show_calendar_date() {
        assert_eq!(format_pub_date("2022-03-04T12:00:00Z", now()), "MARCH 4");
        assert_eq!(format_pub_date("2021-03-04T12:00:00Z", now()), "MARCH 4, 2021");
    }

    #[test]
    fn future_dates_clamp_to_now() {
        assert_eq!(format_pub_date("2022-03-20T12:00:05Z", now()), "SECONDS AGO");
    }

    #[test]
    fn caption_strips_markup_and_links_urls() {
        let html = caption_html("<b>sunset</b> at https://example.com/p?a=1&b=2");
        assert!(!html.contains("<b>"));
        assert!(html.starts_with("sunset at <a href=\"https://example.com/p?a=1&amp;b=2\""));
    }

    #[test]
    fn caption_escapes_script() {
        let html = caption_html("<script>alert(1)</script>hi");
        assert!(!html.contains("<script>"));
        assert!(html.ends_with("hi"));
    }
}
