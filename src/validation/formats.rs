use chrono::{DateTime, NaiveDate, NaiveDateTime};
use phonenumber::country;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

/// Parses with `region` as the default country for numbers without a prefix.
pub fn is_phone(value: &str, region: Option<country::Id>) -> bool {
    phonenumber::parse(region, value.trim())
        .map(|number| phonenumber::is_valid(&number))
        .unwrap_or(false)
}

/// Absolute http(s) URL with a host.
pub fn is_url(value: &str) -> bool {
    let Ok(url) = url::Url::parse(value.trim()) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|host| !host.is_empty())
}

/// Accepts RFC 3339, common date-time layouts and bare dates (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let raw = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::{is_email, is_phone, is_url, parse_datetime};
    use phonenumber::country;

    #[test]
    fn email_shapes() {
        assert!(is_email("jane.doe+agir@example.fr"));
        assert!(!is_email("jane@"));
        assert!(!is_email("jane.example.fr"));
    }

    #[test]
    fn phone_uses_library_validity_not_digit_count() {
        assert!(is_phone("06 12 34 56 78", Some(country::Id::FR)));
        assert!(is_phone("+33 6 12 34 56 78", None));
        assert!(!is_phone("0612", Some(country::Id::FR)));
        assert!(!is_phone("not a number", Some(country::Id::FR)));
    }

    #[test]
    fn url_requires_scheme_and_host() {
        assert!(is_url("https://actionpopulaire.fr/evenements"));
        assert!(!is_url("actionpopulaire.fr"));
        assert!(!is_url("ftp://files.example.org"));
        assert!(!is_url("https://"));
    }

    #[test]
    fn datetime_accepts_several_layouts() {
        assert!(parse_datetime("2026-10-19T18:30:00+02:00").is_some());
        assert!(parse_datetime("2026-10-19 18:30").is_some());
        assert!(parse_datetime("2026-10-19").is_some());
        assert!(parse_datetime("19/10/2026").is_some());
        assert!(parse_datetime("next tuesday").is_none());
        assert!(parse_datetime("2026-13-40").is_none());
    }
}
