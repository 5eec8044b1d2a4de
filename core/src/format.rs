/// Display helpers: relative timestamps and image URLs
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

pub const DEFAULT_AVATAR: &str = "/static/img/default-avatar.jpg";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an API timestamp. Naive values are taken in `tz`.
fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    NAIVE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(raw, fmt)
            .ok()
            .and_then(|naive| tz.from_local_datetime(&naive).single())
    })
}

/// "just now", "5m ago", "2h 5m ago", "3d ago", or the date after a week
pub fn relative_time(created_at: &str) -> String {
    relative_time_at(created_at, Local::now())
}

pub fn relative_time_at<Tz: TimeZone>(created_at: &str, now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(then) = parse_timestamp(created_at, &now.timezone()) else {
        return created_at.to_string();
    };
    let secs = now.signed_duration_since(then.clone()).num_seconds().max(0);
    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if secs < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        match minutes % 60 {
            0 => format!("{}h ago", hours),
            m => format!("{}h {}m ago", hours, m),
        }
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

/// `YYYY-MM-DD` in local time; unparsable input is returned unchanged
pub fn absolute_date(created_at: &str) -> String {
    match parse_timestamp(created_at, &Local) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => created_at.to_string(),
    }
}

/// Resolve an image path from the API into something displayable.
pub fn image_url(base: &str, path: Option<&str>) -> String {
    match path.map(str::trim) {
        None | Some("") => DEFAULT_AVATAR.to_string(),
        Some(p) if p.starts_with("http") => p.to_string(),
        Some("default-avatar.jpg") | Some("default-avatar.png") => DEFAULT_AVATAR.to_string(),
        Some(p) => format!("{}{}", base.trim_end_matches('/'), p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 11, 10, 2, 0).unwrap()
    }

    #[test]
    fn relative_buckets() {
        assert_eq!(relative_time_at("2025-12-11T10:01:30Z", now()), "just now");
        assert_eq!(relative_time_at("2025-12-11 09:50:00", now()), "12m ago");
        assert_eq!(relative_time_at("2025-12-11T09:02:00", now()), "1h ago");
        assert_eq!(relative_time_at("2025-12-11 08:57:00", now()), "1h 5m ago");
        assert_eq!(relative_time_at("2025-12-08 10:02:00", now()), "3d ago");
        assert_eq!(relative_time_at("2025-11-30 10:02:00", now()), "2025-11-30");
    }

    #[test]
    fn naive_timestamps_use_the_caller_zone() {
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = seoul.with_ymd_and_hms(2025, 12, 11, 19, 2, 0).unwrap();
        assert_eq!(relative_time_at("2025-12-11 18:50:00", now), "12m ago");
        assert_eq!(relative_time_at("2025-12-11T09:00:00Z", now), "1h 2m ago");
        assert_eq!(relative_time_at("2025-11-30 23:30:00", now), "2025-11-30");
    }

    #[test]
    fn future_and_garbage_timestamps() {
        assert_eq!(relative_time_at("2025-12-11T10:05:00Z", now()), "just now");
        assert_eq!(relative_time_at("yesterday", now()), "yesterday");
    }

    #[test]
    fn image_urls() {
        assert_eq!(image_url("http://h:9000", None), DEFAULT_AVATAR);
        assert_eq!(image_url("http://h:9000", Some("")), DEFAULT_AVATAR);
        assert_eq!(image_url("http://h:9000", Some("default-avatar.png")), DEFAULT_AVATAR);
        assert_eq!(
            image_url("http://h:9000/", Some("/uploads/a.jpg")),
            "http://h:9000/uploads/a.jpg"
        );
        assert_eq!(
            image_url("http://h:9000", Some("https://cdn/x.jpg")),
            "https://cdn/x.jpg"
        );
    }
}
