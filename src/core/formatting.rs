/*
 * Turns raw movie API fields into display text. API records frequently omit optional fields
 * or send zero for "not known"; every helper here maps those cases to a fixed placeholder
 * ("Unknown", "Not available", "N/A") instead of failing.
 */
use crate::core::models::Video;
use time::Date;
use time::macros::format_description;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
pub const POSTER_SIZE: &str = "w500";
pub const DEFAULT_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image";
pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "Not available";
pub const NO_DATE: &str = "N/A";

fn parse_release_date(date: &str) -> Option<Date> {
    Date::parse(date.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Year part of an ISO `YYYY-MM-DD` date; `None` for blank or malformed input.
pub fn year_from_date(date: &str) -> Option<i32> {
    parse_release_date(date).map(|d| d.year())
}

/// "May 17, 2020" for ISO dates; "N/A" when missing. Unparseable text is shown as received.
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date.filter(|d| !d.trim().is_empty()) else {
        return NO_DATE.to_string();
    };
    parse_release_date(raw)
        .and_then(|d| {
            d.format(format_description!(
                "[month repr:long] [day padding:none], [year]"
            ))
            .ok()
        })
        .unwrap_or_else(|| raw.to_string())
}

pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{}h {}m", m / 60, m % 60),
        _ => UNKNOWN.to_string(),
    }
}

/// Whole dollars with thousands separators, e.g. "$160,000,000".
pub fn format_money(amount: Option<u64>) -> String {
    match amount {
        Some(a) if a > 0 => {
            let digits = a.to_string();
            let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            format!("${grouped}")
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_text_or_unknown(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Cuts `text` to `max_chars` characters and appends "..." when anything was removed.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

pub fn full_image_path(path: Option<&str>, size: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(p) => format!("{IMAGE_BASE_URL}{size}{p}"),
        None => DEFAULT_POSTER.to_string(),
    }
}

/// Prefers the first YouTube trailer, otherwise whatever video comes first.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.kind == "Trailer" && v.site == "YouTube")
        .or_else(|| videos.first())
}

pub fn youtube_url(key: &str) -> String {
    format!("https://www.youtube.com/watch?v={key}")
}

/// English name for an ISO 639-1 code; unlisted codes are shown upper-cased.
pub fn language_name(code: Option<&str>) -> String {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return UNKNOWN.to_string();
    };
    let name = match code.to_ascii_lowercase().as_str() {
        "en" => "English",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "it" => "Italian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "hi" => "Hindi",
        "ru" => "Russian",
        "pt" => "Portuguese",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" => "Norwegian",
        "nl" => "Dutch",
        "tr" => "Turkish",
        _ => return code.to_ascii_uppercase(),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(kind: &str, site: &str, key: &str) -> Video {
        Video {
            key: key.into(),
            name: format!("{kind} {key}"),
            site: site.into(),
            kind: kind.into(),
        }
    }

    #[test]
    fn test_year_from_date() {
        assert_eq!(year_from_date("2020-05-17"), Some(2020));
        assert_eq!(year_from_date(""), None);
        assert_eq!(year_from_date("someday"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2010-07-16")), "July 16, 2010");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("2010")), "2010");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(Some(135)), "2h 15m");
        assert_eq!(format_runtime(Some(45)), "0h 45m");
        assert_eq!(format_runtime(Some(0)), "Unknown");
        assert_eq!(format_runtime(None), "Unknown");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(160_000_000)), "$160,000,000");
        assert_eq!(format_money(Some(1_234_567)), "$1,234,567");
        assert_eq!(format_money(Some(999)), "$999");
        assert_eq!(format_money(Some(0)), "Not available");
        assert_eq!(format_money(None), "Not available");
    }

    #[test]
    fn test_truncate_text_is_char_aware() {
        assert_eq!(truncate_text("short", 150), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("Amélie Poulain", 5), "Améli...");
    }

    #[test]
    fn test_full_image_path() {
        assert_eq!(
            full_image_path(Some("/abc.jpg"), POSTER_SIZE),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(full_image_path(None, "original"), DEFAULT_POSTER);
        assert_eq!(full_image_path(Some(""), POSTER_SIZE), DEFAULT_POSTER);
    }

    #[test]
    fn test_pick_trailer_prefers_youtube_trailer() {
        let videos = vec![
            video("Teaser", "YouTube", "t1"),
            video("Trailer", "Vimeo", "v1"),
            video("Trailer", "YouTube", "y1"),
        ];
        assert_eq!(pick_trailer(&videos).map(|v| v.key.as_str()), Some("y1"));

        let no_trailer = vec![video("Featurette", "YouTube", "f1")];
        assert_eq!(pick_trailer(&no_trailer).map(|v| v.key.as_str()), Some("f1"));
        assert!(pick_trailer(&[]).is_none());
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name(Some("en")), "English");
        assert_eq!(language_name(Some("xx")), "XX");
        assert_eq!(language_name(None), "Unknown");
    }
}
