use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

const WORDS_PER_MINUTE: usize = 200;

/// Relative date for recent items, calendar date for anything older than a week.
pub fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date);
    if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    }
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    match (elapsed.num_minutes(), elapsed.num_hours(), elapsed.num_days()) {
        (m, _, _) if m < 60 => plural(m, "minute"),
        (_, h, _) if h < 24 => plural(h, "hour"),
        (_, _, d) if d < 7 => plural(d, "day"),
        _ => date.format("%b %-d, %Y").to_string(),
    }
}

/// Text content of an HTML fragment with whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().join(" ")
}

/// At most `max_chars` characters of plain text, cut at a word boundary.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = plain_text(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

pub fn reading_time_minutes(html: &str) -> usize {
    let words = plain_text(html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn recent_dates_are_relative() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(format_date(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_date(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_date(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(format_date(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_date(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_date(now - Duration::days(30), now), "Apr 20, 2024");
    }

    #[test]
    fn future_dates_read_as_just_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(format_date(now + Duration::hours(2), now), "just now");
    }

    #[test]
    fn html_is_flattened() {
        assert_eq!(
            plain_text("<p>Rain &amp; wind</p>\n<p>across&nbsp;the <b>coast</b></p>"),
            "Rain & wind across the coast"
        );
    }

    #[test]
    fn excerpts_cut_on_words() {
        assert_eq!(excerpt("<p>Short</p>", 20), "Short");
        assert_eq!(
            excerpt("<p>The monsoon arrived early this year, flooding roads.</p>", 24),
            "The monsoon arrived..."
        );
    }

    #[test]
    fn reading_time_has_a_floor() {
        assert_eq!(reading_time_minutes(""), 1);
        let long = "word ".repeat(401);
        assert_eq!(reading_time_minutes(&long), 3);
    }
}
