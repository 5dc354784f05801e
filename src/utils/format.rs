use chrono::{DateTime, Utc};

/// Case-insensitive substring match, used by the todo filter.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Relative age of a timestamp for display ("just now", "5m ago", ...).
pub fn relative_time(when: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - when).num_minutes();
    if minutes < 1 {
        // Future timestamps from clock skew land here too.
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Buy Milk", "milk"));
        assert!(contains_ignore_case("buy milk", "MILK"));
        assert!(!contains_ignore_case("buy milk", "bread"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(relative_time(Utc::now()), "just now");
        assert_eq!(relative_time(Utc::now() - Duration::minutes(5)), "5m ago");
        assert_eq!(relative_time(Utc::now() - Duration::hours(3)), "3h ago");
        assert_eq!(relative_time(Utc::now() - Duration::days(2)), "2d ago");
    }
}
