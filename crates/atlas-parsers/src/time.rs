//! Time formatting utilities.

use chrono::TimeDelta;

/// Format a duration the way `kubectl` renders ages: `45s`, `12m`, `3h`, `9d`, `2y`.
///
/// Small negative values (clock skew between client and API server) render
/// as `0s`; anything more negative is `<invalid>`.
pub fn short_human_duration(d: TimeDelta) -> String {
    let seconds = d.num_seconds();
    if seconds < -1 {
        return "<invalid>".to_string();
    }
    if seconds < 0 {
        return "0s".to_string();
    }
    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let minutes = d.num_minutes();
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = d.num_hours();
    if hours < 24 {
        format!("{}h", hours)
    } else if hours < 24 * 365 {
        format!("{}d", hours / 24)
    } else {
        format!("{}y", hours / 24 / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_human_duration() {
        assert_eq!(short_human_duration(TimeDelta::seconds(0)), "0s");
        assert_eq!(short_human_duration(TimeDelta::seconds(59)), "59s");
        assert_eq!(short_human_duration(TimeDelta::seconds(60)), "1m");
        assert_eq!(short_human_duration(TimeDelta::minutes(90)), "1h");
        assert_eq!(short_human_duration(TimeDelta::hours(23)), "23h");
        assert_eq!(short_human_duration(TimeDelta::hours(49)), "2d");
        assert_eq!(short_human_duration(TimeDelta::days(800)), "2y");
    }

    #[test]
    fn test_short_human_duration_negative() {
        assert_eq!(short_human_duration(TimeDelta::seconds(-1)), "0s");
        assert_eq!(short_human_duration(TimeDelta::seconds(-30)), "<invalid>");
    }
}
