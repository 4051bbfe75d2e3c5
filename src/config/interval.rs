use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Parse interval string like "15s", "5m", "1h", "1d" or raw seconds.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let secs = if let Some(hours) = s.strip_suffix('h') {
        scaled(hours, 3600, "hours")?
    } else if let Some(minutes) = s.strip_suffix('m') {
        scaled(minutes, 60, "minutes")?
    } else if let Some(days) = s.strip_suffix('d') {
        scaled(days, 86400, "days")?
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))?
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '15s', '5m', '1h'", s))?
    };

    Ok(Duration::from_secs(secs))
}

fn scaled(value: &str, unit_secs: u64, unit: &str) -> Result<u64, String> {
    let n = value
        .parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}", unit, value))?;
    n.checked_mul(unit_secs)
        .ok_or_else(|| format!("Interval too large: {}{}", value, &unit[..1]))
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Accepts either an interval string or a bare number of seconds.
pub(crate) fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_interval(&text).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("15s").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_interval("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_interval(" 90 ").unwrap(), Duration::from_secs(90));
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("xm").is_err());
    }

    #[test]
    fn test_parse_interval_overflow_is_an_error() {
        assert!(parse_interval("99999999999999999h").is_err());
        assert!(parse_interval("999999999999999999m").is_err());
        assert!(parse_interval("999999999999999d").is_err());
        assert_eq!(
            parse_interval("99999999999999999h").unwrap_err(),
            "Interval too large: 99999999999999999h"
        );
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(15), "15s");
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(86400), "1d");
        assert_eq!(format_interval(90), "90s");
    }
}
