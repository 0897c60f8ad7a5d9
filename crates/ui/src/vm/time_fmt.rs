use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// `h:mm:ss` from one hour up, `m:ss` below.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    let hours = secs / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    #[test]
    fn remaining_time_labels() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(59), "0:59");
        assert_eq!(format_remaining(5_400), "1:30:00");
        assert_eq!(format_remaining(3_599), "59:59");
        assert_eq!(format_remaining(3_661), "1:01:01");
    }

    #[test]
    fn datetime_label() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13");
    }
}
