use chrono::{DateTime, Utc};

/// Get the current Unix timestamp in milliseconds (UTC)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix millisecond timestamp as a local wall-clock time string
/// for display next to chat messages
pub fn format_clock(timestamp_millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_millis) {
        Some(dt) => dt.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_positive() {
        // テスト項目: 現在時刻のタイムスタンプが取得できる
        assert!(now_millis() > 0);
    }

    #[test]
    fn test_format_clock_invalid_timestamp() {
        // テスト項目: 範囲外のタイムスタンプはプレースホルダになる
        assert_eq!(format_clock(i64::MAX), "--:--:--");
    }
}
