/// Current UTC timestamp (Unix millis)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp (Unix seconds)
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
