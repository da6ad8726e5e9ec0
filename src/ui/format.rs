//! 显示格式：文件大小、相对时间、消息时间

use chrono::{DateTime, Local, Utc};

/// 1024 进制，保留至多两位小数，如 "239.92 KB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// 相对时间："Just now" / "5h ago" / "Yesterday" / "Jan 17"
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - ts).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if hours < 48 {
        "Yesterday".to_string()
    } else {
        ts.format("%b %-d").to_string()
    }
}

/// 消息头时间，本地时区 12 小时制，如 "2:05 PM"
pub fn format_clock(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%-I:%M %p").to_string()
}
