// Display helpers shared by the views

use chrono::{DateTime, Local, TimeZone, Utc};

/// "d Mon YYYY HH:MM" in local time, e.g. "7 Aug 2024 09:05"
pub fn format_date_time(time: &DateTime<Utc>) -> String {
    format_in(time, &Local)
}

/// Same format in an explicit time zone
pub fn format_in<Tz: TimeZone>(time: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format("%-d %b %Y %H:%M").to_string()
}

/// Size of the binary payload behind a base64 string, e.g. "1.2 KB"
pub fn byte_size(base64: &str) -> String {
    let len = base64.trim_end_matches('=').len();
    let bytes = len * 3 / 4;
    format_bytes(bytes)
}

/// "image/png, 5 bytes" for an attachment, `None` when there is no payload
pub fn attachment_label(data: Option<&str>, content_type: Option<&str>) -> Option<String> {
    let data = data.filter(|d| !d.is_empty())?;
    let size = byte_size(data);
    Some(match content_type {
        Some(kind) => format!("{}, {}", kind, size),
        None => size,
    })
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
