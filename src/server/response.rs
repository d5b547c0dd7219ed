use chrono::{DateTime, Utc};

use super::http_status::{HttpStatus, LINE_END};

pub const CONTENT_TYPE: &str = "text/html";

/// Formats `now` the way C `asctime()` does, trailing newline included.
pub fn asctime(now: DateTime<Utc>) -> String {
    now.format("%a %b %e %H:%M:%S %Y\n").to_string()
}

pub fn not_found() -> String {
    format!("{}{}", HttpStatus::NotFound.as_response_line(), LINE_END)
}

/// Header section of a 200 response, one entry per write on the wire.
/// The last entry carries the blank line that ends the headers.
pub fn ok_headers(now: DateTime<Utc>, content_length: u64) -> Vec<String> {
    vec![
        HttpStatus::Ok.as_response_line(),
        // asctime already ends in a newline
        format!("Date: {}", asctime(now)),
        format!("Content-Length: {}{}", content_length, LINE_END),
        format!("Connection: close{}", LINE_END),
        format!("Content-Type: {}{}{}", CONTENT_TYPE, LINE_END, LINE_END),
    ]
}
