/// Line terminator used on the wire. Bare `\n`, not `\r\n`.
pub const LINE_END: &str = "\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpStatus {
    Ok,
    NotFound,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            // the marker records which step failed; clients see it verbatim
            Self::NotFound => "Not Found (open)",
        }
    }

    pub fn as_response_line(&self) -> String {
        format!("HTTP/1.1 {} {}{}", self.code(), self.text(), LINE_END)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_lines() {
        assert_eq!(HttpStatus::Ok.as_response_line(), "HTTP/1.1 200 OK\n");
        assert_eq!(
            HttpStatus::NotFound.as_response_line(),
            "HTTP/1.1 404 Not Found (open)\n"
        );
    }
}
