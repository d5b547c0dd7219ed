//! Request-line parsing.
//!
//! Only the first read from the client is inspected. It must start with
//! `GET`, then optional whitespace, a `/`, optional whitespace and a
//! non-empty run of non-whitespace bytes, which becomes the path. Headers
//! and body are never looked at. A NUL byte ends the input.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use thiserror::Error;

/// Size of the buffer the request line is read into.
pub const REQUEST_BUFFER_SIZE: usize = 1024;

const METHOD: &[u8] = b"GET";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    #[error("empty request")]
    Empty,

    #[error("request does not start with GET")]
    UnsupportedMethod,

    #[error("missing '/' before path")]
    MissingSlash,

    #[error("missing path")]
    MissingPath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Raw path bytes, exactly as they appeared on the wire.
    pub path: Vec<u8>,
}

impl Request {
    pub fn parse(buffer: &[u8]) -> Result<Self, RequestError> {
        let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
        let input = &buffer[..end];

        if input.is_empty() {
            return Err(RequestError::Empty);
        }

        let rest = input
            .strip_prefix(METHOD)
            .ok_or(RequestError::UnsupportedMethod)?;
        let rest = skip_whitespace(rest);
        let rest = rest.strip_prefix(b"/").ok_or(RequestError::MissingSlash)?;
        let rest = skip_whitespace(rest);

        let token_len = rest
            .iter()
            .position(|&b| is_space(b))
            .unwrap_or(rest.len());
        if token_len == 0 {
            return Err(RequestError::MissingPath);
        }

        Ok(Self {
            path: rest[..token_len].to_vec(),
        })
    }

    /// The path as the filesystem sees it, byte for byte.
    pub fn fs_path(&self) -> &Path {
        Path::new(OsStr::from_bytes(&self.path))
    }

    /// Printable form for logs and the stats record.
    pub fn display_path(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }
}

// Same set as C isspace() in the "C" locale.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn skip_whitespace(input: &[u8]) -> &[u8] {
    let start = input
        .iter()
        .position(|&b| !is_space(b))
        .unwrap_or(input.len());
    &input[start..]
}
