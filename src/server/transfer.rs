//! Body transmission in fixed-size chunks.
//!
//! A chunk is filled from the file until it is full or the file is
//! exhausted, then pushed to the peer. A short chunk marks end of file.
//! The peer may accept fewer bytes than offered on any single write; the
//! rest of the chunk is offered again until it has all been taken.

use log::debug;
use std::io::{self, ErrorKind, Read, Write};

pub const CHUNK_SIZE: usize = 1024;

/// Writes all of `buf`, retrying on short writes. Returns the number of write calls made.
pub fn send_all<W: Write>(writer: &mut W, buf: &[u8]) -> io::Result<usize> {
    let mut sent = 0;
    let mut calls = 0;

    while sent < buf.len() {
        match writer.write(&buf[sent..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "peer accepted no bytes",
                ));
            }
            Ok(n) => {
                sent += n;
                calls += 1;
                if sent < buf.len() {
                    debug!("Short write: {}/{} bytes, retrying", sent, buf.len());
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(calls)
}

/// Fills `buf` from `reader` until it is full or the reader reports end of input.
pub fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

/// Copies `reader` to `writer` chunk by chunk. Returns the number of body bytes sent.
pub fn send_file<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<u64> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = read_chunk(reader, &mut chunk)?;
        if bytes_read > 0 {
            send_all(writer, &chunk[..bytes_read])?;
            total += bytes_read as u64;
        }
        if bytes_read < CHUNK_SIZE {
            break;
        }
    }

    Ok(total)
}
