//! Request Handler: serves exactly one connection from first read to close.
//!
//! ```text
//! recv ──► parse ──bad──► close (nothing sent, no stats)
//!            │
//!            ▼
//!   drain (only if the first read filled the buffer)
//!            │
//!            ▼
//!        open file ──fail──► 404 line ─┐
//!            │                         │
//!            ▼                         │
//!   headers + chunked body             │
//!            │                         │
//!            ▼                         ▼
//!          close ───────────────► record stats
//! ```

use chrono::Utc;
use log::{debug, info, warn};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use super::connection::{Connection, ConnectionStage, Transport};
use super::request::{REQUEST_BUFFER_SIZE, Request};
use super::response;
use super::stats::{ResponseRecord, StatsRecorder};
use super::transfer::{send_all, send_file};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    BadRequest,
    NotFound,
    Served { bytes: u64 },
}

#[derive(Debug, Error)]
pub enum HandlerError {
    /// The connection or the file failed mid-exchange; the connection was abandoned.
    #[error("i/o failure during {stage:?}: {source}")]
    Transport {
        stage: ConnectionStage,
        #[source]
        source: io::Error,
    },

    /// The stats destination could not be written. The server cannot continue.
    #[error("cannot write stats file {path:?}: {source}")]
    Stats {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HandlerError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Stats { .. })
    }
}

pub struct RequestHandler {
    document_root: PathBuf,
    stats: Arc<StatsRecorder>,
}

impl RequestHandler {
    pub fn new(document_root: impl Into<PathBuf>, stats: Arc<StatsRecorder>) -> Self {
        Self {
            document_root: document_root.into(),
            stats,
        }
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    pub fn handle<S: Transport>(&self, mut conn: Connection<S>) -> Result<Outcome, HandlerError> {
        let start = Instant::now();

        let mut buffer = [0u8; REQUEST_BUFFER_SIZE];
        let amt = match conn.recv(&mut buffer) {
            Ok(n) => n,
            Err(e) => {
                debug!("{}: read failed: {}", conn.peer, e);
                0
            }
        };

        conn.advance(ConnectionStage::Parse);
        let request = match Request::parse(&buffer[..amt]) {
            Ok(request) => request,
            Err(e) => {
                warn!("Bad HTTP request from {}: {}", conn.peer, e);
                conn.close();
                return Ok(Outcome::BadRequest);
            }
        };

        if amt == REQUEST_BUFFER_SIZE {
            conn.advance(ConnectionStage::Drain);
            let discarded = conn.drain(&mut buffer);
            debug!("{}: discarded {} trailing request bytes", conn.peer, discarded);
        }

        let (outcome, size) = match self.respond(&mut conn, &request) {
            Ok(result) => result,
            Err(source) => {
                let stage = conn.stage;
                warn!("{}: abandoning connection during {:?}: {}", conn.peer, stage, source);
                conn.close();
                return Err(HandlerError::Transport { stage, source });
            }
        };

        conn.close();
        let record = ResponseRecord {
            path: request.display_path().into_owned(),
            size,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };

        self.stats
            .record(&record)
            .map_err(|source| HandlerError::Stats {
                path: self.stats.path().to_path_buf(),
                source,
            })?;

        Ok(outcome)
    }

    /// Sends the 404 or 200 response. Returns the outcome and the size to record.
    fn respond<S: Transport>(
        &self,
        conn: &mut Connection<S>,
        request: &Request,
    ) -> io::Result<(Outcome, u64)> {
        let file_path = self.document_root.join(request.fs_path());

        let mut file = match File::open(&file_path) {
            Ok(file) => file,
            Err(e) => {
                info!("Not found for {}: {:?} ({})", conn.peer, file_path, e);
                conn.advance(ConnectionStage::SendHeaders);
                send_all(&mut conn.stream, response::not_found().as_bytes())?;
                return Ok((Outcome::NotFound, 0));
            }
        };

        // size comes from the open descriptor, not from seeking
        let size = file.metadata()?.len();

        conn.advance(ConnectionStage::SendHeaders);
        for header in response::ok_headers(Utc::now(), size) {
            send_all(&mut conn.stream, header.as_bytes())?;
        }

        info!("File: {}", request.display_path());

        conn.advance(ConnectionStage::SendFile);
        let sent = send_file(&mut file, &mut conn.stream)?;
        drop(file);

        debug!("{}: sent {} of {} bytes of {:?}", conn.peer, sent, size, file_path);
        Ok((Outcome::Served { bytes: sent }, size))
    }
}
