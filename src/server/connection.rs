use log::{debug, warn};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStage {
    Recv,
    Parse,
    Drain,
    SendHeaders,
    SendFile,
    Close,
}

/// Byte stream a connection is served over.
pub trait Transport: Read + Write {
    /// Tears the stream down in both directions.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// One accepted client, owned by a single handler until it is closed.
#[derive(Debug)]
pub struct Connection<S> {
    pub stream: S,
    pub peer: String,
    pub stage: ConnectionStage,
}

impl Connection<TcpStream> {
    pub fn accepted(stream: TcpStream, addr: SocketAddr) -> Self {
        Self::new(stream, addr.to_string())
    }
}

impl<S: Transport> Connection<S> {
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            stage: ConnectionStage::Recv,
        }
    }

    pub fn advance(&mut self, stage: ConnectionStage) {
        debug!("{}: {:?} -> {:?}", self.peer, self.stage, stage);
        self.stage = stage;
    }

    /// A single read of whatever the peer has sent so far, up to `buf.len()`.
    pub fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.stream.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    /// Reads and discards input for as long as each read fills `buf`.
    pub fn drain(&mut self, buf: &mut [u8]) -> usize {
        let mut discarded = 0;
        while let Ok(n) = self.recv(buf) {
            discarded += n;
            if n < buf.len() {
                break;
            }
        }
        discarded
    }

    pub fn close(mut self) {
        self.advance(ConnectionStage::Close);
        // the peer may already be gone
        if let Err(e) = self.stream.shutdown() {
            if e.kind() != io::ErrorKind::NotConnected {
                warn!("{}: shutdown failed: {}", self.peer, e);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// In-memory client: serves `input` to reads, captures writes, and
    /// remembers whether the server closed it.
    #[derive(Clone)]
    pub(crate) struct MockStream {
        input: Arc<Mutex<Cursor<Vec<u8>>>>,
        read_limit: usize,
        write_limit: usize,
        fail_writes: bool,
        pub output: Arc<Mutex<Vec<u8>>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl MockStream {
        pub fn new(input: &[u8]) -> Self {
            Self {
                input: Arc::new(Mutex::new(Cursor::new(input.to_vec()))),
                read_limit: usize::MAX,
                write_limit: usize::MAX,
                fail_writes: false,
                output: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(false)),
            }
        }

        /// Each read returns at most `limit` bytes.
        pub fn with_read_limit(mut self, limit: usize) -> Self {
            self.read_limit = limit;
            self
        }

        /// Each write accepts at most `limit` bytes.
        pub fn with_write_limit(mut self, limit: usize) -> Self {
            self.write_limit = limit;
            self
        }

        /// Every write fails as if the peer had reset the connection.
        pub fn with_failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        pub fn written(&self) -> Vec<u8> {
            self.output.lock().unwrap().clone()
        }

        pub fn is_closed(&self) -> bool {
            *self.closed.lock().unwrap()
        }

        pub fn remaining_input(&self) -> usize {
            let input = self.input.lock().unwrap();
            input.get_ref().len() - input.position() as usize
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.read_limit);
            self.input.lock().unwrap().read(&mut buf[..n])
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"));
            }
            let n = buf.len().min(self.write_limit);
            self.output.lock().unwrap().extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockStream {
        fn shutdown(&mut self) -> io::Result<()> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    #[test]
    fn test_drain_stops_on_short_read() {
        let mut input = vec![b'a'; 2048];
        input.extend_from_slice(&[b'b'; 100]);
        let stream = MockStream::new(&input);
        let mut conn = Connection::new(stream.clone(), "test");

        let mut buf = [0u8; 1024];
        assert_eq!(conn.drain(&mut buf), 2148);
        assert_eq!(stream.remaining_input(), 0);
    }

    #[test]
    fn test_drain_stops_at_end_of_input() {
        let stream = MockStream::new(&[b'a'; 1024]);
        let mut conn = Connection::new(stream.clone(), "test");

        let mut buf = [0u8; 1024];
        assert_eq!(conn.drain(&mut buf), 1024);
    }

    #[test]
    fn test_close_shuts_the_stream_down() {
        let stream = MockStream::new(b"");
        let conn = Connection::new(stream.clone(), "test");
        conn.close();
        assert!(stream.is_closed());
    }
}
