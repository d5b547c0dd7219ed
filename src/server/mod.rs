pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod http_status;
pub mod listener;
pub mod request;
pub mod request_handler;
pub mod response;
pub mod stats;
pub mod transfer;

use log::{debug, error, info, warn};
use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::process;
use std::sync::Arc;

use config::ServerConfig;
use connection::Connection;
use dispatcher::Dispatcher;
use request_handler::{Outcome, RequestHandler};
use stats::StatsRecorder;

pub struct HttpServer {
    config: ServerConfig,
    listener: TcpListener,
    handler: Arc<RequestHandler>,
    dispatcher: Dispatcher,
}

impl HttpServer {
    pub fn new(config: &ServerConfig) -> io::Result<Self> {
        let addr = SocketAddrV4::new(config.host, config.port);
        let listener = listener::bind(addr, config.backlog)?;

        let stats = Arc::new(StatsRecorder::new(&config.stats_file));
        let handler = Arc::new(RequestHandler::new(&config.document_root, stats));
        let dispatcher = Dispatcher::new(config.workers);

        info!(
            "Server started on {} (backlog {}, {})",
            listener.local_addr()?,
            config.backlog,
            dispatcher.describe()
        );

        Ok(Self {
            config: config.clone(),
            listener,
            handler,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process is killed.
    pub fn run(&self) {
        info!(
            "Serving {:?}, stats in {:?}",
            self.handler.document_root(),
            self.config.stats_file
        );

        let mut total_connections: u64 = 0;
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    total_connections += 1;
                    debug!("Accepted connection from {} (total: {})", addr, total_connections);
                    self.dispatch(stream, addr);
                }
                Err(e) => {
                    error!("Accept failed: {}", e);
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let handler = Arc::clone(&self.handler);
        let job = move || serve_connection(&handler, Connection::accepted(stream, addr));

        // a failed spawn drops the job, which closes the stream
        if let Err(e) = self.dispatcher.dispatch(job) {
            error!("Creating worker for {} failed: {}", addr, e);
        }
    }
}

fn serve_connection(handler: &RequestHandler, conn: Connection<TcpStream>) {
    let peer = conn.peer.clone();
    match handler.handle(conn) {
        Ok(Outcome::Served { bytes }) => debug!("{}: served {} bytes", peer, bytes),
        Ok(outcome) => debug!("{}: {:?}", peer, outcome),
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            process::exit(1);
        }
        Err(e) => warn!("{}: {}", peer, e),
    }
}
