use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use threaded_file_server::{HttpServer, ServerConfig, logger};

fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(e) = logger::init(&config.log_settings()) {
        eprintln!("Cannot open log file {:?}: {}", config.log_file, e);
        return ExitCode::FAILURE;
    }

    info!("Starting file server with config: {:?}", config);

    let server = match HttpServer::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    server.run();

    ExitCode::SUCCESS
}
