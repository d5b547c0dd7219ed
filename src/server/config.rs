use chrono_tz::Tz;
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::logger::LogSettings;

pub const DEFAULT_STATS_FILE: &str = "stats_thread.txt";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// IPv4 address to listen on
    #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    pub host: Ipv4Addr,

    /// Server port
    #[arg(short, long, default_value_t = 80)]
    pub port: u16,

    /// Pending connection queue length handed to listen(2)
    #[arg(long, default_value_t = 10)]
    pub backlog: i32,

    /// Directory request paths are resolved against
    #[arg(short, long, default_value = ".")]
    pub document_root: PathBuf,

    /// File holding the most recent request record
    #[arg(long, default_value = DEFAULT_STATS_FILE)]
    pub stats_file: PathBuf,

    /// Serve from a fixed pool of this many threads instead of one thread per connection
    #[arg(short = 't', long)]
    pub workers: Option<usize>,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Timezone for log timestamps
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    pub log_timezone: Tz,
}

impl ServerConfig {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            file: self.log_file.clone(),
            timezone: self.log_timezone,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED,
            port: 80,
            backlog: 10,
            document_root: PathBuf::from("."),
            stats_file: PathBuf::from(DEFAULT_STATS_FILE),
            workers: None,
            log_file: None,
            log_timezone: Tz::UTC,
        }
    }
}

fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown timezone: {}", name))
}
