use ansi_term::Colour;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use env_logger::{Builder, Env};
use log::Level;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    pub timezone: Tz,
}

/// Installs the global logger. `RUST_LOG` overrides the default `info` filter.
pub fn init(settings: &LogSettings) -> std::io::Result<()> {
    let log_file = match &settings.file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    let timezone = settings.timezone;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let timestamp = format_timestamp(Utc::now(), timezone);
            let module = record.module_path().unwrap_or_default();

            if let Some(file) = &log_file {
                write_plain(file, &timestamp, record.level(), module, record.args())?;
            }

            writeln!(
                buf,
                "[{} {} {}] {}",
                timestamp,
                paint_level(record.level()),
                module,
                record.args()
            )
        })
        .init();

    Ok(())
}

fn format_timestamp(now: DateTime<Utc>, timezone: Tz) -> String {
    now.with_timezone(&timezone)
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}

fn paint_level(level: Level) -> ansi_term::ANSIGenericString<'static, str> {
    let colour = match level {
        Level::Error => Colour::Red,
        Level::Warn => Colour::Yellow,
        Level::Info => Colour::Green,
        Level::Debug => Colour::Blue,
        Level::Trace => Colour::Purple,
    };
    colour.paint(level.as_str())
}

fn write_plain(
    mut file: &File,
    timestamp: &str,
    level: Level,
    module: &str,
    args: &std::fmt::Arguments<'_>,
) -> std::io::Result<()> {
    writeln!(file, "[{} {} {}] {}", timestamp, level, module, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_in_configured_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(format_timestamp(now, Tz::UTC), "2024-03-01T12:00:00+00:00");
        assert_eq!(
            format_timestamp(now, chrono_tz::Europe::Moscow),
            "2024-03-01T15:00:00+03:00"
        );
    }

    #[test]
    fn test_level_is_coloured() {
        let painted = paint_level(Level::Error).to_string();
        assert!(painted.contains("ERROR"));
        assert_ne!(painted, "ERROR");
    }
}
