use colored::{Color, Colorize};
use middleware::logger::LoggerMiddleware;

pub mod middleware {
    pub mod logger;
}

pub const LOG_FILE: &str = "referrals.log";

/// Installs the global logger writing to stdout and [`LOG_FILE`].
pub fn setup() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(level_color(record.level())),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        // driver and transport chatter drowns out request lines
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("hyper", log::LevelFilter::Off)
        .level_for("reqwest", log::LevelFilter::Info)
        .level_for("rustls", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        .chain(fern::log_file(LOG_FILE)?)
        .apply()?;
    Ok(())
}

fn level_color(level: log::Level) -> Color {
    match level {
        log::Level::Error => Color::Red,
        log::Level::Warn => Color::Yellow,
        log::Level::Info => Color::Green,
        log::Level::Debug => Color::Magenta,
        log::Level::Trace => Color::BrightBlack,
    }
}

pub fn middleware() -> LoggerMiddleware {
    LoggerMiddleware::new()
}
