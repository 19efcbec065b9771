use log::LevelFilter;
use std::env;
use std::io::Write;

/// Target prefix shared by the library and the `fitlog` binary.
pub const LOG_TARGET: &str = "fitlog";

/// Logs `fitlog` targets at `level` and everything else (sqlx, tokio) at no
/// more than warn. `RUST_LOG` directives are applied on top. Calling it again
/// only adjusts the global maximum level.
pub fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{:<5} [{}] {}",
                record.level(),
                short_target(record.target()),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module(LOG_TARGET, level);

    if let Ok(directives) = env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }

    if builder.try_init().is_err() {
        log::set_max_level(level);
    }
}

/// `fitlog::db::workouts` is printed as `db::workouts`.
fn short_target(target: &str) -> &str {
    match target.strip_prefix(LOG_TARGET) {
        Some("") => LOG_TARGET,
        Some(rest) => rest.strip_prefix("::").unwrap_or(target),
        None => target,
    }
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    let lvl = match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => return None,
    };
    Some(lvl)
}

pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(lvl) => {
            init_logger(lvl);
            true
        }
        None => false,
    }
}
