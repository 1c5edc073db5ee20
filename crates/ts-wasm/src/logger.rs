//! `log` records forwarded to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = wasm_bindgen::JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug => web_sys::console::debug_1(&line),
            Level::Trace => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger with `default` as the level. A no-op once a
/// logger is installed, so an earlier [`set_level`] is kept.
pub fn install(default: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(default);
    }
}

/// Install the console logger if needed and change the level.
pub fn set_level(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Level names as accepted by `setLogLevel`; unknown names fall back to `warn`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Warn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level(" trace "), LevelFilter::Trace);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Warn);
    }
}
