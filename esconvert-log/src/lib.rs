//! Logging for esconvert.
//!
//! Records go to stderr as JSON lines by default. The environment decides
//! what is written:
//!
//! - `ESCONVERT_DEBUG=1` - enable debug records
//! - `ESCONVERT_LOG_LEVEL=trace|debug|info|warn|error|off` (default `warn`)
//! - `ESCONVERT_LOG_FORMAT=pretty|compact|json|facade`
//! - `ESCONVERT_LOG_TIMESTAMPS=0` - drop timestamps from pretty/compact lines
//!
//! The `facade` format hands every record to the `log` crate, so an
//! application that already installed a logger sees esconvert's records
//! there.
//!
//! ```rust
//! use esconvert_log::{debug, info, warn};
//!
//! info!("creating index {}", "orders");
//! debug!(target: "esconvert::mapping", "derived {} fields", 3);
//! warn!("no client bound");
//! ```

mod config;
mod level;
mod sink;

pub use config::{
    DEFAULT_LEVEL, LogConfig, config, current_level, init, is_debug_enabled, is_level_enabled, set_debug,
    set_level,
};
pub use level::{Format, Level};
#[doc(hidden)]
pub use sink::log;

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log at trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Trace, $($arg)+) };
}

/// Log at debug level.
///
/// Written when `ESCONVERT_DEBUG=1` or the level is debug or lower.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Debug, $($arg)+) };
}

/// Log at info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Info, $($arg)+) };
}

/// Log at warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Warn, $($arg)+) };
}

/// Log at error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Error, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
        assert_eq!(" WARNING ".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("none".parse::<Level>(), Ok(Level::Off));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("log".parse::<Format>(), Ok(Format::Facade));
        assert_eq!("Compact".parse::<Format>(), Ok(Format::Compact));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_level_enabled(Level::Off));
        assert_eq!(Level::Off.to_log(), None);
        assert_eq!(Level::Warn.to_log(), Some(log::Level::Warn));
    }

    #[test]
    fn test_runtime_level_and_debug() {
        let original = current_level();
        let original_debug = is_debug_enabled();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);
        assert!(!is_level_enabled(Level::Warn));

        set_debug(true);
        assert!(is_debug_enabled());
        assert_eq!(current_level(), Level::Debug);

        set_debug(original_debug);
        set_level(original);
    }

    #[test]
    fn test_quiet_by_default() {
        assert_eq!(DEFAULT_LEVEL, Level::Warn);
        assert_eq!(LogConfig::default().level, Level::Warn);

        let unset = LogConfig::from_lookup(|_| None);
        assert_eq!(unset.level, Level::Warn);
        assert!(!unset.debug);
        assert_eq!(unset.format, Format::Json);

        let debug = LogConfig::from_lookup(|name| (name == "ESCONVERT_DEBUG").then(|| "1".to_string()));
        assert_eq!(debug.level, Level::Debug);

        let explicit = LogConfig::from_lookup(|name| match name {
            "ESCONVERT_DEBUG" => Some("true".to_string()),
            "ESCONVERT_LOG_LEVEL" => Some("info".to_string()),
            "ESCONVERT_LOG_FORMAT" => Some("facade".to_string()),
            _ => None,
        });
        assert_eq!(explicit.level, Level::Info);
        assert_eq!(explicit.format, Format::Facade);
    }

    #[test]
    fn test_json_line_shape() {
        let line = sink::json_line(Level::Info, "esconvert::client", "created \"orders\"");
        assert!(line.contains(r#""level":"INFO""#));
        assert!(line.contains(r#""target":"esconvert::client""#));
        assert!(line.contains(r#"created \"orders\""#));
    }

    #[test]
    fn test_macros_expand() {
        trace!("trace {}", 1);
        debug!("debug");
        info!(target: "test", "info {}", "x");
        warn!("warn");
        error!(target: "test", "error");
    }
}
