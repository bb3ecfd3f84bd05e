//! Global logging state.

use crate::level::{Format, Level};
use once_cell::sync::Lazy;
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Level used when neither `ESCONVERT_LOG_LEVEL` nor `ESCONVERT_DEBUG` is set.
pub const DEFAULT_LEVEL: Level = Level::Warn;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(DEFAULT_LEVEL as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `ESCONVERT_DEBUG` was set.
    pub debug: bool,
    /// Minimum level written.
    pub level: Level,
    /// Output format.
    pub format: Format,
    /// Prefix lines with a timestamp (pretty and compact formats).
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: DEFAULT_LEVEL,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Read configuration from the environment.
    ///
    /// - `ESCONVERT_DEBUG=1|true` lowers the default level to debug
    /// - `ESCONVERT_LOG_LEVEL=trace|debug|info|warn|error|off`
    /// - `ESCONVERT_LOG_FORMAT=pretty|compact|json|facade`
    /// - `ESCONVERT_LOG_TIMESTAMPS=0|false` drops timestamps
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|name| env::var(name).ok());

        DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
        LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);

        config
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str| {
            lookup(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        let debug = flag("ESCONVERT_DEBUG").unwrap_or(false);

        let level = lookup("ESCONVERT_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { DEFAULT_LEVEL });

        let format = lookup("ESCONVERT_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let timestamps = flag("ESCONVERT_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            timestamps,
        }
    }
}

/// Force reading the environment now instead of on the first record.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Whether debug mode is on.
#[inline]
pub fn is_debug_enabled() -> bool {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Whether records at `level` are written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    Lazy::force(&CONFIG);
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Current minimum level.
pub fn current_level() -> Level {
    Lazy::force(&CONFIG);
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the minimum level at runtime.
pub fn set_level(level: Level) {
    Lazy::force(&CONFIG);
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it also lowers the level to debug.
pub fn set_debug(enabled: bool) {
    Lazy::force(&CONFIG);
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}
