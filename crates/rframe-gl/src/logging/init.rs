use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g. `"rframe_gl=trace"`.
/// When unset, `RUST_LOG` is read, then `default_level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Capture output through the test harness instead of stderr.
    pub is_test: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

impl LoggingConfig {
    /// Settings for `#[test]` functions: captured output, everything down to `debug`.
    pub fn for_tests() -> Self {
        Self {
            default_level: LevelFilter::Debug,
            is_test: true,
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once per process.
///
/// Later calls are ignored. Returns `false` when another logger was already
/// installed by someone else.
pub fn init_logging(config: LoggingConfig) -> bool {
    let mut installed = true;

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder.write_style(config.write_style).is_test(config.is_test);

        if builder.try_init().is_err() {
            installed = false;
            return;
        }
        log::debug!("logging initialized");
    });

    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_lowers_the_default_level() {
        let config = LoggingConfig::for_tests();
        assert!(config.is_test);
        assert_eq!(config.default_level, LevelFilter::Debug);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::for_tests());
        assert!(init_logging(LoggingConfig::for_tests()));
    }
}
