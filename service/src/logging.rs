use crate::config::Config;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// HTTP stack crates whose logs are hidden below TRACE.
const FILTERED_MODULES: &[&str] = &[
    "reqwest", "rustls", "tower", "tower_http", "tracing", "hyper", "hyper_util", "axum",
];

pub struct Logger {}

impl Logger {
    /// Installs the terminal logger at `config.log_level_filter`.
    pub fn init_logger(config: &Config) {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(level);

        if let Err(err) = TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto)
        {
            eprintln!("Logger already initialized: {err}");
        }
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }

    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }
}
