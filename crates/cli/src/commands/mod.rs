pub mod chat;
pub mod config;
pub mod search;

use homescout_core::config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};

use crate::GlobalArgs;

pub(crate) fn load_config(args: &GlobalArgs) -> Result<AppConfig, ConfigError> {
    AppConfig::load(LoadOptions {
        config_path: args.config.clone(),
        require_file: args.config.is_some(),
        overrides: ConfigOverrides {
            log_level: args.log_level.clone(),
            ..ConfigOverrides::default()
        },
    })
}

pub(crate) fn init_logging(config: &AppConfig) {
    use homescout_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
