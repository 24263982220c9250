use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

pub fn setup_simple_logger(level: LevelFilter) -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("wa_nextcloud_bridge")
        .add_filter_allow_str("ntex::web::middleware")
        .build();

    Ok(SimpleLogger::init(level, logger_config)?)
}
