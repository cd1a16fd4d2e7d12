use anyhow::Result;
use simple_logger::{set_up_color_terminal, SimpleLogger};

use crate::LoggingConfig;

pub fn init(config: LoggingConfig) -> Result<()> {
    set_up_color_terminal();
    let logger = SimpleLogger::new().with_level(config.level).env();
    logger.init()?;
    Ok(())
}
