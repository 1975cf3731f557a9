use anyhow::Result;
use calstash::Config;
use log::error;

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {:#}", e);
            Config::default()
        }
    };

    calstash::init_logger(&config.logging.level);

    if let Err(e) = calstash::run(config) {
        error!("calstash exited with an error: {:?}", e);
        return Err(e);
    }
    Ok(())
}
