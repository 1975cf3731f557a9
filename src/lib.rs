pub mod app;
pub mod command;
pub mod config;
pub mod event;
pub mod storage;
pub mod store;
pub mod validation;

use anyhow::Result;
use log::*;

/// Opens the configured file storage and runs the terminal front end.
pub fn run(config: Config) -> Result<()> {
    let data_dir = config.data_dir()?;
    info!("Using data directory {}", data_dir.display());
    let storage = FileStorage::with_limit(data_dir, config.storage.max_value_bytes)?;
    let store = EventStore::with_key(storage, config.storage.events_key.clone());
    app::Application::new(store).run()
}

pub fn init_logger(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use config::Config;
pub use event::{CalendarEvent, EventForm};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::{EventStore, StoreError};
pub use validation::{Field, ValidationError, validate, validate_form};
