/// Storage engine selection and connection URL resolution
pub mod database;

/// Bot-level options loaded from picord.toml
pub mod bot;

pub use bot::{BotConfig, load_config, load_default_config};
pub use database::DbType;
