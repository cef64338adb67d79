/// Database configuration and connection management
pub mod database;

/// Store settings and category seeds loaded from config.toml
pub mod store;
