use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Serenite";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Address the HTTP API binds to unless overridden by `SERENITE_ADDR`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";

/// Get the application data directory
/// ~/Serenite/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Serenite")
}

/// Path of the SQLite database file
pub fn database_path() -> PathBuf {
    app_data_dir().join("serenite.db")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "info,serenite=debug"
}

/// Bind address, `SERENITE_ADDR` override first
pub fn bind_addr() -> String {
    std::env::var("SERENITE_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}
