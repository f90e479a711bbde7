//! Global constants shared across the workspace.

/// Default configuration file loaded from the working directory at startup.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "botfleet.toml";

/// Directory the SQLite database file lives under.
pub const DATA_DIR: &str = "./data";

/// Tenant identifiers are opaque 36-character strings on the wire.
pub const TENANT_ID_LEN: usize = 36;

/// Device slug rule: starts with a letter, 3-30 chars, then letters,
/// digits, hyphens or underscores.
pub const DEVICE_SLUG_PATTERN: &str = "^[a-zA-Z][a-zA-Z0-9_-]{2,29}$";
