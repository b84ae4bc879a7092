//! Services module
//!
//! Local services the client needs besides the API: credential storage and
//! persisted settings.

pub mod credentials;
pub mod settings;

pub use credentials::{KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use settings::{ClientSettings, SettingsService};
