//! Application configuration constants
//!
//! Central location for API paths, timeouts, bounds and the staffing
//! thresholds used by the day view. Runtime-adjustable values live in
//! `services::settings`.

// ===== API =====

/// Prefix for every versioned resource path
pub const API_V1_PREFIX: &str = "/api/v1";

/// Unversioned, unauthenticated liveness probe
pub const HEALTH_PATH: &str = "/health";

/// Base URL used when neither settings nor environment provide one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "KALGARDEN_API_URL";

/// Fixed request timeout in seconds. A timeout is reported as a network error.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Lower bound for a user-configured timeout
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Upper bound for a user-configured timeout (5 minutes)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Extra attempts for failed reads (network or 5xx). Mutations never retry.
pub const QUERY_RETRY_ATTEMPTS: u32 = 1;

/// Pause before retrying a failed read, in milliseconds
pub const QUERY_RETRY_DELAY_MS: u64 = 300;

// ===== Day editing =====

/// Number of undo entries kept; older entries are dropped silently.
pub const UNDO_STACK_LIMIT: usize = 20;

/// Arrival strictly before this time needs morning (FM) coverage.
pub const FM_THRESHOLD: &str = "08:30";

/// Departure strictly after this time needs afternoon (EM) coverage.
pub const EM_THRESHOLD: &str = "13:30";

/// School weekdays are numbered 0 (Monday) through 4 (Friday).
pub const LAST_WEEKDAY: u8 = 4;

/// Display names for weekdays 0..=4
pub const WEEKDAY_NAMES: &[&str] = &["Måndag", "Tisdag", "Onsdag", "Torsdag", "Fredag"];

// ===== Week bounds accepted by the server =====

pub const MIN_YEAR: i32 = 2020;
pub const MAX_YEAR: i32 = 2100;
pub const MAX_WEEK_NUMBER: u32 = 53;

// ===== Local storage =====

/// Environment variable overriding where settings are kept
pub const DATA_DIR_ENV: &str = "KALGARDEN_DATA_DIR";

/// Directory under the user's home holding `settings.json`
pub const APP_DIR_NAME: &str = ".kalgarden-scheduler";

/// Settings file inside the app data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// ===== Credentials =====

/// Service name under which the access token is kept in the OS keyring
pub const KEYRING_SERVICE_NAME: &str = "KalgardenScheduler";

/// Keyring entry holding the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
