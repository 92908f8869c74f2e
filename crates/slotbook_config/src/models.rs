// --- File: crates/slotbook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// How the service obtains an authorized Google Calendar client.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Service-account JSON key at `key_path`.
    #[default]
    ServiceAccount,
    /// Installed-app OAuth flow; client secret at `client_secret_path`,
    /// tokens persisted to `token_path`.
    Installed,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default)]
    pub credentials: CredentialSource,
    pub key_path: Option<String>,           // service_account; may be "secret_from_env"
    pub client_secret_path: Option<String>, // installed
    #[serde(default = "default_token_path")]
    pub token_path: String,
    #[serde(default = "default_event_summary")]
    pub event_summary: String,
}

impl Default for GcalConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            credentials: CredentialSource::default(),
            key_path: None,
            client_secret_path: None,
            token_path: default_token_path(),
            event_summary: default_event_summary(),
        }
    }
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_token_path() -> String {
    "token.json".to_string()
}

fn default_event_summary() -> String {
    "Appointment".to_string()
}

// --- Booking Rules Config ---
// Times are HH:MM in UTC, weekdays are three-letter English abbreviations.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_close_time")]
    pub close_time: String,
    #[serde(default = "default_appointment_minutes")]
    pub appointment_minutes: i64,
    #[serde(default = "default_gap_minutes")]
    pub gap_minutes: i64,
    #[serde(default = "default_lead_time_hours")]
    pub lead_time_hours: i64,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            open_time: default_open_time(),
            close_time: default_close_time(),
            appointment_minutes: default_appointment_minutes(),
            gap_minutes: default_gap_minutes(),
            lead_time_hours: default_lead_time_hours(),
            working_days: default_working_days(),
        }
    }
}

fn default_open_time() -> String {
    "09:00".to_string()
}

fn default_close_time() -> String {
    "18:00".to_string()
}

fn default_appointment_minutes() -> i64 {
    40
}

fn default_gap_minutes() -> i64 {
    5
}

fn default_lead_time_hours() -> i64 {
    24
}

fn default_working_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// trace | debug | info | warn | error, defaults to info.
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub gcal: GcalConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
