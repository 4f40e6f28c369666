use docket_utils::create_random_secret;
use std::{str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Key operators have to provide in the `x-api-key` header
    pub api_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// Postgres connection string. The in-memory repos are used when missing.
    pub database_url: Option<String>,
    pub reminders: ReminderConfig,
    pub mail: MailConfig,
}

/// Settings for the task reminder poller
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderConfig {
    /// Master switch for sending reminders
    pub enabled: bool,
    /// Minutes between two poll cycles, never less than one
    pub poll_interval_minutes: u64,
    /// Forward edge of the due window
    pub look_ahead_minutes: i64,
    /// Backward edge of the due window. Tolerates poller downtime and slow
    /// cycles without missing reminders that just became due.
    pub grace_minutes: i64,
    /// Maximum number of delivery attempts per (type, key, recipient)
    pub max_attempts_per_recipient: i64,
}

pub const MIN_POLL_INTERVAL_MINUTES: u64 = 1;
/// Upper bound for the look-ahead and grace offsets of the due window (one week)
pub const MAX_WINDOW_OFFSET_MINUTES: i64 = 7 * 24 * 60;

fn clamp_window_offset(name: &str, minutes: i64) -> i64 {
    if minutes > MAX_WINDOW_OFFSET_MINUTES {
        warn!(
            "{} of {} minutes is above the maximum, using {} minutes instead.",
            name, minutes, MAX_WINDOW_OFFSET_MINUTES
        );
        return MAX_WINDOW_OFFSET_MINUTES;
    }
    minutes.max(0)
}

impl ReminderConfig {
    pub fn from_values(
        enabled: bool,
        poll_interval_minutes: i64,
        look_ahead_minutes: i64,
        grace_minutes: i64,
        max_attempts_per_recipient: i64,
    ) -> Self {
        let poll_interval_minutes = if poll_interval_minutes < MIN_POLL_INTERVAL_MINUTES as i64 {
            warn!(
                "Reminder poll interval of {} minutes is below the minimum, using {} minute instead.",
                poll_interval_minutes, MIN_POLL_INTERVAL_MINUTES
            );
            MIN_POLL_INTERVAL_MINUTES
        } else {
            poll_interval_minutes as u64
        };

        Self {
            enabled,
            poll_interval_minutes,
            look_ahead_minutes: clamp_window_offset("Reminder look-ahead", look_ahead_minutes),
            grace_minutes: clamp_window_offset("Reminder grace period", grace_minutes),
            max_attempts_per_recipient: max_attempts_per_recipient.max(1),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_minutes
                .max(MIN_POLL_INTERVAL_MINUTES)
                .saturating_mul(60),
        )
    }

    fn from_env() -> Self {
        Self::from_values(
            parse_env("REMINDERS_ENABLED", true),
            parse_env("REMINDERS_POLL_INTERVAL_MINUTES", 1),
            parse_env("REMINDERS_LOOK_AHEAD_MINUTES", 30),
            parse_env("REMINDERS_GRACE_MINUTES", 5),
            parse_env("REMINDERS_MAX_ATTEMPTS_PER_RECIPIENT", 3),
        )
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self::from_values(true, 1, 30, 5, 3)
    }
}

/// Settings for the http mail relay used to deliver reminders
#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    /// Endpoint of the mail relay. Reminders are only logged when this is missing.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl MailConfig {
    fn from_env() -> Self {
        Self {
            api_url: non_empty_env("MAIL_API_URL"),
            api_key: non_empty_env("MAIL_API_KEY"),
            from: non_empty_env("MAIL_FROM").unwrap_or_else(|| "reminders@docket.local".into()),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from: "reminders@docket.local".into(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match non_empty_env(key) {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(val) => val,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, raw, default
                );
                default
            }
        },
    }
}

impl Config {
    pub fn new() -> Self {
        let api_key = match non_empty_env("DOCKET_API_KEY") {
            Some(key) => key,
            None => {
                info!("Did not find DOCKET_API_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Operator api key was generated and set to: {}", key);
                key
            }
        };

        Self {
            api_key,
            port: parse_env("PORT", 5000),
            database_url: non_empty_env("DATABASE_URL"),
            reminders: ReminderConfig::from_env(),
            mail: MailConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
