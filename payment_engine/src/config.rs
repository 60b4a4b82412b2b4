use std::{env, time::Duration};

use bpg_common::helpers::parse_boolean_flag;
use log::*;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX_POLL_FAILURES: u32 = 10;
const DEFAULT_WRITE_RETRIES: u32 = 3;

/// Runtime knobs for the payment watcher and wallet synchronizer.
///
/// Constructed explicitly and passed in at creation time. There is deliberately no process-wide settings object;
/// tests build whatever configuration they need.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    /// Time between successive payment-request polls for one invoice
    pub poll_interval: Duration,
    /// Number of consecutive transient RPC failures tolerated before the watcher gives up with `NodeUnreachable`
    pub max_poll_failures: u32,
    /// Number of retries for the terminal status write before surfacing the failure
    pub write_retries: u32,
    /// When set, a watcher stops polling at the invoice's payment deadline and marks it expired itself
    pub enforce_expiry: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: String::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_failures: DEFAULT_MAX_POLL_FAILURES,
            write_retries: DEFAULT_WRITE_RETRIES,
            enforce_expiry: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("BPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ BPG_DATABASE_URL is not set. Please set it to the URL for the gateway database.");
            String::default()
        });
        let poll_interval = env::var("BPG_POLL_INTERVAL_SECS")
            .ok()
            .map(|s| match s.parse::<u64>() {
                Ok(n) if n > 0 => Duration::from_secs(n),
                _ => {
                    error!(
                        "🪛️ {s} is not a valid value for BPG_POLL_INTERVAL_SECS. Using the default, {}s, instead.",
                        DEFAULT_POLL_INTERVAL.as_secs()
                    );
                    DEFAULT_POLL_INTERVAL
                },
            })
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let max_poll_failures = parse_u32("BPG_MAX_POLL_FAILURES", DEFAULT_MAX_POLL_FAILURES);
        let write_retries = parse_u32("BPG_WRITE_RETRIES", DEFAULT_WRITE_RETRIES);
        let enforce_expiry = parse_boolean_flag(env::var("BPG_ENFORCE_EXPIRY").ok(), true);
        Self { database_url, poll_interval, max_poll_failures, write_retries, enforce_expiry }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn parse_u32(var: &str, default: u32) -> u32 {
    env::var(var)
        .ok()
        .map(|s| {
            s.parse::<u32>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid value for {var}. {e}. Using the default, {default}, instead.");
                default
            })
        })
        .unwrap_or(default)
}
