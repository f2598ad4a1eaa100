//! Structured logging helpers.
//!
//! Every store operation logs `EVENT key=value` lines prefixed with the
//! store name and, where relevant, the storage key being touched.

use std::fmt;

/// Initialize the process-wide logger. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}

/// Logging context for a content store.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub store: String,
    pub domain: Option<String>,
}

impl LogContext {
    pub fn new(store: &str) -> Self {
        Self {
            store: store.to_string(),
            domain: None,
        }
    }

    pub fn with_domain(&self, domain: &str) -> Self {
        Self {
            store: self.store.clone(),
            domain: Some(domain.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "[store={}] [domain={}]", self.store, domain),
            None => write!(f, "[store={}]", self.store),
        }
    }
}
