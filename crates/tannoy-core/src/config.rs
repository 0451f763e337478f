use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Check payloads against the schema shape at publish time.
    pub validate_payloads: bool,
    /// Log publishes that reach no subscriber.
    pub log_unhandled: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            validate_payloads: true,
            log_unhandled: false,
        }
    }
}
