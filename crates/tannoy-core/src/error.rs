use thiserror::Error;

pub type BusResult<T> = Result<T, BusError>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("invalid payload for event {event}: {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
