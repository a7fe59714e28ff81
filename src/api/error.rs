use thiserror::Error;

/// Transport-level failure: the request never produced a usable response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} returned status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
}

/// The response arrived but its body did not match the expected shape.
#[derive(Error, Debug)]
#[error("unexpected response from {url}: {source:?}")]
pub struct ProtocolError {
    pub url: String,
    #[source]
    pub source: anyhow::Error,
}

/// Everything a gateway operation can fail with.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Reserved for client-side validation; no operation raises this yet.
    #[error("invalid input: {0}")]
    UserInput(String),
}
