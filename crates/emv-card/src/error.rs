//! Error types for card sessions and record scanning

use emv_common::Track2Error;

/// Failure at the session/channel layer
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Pcsc(#[from] pcsc::Error),
    #[error("Response too short for a status word ({0} bytes)")]
    ShortResponse(usize),
    #[error("Invalid reader name: {0}")]
    InvalidReaderName(String),
    #[error("{0}")]
    Io(String),
}

/// Outcome of a card scan that did not yield a PAN
///
/// `Display` renders the messages historically shown to users, so
/// `err.to_string()` can be shown as-is.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No smart card readers found.")]
    NoReader,
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),
    #[error("No AID found in PSE response.")]
    AidNotFound,
    #[error("Track 2 (PAN) not found in any record.")]
    Track2NotFound,
    #[error("Error: {0}")]
    Transport(#[from] TransportError),
    #[error("Error: {0}")]
    Decode(#[from] Track2Error),
}
