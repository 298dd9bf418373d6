//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The inbound payload could not be decoded into a command.
    ///
    /// Common causes: not JSON at all, an unknown `command` tag, or a
    /// missing/ill-typed field such as a string `table_id`.
    #[cfg(feature = "json")]
    #[error("malformed message: {0}")]
    Decode(serde_json::Error),
}
