//! Unified error type for the tic-tac-toe server.

use tictac_protocol::ProtocolError;
use tictac_session::SessionError;
use tictac_table::TableError;
use tictac_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// All variants are transparent, so the `Display` of a rejected command
/// is exactly the underlying error's message. That text is what the
/// requester receives in its `error` notification.
#[derive(Debug, thiserror::Error)]
pub enum TictacError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown or duplicate player).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A table-level error (not found, full, capacity, illegal move).
    #[error(transparent)]
    Table(#[from] TableError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_protocol::{ClientCommand, Codec, JsonCodec, PlayerId, TableId};
    use tictac_table::MoveRejection;

    #[test]
    fn test_from_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gone");
        let err: TictacError = TransportError::Listener(io).into();
        assert!(matches!(err, TictacError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = JsonCodec.decode::<ClientCommand>(b"not json").unwrap_err();
        let err: TictacError = err.into();
        assert!(matches!(err, TictacError::Protocol(ProtocolError::Decode(_))));
        assert!(err.to_string().starts_with("malformed message"));
    }

    #[test]
    fn test_from_session_error() {
        let err: TictacError = SessionError::NotFound(PlayerId(4)).into();
        assert!(matches!(err, TictacError::Session(_)));
    }

    #[test]
    fn test_table_error_message_is_passed_through() {
        let err: TictacError = TableError::from(MoveRejection::NotYourTurn).into();
        assert_eq!(
            err.to_string(),
            TableError::IllegalMove(MoveRejection::NotYourTurn).to_string()
        );
        let err: TictacError = TableError::NotFound(TableId(9)).into();
        assert_eq!(err.to_string(), "table T-9 not found");
    }
}
