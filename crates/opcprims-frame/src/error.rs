/// Errors that can occur during packet encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the 16-bit length field (or the configured
    /// limit) allows.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A pixel count or index beyond what one packet can carry.
    #[error("pixel count {count} exceeds maximum of {max} per packet")]
    TooManyPixels { count: usize, max: usize },

    /// A SysEx payload that is too short or has the wrong shape.
    #[error("invalid sysex message: {0}")]
    InvalidSysEx(&'static str),

    /// A SysEx body could not be serialized or parsed as JSON.
    #[error("sysex json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete packet was received.
    #[error("connection closed (incomplete packet)")]
    ConnectionClosed,
}

impl FrameError {
    /// Whether the peer went away, cleanly or abruptly.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::ConnectionClosed => true,
            Self::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};

    use super::*;

    #[test]
    fn disconnect_kinds() {
        assert!(FrameError::ConnectionClosed.is_disconnect());
        assert!(FrameError::Io(Error::from(ErrorKind::ConnectionReset)).is_disconnect());
        assert!(FrameError::Io(Error::from(ErrorKind::BrokenPipe)).is_disconnect());
        assert!(!FrameError::Io(Error::from(ErrorKind::PermissionDenied)).is_disconnect());
        assert!(!FrameError::InvalidSysEx("short").is_disconnect());
    }
}
