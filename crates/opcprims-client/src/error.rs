use std::path::PathBuf;

/// Errors that can occur in client operations.
///
/// Connection failures are not errors: they are logged and reported as
/// [`Delivery::NotConnected`](crate::Delivery::NotConnected).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] opcprims_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] opcprims_frame::FrameError),

    /// A pixel index or count outside what one OPC packet can carry.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Writing a frame failed. The connection has been closed.
    #[error("send failed: {0}")]
    Send(#[source] opcprims_frame::FrameError),

    /// A model file could not be read.
    #[error("failed to read model {path}: {source}")]
    Model {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether this error means the peer closed or reset the connection.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Frame(err) | Self::Send(err) => err.is_disconnect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
