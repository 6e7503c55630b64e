use std::time::Duration;

use opcprims_frame::BROADCAST;

/// Default time allowed for establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bound on one blocking frame write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// How long a connection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Keep the stream open between frames. Reconnects run in the
    /// background; frames written meanwhile are skipped.
    #[default]
    Persistent,
    /// Connect for each frame and disconnect after it is written. The
    /// connect blocks for up to the connect timeout.
    PerFrame,
}

impl ConnectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::PerFrame => "per-frame",
        }
    }
}

/// Client behavior configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Channel written into every pixel packet header. Default: 0 (broadcast).
    pub channel: u8,
    /// Connection lifetime policy.
    pub mode: ConnectionMode,
    /// Timeout for each connect attempt.
    pub connect_timeout: Duration,
    /// Timeout for one frame write. `None` blocks until the kernel accepts it.
    pub write_timeout: Option<Duration>,
    /// Skip a frame when the socket still holds more than one frame of
    /// unsent data.
    pub drop_on_backlog: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            channel: BROADCAST,
            mode: ConnectionMode::Persistent,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
            drop_on_backlog: true,
        }
    }
}
