//! TCP transport for Open Pixel Control.
//!
//! OPC runs over a plain TCP byte stream with no framing beyond the packet
//! header. This crate resolves endpoints, opens and accepts connections, and
//! exposes the socket details a real-time sender needs (nodelay, write
//! timeouts, send-queue depth for frame dropping).
//!
//! This is the lowest layer of opcprims. Everything else builds on top of
//! the [`OpcStream`] type provided here.

pub mod endpoint;
pub mod error;
pub mod state;
pub mod stream;
pub mod tcp;

pub use endpoint::{Endpoint, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use state::ConnectionState;
pub use stream::OpcStream;
pub use tcp::{connect, TcpTransport};
