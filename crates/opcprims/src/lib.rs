//! Open Pixel Control for LED installations.
//!
//! opcprims drives OPC servers such as fcserver: it keeps a pixel buffer in
//! wire format, shades layout models with colour functions or particles,
//! and sends frames over TCP without waiting for acknowledgement.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP endpoints, streams and connection state
//! - [`frame`]: OPC packet codec, pixel buffers and Fadecandy SysEx
//! - [`client`]: the pixel client, models and particles (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use opcprims_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use opcprims_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use opcprims_client::*;
}

#[cfg(feature = "client")]
pub use opcprims_client::{Client, ClientConfig, ClientError, Delivery, Model, Particle};
pub use opcprims_transport::{Endpoint, DEFAULT_PORT};
