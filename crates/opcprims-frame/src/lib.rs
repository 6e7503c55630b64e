//! Open Pixel Control packet framing.
//!
//! Every OPC message is a 4-byte header followed by a payload:
//! - 1-byte channel (0 broadcasts to all channels)
//! - 1-byte command (0 sets pixel colours, 0xFF is system exclusive)
//! - 2-byte big-endian payload length
//!
//! [`PixelBuffer`] keeps a set-pixel-colors packet in wire form so a frame
//! can be written without re-encoding. Fadecandy SysEx messages live in
//! [`sysex`].

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod error;
pub mod pixels;
pub mod reader;
pub mod sysex;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::OpcCodec;
pub use codec::{
    decode_packet, encode_packet, FrameConfig, Header, Packet, BYTES_PER_PIXEL, HEADER_SIZE,
    MAX_PAYLOAD, MAX_PIXELS,
};
pub use command::{channel_name, command_name, BROADCAST, SET_PIXEL_COLORS, SYSTEM_EXCLUSIVE};
pub use error::{FrameError, Result};
pub use pixels::{clamp_channel, clamp_rgb, PixelBuffer};
pub use reader::PacketReader;
pub use sysex::{ColorCorrection, FirmwareConfig, StatusLed, SysEx};
pub use writer::PacketWriter;
