use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::{SET_PIXEL_COLORS, SYSTEM_EXCLUSIVE};
use crate::error::{FrameError, Result};

/// Packet header: channel (1) + command (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// One RGB triple per pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// Most pixels a single set-pixel-colors packet can carry (21845).
pub const MAX_PIXELS: usize = MAX_PAYLOAD / BYTES_PER_PIXEL;

/// The fixed 4-byte OPC packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub channel: u8,
    pub command: u8,
    /// Payload length in bytes.
    pub length: u16,
}

impl Header {
    pub fn new(channel: u8, command: u8, length: u16) -> Self {
        Self {
            channel,
            command,
            length,
        }
    }

    /// Header for a set-pixel-colors packet carrying `pixels` pixels.
    pub fn pixels(channel: u8, pixels: usize) -> Result<Self> {
        if pixels > MAX_PIXELS {
            return Err(FrameError::TooManyPixels {
                count: pixels,
                max: MAX_PIXELS,
            });
        }
        Ok(Self::new(
            channel,
            SET_PIXEL_COLORS,
            (pixels * BYTES_PER_PIXEL) as u16,
        ))
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let [hi, lo] = self.length.to_be_bytes();
        [self.channel, self.command, hi, lo]
    }

    /// Parse a header from the first four bytes of `src`.
    pub fn parse(src: &[u8]) -> Option<Self> {
        match src {
            [channel, command, hi, lo, ..] => Some(Self::new(
                *channel,
                *command,
                u16::from_be_bytes([*hi, *lo]),
            )),
            _ => None,
        }
    }

    /// Header plus payload size on the wire.
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.length as usize
    }
}

/// A complete OPC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub channel: u8,
    pub command: u8,
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet.
    pub fn new(channel: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            channel,
            command,
            payload: payload.into(),
        }
    }

    /// A set-pixel-colors packet from packed RGB bytes.
    pub fn pixel_colors(channel: u8, rgb: impl Into<Bytes>) -> Self {
        Self::new(channel, SET_PIXEL_COLORS, rgb)
    }

    pub fn is_pixel_colors(&self) -> bool {
        self.command == SET_PIXEL_COLORS
    }

    pub fn is_sysex(&self) -> bool {
        self.command == SYSTEM_EXCLUSIVE
    }

    /// Number of complete RGB triples in the payload.
    pub fn pixel_count(&self) -> usize {
        self.payload.len() / BYTES_PER_PIXEL
    }

    /// Iterate the payload as RGB triples. A trailing partial triple is
    /// ignored, as OPC servers do.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.payload
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|rgb| [rgb[0], rgb[1], rgb[2]])
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬───────────┬─────────────┬─────────────────┐
/// │ Channel   │ Command   │ Length      │ Payload         │
/// │ (1B)      │ (1B)      │ (2B BE)     │ (Length bytes)  │
/// └───────────┴───────────┴─────────────┴─────────────────┘
/// ```
pub fn encode_packet(channel: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(channel);
    dst.put_u8(command);
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a packet from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete packet yet.
/// On success, consumes the packet bytes from the buffer.
pub fn decode_packet(src: &mut BytesMut, max_payload: usize) -> Result<Option<Packet>> {
    let Some(header) = Header::parse(&src[..]) else {
        return Ok(None); // Need more data
    };

    let payload_len = header.length as usize;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < header.wire_size() {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Packet {
        channel: header.channel,
        command: header.command,
        payload,
    }))
}

/// Configuration for packet readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 65535 (the protocol limit).
    pub max_payload_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
