use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use opcprims_transport::OpcStream;
use tracing::trace;

use crate::codec::{encode_packet, FrameConfig, Packet, HEADER_SIZE};
use crate::error::{FrameError, Result};
use crate::pixels::PixelBuffer;
use crate::reader::transport_to_frame_error;
use crate::sysex::SysEx;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete OPC packets to any `Write` stream.
///
/// A write that times out or fails part-way leaves the stream mid-packet;
/// callers should drop the connection on any error.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> PacketWriter<T> {
    /// Create a new packet writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new packet writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete packet (blocking).
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.send(packet.channel, packet.command, packet.payload.as_ref())
    }

    /// Encode and send a payload.
    pub fn send(&mut self, channel: u8, command: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_packet(channel, command, payload, &mut self.buf)?;

        let wire = std::mem::take(&mut self.buf);
        let result = self.write_wire(&wire);
        self.buf = wire;
        result
    }

    /// Send a pixel buffer as-is; it is already in wire format.
    pub fn write_pixels(&mut self, pixels: &PixelBuffer) -> Result<()> {
        self.write_wire(pixels.as_bytes())
    }

    /// Send a SysEx message.
    pub fn write_sysex(&mut self, channel: u8, sysex: &SysEx) -> Result<()> {
        self.buf.clear();
        sysex.encode(channel, &mut self.buf)?;

        let wire = std::mem::take(&mut self.buf);
        let result = self.write_wire(&wire);
        self.buf = wire;
        result
    }

    fn write_wire(&mut self, wire: &[u8]) -> Result<()> {
        debug_assert!(wire.len() >= HEADER_SIZE);

        let mut offset = 0usize;
        while offset < wire.len() {
            match self.inner.write(&wire[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        trace!(bytes = wire.len(), "packet written");

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current packet writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl PacketWriter<OpcStream> {
    /// Create a packet writer for `OpcStream` and apply write timeout from config.
    pub fn with_config_opc(inner: OpcStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }

    /// Bytes handed to the kernel but not yet sent, where the platform
    /// reports it.
    pub fn unsent_bytes(&self) -> Option<usize> {
        self.inner.unsent_bytes()
    }
}
