//! `tokio_util::codec` adapter for OPC packets.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_packet, encode_packet, Packet, MAX_PAYLOAD};
use crate::error::FrameError;
use crate::pixels::PixelBuffer;

/// Packet codec for use with `FramedRead` / `FramedWrite`.
#[derive(Debug, Clone, Copy)]
pub struct OpcCodec {
    max_payload: usize,
}

impl OpcCodec {
    pub fn new() -> Self {
        Self {
            max_payload: MAX_PAYLOAD,
        }
    }

    /// Reject incoming packets whose declared length exceeds `max_payload`.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            max_payload: max_payload.min(MAX_PAYLOAD),
        }
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for OpcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for OpcCodec {
    type Item = Packet;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, FrameError> {
        decode_packet(src, self.max_payload)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, FrameError> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl Encoder<Packet> for OpcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_packet(item.channel, item.command, &item.payload, dst)
    }
}

impl Encoder<&PixelBuffer> for OpcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &PixelBuffer, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SET_PIXEL_COLORS;

    #[test]
    fn decodes_across_chunks() {
        let mut codec = OpcCodec::new();
        let mut buf = BytesMut::from(&[0u8, 0, 0, 6, 1, 2][..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[3, 4, 5, 6]);
        let packet = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(packet.command, SET_PIXEL_COLORS);
        assert_eq!(packet.pixels().collect::<Vec<_>>(), vec![[1, 2, 3], [4, 5, 6]]);
    }

    #[test]
    fn truncated_stream_at_eof_is_an_error() {
        let mut codec = OpcCodec::new();
        let mut buf = BytesMut::from(&[0u8, 0, 0, 3, 1][..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(FrameError::ConnectionClosed)
        ));

        let mut empty = BytesMut::new();
        assert!(codec.decode_eof(&mut empty).unwrap().is_none());
    }

    #[test]
    fn pixel_buffer_encodes_verbatim() {
        let mut pixels = PixelBuffer::with_channel(2);
        pixels.set_pixel_rgb(0, [9, 8, 7]).unwrap();

        let mut codec = OpcCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(&pixels, &mut dst).unwrap();
        codec
            .encode(Packet::pixel_colors(2, vec![9, 8, 7]), &mut dst)
            .unwrap();

        assert_eq!(&dst[..7], pixels.as_bytes());
        assert_eq!(&dst[7..], pixels.as_bytes());
    }

    #[test]
    fn max_payload_is_enforced() {
        let mut codec = OpcCodec::with_max_payload(3);
        let mut buf = BytesMut::from(&[0u8, 0, 0, 6][..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(FrameError::PayloadTooLarge { size: 6, max: 3 })
        ));
    }
}
