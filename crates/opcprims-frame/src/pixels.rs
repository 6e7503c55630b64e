use bytes::BytesMut;

use crate::codec::{Header, BYTES_PER_PIXEL, HEADER_SIZE, MAX_PIXELS};
use crate::command::{BROADCAST, SET_PIXEL_COLORS};
use crate::error::{FrameError, Result};

/// Convert one colour channel to its wire value.
///
/// Clamps to `[0, 255]` first, then truncates toward zero. NaN maps to 0.
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    value.clamp(0.0, 255.0) as u8
}

/// Clamp and truncate an RGB triple.
#[inline]
pub fn clamp_rgb(rgb: [f32; 3]) -> [u8; 3] {
    rgb.map(clamp_channel)
}

/// A set-pixel-colors packet kept in wire format.
///
/// The buffer always holds exactly `4 + 3 * pixel_count` bytes: the header
/// followed by one RGB triple per pixel. It is resized in place, so pixels
/// below the new size keep their bytes and new slots start black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    buf: BytesMut,
    channel: u8,
}

impl PixelBuffer {
    /// An empty buffer on the broadcast channel.
    pub fn new() -> Self {
        Self::with_channel(BROADCAST)
    }

    /// An empty buffer addressed to `channel`.
    pub fn with_channel(channel: u8) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(&Header::new(channel, SET_PIXEL_COLORS, 0).to_bytes());
        Self { buf, channel }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Readdress the packet. Pixel data is untouched.
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel;
        self.buf[0] = channel;
    }

    pub fn pixel_count(&self) -> usize {
        (self.buf.len() - HEADER_SIZE) / BYTES_PER_PIXEL
    }

    /// Resize to `count` pixels and rewrite the header.
    pub fn set_pixel_count(&mut self, count: usize) -> Result<()> {
        let header = Header::pixels(self.channel, count)?;
        self.buf.resize(header.wire_size(), 0);
        self.buf[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        Ok(())
    }

    /// Store one pixel, growing the buffer if `index` is past the end.
    ///
    /// Channels are clamped then truncated; see [`clamp_channel`].
    pub fn set_pixel(&mut self, index: usize, rgb: [f32; 3]) -> Result<()> {
        self.set_pixel_rgb(index, clamp_rgb(rgb))
    }

    /// Store one already-quantized pixel, growing the buffer if needed.
    pub fn set_pixel_rgb(&mut self, index: usize, rgb: [u8; 3]) -> Result<()> {
        if index >= MAX_PIXELS {
            return Err(FrameError::TooManyPixels {
                count: index.saturating_add(1),
                max: MAX_PIXELS,
            });
        }
        if index >= self.pixel_count() {
            self.set_pixel_count(index + 1)?;
        }
        let offset = HEADER_SIZE + index * BYTES_PER_PIXEL;
        self.buf[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
        Ok(())
    }

    /// Read one pixel back.
    pub fn pixel(&self, index: usize) -> Option<[u8; 3]> {
        let offset = HEADER_SIZE + index.checked_mul(BYTES_PER_PIXEL)?;
        let rgb = self.buf.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }

    /// Set every pixel to the same colour.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        for px in self.buf[HEADER_SIZE..].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Set every pixel to black, keeping the count.
    pub fn clear(&mut self) {
        self.buf[HEADER_SIZE..].fill(0);
    }

    pub fn header(&self) -> Header {
        // The buffer always starts with a full header.
        Header::new(
            self.buf[0],
            self.buf[1],
            u16::from_be_bytes([self.buf[2], self.buf[3]]),
        )
    }

    /// The packed RGB payload.
    pub fn payload(&self) -> &[u8] {
        &self.buf[HEADER_SIZE..]
    }

    /// The whole packet, header included, ready to write to the socket.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Wire size of the packet.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the packet carries no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for PixelBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_tracks_pixel_count() {
        let mut px = PixelBuffer::new();
        for n in [0usize, 1, 3, 85, 86, 1000, MAX_PIXELS] {
            px.set_pixel_count(n).unwrap();
            assert_eq!(px.len(), HEADER_SIZE + 3 * n);
            let bytes = px.as_bytes();
            assert_eq!(bytes[0], 0);
            assert_eq!(bytes[1], 0);
            assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]) as usize, 3 * n);
        }
    }

    #[test]
    fn rgb_scenario_bytes() {
        let mut px = PixelBuffer::new();
        px.set_pixel_count(3).unwrap();
        px.set_pixel(0, [255.0, 0.0, 0.0]).unwrap();
        px.set_pixel(1, [0.0, 255.0, 0.0]).unwrap();
        px.set_pixel(2, [0.0, 0.0, 255.0]).unwrap();

        assert_eq!(
            px.as_bytes(),
            &[0, 0, 0, 9, 255, 0, 0, 0, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn clamp_then_truncate() {
        assert_eq!(clamp_channel(-20.0), 0);
        assert_eq!(clamp_channel(-0.9), 0);
        assert_eq!(clamp_channel(0.99), 0);
        assert_eq!(clamp_channel(127.7), 127);
        assert_eq!(clamp_channel(254.999), 254);
        assert_eq!(clamp_channel(255.0), 255);
        assert_eq!(clamp_channel(1e9), 255);
        assert_eq!(clamp_channel(f32::INFINITY), 255);
        assert_eq!(clamp_channel(f32::NEG_INFINITY), 0);
        assert_eq!(clamp_channel(f32::NAN), 0);
    }

    #[test]
    fn set_pixel_grows_and_preserves() {
        let mut px = PixelBuffer::new();
        px.set_pixel(0, [1.0, 2.0, 3.0]).unwrap();
        px.set_pixel(4, [9.0, 9.0, 9.0]).unwrap();

        assert_eq!(px.pixel_count(), 5);
        assert_eq!(px.header().length, 15);
        assert_eq!(px.pixel(0), Some([1, 2, 3]));
        assert_eq!(px.pixel(2), Some([0, 0, 0]));
        assert_eq!(px.pixel(4), Some([9, 9, 9]));
        assert_eq!(px.pixel(5), None);
    }

    #[test]
    fn shrink_keeps_lower_pixels() {
        let mut px = PixelBuffer::new();
        px.set_pixel_count(4).unwrap();
        px.fill([5, 6, 7]);
        px.set_pixel_count(2).unwrap();

        assert_eq!(px.payload(), &[5, 6, 7, 5, 6, 7]);

        px.set_pixel_count(3).unwrap();
        assert_eq!(px.pixel(2), Some([0, 0, 0]));
    }

    #[test]
    fn out_of_range_index_rejected() {
        let mut px = PixelBuffer::new();
        let err = px.set_pixel(MAX_PIXELS, [1.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, FrameError::TooManyPixels { .. }));
        assert!(px.is_empty());

        let err = px.set_pixel_count(MAX_PIXELS + 1).unwrap_err();
        assert!(matches!(err, FrameError::TooManyPixels { .. }));
    }

    #[test]
    fn channel_is_written_to_header() {
        let mut px = PixelBuffer::with_channel(3);
        px.set_pixel_count(1).unwrap();
        assert_eq!(px.as_bytes()[0], 3);

        px.set_channel(0);
        assert_eq!(px.header().channel, 0);
    }

    #[test]
    fn clear_keeps_count() {
        let mut px = PixelBuffer::new();
        px.set_pixel_count(2).unwrap();
        px.fill([200, 100, 50]);
        px.clear();
        assert_eq!(px.pixel_count(), 2);
        assert_eq!(px.payload(), &[0; 6]);
    }
}
