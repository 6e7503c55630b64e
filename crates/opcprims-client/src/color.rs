//! Colour helpers.

/// An RGB colour in `0..=255` space. Values outside the range are clamped
/// when written into a pixel buffer.
pub type Color = [f32; 3];

pub const BLACK: Color = [0.0, 0.0, 0.0];

/// Convert hue, saturation and value to RGB scaled to `0..=255`.
///
/// `h` wraps modulo 1 (negative hues wrap too); `s` and `v` are taken as-is
/// in `[0, 1]`.
pub fn hsv(h: f32, s: f32, v: f32) -> Color {
    let mut h = (h % 1.0) * 6.0;
    if h < 0.0 {
        h += 6.0;
    }

    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [r * 255.0, g * 255.0, b * 255.0]
}

/// Scale a colour by `k`.
pub fn scale(color: Color, k: f32) -> Color {
    color.map(|c| c * k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Color, b: Color) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn primaries() {
        assert!(approx(hsv(0.0, 1.0, 1.0), [255.0, 0.0, 0.0]));
        assert!(approx(hsv(1.0 / 3.0, 1.0, 1.0), [0.0, 255.0, 0.0]));
        assert!(approx(hsv(2.0 / 3.0, 1.0, 1.0), [0.0, 0.0, 255.0]));
    }

    #[test]
    fn hue_wraps() {
        assert!(approx(hsv(1.0, 1.0, 1.0), hsv(0.0, 1.0, 1.0)));
        assert!(approx(hsv(-0.5, 1.0, 1.0), hsv(0.5, 1.0, 1.0)));
        assert!(approx(hsv(2.25, 1.0, 1.0), hsv(0.25, 1.0, 1.0)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert!(approx(hsv(0.7, 0.0, 0.5), [127.5, 127.5, 127.5]));
        assert!(approx(hsv(0.3, 1.0, 0.0), BLACK));
    }
}
