//! Fadecandy system-exclusive messages.
//!
//! A SysEx packet uses command `0xFF`. Its payload starts with a 16-bit
//! system id and, for Fadecandy, a 16-bit command id; the rest is the body.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{encode_packet, Packet};
use crate::command::SYSTEM_EXCLUSIVE;
use crate::error::{FrameError, Result};

/// System id assigned to Fadecandy.
pub const SYSTEM_ID_FADECANDY: u16 = 0x0001;

/// Body is colour-correction JSON.
pub const FC_SET_GLOBAL_COLOR_CORRECTION: u16 = 0x0001;

/// Body is one firmware flag byte.
pub const FC_SET_FIRMWARE_CONFIGURATION: u16 = 0x0002;

const FLAG_NO_DITHERING: u8 = 1 << 0;
const FLAG_NO_INTERPOLATION: u8 = 1 << 1;
const FLAG_NO_ACTIVITY_LED: u8 = 1 << 2;
const FLAG_LED_CONTROL: u8 = 1 << 3;

/// A decoded SysEx payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysEx {
    pub system_id: u16,
    pub command_id: u16,
    pub body: Bytes,
}

impl SysEx {
    pub fn new(system_id: u16, command_id: u16, body: impl Into<Bytes>) -> Self {
        Self {
            system_id,
            command_id,
            body: body.into(),
        }
    }

    /// Parse the payload of a SysEx packet.
    pub fn from_packet(packet: &Packet) -> Result<Self> {
        if !packet.is_sysex() {
            return Err(FrameError::InvalidSysEx("not a system exclusive packet"));
        }
        let payload = &packet.payload;
        if payload.len() < 4 {
            return Err(FrameError::InvalidSysEx("payload shorter than 4-byte id"));
        }
        Ok(Self {
            system_id: u16::from_be_bytes([payload[0], payload[1]]),
            command_id: u16::from_be_bytes([payload[2], payload[3]]),
            body: payload.slice(4..),
        })
    }

    /// Append the full packet (header included) to `dst`.
    pub fn encode(&self, channel: u8, dst: &mut BytesMut) -> Result<()> {
        encode_packet(channel, SYSTEM_EXCLUSIVE, &self.payload(), dst)
    }

    pub fn to_packet(&self, channel: u8) -> Packet {
        Packet::new(channel, SYSTEM_EXCLUSIVE, self.payload().freeze())
    }

    fn payload(&self) -> BytesMut {
        let mut payload = BytesMut::with_capacity(4 + self.body.len());
        payload.put_u16(self.system_id);
        payload.put_u16(self.command_id);
        payload.put_slice(&self.body);
        payload
    }

    pub fn is_fadecandy(&self, command_id: u16) -> bool {
        self.system_id == SYSTEM_ID_FADECANDY && self.command_id == command_id
    }
}

/// Behaviour of the Fadecandy status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLed {
    /// Flash on USB activity.
    #[default]
    Activity,
    On,
    Off,
}

/// Fadecandy firmware options, sent as a one-byte flag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareConfig {
    pub dithering: bool,
    pub interpolation: bool,
    pub status_led: StatusLed,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            dithering: true,
            interpolation: true,
            status_led: StatusLed::Activity,
        }
    }
}

impl FirmwareConfig {
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if !self.dithering {
            flags |= FLAG_NO_DITHERING;
        }
        if !self.interpolation {
            flags |= FLAG_NO_INTERPOLATION;
        }
        match self.status_led {
            StatusLed::Activity => {}
            StatusLed::On => flags |= FLAG_NO_ACTIVITY_LED | FLAG_LED_CONTROL,
            StatusLed::Off => flags |= FLAG_NO_ACTIVITY_LED,
        }
        flags
    }

    pub fn from_flags(flags: u8) -> Self {
        let status_led = if flags & FLAG_NO_ACTIVITY_LED == 0 {
            StatusLed::Activity
        } else if flags & FLAG_LED_CONTROL != 0 {
            StatusLed::On
        } else {
            StatusLed::Off
        };
        Self {
            dithering: flags & FLAG_NO_DITHERING == 0,
            interpolation: flags & FLAG_NO_INTERPOLATION == 0,
            status_led,
        }
    }

    pub fn to_sysex(&self) -> SysEx {
        SysEx::new(
            SYSTEM_ID_FADECANDY,
            FC_SET_FIRMWARE_CONFIGURATION,
            vec![self.flags()],
        )
    }

    pub fn from_sysex(sysex: &SysEx) -> Result<Self> {
        if !sysex.is_fadecandy(FC_SET_FIRMWARE_CONFIGURATION) {
            return Err(FrameError::InvalidSysEx("not a firmware configuration"));
        }
        let flags = *sysex
            .body
            .first()
            .ok_or(FrameError::InvalidSysEx("firmware configuration has no body"))?;
        Ok(Self::from_flags(flags))
    }
}

/// Global colour correction curve, serialized as fcserver's JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorCorrection {
    /// Exponent of the nonlinear part of the curve.
    pub gamma: f64,
    /// Per-channel scale applied first; doubles as global brightness.
    pub whitepoint: [f64; 3],
    /// Output/input slope of the linear section near zero.
    pub linear_slope: f64,
    /// Output level where the linear section hands over to the curve.
    /// Zero disables the linear section.
    pub linear_cutoff: f64,
}

impl Default for ColorCorrection {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            whitepoint: [1.0, 1.0, 1.0],
            linear_slope: 1.0,
            linear_cutoff: 0.0,
        }
    }
}

impl ColorCorrection {
    pub fn to_sysex(&self) -> Result<SysEx> {
        let body = serde_json::to_vec(self)?;
        Ok(SysEx::new(
            SYSTEM_ID_FADECANDY,
            FC_SET_GLOBAL_COLOR_CORRECTION,
            body,
        ))
    }

    pub fn from_sysex(sysex: &SysEx) -> Result<Self> {
        if !sysex.is_fadecandy(FC_SET_GLOBAL_COLOR_CORRECTION) {
            return Err(FrameError::InvalidSysEx("not a color correction"));
        }
        Ok(serde_json::from_slice(&sysex.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_packet, MAX_PAYLOAD};

    #[test]
    fn firmware_config_packet_layout() {
        let cfg = FirmwareConfig {
            dithering: true,
            interpolation: false,
            status_led: StatusLed::Activity,
        };
        let mut buf = BytesMut::new();
        cfg.to_sysex().encode(0, &mut buf).unwrap();

        assert_eq!(buf.as_ref(), &[0x00, 0xFF, 0x00, 0x05, 0x00, 0x01, 0x00, 0x02, 0x02]);
    }

    #[test]
    fn firmware_flags() {
        assert_eq!(FirmwareConfig::default().flags(), 0);

        let all_off = FirmwareConfig {
            dithering: false,
            interpolation: false,
            status_led: StatusLed::Off,
        };
        assert_eq!(all_off.flags(), 0b0111);

        let led_on = FirmwareConfig {
            status_led: StatusLed::On,
            ..FirmwareConfig::default()
        };
        assert_eq!(led_on.flags(), 0b1100);
        assert_eq!(FirmwareConfig::from_flags(led_on.flags()), led_on);
        assert_eq!(FirmwareConfig::from_flags(all_off.flags()), all_off);
    }

    #[test]
    fn color_correction_uses_fcserver_keys() {
        let cc = ColorCorrection {
            gamma: 2.5,
            whitepoint: [0.98, 1.0, 1.0],
            linear_slope: 1.0,
            linear_cutoff: 0.0,
        };
        let sysex = cc.to_sysex().unwrap();
        assert_eq!(sysex.command_id, FC_SET_GLOBAL_COLOR_CORRECTION);

        let json: serde_json::Value = serde_json::from_slice(&sysex.body).unwrap();
        assert_eq!(json["gamma"], 2.5);
        assert_eq!(json["linearSlope"], 1.0);
        assert_eq!(json["linearCutoff"], 0.0);
        assert_eq!(json["whitepoint"][0], 0.98);
    }

    #[test]
    fn color_correction_missing_keys_default() {
        let sysex = SysEx::new(
            SYSTEM_ID_FADECANDY,
            FC_SET_GLOBAL_COLOR_CORRECTION,
            br#"{"gamma": 2.2}"#.to_vec(),
        );
        let cc = ColorCorrection::from_sysex(&sysex).unwrap();
        assert_eq!(cc.gamma, 2.2);
        assert_eq!(cc.whitepoint, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn decode_sysex_from_wire() {
        let mut buf = BytesMut::new();
        ColorCorrection::default()
            .to_sysex()
            .unwrap()
            .encode(0, &mut buf)
            .unwrap();

        let packet = decode_packet(&mut buf, MAX_PAYLOAD).unwrap().unwrap();
        let sysex = SysEx::from_packet(&packet).unwrap();
        assert!(sysex.is_fadecandy(FC_SET_GLOBAL_COLOR_CORRECTION));
        assert_eq!(
            ColorCorrection::from_sysex(&sysex).unwrap(),
            ColorCorrection::default()
        );
    }

    #[test]
    fn short_sysex_rejected() {
        let packet = Packet::new(0, SYSTEM_EXCLUSIVE, vec![0, 1]);
        assert!(matches!(
            SysEx::from_packet(&packet),
            Err(FrameError::InvalidSysEx(_))
        ));

        let pixels = Packet::pixel_colors(0, vec![0, 0, 0, 0]);
        assert!(SysEx::from_packet(&pixels).is_err());
    }

    #[test]
    fn wrong_command_rejected() {
        let sysex = FirmwareConfig::default().to_sysex();
        assert!(ColorCorrection::from_sysex(&sysex).is_err());
        assert!(FirmwareConfig::from_sysex(&sysex).is_ok());
    }
}
