//! OPC channel and command numbers.
//!
//! Channel 0 is a broadcast to every output the server drives.
//! Channels 1-255 address individual outputs.

/// Broadcast channel.
pub const BROADCAST: u8 = 0;

/// Payload is RGB triples, one per pixel.
pub const SET_PIXEL_COLORS: u8 = 0x00;

/// Payload starts with a 16-bit system id followed by vendor data.
pub const SYSTEM_EXCLUSIVE: u8 = 0xFF;

/// Returns a human-readable name for a command byte.
pub fn command_name(command: u8) -> &'static str {
    match command {
        SET_PIXEL_COLORS => "SET_PIXEL_COLORS",
        SYSTEM_EXCLUSIVE => "SYSTEM_EXCLUSIVE",
        _ => "UNKNOWN",
    }
}

/// Returns a human-readable name for a channel byte.
pub fn channel_name(channel: u8) -> &'static str {
    if channel == BROADCAST {
        "BROADCAST"
    } else {
        "OUTPUT"
    }
}
