//! Minimal OPC server: accepts clients one at a time and prints each packet.
//!
//! Run with:
//!   cargo run --example print-sink
//!
//! In another terminal:
//!   cargo run --features cli -- fill :7890 --count 8 --color 255,64,0

use opcprims::client::OpcSink;
use opcprims::frame::{command_name, SysEx};
use opcprims::transport::Endpoint;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = OpcSink::bind(&Endpoint::new("127.0.0.1", opcprims::DEFAULT_PORT))?;
    eprintln!("Listening on {}", sink.endpoint());

    loop {
        let mut conn = sink.accept()?;
        eprintln!("Client {} connected from {:?}", conn.id(), conn.peer_addr());

        loop {
            match conn.recv() {
                Ok(packet) if packet.is_sysex() => {
                    let sysex = SysEx::from_packet(&packet)?;
                    eprintln!(
                        "sysex system={:#06x} command={:#06x} body={} bytes",
                        sysex.system_id,
                        sysex.command_id,
                        sysex.body.len()
                    );
                }
                Ok(packet) => {
                    eprintln!(
                        "channel {} {} {} pixels, first {:?}",
                        packet.channel,
                        command_name(packet.command),
                        packet.pixel_count(),
                        packet.pixels().next()
                    );
                }
                Err(e) => {
                    eprintln!("Client disconnected: {e}");
                    break;
                }
            }
        }
    }
}
