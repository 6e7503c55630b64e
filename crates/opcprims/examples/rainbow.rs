//! Scroll a rainbow along a strip and orbit a particle over it.
//!
//! Run an OPC server (fcserver, or `cargo run --example print-sink`), then:
//!   cargo run --example rainbow

use std::thread;
use std::time::{Duration, Instant};

use opcprims::client::{hsv, Client, Model, ModelPoint, Particle, Vec3};
use opcprims::frame::FirmwareConfig;
use opcprims::transport::Endpoint;

const PIXELS: usize = 64;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = Client::new(Endpoint::local());
    client.on_state_change(|state| eprintln!("connection: {state}"));
    client.set_firmware_config(FirmwareConfig::default())?;

    let strip: Model = (0..PIXELS)
        .map(|i| Some(ModelPoint::new(Vec3::new(i as f32 / PIXELS as f32, 0.0, 0.0))))
        .collect::<Vec<_>>()
        .into();

    let start = Instant::now();
    loop {
        let t = start.elapsed().as_secs_f32();

        if let Err(e) = client.map_pixels(|p| hsv(p.point.x + t * 0.1, 1.0, 0.3), strip.points()) {
            eprintln!("frame failed: {e}");
        }
        thread::sleep(Duration::from_millis(500));

        let orbit = Particle::new(
            Vec3::new(0.5 + 0.5 * t.sin(), 0.0, 0.0),
            [255.0, 255.0, 255.0],
            0.8,
            200.0,
        );
        if let Err(e) = client.map_particles(&[orbit], strip.points()) {
            eprintln!("frame failed: {e}");
        }
        thread::sleep(Duration::from_millis(500));
    }
}
