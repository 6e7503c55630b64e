use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use opcprims_client::{
    point_from_components, Client, ClientConfig, Color, ConnectionMode, Delivery, Particle,
};
use opcprims_frame::{ColorCorrection, FirmwareConfig, StatusLed};
use opcprims_transport::Endpoint;

use serde::Serialize;

use crate::exit::{client_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_fields, print_json, print_raw, OutputFormat};

pub mod fill;
pub mod listen;
pub mod model;
pub mod pixels;
pub mod shade;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set every pixel to one colour and send a frame.
    Fill(FillArgs),
    /// Send explicit pixel values.
    Pixels(PixelsArgs),
    /// Light a model with particles and send one frame.
    Shade(ShadeArgs),
    /// Run an OPC server and print received packets.
    Listen(ListenArgs),
    /// Summarise a model file.
    Model(ModelArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Fill(args) => fill::run(args, format),
        Command::Pixels(args) => pixels::run(args, format),
        Command::Shade(args) => shade::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Model(args) => model::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Connection and device options shared by the sending commands.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// OPC server (host, host:port or :port).
    #[arg(default_value = "localhost:7890")]
    pub endpoint: Endpoint,
    /// Channel written into the packet header (0 broadcasts).
    #[arg(long, short = 'c', default_value = "0")]
    pub channel: u8,
    /// Connection timeout (e.g. 2s, 500ms).
    #[arg(long, default_value = "1s")]
    pub connect_timeout: String,
    /// Disable Fadecandy temporal dithering.
    #[arg(long)]
    pub no_dithering: bool,
    /// Disable Fadecandy keyframe interpolation.
    #[arg(long)]
    pub no_interpolation: bool,
    /// Fadecandy status LED: activity, on or off.
    #[arg(long, value_parser = parse_status_led)]
    pub led: Option<StatusLed>,
    /// Send a global colour correction with this gamma.
    #[arg(long)]
    pub gamma: Option<f64>,
}

impl ClientArgs {
    /// Build a one-shot client: connect per frame so the stream is closed
    /// before the process exits.
    pub fn client(&self) -> CliResult<Client> {
        let config = ClientConfig {
            channel: self.channel,
            mode: ConnectionMode::PerFrame,
            connect_timeout: parse_duration(&self.connect_timeout)?,
            ..ClientConfig::default()
        };
        let mut client = Client::with_config(self.endpoint.clone(), config);

        if self.no_dithering || self.no_interpolation || self.led.is_some() {
            let firmware = FirmwareConfig {
                dithering: !self.no_dithering,
                interpolation: !self.no_interpolation,
                status_led: self.led.unwrap_or_default(),
            };
            client
                .set_firmware_config(firmware)
                .map_err(|err| client_error("firmware config failed", err))?;
        }
        if let Some(gamma) = self.gamma {
            client
                .set_color_correction(ColorCorrection {
                    gamma,
                    ..ColorCorrection::default()
                })
                .map_err(|err| client_error("color correction failed", err))?;
        }
        Ok(client)
    }
}

#[derive(Args, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub client: ClientArgs,
    /// Number of pixels.
    #[arg(long, short = 'n', default_value = "64")]
    pub count: usize,
    /// Colour as R,G,B in 0-255.
    #[arg(long, value_parser = parse_color, conflicts_with = "hue")]
    pub color: Option<Color>,
    /// Fully saturated colour from a hue in [0, 1).
    #[arg(long)]
    pub hue: Option<f32>,
}

#[derive(Args, Debug)]
pub struct PixelsArgs {
    #[command(flatten)]
    pub client: ClientArgs,
    /// Pixel values as R,G,B,R,G,B,...
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub data: Vec<f32>,
}

#[derive(Args, Debug)]
pub struct ShadeArgs {
    #[command(flatten)]
    pub client: ClientArgs,
    /// Model file (JSON array of points).
    #[arg(long, short = 'm')]
    pub model: PathBuf,
    /// Particle as x,y,z:r,g,b[:intensity[:falloff]]. Repeatable.
    #[arg(long = "particle", short = 'p', value_parser = parse_particle)]
    pub particles: Vec<Particle>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(default_value = "0.0.0.0:7890")]
    pub endpoint: Endpoint,
    /// Only print packets for these channels (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub channels: Option<Vec<u8>>,
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Model file to read.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Serialize)]
struct DeliveryOutput<'a> {
    schema_id: &'a str,
    endpoint: String,
    delivery: &'a str,
    bytes: usize,
    pixel_count: usize,
}

/// Report the outcome of a one-shot frame. An unreachable server is a failure.
pub fn report_delivery(client: &Client, delivery: Delivery, format: OutputFormat) -> CliResult<i32> {
    let bytes = match delivery {
        Delivery::Sent(bytes) => bytes,
        Delivery::NotConnected => {
            return Err(CliError::new(
                FAILURE,
                format!("could not connect to {}", client.endpoint()),
            ));
        }
        Delivery::Dropped => 0,
    };

    match format {
        OutputFormat::Json => print_json(&DeliveryOutput {
            schema_id: "https://schemas.3leaps.dev/opcprims/cli/v1/frame-sent.schema.json",
            endpoint: client.endpoint().to_string(),
            delivery: delivery.as_str(),
            bytes,
            pixel_count: client.pixel_count(),
        }),
        OutputFormat::Raw => print_raw(client.packet()),
        other => print_fields(
            &[
                ("endpoint", client.endpoint().to_string()),
                ("delivery", delivery.as_str().to_string()),
                ("bytes", bytes.to_string()),
                ("pixels", client.pixel_count().to_string()),
            ],
            other,
        ),
    }
    Ok(SUCCESS)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

fn parse_floats(input: &str, what: &str) -> Result<Vec<f32>, String> {
    input
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| format!("invalid {what} component: {part:?}"))
        })
        .collect()
}

pub fn parse_color(input: &str) -> Result<Color, String> {
    match parse_floats(input, "colour")?.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        other => Err(format!("colour needs 3 components, got {}", other.len())),
    }
}

fn parse_status_led(input: &str) -> Result<StatusLed, String> {
    match input {
        "activity" => Ok(StatusLed::Activity),
        "on" => Ok(StatusLed::On),
        "off" => Ok(StatusLed::Off),
        other => Err(format!("expected activity, on or off, got {other:?}")),
    }
}

/// `x,y,z:r,g,b[:intensity[:falloff]]`. Empty or missing coordinates are zero.
pub fn parse_particle(input: &str) -> Result<Particle, String> {
    let mut parts = input.split(':');
    let point = parts.next().unwrap_or_default();
    let color = parts
        .next()
        .ok_or_else(|| format!("particle {input:?} has no colour"))?;

    let coords = point
        .split(',')
        .take(3)
        .map(|c| match c.trim() {
            "" => Ok(None),
            c => c
                .parse::<f32>()
                .map(Some)
                .map_err(|_| format!("invalid coordinate: {c:?}")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scalar = |part: Option<&str>, default: f32, what: &str| -> Result<f32, String> {
        match part {
            None | Some("") => Ok(default),
            Some(v) => v.trim().parse().map_err(|_| format!("invalid {what}: {v:?}")),
        }
    };
    let intensity = scalar(parts.next(), 1.0, "intensity")?;
    let falloff = scalar(parts.next(), 0.0, "falloff")?;
    if parts.next().is_some() {
        return Err(format!("particle {input:?} has too many fields"));
    }

    Ok(Particle::new(
        point_from_components(&coords),
        parse_color(color)?,
        intensity,
        falloff,
    ))
}
