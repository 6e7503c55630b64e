use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use opcprims_frame::{channel_name, command_name, Packet, SysEx};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Pixels shown before a preview is cut short.
const PREVIEW_PIXELS: usize = 8;

#[derive(Serialize)]
struct PacketOutput<'a> {
    schema_id: &'a str,
    connection: u64,
    channel: u8,
    channel_name: &'a str,
    command: u8,
    command_name: &'a str,
    payload_size: usize,
    pixel_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixels: Option<Vec<[u8; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sysex: Option<SysExOutput>,
    timestamp: String,
}

#[derive(Serialize)]
struct SysExOutput {
    system_id: u16,
    command_id: u16,
    body_size: usize,
}

pub fn print_packet(packet: &Packet, connection: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let sysex = SysEx::from_packet(packet).ok().map(|s| SysExOutput {
                system_id: s.system_id,
                command_id: s.command_id,
                body_size: s.body.len(),
            });
            let out = PacketOutput {
                schema_id: "https://schemas.3leaps.dev/opcprims/cli/v1/packet-received.schema.json",
                connection,
                channel: packet.channel,
                channel_name: channel_name(packet.channel),
                command: packet.command,
                command_name: command_name(packet.command),
                payload_size: packet.payload.len(),
                pixel_count: packet.pixel_count(),
                pixels: packet
                    .is_pixel_colors()
                    .then(|| packet.pixels().collect()),
                sysex,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CONN", "CHANNEL", "COMMAND", "SIZE", "PIXELS"])
                .add_row(vec![
                    connection.to_string(),
                    packet.channel.to_string(),
                    command_name(packet.command).to_string(),
                    packet.payload.len().to_string(),
                    pixel_preview(packet),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "conn={} channel={} ({}) command={} size={} pixels={}",
                connection,
                packet.channel,
                channel_name(packet.channel),
                command_name(packet.command),
                packet.payload.len(),
                pixel_preview(packet)
            );
        }
        OutputFormat::Raw => {
            print_raw(packet.payload.as_ref());
        }
    }
}

/// Print a serializable record as one JSON line.
pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Print key/value rows as a table or as `key: value` lines.
pub fn print_fields(rows: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in rows {
                table.add_row(vec![key.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        _ => {
            for (key, value) in rows {
                println!("{key}: {value}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn pixel_preview(packet: &Packet) -> String {
    if !packet.is_pixel_colors() {
        return format!("<{} bytes>", packet.payload.len());
    }
    let mut preview: Vec<String> = packet
        .pixels()
        .take(PREVIEW_PIXELS)
        .map(|[r, g, b]| format!("#{r:02x}{g:02x}{b:02x}"))
        .collect();
    if packet.pixel_count() > PREVIEW_PIXELS {
        preview.push(format!("... ({} total)", packet.pixel_count()));
    }
    preview.join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
