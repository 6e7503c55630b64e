//! OPC server on tokio using `OpcCodec`.
//!
//! Run with:
//!   cargo run --example async-sink --features async

use futures_util::StreamExt;
use opcprims::frame::OpcCodec;
use opcprims::DEFAULT_PORT;
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(("127.0.0.1", DEFAULT_PORT)).await?;
    eprintln!("Listening on {}", listener.local_addr()?);

    loop {
        let (socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            let mut packets = FramedRead::new(socket, OpcCodec::new());
            while let Some(result) = packets.next().await {
                match result {
                    Ok(packet) => eprintln!(
                        "{peer}: channel {} command {:#04x} {} bytes",
                        packet.channel,
                        packet.command,
                        packet.payload.len()
                    ),
                    Err(e) => {
                        eprintln!("{peer}: {e}");
                        break;
                    }
                }
            }
        });
    }
}
