use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use opcprims_client::OpcSink;
use tracing::{debug, info};

use crate::cmd::ListenArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let sink = OpcSink::bind(&args.endpoint).map_err(|err| client_error("bind failed", err))?;
    info!(endpoint = %sink.endpoint(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let mut conn = sink
            .accept()
            .map_err(|err| client_error("accept failed", err))?;

        while running.load(Ordering::SeqCst) {
            let packet = match conn.recv() {
                Ok(packet) => packet,
                Err(err) if err.is_disconnect() => {
                    debug!(id = conn.id(), error = %err, "opc client disconnected");
                    break;
                }
                Err(err) => return Err(client_error("receive failed", err)),
            };

            if let Some(channels) = &args.channels {
                if !channels.contains(&packet.channel) {
                    continue;
                }
            }

            print_packet(&packet, conn.id(), format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
