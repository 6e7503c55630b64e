use opcprims_client::load_model;
use tracing::debug;

use crate::cmd::{report_delivery, ShadeArgs};
use crate::exit::{client_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ShadeArgs, format: OutputFormat) -> CliResult<i32> {
    let model = load_model(&args.model).map_err(|err| client_error("model load failed", err))?;
    debug!(
        pixels = model.len(),
        particles = args.particles.len(),
        "shading model"
    );

    let mut client = args.client.client()?;
    let delivery = client
        .map_particles(&args.particles, model.points())
        .map_err(|err| client_error("shade failed", err))?;
    report_delivery(&client, delivery, format)
}
